//! Decode rules of the full (11 instruction bit) machine.
//!
//! Every group lists its rules highest priority first. The escape codes SP and
//! PC in a register field routinely turn a pattern into something unrelated,
//! so the order here is load-bearing.

use super::super::{
    drom::Builder,
    types::{
        hw::{DAddr, Phase, Reg},
        schema::{Rule, Slot, Steps, Table},
    },
};
use super::{
    pairs, uops,
    usig::{AluOp, ImmSel, Width},
};
use crate::common::{bools, regs};
use itertools::iproduct;
use std::ops::RangeInclusive;

/// `0 nnn aaa bbb q`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Grouped {
    pub group: u32,
    pub a: Reg,
    pub b: Reg,
    pub q: bool,
}

/// `1 aaa mmm bbb q`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Extended {
    pub a: Reg,
    pub subop: u32,
    pub b: Reg,
    pub q: bool,
}

impl Slot for Grouped {
    fn addr(&self) -> DAddr {
        DAddr::full_grouped(Phase::First, self.group, self.a, self.b, self.q)
    }
}

impl Slot for Extended {
    fn addr(&self) -> DAddr {
        DAddr::full_extended(Phase::First, self.a, self.subop, self.b, self.q)
    }
}

impl Grouped {
    fn all(groups: RangeInclusive<u32>) -> impl Iterator<Item = Grouped> {
        iproduct!(groups, regs(), regs(), bools()).map(|(group, a, b, q)| Grouped { group, a, b, q })
    }

    fn rule(name: &'static str, when: fn(&Grouped) -> bool, emit: fn(&Grouped) -> Steps) -> Rule<Grouped> {
        Rule::new(name, when, emit)
    }

    fn reserved(name: &'static str, when: fn(&Grouped) -> bool) -> Rule<Grouped> {
        Rule::reserved(name, when)
    }

    fn wide(&self) -> bool {
        self.group & 1 == 1
    }

    fn width(&self) -> Width {
        Width::from(self.wide())
    }
}

impl Extended {
    fn all(subops: RangeInclusive<u32>) -> impl Iterator<Item = Extended> {
        iproduct!(regs(), subops, regs(), bools()).map(|(a, subop, b, q)| Extended { a, subop, b, q })
    }

    fn rule(name: &'static str, when: fn(&Extended) -> bool, emit: fn(&Extended) -> Steps) -> Rule<Extended> {
        Rule::new(name, when, emit)
    }

    fn reserved(name: &'static str, when: fn(&Extended) -> bool) -> Rule<Extended> {
        Rule::reserved(name, when)
    }

    fn wide(&self) -> bool {
        self.subop & 1 == 1
    }

    fn width(&self) -> Width {
        Width::from(self.wide())
    }

    /// The 5 bit number spread over `a`'s low bit, `b` and `q` in sub-opcode 1.
    fn packed(&self) -> u32 {
        self.a.low_bit() * 16 + self.b.bits() * 2 + self.q as u32
    }
}

fn addm(n: u32) -> Steps {
    let (r, base) = pairs::addm(n);
    uops::mem_operand(AluOp::Add, r, base)
}

fn subm(r: Reg, k: Reg) -> Steps {
    uops::mem_operand(AluOp::Sub, r, pairs::skip(r, k.bits()))
}

fn can_add(a: Reg, b: Reg) -> bool {
    (a <= Reg::SP && b <= Reg::SP) || (a == Reg::PC && b.is_gpr()) || (a.is_gpr() && b == Reg::PC)
}

/// Register shift and logic ops, indexed by `b`'s low bit, width bit and `q`.
const REG_OPS: [AluOp; 8] = [
    AluOp::Sr,
    AluOp::Sl,
    AluOp::Rr,
    AluOp::Rl,
    AluOp::Asr,
    AluOp::Xor,
    AluOp::And,
    AluOp::Or,
];

fn group_load() -> Table<Grouped> {
    Table::new(
        "lb/lw",
        Grouped::all(0..=1),
        vec![
            Grouped::rule(
                "incm",
                |s| s.wide() && s.a.is_gpr() && s.b == Reg::SP && s.q,
                |s| uops::rmw_indirect(s.a, AluOp::Add, ImmSel::Simm7),
            ),
            Grouped::rule(
                "adcz",
                |s| s.wide() && s.a.is_gpr() && s.b == Reg::PC && s.q,
                |s| uops::add_carry_zero(s.a),
            ),
            Grouped::rule(
                "lb/lw",
                |s| s.wide() || s.a.is_gpr(),
                |s| uops::load(s.a, s.b, s.width(), ImmSel::offset_from(s.b)),
            ),
            Grouped::rule(
                "and/or imm7",
                |s| s.b.is_gpr(),
                |s| {
                    let op = if s.a == Reg::PC { AluOp::Or } else { AluOp::And };
                    uops::logic_imm(op, s.b)
                },
            ),
            Grouped::rule(
                "addm0-3",
                |_| true,
                |s| addm(s.a.low_bit() * 2 + s.b.low_bit()),
            ),
        ],
    )
}

fn group_store() -> Table<Grouped> {
    Table::new(
        "sb/sw",
        Grouped::all(2..=3),
        vec![
            Grouped::rule(
                "push r2/r3",
                |s| s.a == Reg::R5 && s.b == Reg::R5 && s.q,
                |s| uops::push(if s.wide() { Reg::R3 } else { Reg::R2 }),
            ),
            Grouped::rule(
                "subm0x/subm1x",
                |s| s.a == s.b && s.b.is_gpr(),
                |s| subm(if s.wide() { Reg::R1 } else { Reg::R0 }, s.b),
            ),
            Grouped::rule(
                "push r4",
                |s| s.wide() && s.a == Reg::PC && s.b == Reg::R5 && s.q,
                |_| uops::push(Reg::R4),
            ),
            Grouped::rule(
                "subm2x",
                |s| s.wide() && s.a == Reg::PC && s.b.is_gpr(),
                |s| subm(Reg::R2, s.b),
            ),
            Grouped::rule(
                "dincm/ddecm",
                |s| s.wide() && s.a.is_gpr() && s.b.is_escape() && s.q,
                |s| uops::rmw_indirect_double(s.a, s.b == Reg::PC),
            ),
            Grouped::rule(
                "sb/sw",
                |s| s.a.is_gpr() || (s.wide() && s.a == Reg::SP),
                |s| uops::store(s.a, s.b, s.width(), ImmSel::offset_from(s.b)),
            ),
            Grouped::rule(
                "xor/cmp imm7",
                |s| !s.wide() && s.b.is_gpr(),
                |s| uops::xor_or_cmp_imm(s.b, s.a == Reg::SP),
            ),
            Grouped::rule(
                "push r0",
                |s| !s.wide() && s.a == Reg::SP && s.b == Reg::PC && s.q,
                |_| uops::push(Reg::R0),
            ),
            Grouped::rule(
                "addm4-7",
                |s| !s.wide(),
                |s| addm(4 + s.a.low_bit() * 2 + s.b.low_bit()),
            ),
            Grouped::rule("addm12-13", |_| true, |s| addm(12 + s.b.low_bit())),
        ],
    )
}

fn group_add() -> Table<Grouped> {
    Table::new(
        "add",
        Grouped::all(4..=4),
        vec![
            Grouped::rule(
                "swi",
                |s| s.a == Reg::SP && s.b == Reg::SP && s.q,
                |_| uops::swi(),
            ),
            Grouped::rule(
                "push simm7",
                |s| s.a == Reg::SP && s.b == Reg::PC,
                |_| uops::push_imm(),
            ),
            Grouped::rule(
                "add pc (link)",
                |s| s.a == Reg::PC && s.b.is_gpr() && s.q,
                |s| uops::add_link(s.b),
            ),
            // Targets of sp and pc leave the flags alone.
            Grouped::rule(
                "add simm7",
                |s| can_add(s.a, s.b) && !(s.a == Reg::SP && s.q),
                |s| uops::add_imm(s.a, s.b, s.a.is_escape()),
            ),
            Grouped::rule(
                "addm8-9",
                |s| s.a == Reg::PC && s.b.is_escape(),
                |s| addm(8 + s.b.low_bit()),
            ),
        ],
    )
}

fn group_imm9() -> Table<Grouped> {
    Table::new(
        "li/addu",
        Grouped::all(5..=5),
        vec![
            Grouped::rule(
                "j simm9",
                |s| s.a == Reg::SP && s.b < Reg::R4 && s.q,
                |_| uops::jump(),
            ),
            Grouped::reserved("???", |s| s.a == Reg::SP && s.b < Reg::R4),
            Grouped::rule(
                "addu",
                |s| s.a != Reg::PC && s.b >= Reg::R4,
                |s| uops::add_upper(s.a, s.a == Reg::SP),
            ),
            Grouped::rule("li", |s| s.a != Reg::PC, |s| uops::load_imm(s.a)),
            Grouped::rule(
                "push r5",
                |s| s.b == Reg::R5 && s.q,
                |_| uops::push(Reg::R5),
            ),
            Grouped::rule("subm3x", |s| s.b.is_gpr(), |s| subm(Reg::R3, s.b)),
            Grouped::rule(
                "push r1",
                |s| s.b == Reg::PC && s.q,
                |_| uops::push(Reg::R1),
            ),
            Grouped::rule("addm10-11", |_| true, |s| addm(10 + s.b.low_bit())),
        ],
    )
}

fn group_stack() -> Table<Grouped> {
    Table::new(
        "stack/jal",
        Grouped::all(6..=6),
        vec![
            // b: bit 0 steps down, bit 1 steps by two.
            Grouped::rule(
                "incm/decm sp",
                |s| s.a.is_gpr() && s.b < Reg::R4 && !s.q,
                |s| uops::rmw_stack(s.a, ImmSel::Imm7, s.b.low_bit() == 1, s.b >= Reg::R2),
            ),
            Grouped::rule(
                "ls5r",
                |s| s.a <= Reg::R4 && s.b == Reg::R0 && s.q,
                |s| uops::load_r5_pair(s.a),
            ),
            Grouped::rule(
                "last",
                |s| s.a == Reg::R5 && s.b == Reg::R0 && s.q,
                |_| uops::ret_last(),
            ),
            Grouped::rule(
                "ss5r",
                |s| s.a <= Reg::R4 && s.b == Reg::R1 && s.q,
                |s| uops::store_r5_pair(s.a),
            ),
            Grouped::rule(
                "lurpc",
                |s| s.a.is_gpr() && s.b >= Reg::R4,
                |s| uops::load_upper_pc(s.a),
            ),
            Grouped::rule("jal", |s| s.a.is_escape(), |_| uops::jump_link()),
        ],
    )
}

fn subop_branch() -> Table<Extended> {
    Table::new(
        "jcc/mrs",
        Extended::all(0..=1),
        vec![
            Extended::rule(
                "jcc",
                |s| s.subop * 8 + s.a.bits() <= 13,
                |_| uops::branch(),
            ),
            Extended::rule(
                "mrs",
                |s| s.packed() < pairs::MRS_PAIRS,
                |s| {
                    let (dst, src) = pairs::mrs(s.packed());
                    uops::read_sel(dst, src)
                },
            ),
            Extended::rule("stc", |s| s.packed() == 30, |_| uops::set_carry()),
            Extended::reserved("???", |_| true),
        ],
    )
}

fn subop_addm() -> Table<Extended> {
    Table::new(
        "addm14-29",
        Extended::all(2..=3),
        vec![Extended::rule(
            "addm14-29",
            |_| true,
            |s| addm(14 + s.a.bits() * 2 + (s.subop & 1)),
        )],
    )
}

fn subop_unary() -> Table<Extended> {
    Table::new(
        "unary",
        Extended::all(4..=4),
        vec![
            Extended::rule("subm4x", |s| s.a.is_gpr(), |s| subm(Reg::R4, s.a)),
            Extended::rule(
                "zxt/sxt",
                |s| s.a == Reg::SP && s.b.is_gpr(),
                |s| uops::extend(s.b, s.q),
            ),
            Extended::rule(
                "cpl/neg",
                |s| s.a == Reg::PC && s.b.is_gpr(),
                |s| uops::cpl_or_neg(s.b, s.q),
            ),
            Extended::rule(
                "pop",
                |s| pairs::pop_target(s.a, s.b, s.q).is_gpr(),
                |s| uops::pop(pairs::pop_target(s.a, s.b, s.q)),
            ),
            Extended::rule("mf2/m2f", |_| true, |s| uops::move_flags(s.q)),
        ],
    )
}

fn subop_shift() -> Table<Extended> {
    Table::new(
        "shift/misc",
        Extended::all(5..=5),
        vec![
            Extended::rule(
                "sac",
                |s| s.a.is_gpr() && s.b.is_gpr(),
                |s| uops::shift_add(s.a, s.b),
            ),
            Extended::rule(
                "sr/sl imm4",
                |s| s.b.is_gpr(),
                |s| {
                    let op = if s.a == Reg::PC { AluOp::Sl } else { AluOp::Sr };
                    uops::shift_imm(op, s.b)
                },
            ),
            Extended::rule(
                "asr/rl imm4",
                |s| s.a.is_gpr(),
                |s| {
                    let op = if s.b == Reg::PC { AluOp::Rl } else { AluOp::Asr };
                    uops::shift_imm(op, s.a)
                },
            ),
            Extended::rule(
                "di/ei",
                |s| s.a == Reg::SP && s.b == Reg::SP,
                |s| uops::int_enable(s.q),
            ),
            Extended::rule("reti", |s| s.a == Reg::SP && !s.q, |_| uops::reti()),
            Extended::reserved("hlt?", |s| s.a == Reg::SP),
            Extended::rule(
                "add22adc33",
                |s| s.b == Reg::SP && !s.q,
                |_| uops::add22_adc33(),
            ),
            Extended::rule("cadd24", |s| s.b == Reg::SP, |_| uops::cadd24()),
            Extended::rule("cadd24adc3z", |s| !s.q, |_| uops::cadd24_adc3z()),
            Extended::rule("csub34", |_| true, |_| uops::csub34()),
        ],
    )
}

fn subop_indexed() -> Table<Extended> {
    Table::new(
        "indexed",
        Extended::all(6..=7),
        vec![
            Extended::rule(
                "lb/lw indexed",
                |s| !s.q && s.b.is_gpr() && (s.wide() || s.a.is_gpr()),
                |s| uops::load_indexed(s.a, s.b, s.b, s.width()),
            ),
            Extended::rule(
                "mov",
                |s| s.q && s.b.is_gpr() && s.a == s.b && !s.wide(),
                |s| uops::mov(s.a, s.a),
            ),
            Extended::rule(
                "msr",
                |s| s.q && s.b.is_gpr() && s.a == s.b,
                |s| uops::write_sel(s.a, s.a),
            ),
            Extended::rule(
                "sb/sw indexed",
                |s| s.q && s.b.is_gpr() && (s.a.is_gpr() || (s.wide() && s.a == Reg::SP)),
                |s| uops::store_indexed(s.a, s.b, s.b, s.width()),
            ),
            Extended::rule(
                "shift/logic",
                |s| s.a.is_gpr() && s.b.is_escape(),
                |s| {
                    let idx = s.b.low_bit() * 4 + (s.subop & 1) * 2 + s.q as u32;
                    uops::alu_reg(REG_OPS[idx as usize], s.a, s.a, true)
                },
            ),
            Extended::rule(
                "adc/sbb",
                |s| s.a == Reg::SP && !s.wide() && s.b.is_gpr(),
                |s| {
                    let op = if s.q { AluOp::Sbb } else { AluOp::Adc };
                    uops::alu_reg(op, s.b, s.b, true)
                },
            ),
            Extended::rule(
                "add/sub",
                |s| s.a == Reg::PC && !s.wide() && s.b.is_gpr(),
                |s| {
                    let op = if s.q { AluOp::Sub } else { AluOp::Add };
                    uops::alu_reg(op, s.b, s.b, true)
                },
            ),
            Extended::rule(
                "cmp",
                |s| s.a == Reg::PC && s.q && s.b.is_gpr(),
                |s| uops::compare(s.b, s.b),
            ),
        ],
    )
}

pub(crate) fn register(builder: &mut Builder) {
    for table in [
        group_load(),
        group_store(),
        group_add(),
        group_imm9(),
        group_stack(),
    ]
    .iter()
    {
        builder.decode(table);
    }

    for table in [
        subop_branch(),
        subop_addm(),
        subop_unary(),
        subop_shift(),
        subop_indexed(),
    ]
    .iter()
    {
        builder.decode(table);
    }
}
