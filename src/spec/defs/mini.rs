//! Decode rules of the mini (8 instruction bit) machine.
//!
//! Instructions carry at most two register fields and the ROM cannot see
//! them: selector values 0 and 1 are replaced by hardware with the first and
//! second register field. Only the group bits and the escape values of the
//! first field reach the decoder.

use super::super::{
    drom::Builder,
    types::{
        hw::{DAddr, Phase, Reg},
        schema::{Rule, Slot, Steps, Table},
    },
};
use super::{
    uops,
    usig::{AluOp, ImmSel, Width},
};
use crate::common::{bools, regs};
use itertools::iproduct;
use std::ops::RangeInclusive;

/// Selector standing for the instruction's first register field.
pub const FIELD_A: Reg = Reg::R0;
/// Selector standing for the instruction's second register field.
pub const FIELD_B: Reg = Reg::R1;

/// `0 nnn aaa q`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Grouped {
    pub group: u32,
    pub a: Reg,
    pub q: bool,
}

/// `1 h mm llll`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Extended {
    pub hi: bool,
    pub mid: u32,
    pub low: u32,
}

impl Slot for Grouped {
    fn addr(&self) -> DAddr {
        DAddr::mini_grouped(Phase::First, self.group, self.a, self.q)
    }
}

impl Slot for Extended {
    fn addr(&self) -> DAddr {
        DAddr::mini_extended(Phase::First, self.hi, self.mid, self.low)
    }
}

impl Grouped {
    fn all(groups: RangeInclusive<u32>) -> impl Iterator<Item = Grouped> {
        iproduct!(groups, regs(), bools()).map(|(group, a, q)| Grouped { group, a, q })
    }

    fn rule(name: &'static str, when: fn(&Grouped) -> bool, emit: fn(&Grouped) -> Steps) -> Rule<Grouped> {
        Rule::new(name, when, emit)
    }

    fn wide(&self) -> bool {
        self.group & 1 == 1
    }

    fn width(&self) -> Width {
        Width::from(self.wide())
    }
}

impl Extended {
    fn all(mid: u32) -> impl Iterator<Item = Extended> {
        iproduct!(bools(), 0..16).map(move |(hi, low)| Extended { hi, mid, low })
    }

    fn rule(name: &'static str, when: fn(&Extended) -> bool, emit: fn(&Extended) -> Steps) -> Rule<Extended> {
        Rule::new(name, when, emit)
    }
}

/// Register ALU ops by low nibble. 12 is `cmp`, which drops the result.
const REG_OPS: [AluOp; 13] = [
    AluOp::Sr,
    AluOp::Sl,
    AluOp::Rr,
    AluOp::Rl,
    AluOp::Asr,
    AluOp::Xor,
    AluOp::And,
    AluOp::Or,
    AluOp::Adc,
    AluOp::Sbb,
    AluOp::Add,
    AluOp::Sub,
    AluOp::Sub,
];
const CMP_NIBBLE: u32 = 12;

fn group_load() -> Table<Grouped> {
    Table::new(
        "lb/lw",
        Grouped::all(0..=1),
        vec![
            Grouped::rule(
                "and/or imm7",
                |s| !s.wide() && s.a.is_escape(),
                |s| {
                    let op = if s.a == Reg::PC { AluOp::Or } else { AluOp::And };
                    uops::logic_imm(op, FIELD_B)
                },
            ),
            Grouped::rule(
                "lb/lw",
                |_| true,
                |s| uops::load(FIELD_A, FIELD_B, s.width(), ImmSel::Simm7),
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
                "xor/cmp imm7",
                |s| !s.wide() && s.a.is_escape(),
                |s| uops::xor_or_cmp_imm(FIELD_B, s.a == Reg::SP),
            ),
            Grouped::rule(
                "push simm7",
                |s| s.wide() && s.a == Reg::PC,
                |_| uops::push_imm(),
            ),
            Grouped::rule(
                "sb/sw",
                |_| true,
                |s| uops::store(FIELD_A, FIELD_B, s.width(), ImmSel::Simm7),
            ),
        ],
    )
}

fn group_add() -> Table<Grouped> {
    Table::new(
        "add",
        Grouped::all(4..=4),
        vec![
            Grouped::rule("swi", |s| s.a == Reg::SP && s.q, |_| uops::swi()),
            Grouped::rule(
                "add pc (link)",
                |s| s.a == Reg::PC && s.q,
                |_| uops::add_link(FIELD_B),
            ),
            Grouped::rule(
                "add simm7",
                |_| true,
                |s| uops::add_imm(FIELD_A, FIELD_B, s.a.is_escape()),
            ),
        ],
    )
}

fn group_imm9() -> Table<Grouped> {
    Table::new(
        "li/addu",
        Grouped::all(5..=5),
        vec![
            Grouped::rule("j simm9", |s| s.a == Reg::PC && s.q, |_| uops::jump()),
            Grouped::rule(
                "addu",
                |s| s.q,
                |s| uops::add_upper(FIELD_A, s.a == Reg::SP),
            ),
            Grouped::rule("last", |s| s.a == Reg::SP, |_| uops::ret_last()),
            Grouped::rule(
                "decs",
                |s| s.a == Reg::PC,
                |_| uops::rmw_stack(FIELD_B, ImmSel::Simm7, true, false),
            ),
            Grouped::rule("li", |_| true, |_| uops::load_imm(FIELD_A)),
        ],
    )
}

fn group_misc() -> Table<Grouped> {
    Table::new(
        "jal/misc",
        Grouped::all(6..=6),
        vec![
            Grouped::rule("jal", |s| s.a.is_escape(), |_| uops::jump_link()),
            Grouped::rule(
                "add22adc33",
                |s| s.q && s.a == Reg::R0,
                |_| uops::add22_adc33(),
            ),
            Grouped::rule("cadd24", |s| s.q && s.a == Reg::R1, |_| uops::cadd24()),
            Grouped::rule(
                "cadd24adc3z",
                |s| s.q && s.a == Reg::R2,
                |_| uops::cadd24_adc3z(),
            ),
            Grouped::rule("csub34", |s| s.q && s.a == Reg::R3, |_| uops::csub34()),
            Grouped::rule(
                "mf2",
                |s| s.q && s.a == Reg::R4,
                |_| uops::move_flags(false),
            ),
            Grouped::rule(
                "m2f",
                |s| s.q && s.a == Reg::R5,
                |_| uops::move_flags(true),
            ),
            Grouped::rule("lurpc", |_| true, |_| uops::load_upper_pc(FIELD_A)),
        ],
    )
}

fn ext_branch() -> Table<Extended> {
    Table::new(
        "jcc",
        Extended::all(0),
        vec![
            Extended::rule(
                "zxt/sxt",
                |s| s.low == 14,
                |s| uops::extend(FIELD_A, s.hi),
            ),
            Extended::rule(
                "cpl/neg",
                |s| s.low == 15,
                |s| uops::cpl_or_neg(FIELD_A, s.hi),
            ),
            Extended::rule("jcc", |_| true, |_| uops::branch()),
        ],
    )
}

fn ext_alu() -> Table<Extended> {
    Table::new(
        "alu",
        Extended::all(1),
        vec![
            Extended::rule(
                "sac",
                |s| s.hi && s.low != 0,
                |_| uops::shift_add(FIELD_A, FIELD_B),
            ),
            Extended::rule("adcz", |s| s.hi, |_| uops::add_carry_zero(FIELD_A)),
            Extended::rule(
                "alu",
                |s| s.low <= CMP_NIBBLE,
                |s| {
                    uops::alu_reg(
                        REG_OPS[s.low as usize],
                        FIELD_A,
                        FIELD_B,
                        s.low != CMP_NIBBLE,
                    )
                },
            ),
            Extended::rule("mov", |s| s.low == 13, |_| uops::mov(FIELD_A, FIELD_B)),
            Extended::rule(
                "mrs",
                |s| s.low == 15,
                |_| uops::read_sel(FIELD_A, FIELD_B),
            ),
            Extended::rule("msr", |_| true, |_| uops::write_sel(FIELD_B, FIELD_A)),
        ],
    )
}

fn ext_stack() -> Table<Extended> {
    Table::new(
        "asr/rl/stack",
        Extended::all(2),
        vec![
            Extended::rule(
                "asr/rl imm4",
                |s| s.low != 0,
                |s| {
                    let op = if s.hi { AluOp::Rl } else { AluOp::Asr };
                    uops::shift_imm(op, FIELD_A)
                },
            ),
            Extended::rule("pop", |s| s.hi, |_| uops::pop(FIELD_A)),
            Extended::rule("push", |_| true, |_| uops::push(FIELD_A)),
        ],
    )
}

fn ext_shift() -> Table<Extended> {
    Table::new(
        "sr/sl/pc",
        Extended::all(3),
        vec![
            Extended::rule(
                "sw pc-indexed",
                |s| s.hi && s.low == 1,
                |_| uops::store_indexed(FIELD_A, Reg::PC, FIELD_B, Width::Word),
            ),
            Extended::rule(
                "sr/sl imm4",
                |s| s.low != 0,
                |s| {
                    let op = if s.hi { AluOp::Sl } else { AluOp::Sr };
                    uops::shift_imm(op, FIELD_A)
                },
            ),
            Extended::rule(
                "lw pc-indexed",
                |s| s.hi,
                |_| uops::load_indexed(FIELD_A, Reg::PC, FIELD_B, Width::Word),
            ),
            Extended::rule("reti", |_| true, |_| uops::reti()),
        ],
    )
}

pub(crate) fn register(builder: &mut Builder) {
    for table in [
        group_load(),
        group_store(),
        group_add(),
        group_imm9(),
        group_misc(),
    ]
    .iter()
    {
        builder.decode(table);
    }

    for table in [ext_branch(), ext_alu(), ext_stack(), ext_shift()].iter() {
        builder.decode(table);
    }
}
