//! Microcode shapes shared by both variants.
//!
//! Register arguments are raw selector values. In the mini variant selectors
//! `R0` and `R1` are rewired by hardware to the instruction's register fields,
//! so the same shapes serve both decoders.

use super::super::types::{
    hw::{Reg, UInst},
    schema::{CtlWord, Field, Steps},
};
use super::usig::{AluOp, ImmSel, Width};

/// The delay register every two-phase memory operand passes through.
const SCRATCH: Reg = Reg::R5;

fn w() -> CtlWord {
    CtlWord::new()
}

/// `pc = pc + -2`: refetch the current instruction forever.
pub fn trap() -> CtlWord {
    w().dst(Reg::PC)
        .left(Reg::PC)
        .imm(ImmSel::MinusTwo)
        .alu(AluOp::Add)
        .result()
        .with(Field::Crst, 1)
}

pub fn trap_word() -> UInst {
    trap().pack()
}

/// Step constants are negative, so stepping up subtracts them.
fn stepping(down: bool) -> AluOp {
    if down {
        AluOp::Add
    } else {
        AluOp::Sub
    }
}

fn alu3(op: AluOp, dst: Reg, l: Reg, r: Reg) -> CtlWord {
    w().dst(dst).left(l).right(r).alu(op).result().set_flags()
}

fn sp_down() -> CtlWord {
    w().dst(Reg::SP)
        .left(Reg::SP)
        .imm(ImmSel::MinusTwo)
        .alu(AluOp::Add)
        .result()
}

/// Phase 1 of the linking jumps: `pc = delay & -1`.
fn take_link() -> CtlWord {
    w().dst(Reg::PC).alu(AluOp::And).result()
}

// Memory

pub fn load(dst: Reg, base: Reg, width: Width, offset: ImmSel) -> Steps {
    Steps::one(w().read(width).dst(dst).left(base).imm(offset).alu(AluOp::Add))
}

pub fn store(src: Reg, base: Reg, width: Width, offset: ImmSel) -> Steps {
    Steps::one(
        w().write(width)
            .left(base)
            .store_data(src)
            .imm(offset)
            .alu(AluOp::Add),
    )
}

pub fn load_indexed(dst: Reg, base: Reg, index: Reg, width: Width) -> Steps {
    Steps::one(w().read(width).dst(dst).left(base).right(index).alu(AluOp::Add))
}

/// The address is computed first, the data goes out through the ALU on phase 1.
pub fn store_indexed(src: Reg, base: Reg, index: Reg, width: Width) -> Steps {
    Steps::two(
        w().left(base).right(index).alu(AluOp::Add),
        w().write(width)
            .left(src)
            .alu(AluOp::And)
            .result()
            .delayed_fetch(),
    )
}

/// `r = r op mem[base + offset]`, through the scratch register.
pub fn mem_operand(op: AluOp, r: Reg, base: Reg) -> Steps {
    Steps::two(
        w().read(Width::Word)
            .dst(SCRATCH)
            .left(base)
            .imm(ImmSel::offset_from(base))
            .alu(AluOp::Add),
        alu3(op, r, r, SCRATCH),
    )
}

fn read_modify_write(r: Reg, addr: CtlWord, op: AluOp, step: ImmSel) -> Steps {
    Steps::two(
        addr.read(Width::Word).dst(r),
        w().write(Width::Word)
            .left(r)
            .imm(step)
            .alu(op)
            .result()
            .set_flags()
            .delayed_fetch(),
    )
}

/// `mem[r] = mem[r] op step`, leaving the old value in `r`.
pub fn rmw_indirect(r: Reg, op: AluOp, step: ImmSel) -> Steps {
    read_modify_write(r, w().left(r).alu(AluOp::And), op, step)
}

/// Step the word at `mem[sp + offset]` by one (or two), leaving the old value in `r`.
pub fn rmw_stack(r: Reg, offset: ImmSel, down: bool, double: bool) -> Steps {
    let step = if double {
        ImmSel::MinusTwo
    } else {
        ImmSel::Right
    };
    read_modify_write(
        r,
        w().left(Reg::SP).imm(offset).alu(AluOp::Add),
        stepping(down),
        step,
    )
}

/// Double step of `mem[r]`.
pub fn rmw_indirect_double(r: Reg, down: bool) -> Steps {
    rmw_indirect(r, stepping(down), ImmSel::MinusTwo)
}

pub fn load_r5_pair(r: Reg) -> Steps {
    Steps::two(
        w().read(Width::Word)
            .dst(SCRATCH)
            .left(Reg::SP)
            .alu(AluOp::And),
        w().read(Width::Word)
            .dst(r)
            .left(Reg::SP)
            .imm(ImmSel::MinusTwo)
            .alu(AluOp::Sub),
    )
}

pub fn store_r5_pair(r: Reg) -> Steps {
    Steps::two(
        w().write(Width::Word)
            .left(Reg::SP)
            .store_data(SCRATCH)
            .alu(AluOp::And),
        w().write(Width::Word)
            .left(Reg::SP)
            .store_data(r)
            .imm(ImmSel::MinusTwo)
            .alu(AluOp::Sub),
    )
}

// Stack

pub fn push(src: Reg) -> Steps {
    Steps::two(
        w().write(Width::Word)
            .left(Reg::SP)
            .store_data(src)
            .imm(ImmSel::MinusTwo)
            .alu(AluOp::Add),
        sp_down(),
    )
}

pub fn push_imm() -> Steps {
    Steps::two(
        w().write(Width::Word)
            .imm(ImmSel::Simm7)
            .alu(AluOp::Add)
            .result()
            .delayed_fetch()
            .cnz(),
        sp_down(),
    )
}

pub fn pop(dst: Reg) -> Steps {
    Steps::two(
        w().dst(Reg::SP)
            .left(Reg::SP)
            .imm(ImmSel::MinusTwo)
            .alu(AluOp::Sub)
            .result(),
        w().read(Width::Word)
            .dst(dst)
            .left(Reg::SP)
            .imm(ImmSel::MinusTwo)
            .alu(AluOp::Add),
    )
}

// Immediates

pub fn logic_imm(op: AluOp, r: Reg) -> Steps {
    Steps::one(w().dst(r).left(r).imm(ImmSel::Imm7).alu(op).result().set_flags())
}

/// `xor r, imm7`, or `cmp r, simm7` which only sets flags.
pub fn xor_or_cmp_imm(r: Reg, xor: bool) -> Steps {
    let (imm, op) = if xor {
        (ImmSel::Imm7, AluOp::Xor)
    } else {
        (ImmSel::Simm7, AluOp::Sub)
    };
    Steps::one(
        w().dst_if(r, xor)
            .left(r)
            .imm(imm)
            .alu(op)
            .result_if(xor)
            .set_flags(),
    )
}

pub fn add_imm(dst: Reg, src: Reg, keep_flags: bool) -> Steps {
    Steps::one(
        w().dst(dst)
            .left(src)
            .imm(ImmSel::Simm7)
            .alu(AluOp::Add)
            .result()
            .set_flags_if(!keep_flags),
    )
}

pub fn add_upper(r: Reg, keep_flags: bool) -> Steps {
    Steps::one(
        w().dst(r)
            .left(r)
            .imm(ImmSel::Imm9Hi)
            .alu(AluOp::Add)
            .result()
            .set_flags_if(!keep_flags),
    )
}

pub fn load_imm(r: Reg) -> Steps {
    Steps::one(w().dst(r).imm(ImmSel::Simm9).alu(AluOp::Add).result().cnz())
}

pub fn load_upper_pc(r: Reg) -> Steps {
    Steps::one(
        w().dst(r)
            .left(Reg::PC)
            .imm(ImmSel::Imm9Hi)
            .alu(AluOp::Add)
            .result(),
    )
}

pub fn shift_imm(op: AluOp, r: Reg) -> Steps {
    logic_imm(op, r)
}

/// `dst += src << imm4`.
pub fn shift_add(dst: Reg, src: Reg) -> Steps {
    Steps::two(
        w().left(src).imm(ImmSel::Imm7).alu(AluOp::Sl),
        w().dst(dst).right(dst).alu(AluOp::Add).result().set_flags(),
    )
}

// Control flow

pub fn branch() -> Steps {
    Steps::one(
        w().dst(Reg::PC)
            .left(Reg::PC)
            .imm(ImmSel::Simm7Cond)
            .alu(AluOp::Add)
            .result(),
    )
}

pub fn jump() -> Steps {
    Steps::one(
        w().dst(Reg::PC)
            .left(Reg::PC)
            .imm(ImmSel::Simm9)
            .alu(AluOp::Add)
            .result(),
    )
}

pub fn jump_link() -> Steps {
    Steps::two(
        w().dst(SCRATCH)
            .left(Reg::PC)
            .store_data(Reg::PC)
            .imm(ImmSel::Simm11x2)
            .alu(AluOp::Add),
        take_link(),
    )
}

/// Jump to `base + simm7` with the return address in r5.
pub fn add_link(base: Reg) -> Steps {
    Steps::two(
        w().dst(SCRATCH)
            .left(base)
            .store_data(Reg::PC)
            .imm(ImmSel::Simm7)
            .alu(AluOp::Add),
        take_link(),
    )
}

/// Pop the frame and return through r5.
pub fn ret_last() -> Steps {
    Steps::two(
        w().dst(Reg::SP)
            .left(Reg::SP)
            .imm(ImmSel::Imm7)
            .alu(AluOp::Add)
            .result(),
        w().dst(Reg::PC).left(SCRATCH).alu(AluOp::And).result(),
    )
}

pub fn swi() -> Steps {
    Steps::two(
        w().write(Width::Word)
            .left(Reg::PC)
            .imm(ImmSel::MinusTwo)
            .alu(AluOp::Add)
            .result()
            .delayed_fetch(),
        w().dst(Reg::PC)
            .imm(ImmSel::Simm7)
            .alu(AluOp::Add)
            .result()
            .cnz()
            .int_write(),
    )
}

pub fn reti() -> Steps {
    Steps::one(
        w().read(Width::Word)
            .dst(Reg::PC)
            .alu(AluOp::Add)
            .delayed_fetch()
            .int_write(),
    )
}

pub fn int_enable(on: bool) -> Steps {
    Steps::one(w().alu(AluOp::Add).int_write().sel_iflags_if(on))
}

// Register ALU

pub fn alu_reg(op: AluOp, dst: Reg, src: Reg, writeback: bool) -> Steps {
    Steps::one(alu3(op, dst, dst, src).dst_if(dst, writeback))
}

/// Flags of `l - r`, nothing else.
pub fn compare(l: Reg, r: Reg) -> Steps {
    Steps::one(w().left(l).right(r).alu(AluOp::Sub).set_flags())
}

pub fn add_carry_zero(r: Reg) -> Steps {
    Steps::one(w().dst(r).right(r).alu(AluOp::Adc).result().set_flags().cnz())
}

pub fn mov(dst: Reg, src: Reg) -> Steps {
    Steps::one(w().dst(dst).right(src).alu(AluOp::Add).result().cnz())
}

pub fn extend(r: Reg, signed: bool) -> Steps {
    let op = if signed { AluOp::Sxt } else { AluOp::Zxt };
    Steps::one(w().dst(r).left(r).right(r).alu(op).result())
}

/// `cpl` xors with the undriven -1; `neg` subtracts from the undriven left side.
pub fn cpl_or_neg(r: Reg, neg: bool) -> Steps {
    let op = if neg { AluOp::Sub } else { AluOp::Xor };
    Steps::one(
        w().dst(r)
            .left_if(r, !neg)
            .right_if(r, neg)
            .alu(op)
            .result()
            .set_flags_if(neg)
            .cnz_if(neg),
    )
}

pub fn set_carry() -> Steps {
    Steps::one(w().left(Reg::PC).alu(AluOp::Sub).set_flags())
}

/// `mf2` moves r2 into the flags, `m2f` the flags into r2.
pub fn move_flags(into_r2: bool) -> Steps {
    Steps::one(
        w().dst_if(Reg::R2, into_r2)
            .left(Reg::R2)
            .alu(AluOp::And)
            .result_if(!into_r2)
            .set_flags_if(!into_r2)
            .flags_out_if(into_r2)
            .sel_iflags_if(!into_r2),
    )
}

pub fn read_sel(dst: Reg, src: Reg) -> Steps {
    Steps::one(w().dst(dst).left(src).alu(AluOp::And).sel().sel_iflags_if(true))
}

pub fn write_sel(sel: Reg, src: Reg) -> Steps {
    Steps::one(w().left(sel).store_data(src).alu(AluOp::And).sel())
}

// Wide arithmetic helpers on r2..r4

pub fn add22_adc33() -> Steps {
    Steps::two(
        alu3(AluOp::Add, Reg::R2, Reg::R2, Reg::R2),
        alu3(AluOp::Adc, Reg::R3, Reg::R3, Reg::R3),
    )
}

fn cadd24_word() -> CtlWord {
    alu3(AluOp::Add, Reg::R2, Reg::R4, Reg::R2).cnz()
}

pub fn cadd24() -> Steps {
    Steps::one(cadd24_word())
}

pub fn cadd24_adc3z() -> Steps {
    Steps::two(
        cadd24_word(),
        w().dst(Reg::R3)
            .right(Reg::R3)
            .alu(AluOp::Adc)
            .result()
            .set_flags()
            .cnz(),
    )
}

pub fn csub34() -> Steps {
    Steps::two(
        alu3(AluOp::Sub, Reg::R3, Reg::R3, Reg::R4),
        alu3(AluOp::Add, Reg::R3, Reg::R4, Reg::R3).cnz(),
    )
}
