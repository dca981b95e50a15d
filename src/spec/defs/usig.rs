use super::super::types::{
    hw::Reg,
    schema::{CtlWord, Field},
};
use derive_more::Display;
use strum_macros::EnumIter;

// OP
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, EnumIter)]
pub enum AluOp {
    Sr = 0,
    Sl = 1,
    Rr = 2,
    Rl = 3,
    Asr = 4,
    Xor = 7,
    Add = 8,
    Sub = 9,
    Adc = 10,
    Sbb = 11,
    Zxt = 12,
    Sxt = 13,
    And = 14,
    Or = 15,
}

/*
    IMM: what feeds the second ALU input.

    HARDWARE NOTE: `Right` passes the RR register through, but when RROE is
    low nothing drives the bus and the ALU sees all ones (-1). A lot of
    microcode leans on this: "x & -1" is a plain move, "x - -1" an increment.
*/
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, EnumIter)]
pub enum ImmSel {
    Right = 0,
    /// Zero-extended 7 bit immediate. Also the shift count for the 4 bit shift forms.
    Imm7 = 1,
    Simm7 = 2,
    /// Doubled simm7 when the branch condition holds, zero otherwise.
    Simm7Cond = 3,
    /// imm9 << 7, for building upper bits.
    Imm9Hi = 4,
    Simm9 = 5,
    /// Doubled simm11.
    Simm11x2 = 6,
    MinusTwo = 7,
}

impl ImmSel {
    /// Offsets from the stack pointer are unsigned, all others signed.
    pub fn offset_from(base: Reg) -> ImmSel {
        if base == Reg::SP {
            ImmSel::Imm7
        } else {
            ImmSel::Simm7
        }
    }
}

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum Width {
    Byte,
    Word,
}

impl From<bool> for Width {
    fn from(wide: bool) -> Width {
        if wide {
            Width::Word
        } else {
            Width::Byte
        }
    }
}

impl CtlWord {
    pub fn alu(self, op: AluOp) -> CtlWord {
        self.with(Field::Op, op as u32)
    }

    pub fn imm(self, sel: ImmSel) -> CtlWord {
        self.with(Field::Imm, sel as u32)
    }

    /// Latch into `r`.
    pub fn dst(self, r: Reg) -> CtlWord {
        self.dst_if(r, true)
    }

    pub fn dst_if(self, r: Reg, write: bool) -> CtlWord {
        self.with(Field::Ri, r.bits()).flag(Field::Riwe, write)
    }

    pub fn left(self, r: Reg) -> CtlWord {
        self.left_if(r, true)
    }

    pub fn left_if(self, r: Reg, drive: bool) -> CtlWord {
        self.with(Field::Rl, r.bits()).flag(Field::Rloe, drive)
    }

    pub fn right(self, r: Reg) -> CtlWord {
        self.right_if(r, true)
    }

    pub fn right_if(self, r: Reg, drive: bool) -> CtlWord {
        self.with(Field::Rr, r.bits()).flag(Field::Rroe, drive)
    }

    /// Put `r` on the store-data bus. RROE stays low, so the ALU sees -1.
    pub fn store_data(self, r: Reg) -> CtlWord {
        self.with(Field::Rr, r.bits()).flag(Field::Rrbusoe, true)
    }

    pub fn result(self) -> CtlWord {
        self.result_if(true)
    }

    pub fn result_if(self, on: bool) -> CtlWord {
        self.flag(Field::Aluoe, on)
    }

    pub fn set_flags(self) -> CtlWord {
        self.set_flags_if(true)
    }

    pub fn set_flags_if(self, on: bool) -> CtlWord {
        self.flag(Field::Flagswe, on)
    }

    pub fn flags_out_if(self, on: bool) -> CtlWord {
        self.flag(Field::Flagsoe, on)
    }

    pub fn read(self, width: Width) -> CtlWord {
        self.flag(Field::Moe, true).flag(Field::W16, width == Width::Word)
    }

    pub fn write(self, width: Width) -> CtlWord {
        self.flag(Field::Mwe, true).flag(Field::W16, width == Width::Word)
    }

    /// Fetch the next instruction from the delay register instead of PC.
    pub fn delayed_fetch(self) -> CtlWord {
        self.flag(Field::Iaddrsel, true)
    }

    pub fn cnz(self) -> CtlWord {
        self.cnz_if(true)
    }

    pub fn cnz_if(self, on: bool) -> CtlWord {
        self.flag(Field::Cnz, on)
    }

    pub fn int_write(self) -> CtlWord {
        self.flag(Field::Iwe, true)
    }

    pub fn sel(self) -> CtlWord {
        self.flag(Field::Sele, true)
    }

    pub fn sel_iflags_if(self, on: bool) -> CtlWord {
        self.flag(Field::Seliflagssel, on)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_data_leaves_right_operand_undriven() {
        let w = CtlWord::new().store_data(Reg::R3);
        assert_eq!(w.get(Field::Rr), 3);
        assert_eq!(w.get(Field::Rroe), 0);
        assert_eq!(w.get(Field::Rrbusoe), 1);
    }

    #[test]
    fn memory_width() {
        let w = CtlWord::new().read(Width::Byte);
        assert_eq!((w.get(Field::Moe), w.get(Field::W16)), (1, 0));
        let w = CtlWord::new().write(Width::from(true));
        assert_eq!((w.get(Field::Mwe), w.get(Field::W16)), (1, 1));
    }

    #[test]
    fn stack_offsets_are_unsigned() {
        assert_eq!(ImmSel::offset_from(Reg::SP), ImmSel::Imm7);
        assert_eq!(ImmSel::offset_from(Reg::PC), ImmSel::Simm7);
        assert_eq!(ImmSel::offset_from(Reg::R0), ImmSel::Simm7);
    }
}
