use derive_more::Display;
use num_derive::FromPrimitive;
use num_traits::FromPrimitive;
use static_assertions::const_assert;
use strum_macros::EnumIter;

pub type Byte = u8;

/// One decode ROM entry.
pub type UInst = u32;

pub const UINST_WIDTH: u32 = 32;
pub const UINST_BYTES: usize = (UINST_WIDTH / 8) as usize;
const_assert!(UINST_BYTES == std::mem::size_of::<UInst>());

pub const CLK_WIDTH: u32 = 1;
pub const REG_WIDTH: u32 = 3;

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, EnumIter)]
pub enum Variant {
    #[display(fmt = "full")]
    Full,
    #[display(fmt = "mini")]
    Mini,
}

impl Variant {
    pub const fn instr_width(self) -> u32 {
        match self {
            Variant::Full => 11,
            Variant::Mini => 8,
        }
    }

    /// Number of entries in the ROM: one per (clock phase, instruction bits).
    pub const fn drom_len(self) -> usize {
        1 << (CLK_WIDTH + self.instr_width())
    }

    /// Distance between the two clock-phase slots of the same instruction.
    pub const fn phase_stride(self) -> usize {
        1 << self.instr_width()
    }

    /// The leading instruction bit, which separates the grouped format from the extended one.
    const fn extended_flag(self) -> usize {
        1 << (self.instr_width() - 1)
    }
}

/*
    R0..R5 are general purpose. SP and PC are the "escape" codes: in many
    groups a register field holding one of these selects an unrelated
    instruction rather than the register itself.
*/
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, FromPrimitive, EnumIter)]
pub enum Reg {
    R0,
    R1,
    R2,
    R3,
    R4,
    R5,
    SP,
    PC,
}

impl Reg {
    pub const MASK: u32 = (1 << REG_WIDTH) - 1;

    pub fn decode(bits: u32) -> Reg {
        Reg::from_u32(bits & Reg::MASK).unwrap()
    }

    pub const fn bits(self) -> u32 {
        self as u32
    }

    pub fn is_gpr(self) -> bool {
        self <= Reg::R5
    }

    pub fn is_escape(self) -> bool {
        !self.is_gpr()
    }

    pub const fn low_bit(self) -> u32 {
        self as u32 & 1
    }
}

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, FromPrimitive, EnumIter)]
pub enum Phase {
    #[display(fmt = "0")]
    First,
    #[display(fmt = "1")]
    Second,
}

/*
    Decode ROM addresses. The clock phase is always the top bit; below it the
    instruction bits come in one of two formats, told apart by their leading bit:

        full, grouped:   clk | 0 | nnn | aaa | bbb | q        (n in 0..=6)
        full, extended:  clk | 1 | aaa | mmm | bbb | q
        mini, grouped:   clk | 0 | nnn | aaa | q              (n in 0..=6)
        mini, extended:  clk | 1 | x | yy | zzzz

    Group 7 of the grouped format is never decoded in either variant.
*/
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DAddr {
    variant: Variant,
    val: usize,
}

impl DAddr {
    pub const GROUP_MAX: u32 = 6;
    pub const SUBOP_MAX: u32 = 7;

    fn new(variant: Variant, phase: Phase, instr: usize) -> DAddr {
        assert!(instr < variant.phase_stride());
        DAddr {
            variant,
            val: ((phase as usize) << variant.instr_width()) | instr,
        }
    }

    pub fn full_grouped(phase: Phase, group: u32, a: Reg, b: Reg, q: bool) -> DAddr {
        assert!(group <= DAddr::GROUP_MAX);
        let instr = (group << 7) | (a.bits() << 4) | (b.bits() << 1) | q as u32;
        DAddr::new(Variant::Full, phase, instr as usize)
    }

    pub fn full_extended(phase: Phase, a: Reg, subop: u32, b: Reg, q: bool) -> DAddr {
        assert!(subop <= DAddr::SUBOP_MAX);
        let instr = (a.bits() << 7) | (subop << 4) | (b.bits() << 1) | q as u32;
        DAddr::new(
            Variant::Full,
            phase,
            Variant::Full.extended_flag() | instr as usize,
        )
    }

    pub fn mini_grouped(phase: Phase, group: u32, a: Reg, q: bool) -> DAddr {
        assert!(group <= DAddr::GROUP_MAX);
        let instr = (group << 4) | (a.bits() << 1) | q as u32;
        DAddr::new(Variant::Mini, phase, instr as usize)
    }

    pub fn mini_extended(phase: Phase, hi: bool, mid: u32, low: u32) -> DAddr {
        assert!(mid <= 0b11 && low <= 0b1111);
        let instr = ((hi as u32) << 6) | (mid << 4) | low;
        DAddr::new(
            Variant::Mini,
            phase,
            Variant::Mini.extended_flag() | instr as usize,
        )
    }

    /// Rebuild an address from its raw table index.
    pub fn from_index(variant: Variant, idx: usize) -> DAddr {
        assert!(idx < variant.drom_len());
        DAddr { variant, val: idx }
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    pub fn phase(&self) -> Phase {
        if self.val & self.variant.phase_stride() == 0 {
            Phase::First
        } else {
            Phase::Second
        }
    }

    pub fn instr(&self) -> usize {
        self.val & (self.variant.phase_stride() - 1)
    }

    pub fn is_extended(&self) -> bool {
        self.val & self.variant.extended_flag() != 0
    }

    pub fn with_phase(self, phase: Phase) -> DAddr {
        DAddr::new(self.variant, phase, self.instr())
    }
}

impl From<DAddr> for usize {
    fn from(addr: DAddr) -> usize {
        addr.val
    }
}

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum Endian {
    #[display(fmt = "little-endian")]
    Little,
    #[display(fmt = "big-endian")]
    Big,
}

impl Default for Endian {
    fn default() -> Endian {
        Endian::Little
    }
}

pub fn uinst_to_bytes(ui: UInst, endian: Endian) -> [Byte; UINST_BYTES] {
    match endian {
        Endian::Little => ui.to_le_bytes(),
        Endian::Big => ui.to_be_bytes(),
    }
}

pub fn words_to_bytes(words: &[UInst], endian: Endian) -> Vec<Byte> {
    words
        .iter()
        .flat_map(|&ui| uinst_to_bytes(ui, endian).to_vec())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn drom_sizes() {
        assert_eq!(Variant::Full.drom_len(), 4096);
        assert_eq!(Variant::Mini.drom_len(), 512);
        assert_eq!(Variant::Full.phase_stride(), 2048);
        assert_eq!(Variant::Mini.phase_stride(), 256);
    }

    #[test]
    fn reg_decode_masks() {
        for r in Reg::iter() {
            assert_eq!(Reg::decode(r.bits()), r);
            assert_eq!(Reg::decode(r.bits() | 0b1000), r);
        }
        assert!(Reg::R5.is_gpr());
        assert!(Reg::SP.is_escape() && Reg::PC.is_escape());
    }

    #[test]
    fn phase_slots_are_half_a_table_apart() {
        let first = DAddr::full_extended(Phase::First, Reg::R3, 5, Reg::SP, true);
        let second = first.with_phase(Phase::Second);
        assert_eq!(usize::from(second) - usize::from(first), 2048);
        assert_eq!(second.phase(), Phase::Second);
        assert_eq!(first.instr(), second.instr());
        assert!(first.is_extended());
    }

    #[test]
    fn formats_partition_the_instruction_bits() {
        let grouped = DAddr::mini_grouped(Phase::First, 6, Reg::PC, true);
        let extended = DAddr::mini_extended(Phase::First, false, 0, 0);
        assert_eq!(usize::from(grouped), 0x6f);
        assert_eq!(usize::from(extended), 0x80);
        assert!(!grouped.is_extended());
        assert!(extended.is_extended());
    }

    #[test]
    #[should_panic]
    fn grouped_rejects_group_seven() {
        DAddr::full_grouped(Phase::First, 7, Reg::R0, Reg::R0, false);
    }

    #[test]
    fn words_to_bytes_orders() {
        let words = [0x1122_3344, 0xaabb_ccdd];
        assert_eq!(
            words_to_bytes(&words, Endian::Little),
            vec![0x44, 0x33, 0x22, 0x11, 0xdd, 0xcc, 0xbb, 0xaa]
        );
        assert_eq!(
            words_to_bytes(&words, Endian::Big),
            vec![0x11, 0x22, 0x33, 0x44, 0xaa, 0xbb, 0xcc, 0xdd]
        );
    }
}
