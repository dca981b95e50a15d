use super::hw::{DAddr, Phase, UInst, UINST_WIDTH};
use enum_map::{Enum, EnumMap};
use static_assertions::const_assert;
use strum_macros::{EnumIter, IntoStaticStr};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Enum, EnumIter, IntoStaticStr)]
#[strum(serialize_all = "shouty_snake_case")]
pub enum Field {
    Op,
    Rl,
    Rloe,
    Rr,
    Rroe,
    Ri,
    Riwe,
    Imm,
    Rrbusoe,
    Aluoe,
    Flagsoe,
    Flagswe,
    Iaddrsel,
    Iwe,
    Sele,
    Seliflagssel,
    Cnz,
    Mwe,
    Moe,
    W16,
    Crst,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDef {
    pub offset: u32,
    pub width: u32,
}

const fn at(offset: u32, width: u32) -> FieldDef {
    FieldDef { offset, width }
}

impl FieldDef {
    pub const fn max(&self) -> u32 {
        (1 << self.width) - 1
    }

    pub const fn mask(&self) -> UInst {
        self.max() << self.offset
    }
}

impl Field {
    pub const COUNT: usize = 21;

    pub const ALL: [Field; Field::COUNT] = [
        Field::Op,
        Field::Rl,
        Field::Rloe,
        Field::Rr,
        Field::Rroe,
        Field::Ri,
        Field::Riwe,
        Field::Imm,
        Field::Rrbusoe,
        Field::Aluoe,
        Field::Flagsoe,
        Field::Flagswe,
        Field::Iaddrsel,
        Field::Iwe,
        Field::Sele,
        Field::Seliflagssel,
        Field::Cnz,
        Field::Mwe,
        Field::Moe,
        Field::W16,
        Field::Crst,
    ];

    /*
        HARDWARE NOTE: these positions are shared with the assembler and the
        datapath wiring. Any change must be mirrored there.
    */
    pub const fn def(self) -> FieldDef {
        match self {
            Field::Op => at(0, 4),
            Field::Rl => at(4, 3),
            Field::Rloe => at(7, 1),
            Field::Rr => at(8, 3),
            Field::Rroe => at(11, 1),
            Field::Ri => at(12, 3),
            Field::Riwe => at(15, 1),
            Field::Imm => at(16, 3),
            Field::Rrbusoe => at(19, 1),
            Field::Aluoe => at(20, 1),
            Field::Flagsoe => at(21, 1),
            Field::Flagswe => at(22, 1),
            Field::Iaddrsel => at(23, 1),
            Field::Iwe => at(24, 1),
            Field::Sele => at(25, 1),
            Field::Seliflagssel => at(26, 1),
            Field::Cnz => at(27, 1),
            Field::Mwe => at(28, 1),
            Field::Moe => at(29, 1),
            Field::W16 => at(30, 1),
            Field::Crst => at(31, 1),
        }
    }

    pub fn name(self) -> &'static str {
        self.into()
    }

    /// Shift `val` into place. Range checking is up to the caller.
    pub const fn encode(self, val: u32) -> UInst {
        val << self.def().offset
    }

    pub const fn extract(self, raw: UInst) -> u32 {
        (raw & self.def().mask()) >> self.def().offset
    }
}

const fn layout_is_disjoint() -> bool {
    let mut used: u64 = 0;
    let mut i = 0;
    while i < Field::COUNT {
        let def = Field::ALL[i].def();
        if def.width == 0 || def.offset + def.width > UINST_WIDTH {
            return false;
        }
        let bits = ((1u64 << def.width) - 1) << def.offset;
        if used & bits != 0 {
            return false;
        }
        used |= bits;
        i += 1;
    }
    true
}

const fn layout_width() -> u32 {
    let mut total = 0;
    let mut i = 0;
    while i < Field::COUNT {
        total += Field::ALL[i].def().width;
        i += 1;
    }
    total
}

const_assert!(layout_is_disjoint());
const_assert!(layout_width() == UINST_WIDTH);

pub fn pack(vals: &EnumMap<Field, u32>) -> UInst {
    vals.iter().fold(0, |acc, (f, &v)| acc | f.encode(v))
}

pub fn unpack(raw: UInst) -> EnumMap<Field, u32> {
    let mut vals = EnumMap::new();
    for &f in Field::ALL.iter() {
        vals[f] = f.extract(raw);
    }
    vals
}

/// A control word under construction. Every field starts at zero.
#[derive(Debug, Clone)]
pub struct CtlWord {
    vals: EnumMap<Field, u32>,
}

impl Default for CtlWord {
    fn default() -> CtlWord {
        CtlWord::new()
    }
}

impl CtlWord {
    pub fn new() -> CtlWord {
        CtlWord {
            vals: EnumMap::new(),
        }
    }

    pub fn with(mut self, f: Field, val: u32) -> CtlWord {
        assert!(
            val <= f.def().max(),
            "{} does not fit in {}-bit field {}",
            val,
            f.def().width,
            f.name()
        );
        self.vals[f] = val;
        self
    }

    pub fn flag(self, f: Field, on: bool) -> CtlWord {
        self.with(f, on as u32)
    }

    pub fn get(&self, f: Field) -> u32 {
        self.vals[f]
    }

    pub fn pack(&self) -> UInst {
        pack(&self.vals)
    }
}

/// The control words of one instruction, in clock-phase order.
#[derive(Debug, Clone)]
pub enum Steps {
    Single(CtlWord),
    Double(CtlWord, CtlWord),
}

impl Steps {
    /// A one-phase instruction: its only word ends the instruction.
    pub fn one(only: CtlWord) -> Steps {
        Steps::Single(only.with(Field::Crst, 1))
    }

    /// A two-phase instruction: the second word ends the instruction, the first must not.
    pub fn two(first: CtlWord, second: CtlWord) -> Steps {
        assert_eq!(first.get(Field::Crst), 0);
        Steps::Double(first, second.with(Field::Crst, 1))
    }

    pub fn words(&self) -> Vec<(Phase, UInst)> {
        match self {
            Steps::Single(only) => vec![(Phase::First, only.pack())],
            Steps::Double(first, second) => vec![
                (Phase::First, first.pack()),
                (Phase::Second, second.pack()),
            ],
        }
    }
}

/// One instruction bit pattern, as seen by the decoder of a single format.
pub trait Slot {
    /// The phase-0 address of this bit pattern.
    fn addr(&self) -> DAddr;
}

pub enum Action<S> {
    Emit(fn(&S) -> Steps),
    /// Claim the pattern but leave the trap word in place.
    Reserved,
}

pub struct Rule<S> {
    pub name: &'static str,
    pub when: fn(&S) -> bool,
    pub action: Action<S>,
}

impl<S> Rule<S> {
    pub fn new(name: &'static str, when: fn(&S) -> bool, emit: fn(&S) -> Steps) -> Rule<S> {
        Rule {
            name,
            when,
            action: Action::Emit(emit),
        }
    }

    pub fn reserved(name: &'static str, when: fn(&S) -> bool) -> Rule<S> {
        Rule {
            name,
            when,
            action: Action::Reserved,
        }
    }
}

/// A group of bit patterns together with the rules that decode them, highest priority first.
pub struct Table<S> {
    pub name: &'static str,
    pub slots: Vec<S>,
    pub rules: Vec<Rule<S>>,
}

impl<S: Slot> Table<S> {
    pub fn new(name: &'static str, slots: impl Iterator<Item = S>, rules: Vec<Rule<S>>) -> Table<S> {
        Table {
            name,
            slots: slots.collect(),
            rules,
        }
    }

    /// The first rule matching `slot`, if any.
    pub fn decode(&self, slot: &S) -> Option<&Rule<S>> {
        self.rules.iter().find(|r| (r.when)(slot))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn all_lists_every_field_in_bit_order() {
        assert_eq!(Field::iter().count(), Field::COUNT);
        assert!(Field::iter().eq(Field::ALL.iter().copied()));
        for pair in Field::ALL.windows(2) {
            let (lo, hi) = (pair[0].def(), pair[1].def());
            assert_eq!(lo.offset + lo.width, hi.offset);
        }
    }

    #[test]
    fn field_names() {
        assert_eq!(Field::Seliflagssel.name(), "SELIFLAGSSEL");
        assert_eq!(Field::Crst.name(), "CRST");
    }

    #[test]
    #[should_panic]
    fn with_rejects_wide_values() {
        CtlWord::new().with(Field::Ri, 8);
    }

    #[test]
    #[should_panic]
    fn two_phase_first_word_must_not_end() {
        let w = CtlWord::new().with(Field::Crst, 1);
        Steps::two(w.clone(), w);
    }

    #[test]
    fn steps_set_crst() {
        let words = Steps::two(CtlWord::new(), CtlWord::new()).words();
        assert_eq!(Field::Crst.extract(words[0].1), 0);
        assert_eq!(Field::Crst.extract(words[1].1), 1);
        assert_eq!(words[1].0, Phase::Second);
    }
}
