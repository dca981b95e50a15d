use crate::spec::types::hw::Reg;
use strum::IntoEnumIterator;

pub const BOOLS: [bool; 2] = [false, true];

pub fn bools() -> impl Iterator<Item = bool> + Clone {
    BOOLS.iter().copied()
}

// RUSTFIX drop the `collect` once `EnumIter` iterators are `Clone`.
pub fn regs() -> impl Iterator<Item = Reg> + Clone {
    Reg::iter().collect::<Vec<_>>().into_iter()
}

