pub(crate) mod common;

pub mod spec;

pub mod cli;

pub use spec::drom::{Drom, Owner, Summary};
pub use spec::types::hw::{Endian, Variant};
