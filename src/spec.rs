pub mod defs;
pub mod drom;
pub mod types;
