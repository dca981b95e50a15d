pub mod usig;

pub mod pairs;
pub mod uops;

pub mod full;
pub mod mini;
