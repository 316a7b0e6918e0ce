pub mod chain;
pub mod filler;
