//! Format-agnostic code shared by the parser, the writers and the validator.

pub mod devanagari;
pub mod hierarchy;
pub mod merge;
