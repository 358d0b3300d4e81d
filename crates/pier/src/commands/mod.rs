//! CLI command implementations.

pub(crate) mod clear;
pub(crate) mod generate;

pub(crate) use clear::ClearArgs;
pub(crate) use generate::GenerateArgs;
