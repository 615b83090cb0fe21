pub mod common;
pub mod quant;

pub use quant::{run_quant, QuantArgs};
