//! Mathematical utilities: sample moments and least squares.

pub mod ols;

pub use ols::*;
