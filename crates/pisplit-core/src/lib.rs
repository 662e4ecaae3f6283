//! # pisplit-core
//! Series algebra, range tree, and precision-controlled decimal arithmetic
//! for the concurrent Chudnovsky pi calculator.

pub mod constants;
pub mod decimal;
pub mod error;
pub mod tree;
pub mod triple;
