//! Impulsive transfer primitives: the Lambert boundary-value solver.

pub mod lambert;

pub use lambert::{solve, LambertError};
