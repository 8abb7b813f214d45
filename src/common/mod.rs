//! Shared numeric helpers used by the indicator library.

pub mod math;
