#![deny(missing_docs)]
//! This crate provides the canonical form of a DP number and the parser which produces it.
//! This follows the newtype pattern and parse don't validate, where possible

pub mod number;
pub mod raw;

pub use number::{DpNumber, InvalidDpNumber, InvalidReason};
pub use raw::RawToken;
