//! Module defines the [DpNumber] and the canonicalization rules used to construct it
use std::{fmt, num::NonZeroU64, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;


/// The prefix every canonical identifier starts with
pub const DP_PREFIX: &str = "DP";

/// The minimum number of digits of a canonical identifier
pub const MIN_DIGITS: usize = 4;

/// A canonical DP number.
///
/// The inner value is the positive integer the identifier represents. Rendering always
/// produces `DP` followed by the digits, left-padded with zeros to [MIN_DIGITS].
/// Ordering is numeric, so `DP0002 < DP0010 < DP10000`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DpNumber(NonZeroU64);

/// Why a token was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidReason {
    /// nothing left after removing the prefix and whitespace
    Empty,
    /// the remainder is not a base-10 integer literal
    NotAnInteger,
    /// the remainder contains a decimal point
    Decimal,
    /// the value is zero or negative
    NotPositive,
    /// the value does not fit in 64 bits
    TooLarge,
}

impl fmt::Display for InvalidReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvalidReason::Empty => write!(f, "no digits"),
            InvalidReason::NotAnInteger => write!(f, "not an integer"),
            InvalidReason::Decimal => write!(f, "decimal values are not allowed"),
            InvalidReason::NotPositive => write!(f, "must be a positive integer"),
            InvalidReason::TooLarge => write!(f, "too large"),
        }
    }
}

/// The error produced when a raw token cannot be canonicalized
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid DP number {token:?}: {reason}")]
pub struct InvalidDpNumber {
    token: String,
    reason: InvalidReason,
}

impl InvalidDpNumber {
    pub(crate) fn new(token: impl Into<String>, reason: InvalidReason) -> Self {
        Self {
            token: token.into(),
            reason,
        }
    }

    /// The raw token exactly as it was submitted
    pub fn token(&self) -> &str {
        &self.token
    }

    /// The reason the token was rejected
    pub fn reason(&self) -> InvalidReason {
        self.reason
    }

    /// consume self and return the offending raw token
    pub fn into_token(self) -> String {
        self.token
    }
}

fn strip_prefix_ignore_case(s: &str) -> &str {
    match s.get(..DP_PREFIX.len()) {
        Some(prefix) if prefix.eq_ignore_ascii_case(DP_PREFIX) => &s[DP_PREFIX.len()..],
        _ => s,
    }
}

fn parse_digits(digits: &str) -> Result<NonZeroU64, InvalidReason> {
    if digits.is_empty() {
        return Err(InvalidReason::Empty);
    }
    if digits.contains('.') {
        return Err(InvalidReason::Decimal);
    }
    if let Some(rest) = digits.strip_prefix('-')
        && !rest.is_empty()
        && rest.bytes().all(|b| b.is_ascii_digit())
    {
        return Err(InvalidReason::NotPositive);
    }
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(InvalidReason::NotAnInteger);
    }

    let value: u64 = digits.parse().map_err(|_| InvalidReason::TooLarge)?;
    NonZeroU64::new(value).ok_or(InvalidReason::NotPositive)
}

impl DpNumber {
    /// Canonicalize a single raw textual token.
    ///
    /// Surrounding whitespace and one leading case-insensitive `DP` are removed, the
    /// remainder must be a positive base-10 integer.
    pub fn canonicalize(raw: &str) -> Result<Self, InvalidDpNumber> {
        let digits = strip_prefix_ignore_case(raw.trim()).trim();
        parse_digits(digits)
            .map(DpNumber)
            .map_err(|reason| InvalidDpNumber::new(raw, reason))
    }

    /// Construct a [DpNumber] directly from its numeric value
    pub fn from_value(value: u64) -> Option<Self> {
        NonZeroU64::new(value).map(DpNumber)
    }

    /// The numeric value of this identifier, always >= 1
    pub fn value(&self) -> u64 {
        self.0.get()
    }
}

impl fmt::Display for DpNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{DP_PREFIX}{:0width$}", self.0.get(), width = MIN_DIGITS)
    }
}

impl FromStr for DpNumber {
    type Err = InvalidDpNumber;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DpNumber::canonicalize(s)
    }
}

impl TryFrom<String> for DpNumber {
    type Error = InvalidDpNumber;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        DpNumber::canonicalize(&value)
    }
}

impl From<DpNumber> for String {
    fn from(value: DpNumber) -> Self {
        value.to_string()
    }
}
