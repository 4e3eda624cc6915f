//! Batch-local ingestion checks. These are pure and never touch storage.

use std::collections::HashSet;

use dp_number::{DpNumber, RawToken};

use crate::domain::models::AssignmentErr;


/// returns the trimmed title, or [AssignmentErr::EmptyTitle] if there is nothing left
pub fn validate_title(title: Option<&str>) -> Result<String, AssignmentErr> {
    match title.map(str::trim) {
        Some(title) if !title.is_empty() => Ok(title.to_string()),
        _ => Err(AssignmentErr::EmptyTitle),
    }
}

/// Canonicalize every token of the batch, preserving submission order.
///
/// Fails with [AssignmentErr::EmptyBatch] for a missing or empty batch, with the first
/// [AssignmentErr::InvalidIdentifierFormat] encountered, or with
/// [AssignmentErr::IntraBatchDuplicate] listing each repeated number once in first-seen order.
pub fn canonicalize_batch(tokens: Option<&[RawToken]>) -> Result<Vec<DpNumber>, AssignmentErr> {
    let tokens = match tokens {
        Some(tokens) if !tokens.is_empty() => tokens,
        _ => return Err(AssignmentErr::EmptyBatch),
    };

    let numbers = tokens
        .iter()
        .map(RawToken::canonicalize)
        .collect::<Result<Vec<_>, _>>()?;

    let repeated = repeated_numbers(&numbers);
    if !repeated.is_empty() {
        return Err(AssignmentErr::IntraBatchDuplicate(repeated));
    }

    Ok(numbers)
}

fn repeated_numbers(numbers: &[DpNumber]) -> Vec<DpNumber> {
    let mut seen = HashSet::with_capacity(numbers.len());
    let mut reported = HashSet::new();
    numbers
        .iter()
        .filter(|number| !seen.insert(**number) && reported.insert(**number))
        .copied()
        .collect()
}
