//! # Validation Module
//!
//! Per-field checks for command arguments. Each check is a pure function.
//! Composite validators check fields left to right and stop at the first
//! failure, so the user always sees exactly one error.

use lazy_static::lazy_static;
use regex::Regex;

use crate::command_parser::{AddArgs, ExplainArgs};
use crate::config::{MAX_AGE, MAX_WORD_LIMIT, MIN_AGE, MIN_WORD_LIMIT};
use crate::errors::CommandError;

lazy_static! {
    static ref NAME_REGEX: Regex =
        Regex::new(r"^[A-Za-z]+$").expect("Name pattern should be valid");
}

/// Member fields that passed validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidMember {
    pub first_name: String,
    pub class_name: String,
    pub age: i64,
}

/// Explanation request that passed validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidExplain {
    pub topic: String,
    pub word_limit: i64,
}

/// ASCII letters only: no digits, spaces or punctuation
pub fn validate_first_name(name: &str) -> Result<String, CommandError> {
    if !NAME_REGEX.is_match(name) {
        return Err(CommandError::Pattern {
            field: "field-first-name",
        });
    }
    Ok(name.to_string())
}

/// Non-empty after trimming; returns the trimmed value
pub fn validate_non_empty(value: &str, field: &'static str) -> Result<String, CommandError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CommandError::Empty { field });
    }
    Ok(trimmed.to_string())
}

/// Parse an integer and require `min <= value <= max`
pub fn validate_int_range(
    raw: &str,
    field: &'static str,
    min: i64,
    max: i64,
) -> Result<i64, CommandError> {
    match raw.trim().parse::<i64>() {
        Ok(value) if (min..=max).contains(&value) => Ok(value),
        _ => Err(CommandError::Range { field, min, max }),
    }
}

pub fn validate_age(raw: &str) -> Result<i64, CommandError> {
    validate_int_range(raw, "field-age", MIN_AGE, MAX_AGE)
}

pub fn validate_word_limit(raw: &str) -> Result<i64, CommandError> {
    validate_int_range(raw, "field-word-limit", MIN_WORD_LIMIT, MAX_WORD_LIMIT)
}

/// Name, then class, then age
pub fn validate_member(args: &AddArgs<'_>) -> Result<ValidMember, CommandError> {
    let first_name = validate_first_name(args.first_name)?;
    let class_name = validate_non_empty(args.class_name, "field-class")?;
    let age = validate_age(args.age)?;
    Ok(ValidMember {
        first_name,
        class_name,
        age,
    })
}

/// Topic, then word limit
pub fn validate_explain(args: &ExplainArgs<'_>) -> Result<ValidExplain, CommandError> {
    let topic = validate_non_empty(&args.topic, "field-topic")?;
    let word_limit = validate_word_limit(args.word_limit)?;
    Ok(ValidExplain { topic, word_limit })
}
