//! # Command Error Types Module
//!
//! This module defines the error taxonomy shared by every command pipeline.
//! Input-class errors are detected before any gateway call and are always
//! shown to the user together with a usage hint. Gateway-class errors are
//! logged in full by the handler and surfaced only as a generic message.

use crate::localization::{t, t_args};

/// Which store operation failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOp {
    Insert,
    Query,
}

/// Custom error types for command handling
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Wrong number of arguments; carries the localization key of the usage text
    Arity { usage: &'static str },
    /// Field does not match its required pattern
    Pattern { field: &'static str },
    /// Field is empty after trimming
    Empty { field: &'static str },
    /// Field is not an integer inside the allowed range
    Range {
        field: &'static str,
        min: i64,
        max: i64,
    },
    /// Record store call failed
    Store(StoreOp),
    /// Explanation generator call failed
    Generation,
    /// Issuer lacks the elevated role required by the command
    Authorization,
    /// A lookup found nobody to reply with or to mention
    NoRecipients { message: String },
}

impl CommandError {
    /// Whether this error comes from user input rather than a gateway
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            CommandError::Arity { .. }
                | CommandError::Pattern { .. }
                | CommandError::Empty { .. }
                | CommandError::Range { .. }
        )
    }

    /// Localized text sent back to the chat
    pub fn user_message(&self) -> String {
        match self {
            CommandError::Arity { usage } => t(usage),
            CommandError::Pattern { field } => t_args("error-pattern", &[("field", &t(field))]),
            CommandError::Empty { field } => t_args("error-empty", &[("field", &t(field))]),
            CommandError::Range { field, min, max } => t_args(
                "error-range",
                &[
                    ("field", &t(field)),
                    ("min", &min.to_string()),
                    ("max", &max.to_string()),
                ],
            ),
            CommandError::Store(_) => t("error-store"),
            CommandError::Generation => t("error-generation"),
            CommandError::Authorization => t("alert-denied"),
            CommandError::NoRecipients { message } => message.clone(),
        }
    }
}

impl std::fmt::Display for CommandError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CommandError::Arity { usage } => write!(f, "Arity error: expected {usage}"),
            CommandError::Pattern { field } => write!(f, "Pattern error: {field}"),
            CommandError::Empty { field } => write!(f, "Empty error: {field}"),
            CommandError::Range { field, min, max } => {
                write!(f, "Range error: {field} outside {min}..={max}")
            }
            CommandError::Store(StoreOp::Insert) => write!(f, "Store error: insert failed"),
            CommandError::Store(StoreOp::Query) => write!(f, "Store error: query failed"),
            CommandError::Generation => write!(f, "Generation error"),
            CommandError::Authorization => write!(f, "Authorization error"),
            CommandError::NoRecipients { .. } => write!(f, "No recipients"),
        }
    }
}

impl std::error::Error for CommandError {}
