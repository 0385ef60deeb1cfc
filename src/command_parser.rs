//! # Command Argument Parser
//!
//! Splits the text following a slash-command into positional arguments.
//! Two shapes exist: a fixed arity (exactly N whitespace-separated tokens)
//! and the variable tail used by `/explain`, where the last token is the
//! word limit and every token before it forms the topic.
//!
//! Parsing never validates values; it only checks shape.

use crate::errors::CommandError;

/// Raw arguments of `/add <first_name> <class> <age>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddArgs<'a> {
    pub first_name: &'a str,
    pub class_name: &'a str,
    pub age: &'a str,
}

/// Raw arguments of `/explain <topic...> <word_limit>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExplainArgs<'a> {
    pub topic: String,
    pub word_limit: &'a str,
}

/// Split `text` on whitespace and require exactly `arity` tokens
pub fn split_fixed<'a>(
    text: &'a str,
    arity: usize,
    usage: &'static str,
) -> Result<Vec<&'a str>, CommandError> {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    if tokens.len() != arity {
        return Err(CommandError::Arity { usage });
    }
    Ok(tokens)
}

pub fn parse_add(text: &str) -> Result<AddArgs<'_>, CommandError> {
    let tokens = split_fixed(text, 3, "add-usage")?;
    Ok(AddArgs {
        first_name: tokens[0],
        class_name: tokens[1],
        age: tokens[2],
    })
}

/// Returns the single class token
pub fn parse_tag(text: &str) -> Result<&str, CommandError> {
    let tokens = split_fixed(text, 1, "tag-usage")?;
    Ok(tokens[0])
}

/// The last token is the limit; the rest, joined by single spaces, is the topic
pub fn parse_explain(text: &str) -> Result<ExplainArgs<'_>, CommandError> {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    match tokens.split_last() {
        Some((word_limit, topic)) if !topic.is_empty() => Ok(ExplainArgs {
            topic: topic.join(" "),
            word_limit: *word_limit,
        }),
        _ => Err(CommandError::Arity {
            usage: "explain-usage",
        }),
    }
}

/// `/alert` only accepts the literal `everyone`
pub fn parse_alert(text: &str) -> Result<(), CommandError> {
    let tokens = split_fixed(text, 1, "alert-usage")?;
    if tokens[0] != "everyone" {
        return Err(CommandError::Arity {
            usage: "alert-usage",
        });
    }
    Ok(())
}
