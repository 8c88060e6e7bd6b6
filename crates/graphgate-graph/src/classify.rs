//! Statement routing by leading keyword.
//!
//! This is a routing heuristic, not a grammar: only the first token of the
//! trimmed statement is looked at.

use graphgate_core::GatewayError;

/// Keywords that mark a statement as a write.
pub const WRITE_KEYWORDS: [&str; 5] = ["CREATE", "MERGE", "DELETE", "SET", "REMOVE"];

/// Keywords that mark a statement as read-only.
pub const READ_KEYWORDS: [&str; 2] = ["MATCH", "RETURN"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    Read,
    Write,
    Unclassified,
}

/// Classify a statement by its leading keyword, ignoring case and surrounding whitespace.
pub fn classify(statement: &str) -> StatementKind {
    let keyword = leading_keyword(statement).to_ascii_uppercase();

    if WRITE_KEYWORDS.contains(&keyword.as_str()) {
        StatementKind::Write
    } else if READ_KEYWORDS.contains(&keyword.as_str()) {
        StatementKind::Read
    } else {
        StatementKind::Unclassified
    }
}

/// Reject anything that is not a write statement.
pub fn check_write(statement: &str) -> Result<(), GatewayError> {
    match classify(statement) {
        StatementKind::Write => Ok(()),
        _ => Err(GatewayError::Validation(format!(
            "this operation only accepts graph-modifying statements starting with one of: {}",
            WRITE_KEYWORDS.join(", ")
        ))),
    }
}

/// The first token: letters up to the first character that cannot be part of a keyword.
fn leading_keyword(statement: &str) -> &str {
    let trimmed = statement.trim_start();
    let end = trimmed
        .find(|c: char| !c.is_ascii_alphabetic())
        .unwrap_or(trimmed.len());
    &trimmed[..end]
}
