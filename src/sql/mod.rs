//! SQL text rendering for statements sent outside the structured API.
//!
//! Identifiers that are plain (letters, digits, `_`, `$`, not starting with a
//! digit) are emitted as-is so Snowflake resolves them case-insensitively.
//! Anything else is double-quoted with embedded quotes doubled. String
//! literals are single-quoted with quotes and backslashes escaped.

use crate::error::{SqlError, SqlResult};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

/// Unquoted Snowflake identifier.
static PLAIN_IDENTIFIER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_$]*$").expect("Invalid regex: plain identifier pattern")
});

/// Already-quoted identifier: `"..."` with inner quotes doubled.
static QUOTED_IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"^"(?:[^"]|"")+"$"#).expect("Invalid regex: quoted identifier pattern"));

/// Trailing statement terminators.
static TRAILING_TERMINATORS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[;\s]+$").expect("Invalid regex: trailing terminator pattern"));

/// Renders one identifier for inclusion in a statement.
pub fn quote_identifier(identifier: &str) -> SqlResult<String> {
    let identifier = identifier.trim();
    if identifier.is_empty() {
        return Err(SqlError::EmptyIdentifier);
    }
    if identifier.chars().any(char::is_control) {
        return Err(SqlError::InvalidIdentifier(identifier.to_string()));
    }
    if PLAIN_IDENTIFIER.is_match(identifier) || QUOTED_IDENTIFIER.is_match(identifier) {
        return Ok(identifier.to_string());
    }
    debug!("Quoting identifier: {}", identifier);
    Ok(format!("\"{}\"", identifier.replace('"', "\"\"")))
}

/// Renders `a.b.c` from its parts, quoting each one.
pub fn qualified_name(parts: &[&str]) -> SqlResult<String> {
    let quoted = parts
        .iter()
        .map(|part| quote_identifier(part))
        .collect::<SqlResult<Vec<_>>>()?;
    Ok(quoted.join("."))
}

/// Renders a single-quoted string literal.
pub fn string_literal(value: &str) -> String {
    format!("'{}'", value.replace('\\', "\\\\").replace('\'', "''"))
}

/// Trims whitespace and trailing `;` so the text can be embedded in a larger statement.
pub fn statement_body(sql: &str) -> SqlResult<&str> {
    let trimmed = sql.trim();
    let body = match TRAILING_TERMINATORS.find(trimmed) {
        Some(m) => &trimmed[..m.start()],
        None => trimmed,
    };
    if body.is_empty() {
        return Err(SqlError::EmptyStatement);
    }
    Ok(body)
}
