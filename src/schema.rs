//! Structured-output contract between the client and a response type.
//!
//! A type implementing [`StructuredOutput`] can be requested from the model:
//! it supplies the JSON Schema sent with the request and an explicit
//! validation pass run after the response is decoded. The remote service may
//! only approximate the schema, so the client never trusts a decoded value
//! until [`validate`](StructuredOutput::validate) accepts it.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::SchemaViolation;

/// A response shape the model can be constrained to.
pub trait StructuredOutput: DeserializeOwned {
    /// Schema name sent in the `response_format` block.
    const SCHEMA_NAME: &'static str;

    /// JSON Schema describing the expected object.
    fn json_schema() -> Value;

    /// Check constraints the type system cannot express.
    fn validate(&self) -> Result<(), SchemaViolation>;
}

/// Check that `value` is at most `max` characters long.
pub(crate) fn check_max_chars(
    field: &'static str,
    value: &str,
    max: usize,
) -> Result<(), SchemaViolation> {
    let actual = value.chars().count();
    if actual > max {
        return Err(SchemaViolation {
            field,
            expected: format!("at most {max}"),
            actual,
        });
    }
    Ok(())
}

/// Check that `value` is between `min` and `max` characters long, inclusive.
pub(crate) fn check_char_range(
    field: &'static str,
    value: &str,
    min: usize,
    max: usize,
) -> Result<(), SchemaViolation> {
    let actual = value.chars().count();
    if actual < min || actual > max {
        return Err(SchemaViolation {
            field,
            expected: format!("between {min} and {max}"),
            actual,
        });
    }
    Ok(())
}
