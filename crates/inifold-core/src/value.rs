//! Conversion of resolved strings into typed values

use crate::error::{Error, Result};

/// Tokens accepted as `true` (compared case-insensitively)
pub const TRUE_TOKENS: &[&str] = &["t", "true", "y", "yes", "on", "1", "是"];

/// Tokens accepted as `false` (compared case-insensitively)
pub const FALSE_TOKENS: &[&str] = &["f", "false", "n", "no", "off", "0", "否", "不"];

/// Parse a boolean from the fixed true/false vocabulary
pub fn parse_bool(value: &str) -> Result<bool> {
    let lower = value.to_lowercase();
    if TRUE_TOKENS.contains(&lower.as_str()) {
        Ok(true)
    } else if FALSE_TOKENS.contains(&lower.as_str()) {
        Ok(false)
    } else {
        Err(Error::type_coercion("boolean", value))
    }
}

/// Parse a signed integer
pub fn parse_int(value: &str) -> Result<i64> {
    value
        .parse()
        .map_err(|_| Error::type_coercion("integer", value))
}

/// Parse a floating point number
pub fn parse_float(value: &str) -> Result<f64> {
    value
        .parse()
        .map_err(|_| Error::type_coercion("float", value))
}
