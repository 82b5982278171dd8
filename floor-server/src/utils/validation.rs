//! Input validation helpers
//!
//! Text length limits shared by the registry, state store and combinations.
//! Helpers return the message only; callers wrap it in their own error.

/// Table and combination names
pub const MAX_NAME_LEN: usize = 200;

/// Staff notes on a table state
pub const MAX_NOTE_LEN: usize = 500;

/// Node ids, reservation references, actors
pub const MAX_SHORT_TEXT_LEN: usize = 100;

/// Validate that a required string is non-empty and within the length limit.
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("{field} must not be empty"));
    }
    if value.len() > max_len {
        return Err(format!(
            "{field} is too long ({} chars, max {max_len})",
            value.len()
        ));
    }
    Ok(())
}

/// Validate that an optional string, if present, is within the length limit.
pub fn validate_optional_text(
    value: &Option<String>,
    field: &str,
    max_len: usize,
) -> Result<(), String> {
    if let Some(v) = value
        && v.len() > max_len
    {
        return Err(format!(
            "{field} is too long ({} chars, max {max_len})",
            v.len()
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_text() {
        assert!(validate_required_text("Terraza", "name", 10).is_ok());
        assert!(validate_required_text("   ", "name", 10).is_err());
        assert!(validate_required_text("Mesa del fondo", "name", 5).is_err());
    }

    #[test]
    fn test_optional_text() {
        assert!(validate_optional_text(&None, "note", 3).is_ok());
        assert!(validate_optional_text(&Some(String::new()), "note", 3).is_ok());
        let err = validate_optional_text(&Some("abcd".to_string()), "note", 3).unwrap_err();
        assert!(err.contains("note is too long"));
    }
}
