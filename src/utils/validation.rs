use validator::ValidationError;

/// Rejects strings that are empty once surrounding whitespace is removed.
pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Trims an optional text field, folding blank values to `None`.
pub fn clean_optional(raw: Option<String>) -> Option<String> {
    raw.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}
