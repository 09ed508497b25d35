use std::sync::OnceLock;

use regex::Regex;

use super::error::ContentError;

fn color_hex_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new("^#[0-9A-Fa-f]{6}$").expect("static regex"))
}

/// Rejects empty (or whitespace-only) required fields.
pub(crate) fn require(field: &str, value: &str) -> Result<(), ContentError> {
    if value.trim().is_empty() {
        return Err(ContentError::Validation(format!("{field} is required")));
    }
    Ok(())
}

pub(crate) fn require_opt(field: &str, value: Option<&String>) -> Result<(), ContentError> {
    match value {
        Some(value) => require(field, value),
        None => Ok(()),
    }
}

/// `#RRGGBB` color codes only.
pub(crate) fn color_hex(value: &str) -> Result<(), ContentError> {
    if !color_hex_re().is_match(value) {
        return Err(ContentError::Validation(format!(
            "colorHex must be a hex color code like #37B24D, got {value:?}"
        )));
    }
    Ok(())
}

pub(crate) fn color_hex_opt(value: Option<&String>) -> Result<(), ContentError> {
    match value {
        Some(value) => color_hex(value),
        None => Ok(()),
    }
}
