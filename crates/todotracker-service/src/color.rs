//! Hex color validation shared by the category, tag, and priority services.

use todotracker_core::error::AppError;
use todotracker_core::result::AppResult;

/// Validate a `#RRGGBB` color string.
pub(crate) fn validate_color(color: &str) -> AppResult<()> {
    let valid = color.len() == 7
        && color.starts_with('#')
        && color[1..].chars().all(|c| c.is_ascii_hexdigit());

    if valid {
        Ok(())
    } else {
        Err(AppError::validation(format!(
            "Invalid color '{color}': expected format #RRGGBB"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_colors() {
        assert!(validate_color("#FF0000").is_ok());
        assert!(validate_color("#a1b2c3").is_ok());
    }

    #[test]
    fn test_invalid_colors() {
        assert!(validate_color("FF0000").is_err());
        assert!(validate_color("#FF00").is_err());
        assert!(validate_color("#GGGGGG").is_err());
        assert!(validate_color("#FF0000AA").is_err());
    }
}
