//! Validation helpers for DTOs.

use validator::ValidationError;

/// Longest accepted participant name.
const MAX_NAME_LENGTH: usize = 64;

/// Validates a participant display name: non-empty once trimmed, at most 64
/// characters, and free of control characters.
pub fn validate_player_name(name: &str) -> Result<(), ValidationError> {
    let trimmed = name.trim();

    if trimmed.is_empty() {
        let mut err = ValidationError::new("name_empty");
        err.message = Some("Name must not be empty".into());
        return Err(err);
    }

    if trimmed.chars().count() > MAX_NAME_LENGTH {
        let mut err = ValidationError::new("name_length");
        err.message = Some(format!("Name must be at most {MAX_NAME_LENGTH} characters").into());
        return Err(err);
    }

    if trimmed.chars().any(char::is_control) {
        let mut err = ValidationError::new("name_format");
        err.message = Some("Name must not contain control characters".into());
        return Err(err);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_ordinary_names() {
        assert!(validate_player_name("Ann").is_ok());
        assert!(validate_player_name("  Ann  ").is_ok());
        assert!(validate_player_name("Єгор").is_ok());
    }

    #[test]
    fn rejects_blank_names() {
        assert!(validate_player_name("").is_err());
        assert!(validate_player_name("   ").is_err());
        assert!(validate_player_name("\t\n").is_err());
    }

    #[test]
    fn rejects_oversized_and_control_names() {
        let long = "x".repeat(MAX_NAME_LENGTH + 1);
        assert!(validate_player_name(&long).is_err());
        assert!(validate_player_name("An\u{0000}n").is_err());
    }
}
