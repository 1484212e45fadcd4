//! Validation helpers for DTOs.

use validator::ValidationError;

use crate::dto::room::AddQuestionRequest;

const MIN_OPTIONS: usize = 2;
const MAX_OPTIONS: usize = 10;

/// Validates a display name: 3 to 32 characters, letters, digits, `_`, `-` or `.`.
///
/// # Examples
///
/// ```ignore
/// validate_username("quiz_master") // Ok
/// validate_username("qm")          // Err - too short
/// validate_username("quiz master") // Err - space
/// ```
pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    let len = username.chars().count();
    if !(3..=32).contains(&len) {
        let mut err = ValidationError::new("username_length");
        err.message = Some(format!("Username must be 3 to 32 characters (got {len})").into());
        return Err(err);
    }

    if !username
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.'))
    {
        let mut err = ValidationError::new("username_format");
        err.message =
            Some("Username may only contain letters, digits, '_', '-' or '.'".into());
        return Err(err);
    }

    Ok(())
}

/// Validates the options of a multiple choice question.
pub fn validate_options(options: &[String]) -> Result<(), ValidationError> {
    if !(MIN_OPTIONS..=MAX_OPTIONS).contains(&options.len()) {
        let mut err = ValidationError::new("options_count");
        err.message = Some(
            format!(
                "A question needs {MIN_OPTIONS} to {MAX_OPTIONS} options (got {})",
                options.len()
            )
            .into(),
        );
        return Err(err);
    }

    if options.iter().any(|option| option.trim().is_empty()) {
        let mut err = ValidationError::new("options_blank");
        err.message = Some("Options must not be blank".into());
        return Err(err);
    }

    Ok(())
}

/// The answer key must designate one of the options.
pub fn validate_answer_key(request: &AddQuestionRequest) -> Result<(), ValidationError> {
    if (request.correct_answer_index as usize) < request.options.len() {
        return Ok(());
    }
    let mut err = ValidationError::new("answer_key_out_of_range");
    err.message = Some(
        format!(
            "correctAnswerIndex {} is out of range for {} options",
            request.correct_answer_index,
            request.options.len()
        )
        .into(),
    );
    Err(err)
}

#[cfg(test)]
mod tests {
    use validator::Validate;

    use super::*;

    fn options(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn test_validate_username() {
        assert!(validate_username("quiz_master").is_ok());
        assert!(validate_username("ana.b-2").is_ok());
        assert!(validate_username("qm").is_err());
        assert!(validate_username("quiz master").is_err());
        assert!(validate_username(&"x".repeat(33)).is_err());
    }

    #[test]
    fn test_validate_options() {
        assert!(validate_options(&options(&["yes", "no"])).is_ok());
        assert!(validate_options(&options(&["only"])).is_err());
        assert!(validate_options(&options(&["yes", "  "])).is_err());
        assert!(validate_options(&vec!["a".to_string(); 11]).is_err());
    }

    #[test]
    fn answer_key_must_point_at_an_option() {
        let mut request = AddQuestionRequest {
            text: "Capital of Peru?".into(),
            options: options(&["Lima", "Cusco"]),
            correct_answer_index: 1,
            image_url: None,
        };
        assert!(request.validate().is_ok());

        request.correct_answer_index = 2;
        assert!(request.validate().is_err());
    }
}
