//! Registration input validation.
//!
//! Runs before any password hashing or store write.

use validator::Validate;

use super::{AuthError, FieldErrors};

#[derive(Debug, Validate)]
struct Registration {
    #[validate(length(max = 255, message = "The name may not be greater than 255 characters."))]
    name: String,

    #[validate(
        email(message = "The email must be a valid email address."),
        length(max = 255, message = "The email may not be greater than 255 characters.")
    )]
    email: String,

    #[validate(length(min = 6, message = "The password must be at least 6 characters."))]
    password: String,
}

/// Validate registration fields, collecting every failure per field.
///
/// A blank field reports only "required"; format and length checks apply to
/// non-blank fields.
pub fn validate_registration(name: &str, email: &str, password: &str) -> Result<(), AuthError> {
    let mut errors = FieldErrors::new();

    for (field, value) in [("name", name), ("email", email), ("password", password)] {
        if value.trim().is_empty() {
            errors.insert(
                field.to_string(),
                vec![format!("The {field} field is required.")],
            );
        }
    }

    let input = Registration {
        name: name.to_string(),
        email: email.to_string(),
        password: password.to_string(),
    };

    if let Err(e) = input.validate() {
        for (field, field_errors) in e.field_errors() {
            let field = field.to_string();
            if errors.contains_key(&field) {
                continue;
            }
            let messages = field_errors.iter().map(|err| {
                err.message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| err.code.to_string())
            });
            errors.entry(field).or_default().extend(messages);
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(AuthError::Validation(errors))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field_errors(result: Result<(), AuthError>) -> FieldErrors {
        match result {
            Err(AuthError::Validation(errors)) => errors,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn accepts_valid_input() {
        assert!(validate_registration("Ann", "ann@x.com", "secret1").is_ok());
    }

    #[test]
    fn accepts_password_at_minimum_length() {
        assert!(validate_registration("Ann", "ann@x.com", "123456").is_ok());
    }

    #[test]
    fn blank_fields_are_required() {
        let errors = field_errors(validate_registration("", "  ", ""));
        assert_eq!(errors["name"], vec!["The name field is required."]);
        assert_eq!(errors["email"], vec!["The email field is required."]);
        assert_eq!(errors["password"], vec!["The password field is required."]);
    }

    #[test]
    fn rejects_short_password() {
        let errors = field_errors(validate_registration("Ann", "ann@x.com", "12345"));
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors["password"],
            vec!["The password must be at least 6 characters."]
        );
    }

    #[test]
    fn rejects_malformed_email() {
        let errors = field_errors(validate_registration("Ann", "not-an-email", "secret1"));
        assert!(errors.contains_key("email"));
        assert!(!errors.contains_key("name"));
    }

    #[test]
    fn rejects_long_name() {
        let name = "a".repeat(256);
        let errors = field_errors(validate_registration(&name, "ann@x.com", "secret1"));
        assert!(errors.contains_key("name"));
    }

    #[test]
    fn name_length_counts_characters() {
        let name = "é".repeat(255);
        assert!(validate_registration(&name, "ann@x.com", "secret1").is_ok());
    }
}
