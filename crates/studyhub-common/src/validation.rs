//! Input validation utilities.
//!
//! Centralized validation helpers used by the client services before any
//! store call is made; validation failures never reach the network.

use validator::Validate;

use crate::error::StudyhubError;

/// Validate a request payload, returning a `StudyhubError::Validation` on failure.
pub fn validate_request<T: Validate>(body: &T) -> Result<(), StudyhubError> {
    body.validate().map_err(|e| StudyhubError::Validation {
        message: format_validation_errors(e),
    })
}

/// Format validation errors into a human-readable string.
fn format_validation_errors(errors: validator::ValidationErrors) -> String {
    errors
        .field_errors()
        .iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| {
                e.message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("Invalid value for '{field}'"))
            })
        })
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Validate)]
    struct Probe {
        #[validate(length(min = 1, message = "Name cannot be empty"))]
        name: String,
    }

    #[test]
    fn failures_surface_the_declared_message() {
        let err = validate_request(&Probe { name: String::new() }).unwrap_err();
        assert!(matches!(err, StudyhubError::Validation { ref message } if message == "Name cannot be empty"));
        assert!(validate_request(&Probe { name: "Calculus I".into() }).is_ok());
    }
}
