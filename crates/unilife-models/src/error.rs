//! Error types for the `unilife-models` crate.
//!
//! All validation helpers in this crate return variants of [`ModelError`].

/// Errors produced when validating model types.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    /// One or more required fields were missing or blank.
    #[error("missing required field(s): {}", fields.join(", "))]
    MissingFields {
        /// Names of the missing fields, in declaration order.
        fields: Vec<&'static str>,
    },

    /// A field was present but not in the expected format.
    #[error("invalid {field} \"{value}\": {reason}")]
    InvalidField {
        /// The name of the offending field.
        field: &'static str,
        /// The value that failed validation.
        value: String,
        /// Human-readable explanation.
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_missing_fields() {
        let err = ModelError::MissingFields {
            fields: vec!["name", "credits"],
        };
        assert_eq!(err.to_string(), "missing required field(s): name, credits");
    }

    #[test]
    fn error_display_invalid_field() {
        let err = ModelError::InvalidField {
            field: "date",
            value: "2025-13-01".into(),
            reason: "expected YYYY-MM-DD".into(),
        };
        assert_eq!(
            err.to_string(),
            "invalid date \"2025-13-01\": expected YYYY-MM-DD"
        );
    }
}
