use regex::Regex;

use super::{FieldValidator, absent, coerce_text, label_of, required_value_error, validator};
use crate::error::{ErrorCode, FieldError, SchemaError};
use crate::spec::TextField;
use crate::value::FormValue;

pub const PATTERN_MESSAGE: &str = "Enter a valid value.";

/// Builds the validator of a text field. Fails when `regex` does not compile.
pub fn text_validator(field: &TextField) -> Result<FieldValidator, SchemaError> {
    let pattern = field
        .regex
        .as_deref()
        .map(|pattern| {
            Regex::new(pattern).map_err(|source| SchemaError::InvalidRegex {
                pattern: pattern.to_string(),
                source,
            })
        })
        .transpose()?;
    let field = field.clone();
    let label = label_of(&field.label);

    Ok(validator(move |value| {
        let Some(text) = coerce_text(value, &label)? else {
            return absent(field.optional, &label);
        };
        if text.is_empty() {
            return absent(field.optional, &label);
        }

        let length = text.chars().count();
        if length < field.min {
            return Err(FieldError::new(
                ErrorCode::MinLength,
                format!("{label} must be at least {} characters", field.min),
            ));
        }
        if length > field.max {
            return Err(FieldError::new(
                ErrorCode::MaxLength,
                format!("{label} must be at most {} characters", field.max),
            ));
        }
        if let Some(pattern) = &pattern
            && !pattern.is_match(&text)
        {
            return Err(FieldError::new(ErrorCode::Pattern, PATTERN_MESSAGE));
        }
        if let Some(required) = &field.require_value
            && required.trim() != text
        {
            return Err(required_value_error(&field.require_value_message));
        }
        Ok(Some(FormValue::Text(text)))
    }))
}
