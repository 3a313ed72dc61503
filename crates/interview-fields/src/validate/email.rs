use super::{FieldValidator, coerce_text, label_of, required_value_error, validator};
use crate::email::{has_registrable_domain, is_valid_syntax};
use crate::error::{ErrorCode, FieldError};
use crate::spec::EmailField;
use crate::value::FormValue;

pub const INVALID_EMAIL_MESSAGE: &str = "Invalid email";

/// Builds the validator of an email field.
///
/// An empty address fails the domain check even when the field is optional.
pub fn email_validator(field: &EmailField) -> FieldValidator {
    let field = field.clone();
    let label = label_of(&field.label);

    validator(move |value| {
        let address = coerce_text(value, &label)?.unwrap_or_default();
        if address.is_empty() && !field.optional {
            return Err(FieldError::required(&label));
        }
        if !address.is_empty() && !is_valid_syntax(&address) {
            return Err(FieldError::new(ErrorCode::Email, INVALID_EMAIL_MESSAGE));
        }
        if !has_registrable_domain(&address) {
            return Err(FieldError::new(ErrorCode::Email, INVALID_EMAIL_MESSAGE));
        }
        if let Some(required) = &field.require_value
            && !required.trim().eq_ignore_ascii_case(&address)
        {
            return Err(required_value_error(&field.require_value_message));
        }
        Ok(Some(FormValue::Text(address)))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_optional_address_still_fails() {
        let check = email_validator(&EmailField {
            optional: true,
            ..EmailField::default()
        });
        let err = check(&json!("")).unwrap_err();
        assert_eq!(err.code, ErrorCode::Email);
        assert!(check(&json!(null)).is_err());
    }

    #[test]
    fn required_address_reports_required_first() {
        let check = email_validator(&EmailField::default());
        let err = check(&json!("  ")).unwrap_err();
        assert_eq!(err.code, ErrorCode::Required);
        assert_eq!(err.message, "Field is a required field");
    }
}
