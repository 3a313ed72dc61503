use serde_json::Value;

use super::{FieldValidator, absent, format_bound, label_of, required_value_error, validator};
use crate::error::{ErrorCode, FieldError};
use crate::spec::NumberField;
use crate::value::FormValue;

pub const INVALID_NUMBER_MESSAGE: &str = "Enter a valid number.";

/// Builds the validator of a number field.
///
/// Numeric strings are parsed; with `integer` set the value is truncated
/// toward zero before the bounds are checked.
pub fn number_validator(field: &NumberField) -> FieldValidator {
    let field = field.clone();
    let label = label_of(&field.label);

    validator(move |value| {
        let Some(mut number) = coerce_number(value)? else {
            return absent(field.optional, &label);
        };
        if field.integer {
            number = number.trunc();
        }
        if let Some(min) = field.min
            && number < min
        {
            return Err(FieldError::new(
                ErrorCode::Min,
                format!("{label} must be greater than or equal to {}", format_bound(min)),
            ));
        }
        if let Some(max) = field.max
            && number > max
        {
            return Err(FieldError::new(
                ErrorCode::Max,
                format!("{label} must be less than or equal to {}", format_bound(max)),
            ));
        }
        if let Some(required) = field.require_value
            && required != number
        {
            return Err(required_value_error(&field.require_value_message));
        }
        FormValue::from_f64(number)
            .map(Some)
            .ok_or_else(type_error)
    })
}

fn coerce_number(value: &Value) -> Result<Option<f64>, FieldError> {
    let number = match value {
        Value::Null => return Ok(None),
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        Value::Bool(_) | Value::Array(_) | Value::Object(_) => None,
    };
    number
        .filter(|number| number.is_finite())
        .map(Some)
        .ok_or_else(type_error)
}

fn type_error() -> FieldError {
    FieldError::new(ErrorCode::Type, INVALID_NUMBER_MESSAGE)
}
