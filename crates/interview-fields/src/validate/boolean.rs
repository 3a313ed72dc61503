use serde_json::Value;

use super::{FieldValidator, absent, label_of, required_value_error, validator};
use crate::error::{ErrorCode, FieldError};
use crate::spec::BoolField;
use crate::value::FormValue;

/// Builds the validator of a bool field. `false` counts as a present value.
pub fn bool_validator(field: &BoolField) -> FieldValidator {
    let field = field.clone();
    let label = label_of(&field.label);

    validator(move |value| {
        let Some(flag) = coerce_bool(value).map_err(|()| {
            FieldError::new(ErrorCode::Type, format!("{label} must be true or false"))
        })?
        else {
            return absent(field.optional, &label);
        };
        if let Some(required) = field.require_value
            && required != flag
        {
            return Err(required_value_error(&field.require_value_message));
        }
        Ok(Some(FormValue::Bool(flag)))
    })
}

fn coerce_bool(value: &Value) -> Result<Option<bool>, ()> {
    match value {
        Value::Null => Ok(None),
        Value::Bool(flag) => Ok(Some(*flag)),
        Value::String(text) => match text.trim().to_ascii_lowercase().as_str() {
            "" => Ok(None),
            "true" | "1" => Ok(Some(true)),
            "false" | "0" => Ok(Some(false)),
            _ => Err(()),
        },
        Value::Number(number) => match number.as_f64() {
            Some(n) if n == 1.0 => Ok(Some(true)),
            Some(n) if n == 0.0 => Ok(Some(false)),
            _ => Err(()),
        },
        Value::Array(_) | Value::Object(_) => Err(()),
    }
}
