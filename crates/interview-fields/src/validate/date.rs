use serde_json::Value;
use time::Date;

use super::{FieldValidator, absent, label_of, required_value_error, validator};
use crate::date::{compare_dates, format_date, parse_date};
use crate::error::{ErrorCode, FieldError, SchemaError};
use crate::spec::DateField;
use crate::value::FormValue;

pub const INVALID_DATE_MESSAGE: &str = "Enter a valid date";
pub const MIN_DATE_MESSAGE: &str = "Enter a later date";
pub const MAX_DATE_MESSAGE: &str = "Enter an earlier date";

/// Builds the validator of a date field.
///
/// Bounds are parsed up front and fail the build when malformed.
pub fn date_validator(field: &DateField) -> Result<FieldValidator, SchemaError> {
    let min = parse_bound(field.min.as_deref())?;
    let max = parse_bound(field.max.as_deref())?;
    let required = parse_bound(field.require_value.as_deref())?;
    let optional = field.optional;
    let require_value_message = field.require_value_message.clone();
    let label = label_of(&field.label);

    Ok(validator(move |value| {
        let date = match value {
            Value::Null => return absent(optional, &label),
            Value::String(text) if text.trim().is_empty() => return absent(optional, &label),
            Value::String(text) => parse_date(text).ok_or_else(invalid)?,
            _ => return Err(invalid()),
        };
        if let Some(min) = min
            && compare_dates(min, date).is_gt()
        {
            return Err(FieldError::new(ErrorCode::MinDate, MIN_DATE_MESSAGE));
        }
        if let Some(max) = max
            && compare_dates(max, date).is_lt()
        {
            return Err(FieldError::new(ErrorCode::MaxDate, MAX_DATE_MESSAGE));
        }
        if let Some(required) = required
            && compare_dates(required, date).is_ne()
        {
            return Err(required_value_error(&require_value_message));
        }
        Ok(Some(FormValue::Text(format_date(date))))
    }))
}

fn parse_bound(bound: Option<&str>) -> Result<Option<Date>, SchemaError> {
    bound
        .filter(|bound| !bound.is_empty())
        .map(|bound| parse_date(bound).ok_or_else(|| SchemaError::InvalidDate(bound.to_string())))
        .transpose()
}

fn invalid() -> FieldError {
    FieldError::new(ErrorCode::Date, INVALID_DATE_MESSAGE)
}
