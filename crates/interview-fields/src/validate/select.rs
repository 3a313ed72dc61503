use serde_json::Value;

use super::{FieldValidator, ValidationResult, label_of, required_value_error, validator};
use crate::error::{ErrorCode, FieldError};
use crate::spec::{SelectField, SelectValue};
use crate::value::FormValue;

/// Builds the validator of a select field.
///
/// With `max == 1` the value is a single option index; a singleton array is
/// accepted in its place. Otherwise the value is a de-duplicated list of
/// indices whose length must fall within `min..=max`.
pub fn select_validator(field: &SelectField) -> FieldValidator {
    let field = field.clone();
    let label = label_of(&field.label);

    validator(move |value| {
        if field.is_single() {
            validate_single(&field, &label, value)
        } else {
            validate_multi(&field, &label, value)
        }
    })
}

fn validate_single(field: &SelectField, label: &str, value: &Value) -> ValidationResult {
    let candidate = match value {
        Value::Null => None,
        Value::Array(items) => match items.as_slice() {
            [] => None,
            [item] => Some(item),
            _ => {
                return Err(FieldError::new(
                    ErrorCode::Type,
                    format!("{label} accepts a single option"),
                ));
            }
        },
        other => Some(other),
    };
    let Some(candidate) = candidate.filter(|candidate| !is_blank(candidate)) else {
        return if field.min == 0 {
            Ok(None)
        } else {
            Err(FieldError::required(label))
        };
    };

    let index = option_index(field, label, candidate)?;
    if let Some(required) = &field.require_value
        && sorted(required) != [index]
    {
        return Err(required_value_error(&field.require_value_message));
    }
    Ok(Some(FormValue::index(index)))
}

fn validate_multi(field: &SelectField, label: &str, value: &Value) -> ValidationResult {
    let items = match value {
        Value::Null => return Err(FieldError::required(label)),
        Value::Array(items) => items,
        _ => {
            return Err(FieldError::new(
                ErrorCode::Type,
                format!("{label} must be a list of options"),
            ));
        }
    };

    let mut indices: Vec<usize> = Vec::with_capacity(items.len());
    for item in items {
        let index = option_index(field, label, item)?;
        if !indices.contains(&index) {
            indices.push(index);
        }
    }

    if indices.len() < field.min {
        return Err(FieldError::new(
            ErrorCode::MinItems,
            format!("{label} field must have at least {} items", field.min),
        ));
    }
    if indices.len() > field.max {
        return Err(FieldError::new(
            ErrorCode::MaxItems,
            format!(
                "{label} field must have less than or equal to {} items",
                field.max
            ),
        ));
    }
    if let Some(required) = &field.require_value {
        let mut chosen = indices.clone();
        chosen.sort_unstable();
        if sorted(required) != chosen {
            return Err(required_value_error(&field.require_value_message));
        }
    }
    Ok(Some(FormValue::List(
        indices.into_iter().map(FormValue::index).collect(),
    )))
}

fn is_blank(value: &Value) -> bool {
    value.as_str().is_some_and(|text| text.trim().is_empty())
}

/// Reads an option index from a number or numeric string.
fn option_index(field: &SelectField, label: &str, value: &Value) -> Result<usize, FieldError> {
    let index = match value {
        Value::Number(number) => number.as_u64(),
        Value::String(text) => text.trim().parse::<u64>().ok(),
        _ => None,
    };
    index
        .and_then(|index| usize::try_from(index).ok())
        .filter(|index| *index < field.options.len())
        .ok_or_else(|| {
            let allowed: Vec<String> = (0..field.options.len()).map(|i| i.to_string()).collect();
            FieldError::new(
                ErrorCode::Option,
                format!(
                    "{label} must be one of the following values: {}",
                    allowed.join(", ")
                ),
            )
        })
}

fn sorted(value: &SelectValue) -> Vec<usize> {
    let mut indices = match value {
        SelectValue::One(index) => vec![*index],
        SelectValue::Many(indices) => indices.clone(),
    };
    indices.sort_unstable();
    indices.dedup();
    indices
}
