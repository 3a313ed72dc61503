use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

/// A coerced, valid field value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FormValue {
    Bool(bool),
    Number(Number),
    Text(String),
    List(Vec<FormValue>),
}

/// Valid values of a form, keyed by field name.
pub type FormValues = BTreeMap<String, FormValue>;

impl FormValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FormValue::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FormValue::Number(number) => number.as_f64(),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FormValue::Bool(flag) => Some(*flag),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[FormValue]> {
        match self {
            FormValue::List(items) => Some(items),
            _ => None,
        }
    }

    /// Number value for an `f64`, emitted as an integer when it has no fraction.
    pub fn from_f64(value: f64) -> Option<Self> {
        if value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
            return Some(FormValue::Number(Number::from(value as i64)));
        }
        Number::from_f64(value).map(FormValue::Number)
    }

    pub fn index(index: usize) -> Self {
        FormValue::Number(Number::from(index))
    }
}

impl From<FormValue> for Value {
    fn from(value: FormValue) -> Self {
        match value {
            FormValue::Bool(flag) => Value::Bool(flag),
            FormValue::Number(number) => Value::Number(number),
            FormValue::Text(text) => Value::String(text),
            FormValue::List(items) => Value::Array(items.into_iter().map(Value::from).collect()),
        }
    }
}

impl From<bool> for FormValue {
    fn from(value: bool) -> Self {
        FormValue::Bool(value)
    }
}

impl From<String> for FormValue {
    fn from(value: String) -> Self {
        FormValue::Text(value)
    }
}

impl From<&str> for FormValue {
    fn from(value: &str) -> Self {
        FormValue::Text(value.to_string())
    }
}

impl From<i64> for FormValue {
    fn from(value: i64) -> Self {
        FormValue::Number(Number::from(value))
    }
}
