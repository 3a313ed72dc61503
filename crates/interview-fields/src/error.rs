use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A field schema that cannot be turned into a validator.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("no validator registered for field type `{0}`")]
    UnknownFieldType(String),
    #[error("validator factory for `{expected}` received a `{found}` schema")]
    SchemaMismatch { expected: String, found: String },
    #[error("invalid regex `{pattern}`: {source}")]
    InvalidRegex {
        pattern: String,
        #[source]
        source: regex::Error,
    },
    #[error("invalid date bound `{0}`, expected YYYY-MM-DD")]
    InvalidDate(String),
    #[error("invalid field schema `{name}`: {source}")]
    InvalidSchema {
        name: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Stable machine-readable reason of a [`FieldError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    Required,
    Type,
    MinLength,
    MaxLength,
    Pattern,
    Email,
    Min,
    Max,
    Option,
    MinItems,
    MaxItems,
    Date,
    MinDate,
    MaxDate,
    RequiredValue,
}

impl ErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::Required => "required",
            ErrorCode::Type => "type",
            ErrorCode::MinLength => "min_length",
            ErrorCode::MaxLength => "max_length",
            ErrorCode::Pattern => "pattern",
            ErrorCode::Email => "email",
            ErrorCode::Min => "min",
            ErrorCode::Max => "max",
            ErrorCode::Option => "option",
            ErrorCode::MinItems => "min_items",
            ErrorCode::MaxItems => "max_items",
            ErrorCode::Date => "date",
            ErrorCode::MinDate => "min_date",
            ErrorCode::MaxDate => "max_date",
            ErrorCode::RequiredValue => "required_value",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A per-field validation failure, shown next to the field.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{message}")]
pub struct FieldError {
    pub code: ErrorCode,
    pub message: String,
}

impl FieldError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn required(label: &str) -> Self {
        Self::new(ErrorCode::Required, format!("{label} is a required field"))
    }
}
