//! Field validation engine: a registry from field type to validator factory.

mod boolean;
mod date;
mod email;
mod number;
mod select;
mod text;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::error::{ErrorCode, FieldError, SchemaError};
use crate::spec::FieldSchema;
use crate::value::FormValue;

pub use self::boolean::bool_validator;
pub use self::date::date_validator;
pub use self::email::email_validator;
pub use self::number::number_validator;
pub use self::select::select_validator;
pub use self::text::text_validator;

/// Outcome of one validation: the coerced value (`None` when absent) or the error.
pub type ValidationResult = Result<Option<FormValue>, FieldError>;

/// A pure function from raw input to [`ValidationResult`].
pub type FieldValidator = Arc<dyn Fn(&Value) -> ValidationResult + Send + Sync>;

type FieldValidatorFactory =
    Arc<dyn Fn(&FieldSchema) -> Result<FieldValidator, SchemaError> + Send + Sync>;

/// Default message of a failed `require_value` check.
pub const DEFAULT_REQUIRE_VALUE_MESSAGE: &str = "Required";

/// Wraps a closure as a [`FieldValidator`].
pub fn validator<F>(check: F) -> FieldValidator
where
    F: Fn(&Value) -> ValidationResult + Send + Sync + 'static,
{
    Arc::new(check)
}

/// Maps field type names to validator factories.
#[derive(Clone, Default)]
pub struct FieldRegistry {
    factories: HashMap<String, FieldValidatorFactory>,
}

impl FieldRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the built-in field types.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        register_default_fields(&mut registry);
        registry
    }

    /// Registers (or replaces) the factory for a field type.
    pub fn register<F>(&mut self, kind: impl Into<String>, factory: F)
    where
        F: Fn(&FieldSchema) -> Result<FieldValidator, SchemaError> + Send + Sync + 'static,
    {
        self.factories.insert(kind.into(), Arc::new(factory));
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.factories.contains_key(kind)
    }

    pub fn kinds(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    /// Builds the validator for a schema.
    ///
    /// Fails with [`SchemaError::UnknownFieldType`] when its type has no factory.
    pub fn validator_for(&self, schema: &FieldSchema) -> Result<FieldValidator, SchemaError> {
        let kind = schema.type_name();
        let factory = self
            .factories
            .get(kind)
            .ok_or_else(|| SchemaError::UnknownFieldType(kind.to_string()))?;
        factory(schema)
    }

    /// Validates one value against a schema without keeping the validator.
    pub fn validate(
        &self,
        schema: &FieldSchema,
        value: &Value,
    ) -> Result<ValidationResult, SchemaError> {
        let check = self.validator_for(schema)?;
        Ok(check(value))
    }
}

impl fmt::Debug for FieldRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut kinds: Vec<_> = self.kinds().collect();
        kinds.sort_unstable();
        f.debug_struct("FieldRegistry").field("kinds", &kinds).finish()
    }
}

/// Registers the six built-in field types.
pub fn register_default_fields(registry: &mut FieldRegistry) {
    registry.register("text", |schema| match schema {
        FieldSchema::Text(field) => text_validator(field),
        other => Err(mismatch("text", other)),
    });
    registry.register("email", |schema| match schema {
        FieldSchema::Email(field) => Ok(email_validator(field)),
        other => Err(mismatch("email", other)),
    });
    registry.register("number", |schema| match schema {
        FieldSchema::Number(field) => Ok(number_validator(field)),
        other => Err(mismatch("number", other)),
    });
    registry.register("bool", |schema| match schema {
        FieldSchema::Bool(field) => Ok(bool_validator(field)),
        other => Err(mismatch("bool", other)),
    });
    registry.register("select", |schema| match schema {
        FieldSchema::Select(field) => Ok(select_validator(field)),
        other => Err(mismatch("select", other)),
    });
    registry.register("date", |schema| match schema {
        FieldSchema::Date(field) => date_validator(field),
        other => Err(mismatch("date", other)),
    });
}

fn mismatch(expected: &str, found: &FieldSchema) -> SchemaError {
    SchemaError::SchemaMismatch {
        expected: expected.to_string(),
        found: found.type_name().to_string(),
    }
}

fn label_of(label: &Option<String>) -> String {
    label
        .clone()
        .unwrap_or_else(|| crate::spec::FALLBACK_LABEL.to_string())
}

/// `Ok(None)` for optional fields, the required error otherwise.
fn absent(optional: bool, label: &str) -> ValidationResult {
    if optional {
        Ok(None)
    } else {
        Err(FieldError::required(label))
    }
}

/// Reads a raw value as trimmed text. Numbers and booleans are stringified.
fn coerce_text(value: &Value, label: &str) -> Result<Option<String>, FieldError> {
    match value {
        Value::Null => Ok(None),
        Value::String(text) => Ok(Some(text.trim().to_string())),
        Value::Number(number) => Ok(Some(number.to_string())),
        Value::Bool(flag) => Ok(Some(flag.to_string())),
        Value::Array(_) | Value::Object(_) => Err(FieldError::new(
            ErrorCode::Type,
            format!("{label} must be text"),
        )),
    }
}

fn required_value_error(message: &Option<String>) -> FieldError {
    FieldError::new(
        ErrorCode::RequiredValue,
        message
            .clone()
            .unwrap_or_else(|| DEFAULT_REQUIRE_VALUE_MESSAGE.to_string()),
    )
}

/// Renders a bound for messages, dropping a zero fraction.
fn format_bound(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}
