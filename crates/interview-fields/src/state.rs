//! Field and form state: raw input plus derived validity, recomputed on read.

use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

use crate::error::{FieldError, SchemaError};
use crate::spec::{Button, FieldSchema, FieldSchemas};
use crate::validate::{FieldRegistry, FieldValidator, ValidationResult};
use crate::value::{FormValue, FormValues};

/// State of one rendered field.
#[derive(Clone)]
pub struct FieldState {
    schema: FieldSchema,
    validator: FieldValidator,
    value: Value,
    touched: bool,
}

impl FieldState {
    pub fn new(schema: FieldSchema, validator: FieldValidator, value: Value) -> Self {
        Self {
            schema,
            validator,
            value,
            touched: false,
        }
    }

    pub fn schema(&self) -> &FieldSchema {
        &self.schema
    }

    /// The raw input, possibly invalid. `Value::Null` when absent.
    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn touched(&self) -> bool {
        self.touched
    }

    /// Replaces the raw input. Never rejects a value.
    pub fn handle_change(&mut self, value: impl Into<Value>) {
        self.value = value.into();
    }

    /// Marks the field touched. There is no way back.
    pub fn handle_touch(&mut self) {
        self.touched = true;
    }

    pub fn validation_result(&self) -> ValidationResult {
        (self.validator)(&self.value)
    }

    pub fn is_valid(&self) -> bool {
        self.validation_result().is_ok()
    }

    pub fn valid_value(&self) -> Option<FormValue> {
        self.validation_result().ok().flatten()
    }

    pub fn error(&self) -> Option<FieldError> {
        self.validation_result().err()
    }

    /// Whether the error should be displayed: invalid and touched.
    pub fn show_error(&self) -> bool {
        self.touched && !self.is_valid()
    }
}

impl fmt::Debug for FieldState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldState")
            .field("schema", &self.schema)
            .field("value", &self.value)
            .field("touched", &self.touched)
            .finish_non_exhaustive()
    }
}

/// Why a submit attempt did not start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SubmitRefused {
    #[error("a submission is already in flight")]
    InFlight,
    #[error("the form has invalid fields")]
    Invalid,
}

/// Failure of [`FormState::submit`].
#[derive(Debug, Error)]
pub enum SubmitError<E> {
    #[error(transparent)]
    Refused(SubmitRefused),
    #[error("submission failed: {0}")]
    Failed(E),
}

/// What a started submission hands to the session layer.
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub values: FormValues,
    pub button: Option<usize>,
}

/// State of one question step's form.
#[derive(Debug, Clone, Default)]
pub struct FormState {
    fields: BTreeMap<String, FieldState>,
    buttons: Option<Vec<Button>>,
    submitting: bool,
    button: Option<usize>,
}

impl FormState {
    /// Builds a form, resolving each schema through the registry and seeding
    /// each field from `initial_values` when it carries the field's key.
    pub fn create(
        registry: &FieldRegistry,
        schemas: &FieldSchemas,
        buttons: Option<Vec<Button>>,
        initial_values: Option<&Map<String, Value>>,
    ) -> Result<Self, SchemaError> {
        let mut fields = BTreeMap::new();
        for (name, schema) in schemas {
            let validator = registry.validator_for(schema)?;
            let value = initial_values
                .and_then(|values| values.get(name))
                .cloned()
                .unwrap_or(Value::Null);
            fields.insert(
                name.clone(),
                FieldState::new(schema.clone(), validator, value),
            );
        }
        debug!(fields = fields.len(), "form state created");
        Ok(Self {
            fields,
            buttons,
            submitting: false,
            button: None,
        })
    }

    /// Builds a form from a raw JSON object of field schemas.
    pub fn from_json(
        registry: &FieldRegistry,
        schemas: &Map<String, Value>,
        buttons: Option<Vec<Button>>,
        initial_values: Option<&Map<String, Value>>,
    ) -> Result<Self, SchemaError> {
        let mut parsed = FieldSchemas::new();
        for (name, schema) in schemas {
            let schema = serde_json::from_value(schema.clone()).map_err(|source| {
                SchemaError::InvalidSchema {
                    name: name.clone(),
                    source,
                }
            })?;
            parsed.insert(name.clone(), schema);
        }
        Self::create(registry, &parsed, buttons, initial_values)
    }

    pub fn field(&self, name: &str) -> Option<&FieldState> {
        self.fields.get(name)
    }

    pub fn field_mut(&mut self, name: &str) -> Option<&mut FieldState> {
        self.fields.get_mut(name)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldState)> {
        self.fields.iter().map(|(name, state)| (name.as_str(), state))
    }

    pub fn buttons(&self) -> Option<&[Button]> {
        self.buttons.as_deref()
    }

    pub fn submitting(&self) -> bool {
        self.submitting
    }

    /// The button chosen for the next submission.
    pub fn button(&self) -> Option<usize> {
        self.button
    }

    pub fn set_button(&mut self, button: Option<usize>) {
        self.button = button;
    }

    pub fn is_valid(&self) -> bool {
        self.fields.values().all(FieldState::is_valid)
    }

    /// Values of the fields that are valid and present.
    pub fn valid_values(&self) -> FormValues {
        self.fields
            .iter()
            .filter_map(|(name, state)| {
                state
                    .validation_result()
                    .ok()
                    .flatten()
                    .map(|value| (name.clone(), value))
            })
            .collect()
    }

    pub fn touch_all(&mut self) {
        for state in self.fields.values_mut() {
            state.handle_touch();
        }
    }

    /// Starts a submission.
    ///
    /// Every field is touched first so errors show. Refused while another
    /// submission is in flight or when any field is invalid.
    pub fn begin_submit(&mut self) -> Result<Submission, SubmitRefused> {
        self.touch_all();
        if self.submitting {
            return Err(SubmitRefused::InFlight);
        }
        if !self.is_valid() {
            return Err(SubmitRefused::Invalid);
        }
        self.submitting = true;
        Ok(Submission {
            values: self.valid_values(),
            button: self.button,
        })
    }

    /// Settles the in-flight submission.
    ///
    /// A failure clears `submitting` so the user can retry; after a success
    /// the form stays locked until the step is replaced.
    pub fn settle_submit(&mut self, succeeded: bool) {
        if !succeeded {
            self.submitting = false;
        }
    }

    /// Runs a whole submission through `handler`, settling it afterwards.
    pub async fn submit<F, Fut, T, E>(&mut self, handler: F) -> Result<T, SubmitError<E>>
    where
        F: FnOnce(Submission) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let submission = self.begin_submit().map_err(SubmitError::Refused)?;
        let result = handler(submission).await;
        self.settle_submit(result.is_ok());
        result.map_err(SubmitError::Failed)
    }
}
