pub mod button;
pub mod field;

pub use button::{Button, default_button};
pub use field::{
    BoolField, CustomField, DEFAULT_MAX_TEXT_LENGTH, DateField, EmailField, FALLBACK_LABEL,
    FieldSchema, NumberField, SelectComponent, SelectField, SelectValue, TextField,
};

use std::collections::BTreeMap;

/// Field schemas of one question step, keyed by field name.
pub type FieldSchemas = BTreeMap<String, FieldSchema>;
