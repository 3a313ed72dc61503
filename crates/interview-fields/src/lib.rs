#![allow(missing_docs)]

pub mod date;
pub mod email;
pub mod error;
pub mod spec;
pub mod state;
pub mod validate;
pub mod value;

pub use date::{compare_dates, date_value, format_date, parse_date};
pub use error::{ErrorCode, FieldError, SchemaError};
pub use spec::{
    BoolField, Button, CustomField, DateField, EmailField, FieldSchema, FieldSchemas, NumberField,
    SelectComponent, SelectField, SelectValue, TextField, default_button,
};
pub use state::{FieldState, FormState, Submission, SubmitError, SubmitRefused};
pub use validate::{
    FieldRegistry, FieldValidator, ValidationResult, register_default_fields, validator,
};
pub use value::{FormValue, FormValues};
