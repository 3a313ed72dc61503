use serde::de::Error as _;
use serde::ser::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

/// Default maximum length of a text field.
pub const DEFAULT_MAX_TEXT_LENGTH: usize = 300;

/// Label used in messages when a field carries none.
pub const FALLBACK_LABEL: &str = "Field";

fn default_text_max() -> usize {
    DEFAULT_MAX_TEXT_LENGTH
}

fn default_select_bound() -> usize {
    1
}

/// Rendering hint for select fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectComponent {
    #[default]
    Dropdown,
    Checkbox,
    Radio,
}

/// A select default or required value: one option index or a set of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SelectValue {
    One(usize),
    Many(Vec<usize>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextField {
    #[serde(default)]
    pub optional: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default)]
    pub min: usize,
    #[serde(default = "default_text_max")]
    pub max: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regex: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_mode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub autocomplete: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub require_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub require_value_message: Option<String>,
}

impl Default for TextField {
    fn default() -> Self {
        Self {
            optional: false,
            default: None,
            label: None,
            min: 0,
            max: DEFAULT_MAX_TEXT_LENGTH,
            regex: None,
            input_mode: None,
            autocomplete: None,
            require_value: None,
            require_value_message: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EmailField {
    #[serde(default)]
    pub optional: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_mode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub autocomplete: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub require_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub require_value_message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NumberField {
    #[serde(default)]
    pub optional: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    /// Non-integers are truncated rather than rejected.
    #[serde(default)]
    pub integer: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_mode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub autocomplete: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub require_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub require_value_message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BoolField {
    #[serde(default)]
    pub optional: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub require_value: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub require_value_message: Option<String>,
}

/// Select field; valid selections are indices into `options`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectField {
    #[serde(default)]
    pub optional: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<SelectValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default = "default_select_bound")]
    pub min: usize,
    #[serde(default = "default_select_bound")]
    pub max: usize,
    #[serde(default)]
    pub component: SelectComponent,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_mode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub autocomplete: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub require_value: Option<SelectValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub require_value_message: Option<String>,
}

impl SelectField {
    /// Whether the field holds a single index rather than a list.
    pub fn is_single(&self) -> bool {
        self.max == 1
    }
}

impl Default for SelectField {
    fn default() -> Self {
        Self {
            optional: false,
            default: None,
            label: None,
            min: 1,
            max: 1,
            component: SelectComponent::default(),
            options: Vec::new(),
            input_mode: None,
            autocomplete: None,
            require_value: None,
            require_value_message: None,
        }
    }
}

/// Date field. Bounds are ISO `YYYY-MM-DD` strings.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DateField {
    #[serde(default)]
    pub optional: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_mode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub autocomplete: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub require_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub require_value_message: Option<String>,
}

/// A field of a type the built-in set does not know; every attribute is kept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomField {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub optional: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

/// Declarative description of one input, tagged by `type` on the wire.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldSchema {
    Text(TextField),
    Email(EmailField),
    Number(NumberField),
    Bool(BoolField),
    Select(SelectField),
    Date(DateField),
    Custom(CustomField),
}

impl FieldSchema {
    pub fn type_name(&self) -> &str {
        match self {
            FieldSchema::Text(_) => "text",
            FieldSchema::Email(_) => "email",
            FieldSchema::Number(_) => "number",
            FieldSchema::Bool(_) => "bool",
            FieldSchema::Select(_) => "select",
            FieldSchema::Date(_) => "date",
            FieldSchema::Custom(field) => &field.kind,
        }
    }

    pub fn is_optional(&self) -> bool {
        match self {
            FieldSchema::Text(field) => field.optional,
            FieldSchema::Email(field) => field.optional,
            FieldSchema::Number(field) => field.optional,
            FieldSchema::Bool(field) => field.optional,
            FieldSchema::Select(field) => field.min == 0,
            FieldSchema::Date(field) => field.optional,
            FieldSchema::Custom(field) => field.optional,
        }
    }

    pub fn label(&self) -> Option<&str> {
        match self {
            FieldSchema::Text(field) => field.label.as_deref(),
            FieldSchema::Email(field) => field.label.as_deref(),
            FieldSchema::Number(field) => field.label.as_deref(),
            FieldSchema::Bool(field) => field.label.as_deref(),
            FieldSchema::Select(field) => field.label.as_deref(),
            FieldSchema::Date(field) => field.label.as_deref(),
            FieldSchema::Custom(field) => field.label.as_deref(),
        }
    }

    /// The label, or a generic placeholder for messages.
    pub fn display_label(&self) -> &str {
        self.label().unwrap_or(FALLBACK_LABEL)
    }

    /// The schema default as a raw value, used by frontends to seed inputs.
    pub fn default_value(&self) -> Option<Value> {
        match self {
            FieldSchema::Text(field) => field.default.clone().map(Value::String),
            FieldSchema::Email(field) => field.default.clone().map(Value::String),
            FieldSchema::Number(field) => field
                .default
                .and_then(serde_json::Number::from_f64)
                .map(Value::Number),
            FieldSchema::Bool(field) => field.default.map(Value::Bool),
            FieldSchema::Select(field) => field
                .default
                .as_ref()
                .and_then(|value| serde_json::to_value(value).ok()),
            FieldSchema::Date(field) => field.default.clone().map(Value::String),
            FieldSchema::Custom(field) => field.default.clone(),
        }
    }
}

impl From<TextField> for FieldSchema {
    fn from(field: TextField) -> Self {
        FieldSchema::Text(field)
    }
}

impl From<EmailField> for FieldSchema {
    fn from(field: EmailField) -> Self {
        FieldSchema::Email(field)
    }
}

impl From<NumberField> for FieldSchema {
    fn from(field: NumberField) -> Self {
        FieldSchema::Number(field)
    }
}

impl From<BoolField> for FieldSchema {
    fn from(field: BoolField) -> Self {
        FieldSchema::Bool(field)
    }
}

impl From<SelectField> for FieldSchema {
    fn from(field: SelectField) -> Self {
        FieldSchema::Select(field)
    }
}

impl From<DateField> for FieldSchema {
    fn from(field: DateField) -> Self {
        FieldSchema::Date(field)
    }
}

impl From<CustomField> for FieldSchema {
    fn from(field: CustomField) -> Self {
        FieldSchema::Custom(field)
    }
}

impl Serialize for FieldSchema {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let body = match self {
            FieldSchema::Text(field) => serde_json::to_value(field),
            FieldSchema::Email(field) => serde_json::to_value(field),
            FieldSchema::Number(field) => serde_json::to_value(field),
            FieldSchema::Bool(field) => serde_json::to_value(field),
            FieldSchema::Select(field) => serde_json::to_value(field),
            FieldSchema::Date(field) => serde_json::to_value(field),
            FieldSchema::Custom(field) => serde_json::to_value(field),
        };
        let mut body = body.map_err(S::Error::custom)?;
        if let Value::Object(map) = &mut body {
            map.insert("type".into(), Value::String(self.type_name().to_string()));
        }
        body.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for FieldSchema {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        let kind = value
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| D::Error::missing_field("type"))?
            .to_string();
        let parsed = match kind.as_str() {
            "text" => serde_json::from_value(value).map(FieldSchema::Text),
            "email" => serde_json::from_value(value).map(FieldSchema::Email),
            "number" => serde_json::from_value(value).map(FieldSchema::Number),
            "bool" => serde_json::from_value(value).map(FieldSchema::Bool),
            "select" => serde_json::from_value(value).map(FieldSchema::Select),
            "date" => serde_json::from_value(value).map(FieldSchema::Date),
            _ => serde_json::from_value(value).map(FieldSchema::Custom),
        };
        parsed.map_err(|err| D::Error::custom(format!("invalid {kind} field: {err}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn text_defaults_apply() {
        let field: FieldSchema = serde_json::from_value(json!({ "type": "text" })).unwrap();
        match field {
            FieldSchema::Text(text) => {
                assert_eq!(text.min, 0);
                assert_eq!(text.max, DEFAULT_MAX_TEXT_LENGTH);
                assert!(!text.optional);
            }
            other => panic!("expected text field, got {other:?}"),
        }
    }

    #[test]
    fn select_defaults_to_single_dropdown() {
        let field: FieldSchema =
            serde_json::from_value(json!({ "type": "select", "options": ["A", "B"] })).unwrap();
        let FieldSchema::Select(select) = field else {
            panic!("expected select field");
        };
        assert!(select.is_single());
        assert_eq!(select.min, 1);
        assert_eq!(select.component, SelectComponent::Dropdown);
    }

    #[test]
    fn unknown_type_keeps_attributes() {
        let field: FieldSchema = serde_json::from_value(json!({
            "type": "phone",
            "label": "Phone",
            "country": "NL"
        }))
        .unwrap();
        assert_eq!(field.type_name(), "phone");
        assert_eq!(field.display_label(), "Phone");
        let FieldSchema::Custom(custom) = &field else {
            panic!("expected custom field");
        };
        assert_eq!(custom.attributes["country"], "NL");

        let back = serde_json::to_value(&field).unwrap();
        assert_eq!(back["type"], "phone");
        assert_eq!(back["country"], "NL");
    }

    #[test]
    fn serialized_schema_carries_type_tag() {
        let field = FieldSchema::from(NumberField {
            integer: true,
            ..NumberField::default()
        });
        let value = serde_json::to_value(&field).unwrap();
        assert_eq!(value["type"], "number");
        assert_eq!(value["integer"], true);
        let back: FieldSchema = serde_json::from_value(value).unwrap();
        assert_eq!(back, field);
    }

    #[test]
    fn missing_type_is_rejected() {
        let err = serde_json::from_value::<FieldSchema>(json!({ "label": "x" })).unwrap_err();
        assert!(err.to_string().contains("type"));
    }
}
