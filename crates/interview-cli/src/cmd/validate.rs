use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Args;
use serde::Serialize;
use serde_json::{Map, Value};

use interview_fields::{FieldError, FieldRegistry, FormState, FormValue};

use super::i18n::{tr_key, trf};
use super::read_json_input;
use crate::render::natural_cmp;

#[derive(Args, Debug, Clone)]
pub struct ValidateArgs {
    /// Field schemas keyed by field name (JSON object)
    #[arg(long = "fields", value_name = "FIELDS_JSON")]
    pub fields: PathBuf,
    /// Raw answers keyed by field name (JSON object)
    #[arg(long = "values", value_name = "VALUES_JSON")]
    pub values: Option<PathBuf>,
    /// Emit the report as JSON
    #[arg(long = "json", default_value_t = false)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
pub struct FieldReport {
    pub name: String,
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<FormValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<FieldError>,
}

#[derive(Debug, Serialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub fields: Vec<FieldReport>,
}

pub fn run(args: ValidateArgs) -> Result<()> {
    let schemas: Map<String, Value> = read_json_input(&args.fields.to_string_lossy())?;
    let values: Map<String, Value> = match &args.values {
        Some(path) => read_json_input(&path.to_string_lossy())?,
        None => Map::new(),
    };
    let report = validate(&schemas, &values)?;

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("failed to encode report")?
        );
    } else {
        for line in render_report(&report) {
            println!("{line}");
        }
    }
    if !report.valid {
        bail!("{}", tr_key("cli.validate.invalid"));
    }
    Ok(())
}

/// Builds the form offline and reports every field, in natural name order.
pub fn validate(schemas: &Map<String, Value>, values: &Map<String, Value>) -> Result<ValidationReport> {
    let form = FormState::from_json(&FieldRegistry::with_defaults(), schemas, None, Some(values))?;
    let mut fields = form
        .fields()
        .map(|(name, state)| {
            let result = state.validation_result();
            FieldReport {
                name: name.to_string(),
                valid: result.is_ok(),
                value: result.clone().ok().flatten(),
                error: result.err(),
            }
        })
        .collect::<Vec<_>>();
    fields.sort_by(|a, b| natural_cmp(&a.name, &b.name));
    Ok(ValidationReport {
        valid: form.is_valid(),
        fields,
    })
}

fn render_report(report: &ValidationReport) -> Vec<String> {
    let mut lines = report
        .fields
        .iter()
        .map(|field| match (&field.error, &field.value) {
            (Some(error), _) => format!("{}: {} ({})", field.name, error.message, error.code),
            (None, Some(value)) => {
                let shown = serde_json::to_string(value).unwrap_or_default();
                format!("{}: {}", field.name, trf("cli.validate.ok_value", &[&shown]))
            }
            (None, None) => format!("{}: {}", field.name, tr_key("cli.validate.ok_empty")),
        })
        .collect::<Vec<_>>();
    lines.push(if report.valid {
        tr_key("cli.validate.valid")
    } else {
        tr_key("cli.validate.invalid")
    });
    lines
}
