//! Terminal field renderers, keyed by field type like the validator registry.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::io::{self, BufRead, Write};
use std::sync::Arc;

use anyhow::{Result, bail};
use serde_json::Value;

use interview_fields::{FieldSchema, FieldState, SelectField};

use crate::cmd::i18n::tr_key;

/// Line-oriented terminal over any reader and writer.
pub struct Terminal<'a> {
    input: Box<dyn BufRead + 'a>,
    output: Box<dyn Write + 'a>,
}

impl<'a> Terminal<'a> {
    pub fn new(input: impl BufRead + 'a, output: impl Write + 'a) -> Self {
        Self {
            input: Box::new(input),
            output: Box::new(output),
        }
    }

    pub fn stdio() -> Terminal<'static> {
        Terminal::new(io::BufReader::new(io::stdin()), io::stdout())
    }

    /// Prints `prompt` and reads one trimmed line. Fails once input is closed.
    pub fn ask(&mut self, prompt: &str) -> Result<String> {
        write!(self.output, "{prompt}")?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            bail!("{}", tr_key("cli.error.stdin_closed"));
        }
        Ok(line.trim().to_string())
    }

    pub fn say(&mut self, line: &str) -> Result<()> {
        writeln!(self.output, "{line}")?;
        Ok(())
    }
}

/// Reads one field's answer into its state.
pub type FieldRenderer =
    Arc<dyn Fn(&mut Terminal<'_>, &str, &mut FieldState) -> Result<()> + Send + Sync>;

#[derive(Clone, Default)]
pub struct RendererRegistry {
    renderers: HashMap<String, FieldRenderer>,
}

impl RendererRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        register_default_renderers(&mut registry);
        registry
    }

    pub fn register<F>(&mut self, kind: impl Into<String>, renderer: F)
    where
        F: Fn(&mut Terminal<'_>, &str, &mut FieldState) -> Result<()> + Send + Sync + 'static,
    {
        self.renderers.insert(kind.into(), Arc::new(renderer));
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.renderers.contains_key(kind)
    }

    /// Prompts until the field is valid. Unknown field types are an error.
    pub fn render(
        &self,
        terminal: &mut Terminal<'_>,
        name: &str,
        state: &mut FieldState,
    ) -> Result<()> {
        let kind = state.schema().type_name().to_string();
        let Some(renderer) = self.renderers.get(&kind) else {
            bail!("no renderer registered for field type `{kind}` (field `{name}`)");
        };
        loop {
            renderer(terminal, name, state)?;
            state.handle_touch();
            if !state.show_error() {
                return Ok(());
            }
            if let Some(error) = state.error() {
                terminal.say(&format!("  {}", error.message))?;
            }
        }
    }
}

pub fn register_default_renderers(registry: &mut RendererRegistry) {
    for kind in ["text", "email", "number", "date"] {
        registry.register(kind, render_line);
    }
    registry.register("bool", render_bool);
    registry.register("select", render_select);
}

/// Value offered when the user just presses enter: the current input, else
/// the schema default.
fn fallback(state: &FieldState) -> Option<Value> {
    if !state.value().is_null() {
        return Some(state.value().clone());
    }
    state.schema().default_value()
}

fn display(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn prompt_label(name: &str, state: &FieldState) -> String {
    state.schema().label().unwrap_or(name).to_string()
}

fn render_line(terminal: &mut Terminal<'_>, name: &str, state: &mut FieldState) -> Result<()> {
    let label = prompt_label(name, state);
    let default = fallback(state);
    let prompt = match &default {
        Some(value) => format!("{label} [{}]: ", display(value)),
        None => format!("{label}: "),
    };
    let line = terminal.ask(&prompt)?;
    let value = match (line.is_empty(), default) {
        (true, Some(value)) => value,
        (true, None) => Value::Null,
        (false, _) => Value::String(line),
    };
    state.handle_change(value);
    Ok(())
}

fn render_bool(terminal: &mut Terminal<'_>, name: &str, state: &mut FieldState) -> Result<()> {
    let label = prompt_label(name, state);
    let default = fallback(state).and_then(|value| value.as_bool());
    let suffix = match default {
        Some(true) => "[Y/n]",
        Some(false) => "[y/N]",
        None => "[y/n]",
    };
    let line = terminal.ask(&format!("{label} {suffix}: "))?;
    let value = match line.to_ascii_lowercase().as_str() {
        "" => default.map(Value::Bool).unwrap_or(Value::Null),
        "y" | "yes" | "true" | "1" => Value::Bool(true),
        "n" | "no" | "false" | "0" => Value::Bool(false),
        _ => Value::String(line),
    };
    state.handle_change(value);
    Ok(())
}

fn render_select(terminal: &mut Terminal<'_>, name: &str, state: &mut FieldState) -> Result<()> {
    let FieldSchema::Select(field) = state.schema().clone() else {
        bail!("field `{name}` is not a select field");
    };
    let label = prompt_label(name, state);
    terminal.say(&format!("{label}:"))?;
    for (idx, option) in field.options.iter().enumerate() {
        terminal.say(&format!("  {}. {option}", idx + 1))?;
    }
    let default = fallback(state);
    let hint = if field.is_single() {
        tr_key("cli.prompt.select_number")
    } else {
        tr_key("cli.prompt.select_numbers")
    };
    let prompt = match &default {
        Some(value) => format!("{hint} [{}]: ", one_based(value)),
        None => format!("{hint}: "),
    };
    let value = loop {
        let line = terminal.ask(&prompt)?;
        if line.is_empty() {
            break default.unwrap_or_else(|| empty_selection(&field));
        }
        match parse_selection(&field, &line) {
            Some(value) => break value,
            None => terminal.say(&tr_key("cli.prompt.invalid_choice"))?,
        }
    };
    state.handle_change(value);
    Ok(())
}

fn empty_selection(field: &SelectField) -> Value {
    if field.is_single() {
        Value::Null
    } else {
        Value::Array(Vec::new())
    }
}

/// Turns 1-based user input into 0-based option indices. `None` when a token
/// is not a positive number.
pub fn parse_selection(field: &SelectField, line: &str) -> Option<Value> {
    let items = line
        .split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(|token| match token.parse::<usize>() {
            Ok(n) if n > 0 => Some(Value::from(n - 1)),
            _ => None,
        })
        .collect::<Option<Vec<Value>>>()?;
    match items.as_slice() {
        [single] if field.is_single() => Some(single.clone()),
        _ => Some(Value::Array(items)),
    }
}

fn one_based(value: &Value) -> String {
    match value {
        Value::Number(number) => number
            .as_u64()
            .map(|index| (index + 1).to_string())
            .unwrap_or_else(|| number.to_string()),
        Value::Array(items) => items.iter().map(one_based).collect::<Vec<_>>().join(","),
        other => display(other),
    }
}

/// Orders field names so embedded numbers compare by value (`f2` < `f10`).
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut left = a.chars().peekable();
    let mut right = b.chars().peekable();
    loop {
        match (left.peek().copied(), right.peek().copied()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(l), Some(r)) if l.is_ascii_digit() && r.is_ascii_digit() => {
                let l_num = take_number(&mut left);
                let r_num = take_number(&mut right);
                let l_trim = l_num.trim_start_matches('0');
                let r_trim = r_num.trim_start_matches('0');
                let ordering = l_trim
                    .len()
                    .cmp(&r_trim.len())
                    .then_with(|| l_trim.cmp(r_trim))
                    .then_with(|| l_num.len().cmp(&r_num.len()));
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
            (Some(l), Some(r)) => {
                if l != r {
                    return l.cmp(&r);
                }
                left.next();
                right.next();
            }
        }
    }
}

fn take_number(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> String {
    let mut digits = String::new();
    while let Some(c) = chars.peek().copied().filter(char::is_ascii_digit) {
        digits.push(c);
        chars.next();
    }
    digits
}
