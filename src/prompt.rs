//! User input handling.
//! Asks for argument values and casts raw answers to the declared argument type.

use dialoguer::Input;
use serde_json::{Number, Value};

use crate::error::{Error, Result};
use crate::matcher::matches;
use crate::template::{ArgumentSpec, ArgumentType};

/// Source of raw answers for template arguments.
pub trait Prompter {
    /// Asks for the value of argument `name`.
    ///
    /// Returns `None` when the user declines to answer.
    fn prompt(&self, name: &str, spec: &ArgumentSpec) -> Result<Option<String>>;
}

/// Interactive prompter backed by `dialoguer`.
pub struct DialoguerPrompter;

impl DialoguerPrompter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DialoguerPrompter {
    fn default() -> Self {
        DialoguerPrompter::new()
    }
}

impl Prompter for DialoguerPrompter {
    fn prompt(&self, name: &str, spec: &ArgumentSpec) -> Result<Option<String>> {
        let mut input = Input::<String>::new()
            .with_prompt(question_line(name, spec))
            .allow_empty(true);
        if let Some(default) = &spec.default {
            input = input.default(display_value(default));
        }

        let answer = input.interact_text()?;
        if answer.is_empty() && spec.is_mandatory() {
            return Ok(None);
        }
        Ok(Some(answer))
    }
}

/// `name <accepts=default> type - description`
pub fn question_line(name: &str, spec: &ArgumentSpec) -> String {
    let default = spec.default.as_ref().map(display_value).unwrap_or_default();
    format!(
        "{} <{}={}> {} - {}",
        name,
        display_value(&spec.accepts),
        default,
        spec.kind,
        spec.description
    )
}

/// Strings are shown bare, everything else as JSON.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Casts a raw answer to the declared argument type.
pub fn cast(raw: &str, kind: ArgumentType) -> Result<Value> {
    let cast_error = |reason: &str| Error::CastError {
        input: raw.to_string(),
        expected: kind.to_string(),
        reason: reason.to_string(),
    };

    match kind {
        ArgumentType::String => Ok(Value::String(raw.to_string())),
        ArgumentType::Boolean => match raw.trim().to_lowercase().as_str() {
            "true" | "yes" | "y" | "1" | "on" => Ok(Value::Bool(true)),
            "false" | "no" | "n" | "0" | "off" => Ok(Value::Bool(false)),
            _ => Err(cast_error("expected yes/no or true/false")),
        },
        ArgumentType::Number => {
            let trimmed = raw.trim();
            if let Ok(integer) = trimmed.parse::<i64>() {
                return Ok(Value::Number(integer.into()));
            }
            trimmed
                .parse::<f64>()
                .ok()
                .and_then(Number::from_f64)
                .map(Value::Number)
                .ok_or_else(|| cast_error("not a finite number"))
        }
        ArgumentType::Array => match serde_json::from_str::<Value>(raw) {
            Ok(value @ Value::Array(_)) => Ok(value),
            Ok(_) => Err(cast_error("expected a JSON array")),
            Err(e) => Err(cast_error(&e.to_string())),
        },
        ArgumentType::Object => match serde_json::from_str::<Value>(raw) {
            Ok(value @ Value::Object(_)) => Ok(value),
            Ok(_) => Err(cast_error("expected a JSON object")),
            Err(e) => Err(cast_error(&e.to_string())),
        },
    }
}

/// Casts `raw` and checks it against the argument's `accepts` constraint.
///
/// The constraint only applies to string values with a string `accepts`,
/// read as an unanchored regular expression.
pub fn cast_answer(raw: &str, spec: &ArgumentSpec) -> Result<Value> {
    let value = cast(raw, spec.kind)?;
    if let (Value::String(_), Value::String(accepts)) = (&value, &spec.accepts) {
        if !matches(&value, &spec.accepts) {
            return Err(Error::CastError {
                input: raw.to_string(),
                expected: spec.kind.to_string(),
                reason: format!("does not match '{accepts}'"),
            });
        }
    }
    Ok(value)
}
