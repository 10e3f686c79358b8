//! Evaluation context of a scaffold session.
//!
//! The context maps variable roots to previously resolved values. It starts
//! empty, receives the template name on every load and one entry per resolved
//! argument. Argument entries are never replaced once appended.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::constants::TEMPLATE_NAME_KEY;
use crate::error::{Error, Result};
use crate::template::MatchRule;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Context {
    vars: Map<String, Value>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, root: &str) -> Option<&Value> {
        self.vars.get(root)
    }

    pub fn contains(&self, root: &str) -> bool {
        self.vars.contains_key(root)
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Records the name of the template currently being loaded.
    pub fn set_name(&mut self, name: &str) {
        self.vars.insert(TEMPLATE_NAME_KEY.to_string(), Value::String(name.to_string()));
    }

    /// Appends a new variable. Existing variables are never overwritten.
    pub fn append<K: Into<String>>(&mut self, key: K, value: Value) -> Result<()> {
        let key = key.into();
        if self.vars.contains_key(&key) {
            let template = self
                .vars
                .get(TEMPLATE_NAME_KEY)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            return Err(Error::malformed(template, format!("'{key}' is defined twice")));
        }
        self.vars.insert(key, value);
        Ok(())
    }

    /// Appends the `{default, match}` entry of a resolved argument.
    ///
    /// `value` is what the session settled on for the argument, so later
    /// references to `$argument.default` observe the resolved value.
    pub fn append_argument(&mut self, name: &str, value: Value, rules: &[MatchRule]) -> Result<()> {
        self.append(name, argument_entry(Some(value), rules)?)
    }

    pub fn as_value(&self) -> Value {
        Value::Object(self.vars.clone())
    }
}

impl FromIterator<(String, Value)> for Context {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self { vars: iter.into_iter().collect() }
    }
}

impl From<Map<String, Value>> for Context {
    fn from(vars: Map<String, Value>) -> Self {
        Self { vars }
    }
}

/// Builds the context representation of an argument.
pub(crate) fn argument_entry(default: Option<Value>, rules: &[MatchRule]) -> Result<Value> {
    let mut entry = Map::new();
    if let Some(default) = default {
        entry.insert("default".to_string(), default);
    }
    entry.insert("match".to_string(), serde_json::to_value(rules)?);
    Ok(Value::Object(entry))
}
