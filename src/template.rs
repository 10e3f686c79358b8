//! Data model of a `dedale.template.json` definition.
//!
//! Every type here describes a template *after* variable substitution; the raw
//! definition is only ever handled as a `serde_json::Value` by the loader.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};

/// A fully resolved template snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Template {
    pub name: String,

    /// Arguments in declaration order, which is also the prompt order.
    #[serde(default)]
    pub arguments: IndexMap<String, ArgumentSpec>,

    /// Base template this template's file set is derived from.
    #[serde(default, rename = "use", skip_serializing_if = "Option::is_none")]
    pub base: Option<TemplateUse>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub plugins: Vec<PluginCall>,

    /// References into arguments the session has not resolved yet. They are
    /// kept verbatim in this snapshot and resolve on a later load.
    #[serde(skip)]
    pub unresolved: IndexMap<DefinitionPart, Vec<UnresolvedReference>>,
}

impl Template {
    pub fn is_resolved(&self, part: &DefinitionPart) -> bool {
        !self.unresolved.contains_key(part)
    }

    /// Fails with the first reference still pending in `part`.
    pub fn ensure_resolved(&self, part: &DefinitionPart) -> Result<()> {
        match self.unresolved.get(part).and_then(|references| references.first()) {
            Some(pending) => Err(Error::ResolutionError {
                reference: pending.reference.clone(),
                reason: pending.reason.clone(),
            }),
            None => Ok(()),
        }
    }
}

/// Part of a definition that may hold references.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DefinitionPart {
    Argument(String),
    Use,
    Plugins,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnresolvedReference {
    pub reference: String,
    pub reason: String,
}

/// Declared type of an argument; drives how raw input is cast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArgumentType {
    String,
    Boolean,
    Number,
    Array,
    #[serde(alias = "mapping")]
    Object,
}

impl std::fmt::Display for ArgumentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ArgumentType::String => "string",
            ArgumentType::Boolean => "boolean",
            ArgumentType::Number => "number",
            ArgumentType::Array => "array",
            ArgumentType::Object => "object",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ArgumentSpec {
    #[serde(rename = "type")]
    pub kind: ArgumentType,

    /// Accepted values; a string is read as a regular expression.
    pub accepts: Value,

    pub description: String,

    /// Absent means the argument is mandatory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,

    #[serde(default, rename = "match")]
    pub rules: Vec<MatchRule>,
}

impl ArgumentSpec {
    pub fn is_mandatory(&self) -> bool {
        self.default.is_none()
    }
}

/// One entry of an argument's `match` list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MatchRule {
    Pattern(PatternRule),
    Default(DefaultRule),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PatternRule {
    pub pattern: Value,
    pub then: ActionSet,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DefaultRule {
    pub default: ActionSet,
}

/// File-system actions triggered by a match rule.
///
/// Execution order is fixed: remove, create, move, then plugin call-sites.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ActionSet {
    #[serde(default, rename = "move", skip_serializing_if = "Vec::is_empty")]
    pub moves: Vec<(String, String)>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub remove: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub create: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub plugins: Vec<PluginCall>,
}

/// Reference to the template this one is based on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TemplateUse {
    pub name: String,

    /// Values supplied to the base template's arguments.
    #[serde(default)]
    pub arguments: IndexMap<String, Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclude: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub replace: Vec<(String, String)>,
}

/// A plugin call-site. Plugins are never executed by the core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PluginCall {
    pub name: String,
    #[serde(default)]
    pub arguments: Vec<Value>,
}
