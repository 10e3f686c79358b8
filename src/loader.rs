//! Template loading for Dédale.
//! Reads `dedale.template.json` definitions from a template store, checks their
//! shape and substitutes `$variable` references against the session context.
use indexmap::IndexMap;
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};

use crate::constants::{TEMPLATE_FILE, TEMPLATE_NAME_KEY};
use crate::context::{argument_entry, Context};
use crate::error::{Error, Result};
use crate::resolver::resolve_deferred;
use crate::template::{ArgumentSpec, DefinitionPart, PluginCall, Template, TemplateUse};

static TEMPLATE_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[-\w]+$").expect("template name grammar is a valid regex"));

/// Raw shape of a template definition, checked before any substitution.
static TEMPLATE_SCHEMA: Lazy<Value> = Lazy::new(|| {
    json!({
        "$schema": "http://json-schema.org/draft-07/schema#",
        "type": "object",
        "required": ["name"],
        "additionalProperties": false,
        "properties": {
            "name": { "type": "string", "pattern": "^[-\\w]+$" },
            "arguments": {
                "type": "object",
                "additionalProperties": { "$ref": "#/definitions/argument" }
            },
            "use": { "$ref": "#/definitions/use" },
            "plugins": { "$ref": "#/definitions/plugins" }
        },
        "definitions": {
            "globs": { "type": "array", "items": { "type": "string" } },
            "globPairs": {
                "type": "array",
                "items": {
                    "type": "array",
                    "items": { "type": "string" },
                    "minItems": 2,
                    "maxItems": 2
                }
            },
            "plugins": {
                "type": "array",
                "items": {
                    "type": "object",
                    "required": ["name"],
                    "properties": {
                        "name": { "type": "string", "pattern": "^[-\\w]+$" },
                        "arguments": { "type": "array" }
                    }
                }
            },
            "actions": {
                "type": "object",
                "additionalProperties": false,
                "properties": {
                    "move": { "$ref": "#/definitions/globPairs" },
                    "remove": { "$ref": "#/definitions/globs" },
                    "create": { "$ref": "#/definitions/globs" },
                    "plugins": { "$ref": "#/definitions/plugins" }
                }
            },
            "argument": {
                "type": "object",
                "required": ["type", "accepts", "description"],
                "properties": {
                    "type": { "enum": ["string", "boolean", "number", "array", "object", "mapping"] },
                    "description": { "type": "string" },
                    "match": {
                        "type": "array",
                        "items": {
                            "anyOf": [
                                {
                                    "type": "object",
                                    "required": ["pattern", "then"],
                                    "properties": { "then": { "$ref": "#/definitions/actions" } }
                                },
                                {
                                    "type": "object",
                                    "required": ["default"],
                                    "properties": { "default": { "$ref": "#/definitions/actions" } }
                                }
                            ]
                        }
                    }
                }
            },
            "use": {
                "type": "object",
                "required": ["name"],
                "properties": {
                    "name": { "type": "string", "pattern": "^[-\\w]+$" },
                    "arguments": { "type": "object" },
                    "include": { "$ref": "#/definitions/globs" },
                    "exclude": { "$ref": "#/definitions/globs" },
                    "replace": { "$ref": "#/definitions/globPairs" }
                }
            }
        }
    })
});

/// Source of raw template definitions.
pub trait TemplateStore {
    /// Returns the raw `dedale.template.json` of template `name`.
    fn read_definition(&self, name: &str) -> Result<String>;

    /// Returns the directory holding the static files of template `name`.
    fn template_dir(&self, name: &str) -> Result<PathBuf>;
}

/// Store of templates installed on the local filesystem, one directory per
/// template.
pub struct LocalTemplateStore {
    root: PathBuf,
}

impl LocalTemplateStore {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self { root: root.as_ref().to_path_buf() }
    }

    fn not_found(&self, name: &str) -> Error {
        Error::TemplateDoesNotExistError {
            name: name.to_string(),
            templates_dir: self.root.display().to_string(),
        }
    }
}

impl TemplateStore for LocalTemplateStore {
    fn read_definition(&self, name: &str) -> Result<String> {
        let path = self.template_dir(name)?.join(TEMPLATE_FILE);
        if !path.is_file() {
            return Err(self.not_found(name));
        }
        debug!("Loading template definition from {}", path.display());
        Ok(fs::read_to_string(&path)?)
    }

    fn template_dir(&self, name: &str) -> Result<PathBuf> {
        if !TEMPLATE_NAME.is_match(name) {
            return Err(self.not_found(name));
        }
        let dir = self.root.join(name);
        if !dir.is_dir() {
            return Err(self.not_found(name));
        }
        Ok(dir)
    }
}

/// Loads template snapshots against a growing context.
pub struct TemplateLoader<'a> {
    store: &'a dyn TemplateStore,
}

impl<'a> TemplateLoader<'a> {
    pub fn new(store: &'a dyn TemplateStore) -> Self {
        Self { store }
    }

    /// Reads template `name` and resolves it against `context`.
    ///
    /// Nothing is cached: calling this again after the context grew yields a
    /// snapshot reflecting the new values.
    pub fn load(&self, name: &str, context: &mut Context) -> Result<Template> {
        let raw = self.store.read_definition(name)?;
        parse_template(name, &raw, context)
    }
}

/// Parses a raw definition and resolves it against `context`.
///
/// `context` receives the template name; argument entries are only ever added
/// by the driver once an argument is resolved.
pub fn parse_template(source: &str, raw: &str, context: &mut Context) -> Result<Template> {
    let definition: Value = serde_json::from_str(raw)
        .map_err(|e| Error::malformed(source, format!("invalid JSON: {e}")))?;
    check_shape(source, &definition)?;

    let name = definition
        .get("name")
        .and_then(Value::as_str)
        .ok_or_else(|| Error::malformed(source, "missing template name"))?
        .to_string();
    context.set_name(&name);

    let raw_arguments = match definition.get("arguments") {
        Some(Value::Object(raw_arguments)) => raw_arguments.clone(),
        _ => serde_json::Map::new(),
    };

    // References into arguments the session has not resolved yet are left
    // verbatim until a later load, once the context holds their value.
    let is_pending = |root: &str| raw_arguments.contains_key(root) && !context.contains(root);
    let mut unresolved = IndexMap::new();

    // Earlier arguments the session has not resolved yet stay visible to
    // later ones through provisional entries.
    let mut scope = context.clone();
    let mut arguments = IndexMap::new();
    for (argument, raw_spec) in &raw_arguments {
        if argument == TEMPLATE_NAME_KEY {
            return Err(Error::malformed(
                &name,
                format!("argument '{TEMPLATE_NAME_KEY}' is reserved for the template name"),
            ));
        }
        let mut deferred = Vec::new();
        let spec: ArgumentSpec = typed(&name, &resolve_deferred(raw_spec, &scope, &is_pending, &mut deferred)?)?;
        if !scope.contains(argument) {
            let provisional_default = if deferred.is_empty() { spec.default.clone() } else { None };
            scope.append(argument.as_str(), argument_entry(provisional_default, &spec.rules)?)?;
        }
        if !deferred.is_empty() {
            unresolved.insert(DefinitionPart::Argument(argument.clone()), deferred);
        }
        arguments.insert(argument.clone(), spec);
    }

    let mut deferred = Vec::new();
    let base: Option<TemplateUse> = match definition.get("use") {
        Some(raw_use) => Some(typed(&name, &resolve_deferred(raw_use, &scope, &is_pending, &mut deferred)?)?),
        None => None,
    };
    if !deferred.is_empty() {
        unresolved.insert(DefinitionPart::Use, deferred);
    }

    let mut deferred = Vec::new();
    let plugins: Vec<PluginCall> = match definition.get("plugins") {
        Some(raw_plugins) => typed(&name, &resolve_deferred(raw_plugins, &scope, &is_pending, &mut deferred)?)?,
        None => Vec::new(),
    };
    if !deferred.is_empty() {
        unresolved.insert(DefinitionPart::Plugins, deferred);
    }

    debug!(
        "Loaded template '{}' with {} argument(s), {} part(s) pending",
        name,
        arguments.len(),
        unresolved.len()
    );
    Ok(Template { name, arguments, base, plugins, unresolved })
}

fn check_shape(source: &str, definition: &Value) -> Result<()> {
    let validator = jsonschema::validator_for(&TEMPLATE_SCHEMA)
        .map_err(|e| Error::malformed(source, format!("schema error: {e}")))?;
    let problems: Vec<String> = validator.iter_errors(definition).map(|e| e.to_string()).collect();
    if problems.is_empty() {
        Ok(())
    } else {
        Err(Error::malformed(source, problems.join("; ")))
    }
}

fn typed<T: DeserializeOwned>(template: &str, value: &Value) -> Result<T> {
    serde_json::from_value(value.clone()).map_err(|e| Error::malformed(template, e))
}
