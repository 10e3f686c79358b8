//! Variable resolution.
//!
//! A string leaf of the form `$root.prop.prop2` is replaced by the value found
//! in the [`Context`] under `root`, projected through each property. Any other
//! leaf is left untouched.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

use crate::context::Context;
use crate::error::{Error, Result};
use crate::template::UnresolvedReference;

static REFERENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\$(\w+\.)*\w+$").expect("reference grammar is a valid regex"));

/// Whether `s` is a variable reference as a whole.
pub fn is_reference(s: &str) -> bool {
    REFERENCE.is_match(s)
}

/// Structurally resolves every reference inside `value`.
///
/// Arrays and mappings keep their shape and key order; only string leaves
/// that are references get replaced. Substituted values are not resolved
/// again.
pub fn resolve(value: &Value, context: &Context) -> Result<Value> {
    resolve_deferred(value, context, &|_: &str| false, &mut Vec::new())
}

/// Same as [`resolve`], except that a failing reference whose root satisfies
/// `is_pending` stays in place as a string and is recorded in `deferred`.
pub fn resolve_deferred<F>(
    value: &Value,
    context: &Context,
    is_pending: &F,
    deferred: &mut Vec<UnresolvedReference>,
) -> Result<Value>
where
    F: Fn(&str) -> bool,
{
    match value {
        Value::String(s) if is_reference(s) => match resolve_reference(s, context) {
            Err(Error::ResolutionError { reference, reason }) if is_pending(reference_root(s)) => {
                log::trace!("Deferring '{reference}': {reason}");
                deferred.push(UnresolvedReference { reference, reason });
                Ok(value.clone())
            }
            resolved => resolved,
        },
        Value::Array(items) => items
            .iter()
            .map(|item| resolve_deferred(item, context, is_pending, deferred))
            .collect::<Result<Vec<_>>>()
            .map(Value::Array),
        Value::Object(entries) => {
            let mut resolved = Map::with_capacity(entries.len());
            for (key, item) in entries {
                resolved.insert(key.clone(), resolve_deferred(item, context, is_pending, deferred)?);
            }
            Ok(Value::Object(resolved))
        }
        _ => Ok(value.clone()),
    }
}

fn reference_root(reference: &str) -> &str {
    let path = reference.strip_prefix('$').unwrap_or(reference);
    path.split('.').next().unwrap_or_default()
}

/// Resolves a single `$root.path` reference.
pub fn resolve_reference(reference: &str, context: &Context) -> Result<Value> {
    let path = reference.strip_prefix('$').unwrap_or(reference);
    let mut segments = path.split('.');
    let root = segments.next().unwrap_or_default();

    let mut current = context.get(root).ok_or_else(|| Error::ResolutionError {
        reference: reference.to_string(),
        reason: format!("'{root}' is not defined"),
    })?;

    for segment in segments {
        current = project(current, segment).ok_or_else(|| Error::ResolutionError {
            reference: reference.to_string(),
            reason: format!("cannot read '{segment}' of {}", describe(current)),
        })?;
    }

    log::trace!("Resolved '{reference}' to {current}");
    Ok(current.clone())
}

fn project<'a>(value: &'a Value, segment: &str) -> Option<&'a Value> {
    match value {
        Value::Object(entries) => entries.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    }
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "a mapping",
    }
}
