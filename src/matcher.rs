//! Pattern matching of resolved argument values.
//!
//! Comparison follows the runtime shape of both sides, never the declared
//! argument type: strings are regex searches, numbers and booleans compare by
//! equality, arrays and mappings compare element by element.

use regex::Regex;
use serde_json::{Map, Number, Value};

use crate::template::{ActionSet, MatchRule};

/// How two mappings are paired up.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MappingComparison {
    /// The i-th entry of the value is compared with the i-th entry of the
    /// pattern, keys included. Sensitive to key order.
    #[default]
    Positional,
    /// Each pattern key is looked up in the value.
    ByKey,
}

/// When a `{default: ...}` rule fires.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DefaultRule {
    /// Every default rule fires, whatever its position and whatever matched.
    #[default]
    Always,
    /// Default rules fire only when no pattern rule of the list matched.
    Fallback,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatchOptions {
    pub mappings: MappingComparison,
    pub default_rule: DefaultRule,
}

/// Matches `value` against `pattern` with the default options.
pub fn matches(value: &Value, pattern: &Value) -> bool {
    matches_with(value, pattern, &MatchOptions::default())
}

pub fn matches_with(value: &Value, pattern: &Value, options: &MatchOptions) -> bool {
    match (value, pattern) {
        (Value::String(value), Value::String(pattern)) => matches_regex(value, pattern),
        (Value::Number(value), Value::Number(pattern)) => numbers_equal(value, pattern),
        (Value::Bool(value), Value::Bool(pattern)) => value == pattern,
        (Value::Array(values), Value::Array(patterns)) => {
            values.len() == patterns.len()
                && values.iter().zip(patterns).all(|(v, p)| matches_with(v, p, options))
        }
        (Value::Object(values), Value::Object(patterns)) => match options.mappings {
            MappingComparison::Positional => matches_positional(values, patterns, options),
            MappingComparison::ByKey => matches_by_key(values, patterns, options),
        },
        _ => false,
    }
}

fn matches_regex(value: &str, pattern: &str) -> bool {
    match Regex::new(pattern) {
        Ok(regex) => regex.is_match(value),
        Err(e) => {
            log::warn!("Pattern '{pattern}' is not a valid regular expression: {e}");
            false
        }
    }
}

fn numbers_equal(a: &Number, b: &Number) -> bool {
    match (a.as_i64(), b.as_i64()) {
        (Some(a), Some(b)) => a == b,
        _ => match (a.as_u64(), b.as_u64()) {
            (Some(a), Some(b)) => a == b,
            _ => a.as_f64() == b.as_f64(),
        },
    }
}

fn matches_positional(
    values: &Map<String, Value>,
    patterns: &Map<String, Value>,
    options: &MatchOptions,
) -> bool {
    values.len() == patterns.len()
        && values.iter().zip(patterns).all(|((key, value), (pattern_key, pattern))| {
            key == pattern_key && matches_with(value, pattern, options)
        })
}

fn matches_by_key(
    values: &Map<String, Value>,
    patterns: &Map<String, Value>,
    options: &MatchOptions,
) -> bool {
    values.len() == patterns.len()
        && patterns.iter().all(|(key, pattern)| {
            values.get(key).is_some_and(|value| matches_with(value, pattern, options))
        })
}

/// Walks `rules` in order and returns the action sets that fire for `value`.
pub fn select_actions<'a>(
    value: &Value,
    rules: &'a [MatchRule],
    options: &MatchOptions,
) -> Vec<&'a ActionSet> {
    let pattern_hits: Vec<bool> = rules
        .iter()
        .map(|rule| match rule {
            MatchRule::Pattern(rule) => matches_with(value, &rule.pattern, options),
            MatchRule::Default(_) => false,
        })
        .collect();
    let any_pattern_hit = pattern_hits.iter().any(|hit| *hit);

    rules
        .iter()
        .zip(pattern_hits)
        .filter_map(|(rule, hit)| match rule {
            MatchRule::Pattern(rule) if hit => Some(&rule.then),
            MatchRule::Pattern(_) => None,
            MatchRule::Default(rule) => match options.default_rule {
                DefaultRule::Always => Some(&rule.default),
                DefaultRule::Fallback if !any_pattern_hit => Some(&rule.default),
                DefaultRule::Fallback => None,
            },
        })
        .collect()
}
