//! Action execution against a target directory.
//!
//! An [`ActionSet`] runs in a fixed order: `remove`, then `create`, then
//! `move`. Execution is fail-fast: the first failing entry stops the set and
//! whatever was already applied stays applied.

use log::debug;
use std::fs;
use std::path::{Component, Path};

use crate::error::{Error, Result};
use crate::fileset::{compile_glob, join_relative, list_entries};
use crate::template::ActionSet;

const GLOB_META: &[char] = &['*', '?', '[', ']', '{', '}'];

/// Applies the file actions of `actions` inside `target_dir`.
///
/// Plugin call-sites carried by the set are not handled here.
pub fn apply(actions: &ActionSet, target_dir: &Path) -> Result<()> {
    for glob in &actions.remove {
        remove(glob, target_dir)?;
    }
    for path in &actions.create {
        create(path, target_dir)?;
    }
    for (from, to) in &actions.moves {
        move_matches(from, to, target_dir)?;
    }
    Ok(())
}

/// Deletes every entry matching `glob`; directories go recursively.
///
/// A trailing `/` restricts the glob to directories.
pub fn remove(glob: &str, target_dir: &Path) -> Result<usize> {
    check_relative(glob)?;
    let (pattern, directories_only) = match glob.strip_suffix('/') {
        Some(dir) if !dir.is_empty() => (dir, true),
        _ => (glob, false),
    };
    let matcher = compile_glob(pattern)
        .map_err(|e| Error::ActionError(format!("invalid glob '{glob}': {e}")))?
        .compile_matcher();

    let matched: Vec<String> = list_entries(target_dir, false)?
        .into_iter()
        .filter(|relative| matcher.is_match(relative))
        .filter(|relative| !directories_only || join_relative(target_dir, relative).is_dir())
        .collect();
    let matched = outermost(matched);

    for relative in &matched {
        let path = join_relative(target_dir, relative);
        remove_path(&path)?;
        println!("Removed: '{}'", path.display());
    }
    if matched.is_empty() {
        debug!("Nothing matches '{glob}', nothing to remove");
    }
    Ok(matched.len())
}

/// Ensures `path` exists; a trailing `/` asks for a directory.
///
/// Existing entries are left untouched.
pub fn create(path: &str, target_dir: &Path) -> Result<bool> {
    check_relative(path)?;
    if path.contains(GLOB_META) {
        return Err(Error::ActionError(format!(
            "cannot create '{path}': creation targets must be literal paths"
        )));
    }

    let destination = join_relative(target_dir, path);
    if destination.exists() {
        debug!("'{}' already exists", destination.display());
        return Ok(false);
    }

    if path.ends_with('/') {
        fs::create_dir_all(&destination)?;
    } else {
        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::File::create(&destination)?;
    }
    println!("Created: '{}'", destination.display());
    Ok(true)
}

/// Relocates every match of `from` to the path derived from `to`.
pub fn move_matches(from: &str, to: &str, target_dir: &Path) -> Result<usize> {
    check_relative(from)?;
    check_relative(to)?;
    let candidates = list_entries(target_dir, false)?;
    let plan = plan_rewrites(from, to, &candidates, |relative| {
        join_relative(target_dir, relative).is_dir()
    })?;

    for (source, destination) in &plan {
        if source == destination {
            continue;
        }
        if destination.starts_with(&format!("{source}/")) {
            return Err(Error::ActionError(format!(
                "cannot move '{source}' into itself ('{destination}')"
            )));
        }
        let source_path = join_relative(target_dir, source);
        let destination_path = join_relative(target_dir, destination);
        if destination_path.exists() {
            remove_path(&destination_path)?;
        }
        if let Some(parent) = destination_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::rename(&source_path, &destination_path)?;
        println!("Moved: '{}' -> '{}'", source_path.display(), destination_path.display());
    }
    Ok(plan.len())
}

fn remove_path(path: &Path) -> Result<()> {
    if path.is_dir() {
        fs::remove_dir_all(path)?;
    } else {
        fs::remove_file(path)?;
    }
    Ok(())
}

/// Rejects absolute globs and globs climbing out of the target directory.
fn check_relative(glob: &str) -> Result<()> {
    let path = Path::new(glob);
    if glob.is_empty() || glob.starts_with('/') || path.is_absolute() {
        return Err(Error::ActionError(format!(
            "'{glob}' must be a path relative to the target directory"
        )));
    }
    if path.components().any(|c| matches!(c, Component::ParentDir)) {
        return Err(Error::ActionError(format!("'{glob}' escapes the target directory")));
    }
    Ok(())
}

/// Drops entries whose ancestor is also in the (sorted) list.
fn outermost(mut entries: Vec<String>) -> Vec<String> {
    entries.sort();
    let mut kept: Vec<String> = Vec::with_capacity(entries.len());
    for entry in entries {
        let nested = kept.iter().any(|parent| entry.starts_with(&format!("{parent}/")));
        if !nested {
            kept.push(entry);
        }
    }
    kept
}

/// Recognised shapes of a rewrite source.
#[derive(Debug, Clone, PartialEq, Eq)]
enum SourceShape {
    /// `deno.unstable.json`
    Exact(String),
    /// `src/` or `src/**`
    DirectoryPrefix(String),
    /// `src/*` or `deno.json*`; holds the text before the `*`
    TrailingWildcard(String),
}

/// Recognised shapes of a rewrite destination.
#[derive(Debug, Clone, PartialEq, Eq)]
enum DestinationShape {
    /// `deno.json`
    Literal(String),
    /// `lib/` or `lib/**`
    Directory(String),
    /// `config.*`; holds the text before the `*`
    Concat(String),
}

fn is_literal(s: &str) -> bool {
    !s.contains(GLOB_META)
}

fn classify_source(glob: &str) -> Result<SourceShape> {
    if is_literal(glob) {
        return Ok(match glob.strip_suffix('/') {
            Some(dir) if !dir.is_empty() => SourceShape::DirectoryPrefix(dir.to_string()),
            _ => SourceShape::Exact(glob.to_string()),
        });
    }
    if let Some(dir) = glob.strip_suffix("/**") {
        if !dir.is_empty() && is_literal(dir) {
            return Ok(SourceShape::DirectoryPrefix(dir.to_string()));
        }
    }
    if let Some(prefix) = glob.strip_suffix('*') {
        if is_literal(prefix) {
            return Ok(SourceShape::TrailingWildcard(prefix.to_string()));
        }
    }
    Err(Error::ActionError(format!(
        "ambiguous source glob '{glob}': only exact paths, directory prefixes and a single trailing '*' can be rewritten"
    )))
}

fn classify_destination(glob: &str) -> Result<DestinationShape> {
    if is_literal(glob) {
        return Ok(match glob.strip_suffix('/') {
            Some(dir) if !dir.is_empty() => DestinationShape::Directory(dir.to_string()),
            _ => DestinationShape::Literal(glob.to_string()),
        });
    }
    if let Some(dir) = glob.strip_suffix("/**") {
        if !dir.is_empty() && is_literal(dir) {
            return Ok(DestinationShape::Directory(dir.to_string()));
        }
    }
    if let Some(prefix) = glob.strip_suffix('*') {
        if is_literal(prefix) {
            return Ok(DestinationShape::Concat(prefix.to_string()));
        }
    }
    Err(Error::ActionError(format!(
        "ambiguous destination glob '{glob}': only literal paths, directories and a single trailing '*' are supported"
    )))
}

fn file_name(relative: &str) -> &str {
    relative.rsplit('/').next().unwrap_or(relative)
}

/// Computes `(source, destination)` pairs for a `[from, to]` rewrite.
///
/// `candidates` are sorted relative paths of the tree being rewritten and
/// `is_dir` tells whether a destination path is an existing directory.
pub(crate) fn plan_rewrites<F>(
    from: &str,
    to: &str,
    candidates: &[String],
    is_dir: F,
) -> Result<Vec<(String, String)>>
where
    F: Fn(&str) -> bool,
{
    let source = classify_source(from)?;
    let destination = classify_destination(to)?;

    let matched: Vec<(String, String)> = match &source {
        SourceShape::Exact(path) => candidates
            .iter()
            .filter(|c| *c == path)
            .map(|c| (c.clone(), file_name(c).to_string()))
            .collect(),
        SourceShape::DirectoryPrefix(dir) => {
            let prefix = format!("{dir}/");
            let nested: Vec<String> = candidates.iter().filter(|c| c.starts_with(&prefix)).cloned().collect();
            outermost(nested)
                .into_iter()
                .map(|c| {
                    let captured = c[prefix.len()..].to_string();
                    (c, captured)
                })
                .collect()
        }
        SourceShape::TrailingWildcard(prefix) => candidates
            .iter()
            .filter_map(|c| {
                let captured = c.strip_prefix(prefix.as_str())?;
                (!captured.contains('/')).then(|| (c.clone(), captured.to_string()))
            })
            .collect(),
    };

    let total = matched.len();
    matched
        .into_iter()
        .map(|(path, captured)| {
            let target = match (&source, &destination) {
                (SourceShape::DirectoryPrefix(_), DestinationShape::Literal(dir))
                | (SourceShape::DirectoryPrefix(_), DestinationShape::Directory(dir)) => {
                    format!("{dir}/{captured}")
                }
                (_, DestinationShape::Directory(dir)) => format!("{dir}/{}", file_name(&path)),
                (_, DestinationShape::Literal(literal)) if is_dir(literal.as_str()) => {
                    format!("{literal}/{}", file_name(&path))
                }
                (_, DestinationShape::Literal(literal)) if total == 1 => literal.clone(),
                (_, DestinationShape::Literal(literal)) => {
                    return Err(Error::ActionError(format!(
                        "'{from}' matches {total} entries but '{literal}' is a single path"
                    )))
                }
                (SourceShape::TrailingWildcard(_), DestinationShape::Concat(prefix)) => {
                    format!("{prefix}{captured}")
                }
                (_, DestinationShape::Concat(_)) => {
                    return Err(Error::ActionError(format!(
                        "cannot rewrite '{from}' into '{to}': a trailing '*' destination needs a trailing '*' source"
                    )))
                }
            };
            Ok((path, target))
        })
        .collect()
}
