//! Template file sets.
//! Copies a template directory into the target without overwriting anything,
//! and derives the file set a template inherits through `use`
//! (include / exclude / replace).

use globset::{Glob, GlobBuilder, GlobSet, GlobSetBuilder};
use log::debug;
use std::fs;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

use crate::actions::plan_rewrites;
use crate::constants::TEMPLATE_FILE;
use crate::error::{Error, Result};
use crate::template::TemplateUse;

/// One file to copy: a path relative to the source template and the path
/// relative to the target directory it lands on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedCopy {
    pub source: String,
    pub target: String,
}

/// Returns `path` relative to `root` with `/` separators.
pub fn relative_slash(path: &Path, root: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let parts: Vec<&str> = relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => part.to_str(),
            _ => None,
        })
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("/"))
    }
}

/// Lists every entry under `root` as sorted relative `/` paths.
pub fn list_entries(root: &Path, files_only: bool) -> Result<Vec<String>> {
    let mut entries = Vec::new();
    for entry in WalkDir::new(root).min_depth(1).sort_by_file_name() {
        let entry = entry?;
        if files_only && entry.file_type().is_dir() {
            continue;
        }
        if let Some(relative) = relative_slash(entry.path(), root) {
            entries.push(relative);
        }
    }
    entries.sort();
    Ok(entries)
}

/// Compiles a glob so that `*` does not cross `/`.
pub fn compile_glob(glob: &str) -> std::result::Result<Glob, globset::Error> {
    GlobBuilder::new(glob).literal_separator(true).build()
}

fn build_glob_set(globs: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for glob in globs {
        builder.add(
            compile_glob(glob)
                .map_err(|e| Error::ActionError(format!("invalid glob '{glob}': {e}")))?,
        );
    }
    builder
        .build()
        .map_err(|e| Error::ActionError(format!("glob set loading failed: {e}")))
}

/// Include / exclude selection of template files.
///
/// A path is matched when it, or one of its ancestor directories, matches a
/// glob, so `.vscode` selects everything under `.vscode/`.
pub struct FileFilter {
    include: Option<GlobSet>,
    exclude: GlobSet,
}

impl FileFilter {
    pub fn new(include: Option<&[String]>, exclude: &[String]) -> Result<Self> {
        let include = include.map(build_glob_set).transpose()?;
        let exclude = build_glob_set(exclude)?;
        Ok(Self { include, exclude })
    }

    pub fn is_selected(&self, relative: &str) -> bool {
        let included = match &self.include {
            Some(include) => matches_self_or_ancestor(include, relative),
            None => true,
        };
        included && !matches_self_or_ancestor(&self.exclude, relative)
    }
}

fn matches_self_or_ancestor(set: &GlobSet, relative: &str) -> bool {
    if set.is_match(relative) {
        return true;
    }
    relative
        .match_indices('/')
        .any(|(i, _)| set.is_match(&relative[..i]))
}

/// Derives the files a template inherits from its base template directory.
pub fn derive_file_set(base_dir: &Path, base: &TemplateUse, target_dir: &Path) -> Result<Vec<PlannedCopy>> {
    let filter = FileFilter::new(base.include.as_deref(), &base.exclude)?;
    let selected: Vec<String> = list_entries(base_dir, true)?
        .into_iter()
        .filter(|relative| relative != TEMPLATE_FILE)
        .filter(|relative| filter.is_selected(relative))
        .collect();

    let mut planned: Vec<PlannedCopy> = selected
        .iter()
        .map(|relative| PlannedCopy { source: relative.clone(), target: relative.clone() })
        .collect();

    for (from, to) in &base.replace {
        let renames = plan_rewrites(from, to, &selected, |relative| target_dir.join(relative).is_dir())?;
        for (source, target) in renames {
            if let Some(copy) = planned.iter_mut().find(|copy| copy.source == source) {
                debug!("Replacing '{}' with '{}'", source, target);
                copy.target = target;
            }
        }
    }

    Ok(planned)
}

/// Copies planned files into `target_dir`, keeping files that already exist.
///
/// Returns the number of files written.
pub fn copy_planned(source_dir: &Path, target_dir: &Path, planned: &[PlannedCopy]) -> Result<usize> {
    let mut copied = 0;
    for copy in planned {
        let destination = target_dir.join(&copy.target);
        if copy_if_absent(&source_dir.join(&copy.source), &destination)? {
            println!("Copied: '{}'", destination.display());
            copied += 1;
        }
    }
    Ok(copied)
}

/// Copies a whole template directory into `target_dir` without overwriting.
///
/// The template definition file itself is left behind.
pub fn copy_template_dir(template_dir: &Path, target_dir: &Path) -> Result<usize> {
    debug!("Copying '{}' into '{}'", template_dir.display(), target_dir.display());
    let planned: Vec<PlannedCopy> = list_entries(template_dir, true)?
        .into_iter()
        .filter(|relative| relative != TEMPLATE_FILE)
        .map(|relative| PlannedCopy { source: relative.clone(), target: relative })
        .collect();
    copy_planned(template_dir, target_dir, &planned)
}

fn copy_if_absent(source: &Path, destination: &Path) -> Result<bool> {
    if destination.exists() {
        debug!("Keeping existing file: {}", destination.display());
        return Ok(false);
    }
    if let Some(parent) = destination.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::copy(source, destination)?;
    Ok(true)
}

/// Joins a validated relative path onto `root`.
pub fn join_relative(root: &Path, relative: &str) -> PathBuf {
    relative.split('/').filter(|part| !part.is_empty()).fold(root.to_path_buf(), |path, part| path.join(part))
}
