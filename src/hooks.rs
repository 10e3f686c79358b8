//! Post-initialisation hooks run in the target directory.

use log::{debug, warn};
use std::path::Path;
use std::process::{Command, Stdio};

/// Runs `git init` in `directory` unless it already is a repository.
///
/// Returns whether a repository was created. Failures are reported, never
/// fatal: the project itself is already initialised at this point.
pub fn git_init<P: AsRef<Path>>(directory: P) -> bool {
    let directory = directory.as_ref();
    if directory.join(".git").exists() {
        debug!("'{}' is already a git repository", directory.display());
        return false;
    }

    let status = Command::new("git")
        .arg("init")
        .current_dir(directory)
        .stdin(Stdio::null())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status();

    match status {
        Ok(status) if status.success() => true,
        Ok(status) => {
            warn!("git init failed with status: {status}");
            false
        }
        Err(e) => {
            warn!("Unable to run git: {e}");
            false
        }
    }
}
