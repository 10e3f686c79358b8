#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};

use dedale::constants::TEMPLATE_FILE;
use dedale::error::Result;
use dedale::plugin::PluginHost;
use dedale::prompt::Prompter;
use dedale::template::ArgumentSpec;
use serde_json::Value;

/// Prompter answering from a fixed script; declines once the script is empty.
pub struct ScriptedPrompter {
    answers: RefCell<VecDeque<Option<String>>>,
    asked: RefCell<Vec<(String, Option<Value>)>>,
}

impl ScriptedPrompter {
    pub fn new(answers: &[&str]) -> Self {
        Self {
            answers: RefCell::new(answers.iter().map(|a| Some(a.to_string())).collect()),
            asked: RefCell::new(Vec::new()),
        }
    }

    pub fn silent() -> Self {
        Self::new(&[])
    }

    /// Names of the prompted arguments with the default shown to the user.
    pub fn asked(&self) -> Vec<(String, Option<Value>)> {
        self.asked.borrow().clone()
    }
}

impl Prompter for ScriptedPrompter {
    fn prompt(&self, name: &str, spec: &ArgumentSpec) -> Result<Option<String>> {
        self.asked.borrow_mut().push((name.to_string(), spec.default.clone()));
        Ok(self.answers.borrow_mut().pop_front().flatten())
    }
}

/// Plugin host remembering every call it receives.
#[derive(Default)]
pub struct RecordingPlugins {
    calls: RefCell<Vec<(String, Vec<Value>)>>,
}

impl RecordingPlugins {
    pub fn calls(&self) -> Vec<(String, Vec<Value>)> {
        self.calls.borrow().clone()
    }
}

impl PluginHost for RecordingPlugins {
    fn invoke(&self, name: &str, arguments: &[Value]) -> Result<()> {
        self.calls.borrow_mut().push((name.to_string(), arguments.to_vec()));
        Ok(())
    }
}

/// Installs template `name` under `templates_root` with its static files.
pub fn install_template(
    templates_root: &Path,
    name: &str,
    definition: &Value,
    files: &[(&str, &str)],
) -> PathBuf {
    let dir = templates_root.join(name);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join(TEMPLATE_FILE), serde_json::to_string_pretty(definition).unwrap()).unwrap();
    for (relative, content) in files {
        let path = dir.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }
    dir
}

pub fn write_file(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}
