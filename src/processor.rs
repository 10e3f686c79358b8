//! Scaffold session orchestration.
//!
//! A session prepares the target directory, loads the template, then resolves
//! its arguments one at a time. After each argument the matching actions are
//! applied, the context grows by one entry and the template is loaded again so
//! that later arguments see the new value.

use indexmap::IndexMap;
use log::{debug, warn};
use serde_json::Value;
use std::cell::Cell;
use std::fs;

use crate::actions;
use crate::config::Config;
use crate::context::Context;
use crate::error::{Error, Result};
use crate::fileset::{copy_planned, copy_template_dir, derive_file_set};
use crate::hooks::git_init;
use crate::loader::{TemplateLoader, TemplateStore};
use crate::matcher::{select_actions, MatchOptions};
use crate::plugin::PluginHost;
use crate::prompt::{cast_answer, Prompter};
use crate::session::Project;
use crate::template::{ArgumentSpec, DefinitionPart, PluginCall, TemplateUse};

/// Where a session currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScaffoldState {
    Idle,
    DirectoryPrepared,
    TemplateLoaded,
    /// Resolving the argument at this declaration index.
    ArgumentLoop(usize),
    Complete,
    Aborted,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ScaffoldOptions {
    /// Take defaults instead of prompting whenever a default exists.
    pub yes: bool,
    pub match_options: MatchOptions,
    /// Run `git init` in the target directory once the session completes.
    pub git_init: bool,
}

/// Scaffold driver.
pub struct Processor<'a> {
    store: &'a dyn TemplateStore,
    prompt: &'a dyn Prompter,
    plugins: &'a dyn PluginHost,
    options: ScaffoldOptions,
    state: Cell<ScaffoldState>,
}

impl<'a> Processor<'a> {
    pub fn new(
        store: &'a dyn TemplateStore,
        prompt: &'a dyn Prompter,
        plugins: &'a dyn PluginHost,
        options: ScaffoldOptions,
    ) -> Self {
        Self { store, prompt, plugins, options, state: Cell::new(ScaffoldState::Idle) }
    }

    pub fn state(&self) -> ScaffoldState {
        self.state.get()
    }

    fn transition(&self, state: ScaffoldState) {
        debug!("Scaffold state: {:?} -> {:?}", self.state.get(), state);
        self.state.set(state);
    }

    /// Initialises `project` from template `template`.
    ///
    /// Returns the final context of the session. On failure the directory is
    /// left as it is and the session ends in [`ScaffoldState::Aborted`].
    pub fn scaffold(&self, template: &str, project: &Project, config: &Config) -> Result<Context> {
        self.transition(ScaffoldState::Idle);
        match self.run(template, project, config) {
            Ok(context) => {
                self.transition(ScaffoldState::Complete);
                println!("{} initialised", project.name);
                Ok(context)
            }
            Err(e) => {
                self.transition(ScaffoldState::Aborted);
                Err(e)
            }
        }
    }

    fn run(&self, template: &str, project: &Project, config: &Config) -> Result<Context> {
        self.prepare_directory(template, project, config)?;
        let mut lineage = Vec::new();
        let context = self.run_template(template, project, &IndexMap::new(), &mut lineage)?;
        if self.options.git_init {
            git_init(&project.directory);
        }
        Ok(context)
    }

    fn prepare_directory(&self, template: &str, project: &Project, config: &Config) -> Result<()> {
        fs::create_dir_all(&project.directory)?;
        config.write_to(&project.directory)?;
        let template_dir = self.store.template_dir(template)?;
        copy_template_dir(&template_dir, &project.directory)?;
        self.transition(ScaffoldState::DirectoryPrepared);
        Ok(())
    }

    /// Runs the argument loop of `name`, then the one of its base template.
    ///
    /// `supplied` holds values that bypass prompting, as given by a `use`
    /// reference.
    fn run_template(
        &self,
        name: &str,
        project: &Project,
        supplied: &IndexMap<String, Value>,
        lineage: &mut Vec<String>,
    ) -> Result<Context> {
        if lineage.iter().any(|seen| seen == name) {
            lineage.push(name.to_string());
            return Err(Error::malformed(name, format!("cyclic use chain: {}", lineage.join(" -> "))));
        }
        lineage.push(name.to_string());

        let loader = TemplateLoader::new(self.store);
        let mut context = Context::new();
        let mut template = loader.load(name, &mut context)?;
        self.transition(ScaffoldState::TemplateLoaded);

        let mut inherited = false;
        if let Some(base) = &template.base {
            if template.is_resolved(&DefinitionPart::Use) {
                self.inherit_files(base, project)?;
                inherited = true;
            } else {
                debug!("'use' of '{}' waits for its arguments", name);
            }
        }

        let argument_names: Vec<String> = template.arguments.keys().cloned().collect();
        for (index, argument) in argument_names.iter().enumerate() {
            self.transition(ScaffoldState::ArgumentLoop(index));
            let spec = template.arguments.get(argument).ok_or_else(|| {
                Error::malformed(name, format!("argument '{argument}' disappeared on reload"))
            })?;
            template.ensure_resolved(&DefinitionPart::Argument(argument.clone()))?;

            let value = match supplied.get(argument) {
                Some(value) => value.clone(),
                None => self.resolve_argument(argument, spec)?,
            };
            debug!("Argument '{}' resolved to {}", argument, value);

            for action_set in select_actions(&value, &spec.rules, &self.options.match_options) {
                actions::apply(action_set, &project.directory)?;
                self.invoke_plugins(&action_set.plugins)?;
            }

            context.append_argument(argument, value, &spec.rules)?;
            template = loader.load(name, &mut context)?;
        }

        template.ensure_resolved(&DefinitionPart::Use)?;
        template.ensure_resolved(&DefinitionPart::Plugins)?;
        if !inherited {
            if let Some(base) = &template.base {
                self.inherit_files(base, project)?;
            }
        }
        if let Some(base) = template.base.take() {
            debug!("Running arguments of base template '{}'", base.name);
            self.run_template(&base.name, project, &base.arguments, lineage)?;
        }
        self.invoke_plugins(&template.plugins)?;

        lineage.pop();
        Ok(context)
    }

    /// Copies the file set a template derives from its base template.
    fn inherit_files(&self, base: &TemplateUse, project: &Project) -> Result<()> {
        let base_dir = self.store.template_dir(&base.name)?;
        let planned = derive_file_set(&base_dir, base, &project.directory)?;
        let copied = copy_planned(&base_dir, &project.directory, &planned)?;
        debug!("Inherited {} file(s) from '{}'", copied, base.name);
        Ok(())
    }

    /// Takes the default or asks the user until the answer casts cleanly.
    fn resolve_argument(&self, name: &str, spec: &ArgumentSpec) -> Result<Value> {
        if self.options.yes {
            match &spec.default {
                Some(default) => return Ok(default.clone()),
                None => debug!("Argument '{name}' is mandatory, prompting"),
            }
        }

        loop {
            let raw = self.prompt.prompt(name, spec)?.ok_or(Error::UserAbort)?;
            match cast_answer(&raw, spec) {
                Ok(value) => return Ok(value),
                Err(e) if e.is_recoverable() => warn!("{e}"),
                Err(e) => return Err(e),
            }
        }
    }

    fn invoke_plugins(&self, calls: &[PluginCall]) -> Result<()> {
        for call in calls {
            self.plugins.invoke(&call.name, &call.arguments)?;
        }
        Ok(())
    }
}
