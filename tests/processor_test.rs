mod common;

use common::{install_template, write_file, RecordingPlugins, ScriptedPrompter};
use dedale::config::Config;
use dedale::constants::{CONFIG_FILE, TEMPLATE_FILE};
use dedale::context::Context;
use dedale::error::{Error, Result};
use dedale::loader::LocalTemplateStore;
use dedale::processor::{Processor, ScaffoldOptions, ScaffoldState};
use dedale::session::Project;
use serde_json::{json, Value};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn yes() -> ScaffoldOptions {
    ScaffoldOptions { yes: true, ..Default::default() }
}

fn scaffold(
    templates: &Path,
    template: &str,
    directory: &Path,
    prompter: &ScriptedPrompter,
    plugins: &RecordingPlugins,
    options: ScaffoldOptions,
) -> (Result<Context>, ScaffoldState) {
    let store = LocalTemplateStore::new(templates);
    let processor = Processor::new(&store, prompter, plugins, options);
    let project = Project::new(Some("app"), directory);
    let result = processor.scaffold(template, &project, &Config::default());
    (result, processor.state())
}

fn basic() -> Value {
    json!({
        "name": "basic",
        "arguments": {
            "license": {
                "type": "string",
                "accepts": "MIT|Apache",
                "description": "licence",
                "default": "MIT",
                "match": [{"pattern": "MIT", "then": {"create": ["LICENSE-MIT"]}}]
            }
        }
    })
}

#[test_log::test]
fn test_basic_template_with_defaults() {
    let templates = TempDir::new().unwrap();
    let target = TempDir::new().unwrap();
    install_template(templates.path(), "basic", &basic(), &[]);
    let app = target.path().join("app");

    let (result, state) = scaffold(
        templates.path(),
        "basic",
        &app,
        &ScriptedPrompter::silent(),
        &RecordingPlugins::default(),
        yes(),
    );

    let context = result.unwrap();
    assert_eq!(state, ScaffoldState::Complete);
    assert!(app.join("LICENSE-MIT").is_file());
    assert_eq!(
        context.as_value(),
        json!({
            "name": "basic",
            "license": {
                "default": "MIT",
                "match": [{"pattern": "MIT", "then": {"create": ["LICENSE-MIT"]}}]
            }
        })
    );
}

#[test]
fn test_unmatched_answer_runs_no_action() {
    let templates = TempDir::new().unwrap();
    let target = TempDir::new().unwrap();
    install_template(templates.path(), "basic", &basic(), &[]);
    let prompter = ScriptedPrompter::new(&["Apache"]);

    let (result, _) = scaffold(
        templates.path(),
        "basic",
        target.path(),
        &prompter,
        &RecordingPlugins::default(),
        ScaffoldOptions::default(),
    );

    let context = result.unwrap();
    assert!(!target.path().join("LICENSE-MIT").exists());
    assert_eq!(context.get("license").unwrap()["default"], json!("Apache"));
    assert_eq!(prompter.asked(), vec![("license".to_string(), Some(json!("MIT")))]);
}

#[test]
fn test_mandatory_argument_prompts_with_yes() {
    let templates = TempDir::new().unwrap();
    let target = TempDir::new().unwrap();
    let definition = json!({
        "name": "mandatory",
        "arguments": {
            "author": {"type": "string", "accepts": ".+", "description": "author"}
        }
    });
    install_template(templates.path(), "mandatory", &definition, &[]);
    let prompter = ScriptedPrompter::new(&["Ada"]);

    let (result, _) = scaffold(
        templates.path(),
        "mandatory",
        target.path(),
        &prompter,
        &RecordingPlugins::default(),
        yes(),
    );

    assert_eq!(result.unwrap().get("author"), Some(&json!({"default": "Ada", "match": []})));
    assert_eq!(prompter.asked(), vec![("author".to_string(), None)]);
}

#[test]
fn test_invalid_answer_is_asked_again() {
    let templates = TempDir::new().unwrap();
    let target = TempDir::new().unwrap();
    let definition = json!({
        "name": "counter",
        "arguments": {
            "count": {"type": "number", "accepts": 0, "description": "count"}
        }
    });
    install_template(templates.path(), "counter", &definition, &[]);
    let prompter = ScriptedPrompter::new(&["many", "42"]);

    let (result, _) = scaffold(
        templates.path(),
        "counter",
        target.path(),
        &prompter,
        &RecordingPlugins::default(),
        ScaffoldOptions::default(),
    );

    assert_eq!(result.unwrap().get("count").unwrap()["default"], json!(42));
    assert_eq!(prompter.asked().len(), 2);
}

#[test]
fn test_declining_aborts_the_session() {
    let templates = TempDir::new().unwrap();
    let target = TempDir::new().unwrap();
    let definition = json!({
        "name": "mandatory",
        "arguments": {
            "author": {"type": "string", "accepts": ".+", "description": "author"}
        }
    });
    install_template(templates.path(), "mandatory", &definition, &[]);

    let (result, state) = scaffold(
        templates.path(),
        "mandatory",
        target.path(),
        &ScriptedPrompter::silent(),
        &RecordingPlugins::default(),
        ScaffoldOptions::default(),
    );

    assert!(matches!(result, Err(Error::UserAbort)));
    assert_eq!(state, ScaffoldState::Aborted);
}

#[test]
fn test_later_arguments_see_earlier_answers() {
    let templates = TempDir::new().unwrap();
    let target = TempDir::new().unwrap();
    let definition = json!({
        "name": "chained",
        "arguments": {
            "project": {"type": "string", "accepts": "\\w+", "description": "project", "default": "demo"},
            "entry": {"type": "string", "accepts": ".+", "description": "entry", "default": "$project.default"}
        }
    });
    install_template(templates.path(), "chained", &definition, &[]);
    let prompter = ScriptedPrompter::new(&["app", "main"]);

    let (result, _) = scaffold(
        templates.path(),
        "chained",
        target.path(),
        &prompter,
        &RecordingPlugins::default(),
        ScaffoldOptions::default(),
    );

    result.unwrap();
    assert_eq!(
        prompter.asked(),
        vec![
            ("project".to_string(), Some(json!("demo"))),
            ("entry".to_string(), Some(json!("app"))),
        ]
    );
}

#[test]
fn test_default_referencing_a_mandatory_argument() {
    let templates = TempDir::new().unwrap();
    let target = TempDir::new().unwrap();
    let definition = json!({
        "name": "signed",
        "arguments": {
            "author": {"type": "string", "accepts": ".+", "description": "author"},
            "copyright": {"type": "string", "accepts": ".+", "description": "copyright", "default": "$author.default"}
        }
    });
    install_template(templates.path(), "signed", &definition, &[]);
    let prompter = ScriptedPrompter::new(&["Ada", "Ada"]);

    let (result, state) = scaffold(
        templates.path(),
        "signed",
        target.path(),
        &prompter,
        &RecordingPlugins::default(),
        yes(),
    );

    let context = result.unwrap();
    assert_eq!(state, ScaffoldState::Complete);
    assert_eq!(prompter.asked(), vec![("author".to_string(), None)]);
    assert_eq!(context.get("copyright").unwrap()["default"], json!("Ada"));
    assert_eq!(context.len(), 3);
}

#[test]
fn test_use_arguments_referencing_a_mandatory_argument() {
    let templates = TempDir::new().unwrap();
    let target = TempDir::new().unwrap();
    install_template(
        templates.path(),
        "licensed",
        &json!({
            "name": "licensed",
            "arguments": {
                "license": {
                    "type": "string",
                    "accepts": ".+",
                    "description": "licence",
                    "match": [{"pattern": "MIT", "then": {"create": ["LICENSE-MIT"]}}]
                }
            }
        }),
        &[("README.md", "readme")],
    );
    install_template(
        templates.path(),
        "child",
        &json!({
            "name": "child",
            "arguments": {
                "license": {"type": "string", "accepts": ".+", "description": "licence"}
            },
            "use": {"name": "licensed", "arguments": {"license": "$license.default"}, "include": ["$license.default"]},
            "plugins": [{"name": "readme", "arguments": ["$license.default"]}]
        }),
        &[],
    );
    let prompter = ScriptedPrompter::new(&["MIT"]);
    let plugins = RecordingPlugins::default();

    let (result, _) = scaffold(
        templates.path(),
        "child",
        target.path(),
        &prompter,
        &plugins,
        ScaffoldOptions::default(),
    );

    result.unwrap();
    assert_eq!(prompter.asked().len(), 1);
    assert!(target.path().join("LICENSE-MIT").is_file());
    assert!(!target.path().join("README.md").exists());
    assert_eq!(plugins.calls(), vec![("readme".to_string(), vec![json!("MIT")])]);
}

#[test]
fn test_static_files_are_copied_without_overwriting() {
    let templates = TempDir::new().unwrap();
    let target = TempDir::new().unwrap();
    install_template(
        templates.path(),
        "files",
        &json!({"name": "files"}),
        &[("README.md", "# files"), ("src/main.ts", "console.log()")],
    );
    write_file(target.path(), "README.md", "mine");

    let (result, _) = scaffold(
        templates.path(),
        "files",
        target.path(),
        &ScriptedPrompter::silent(),
        &RecordingPlugins::default(),
        yes(),
    );

    result.unwrap();
    assert_eq!(fs::read_to_string(target.path().join("README.md")).unwrap(), "mine");
    assert_eq!(fs::read_to_string(target.path().join("src/main.ts")).unwrap(), "console.log()");
    assert!(!target.path().join(TEMPLATE_FILE).exists());
    assert!(target.path().join(CONFIG_FILE).is_file());
}

#[test]
fn test_output_matches_expected_tree() {
    let templates = TempDir::new().unwrap();
    let target = TempDir::new().unwrap();
    let expected = TempDir::new().unwrap();
    install_template(templates.path(), "basic", &basic(), &[("README.md", "# basic")]);

    write_file(expected.path(), "README.md", "# basic");
    write_file(expected.path(), "LICENSE-MIT", "");
    Config::default().write_to(expected.path()).unwrap();

    let (result, _) = scaffold(
        templates.path(),
        "basic",
        target.path(),
        &ScriptedPrompter::silent(),
        &RecordingPlugins::default(),
        yes(),
    );

    result.unwrap();
    assert!(!dir_diff::is_different(target.path(), expected.path()).unwrap());
}

#[test]
fn test_use_derives_base_file_set() {
    let templates = TempDir::new().unwrap();
    let target = TempDir::new().unwrap();
    install_template(
        templates.path(),
        "deno",
        &json!({"name": "deno"}),
        &[
            ("src/main.ts", "main"),
            ("src/test.ts", "test"),
            ("src/lib/util.ts", "util"),
            ("README.md", "readme"),
        ],
    );
    install_template(
        templates.path(),
        "vscode",
        &json!({
            "name": "vscode",
            "use": {"name": "deno", "include": ["src/*"], "exclude": ["src/test.ts"]}
        }),
        &[(".vscode/settings.json", "{}")],
    );

    let (result, _) = scaffold(
        templates.path(),
        "vscode",
        target.path(),
        &ScriptedPrompter::silent(),
        &RecordingPlugins::default(),
        yes(),
    );

    result.unwrap();
    assert!(target.path().join(".vscode/settings.json").is_file());
    assert!(target.path().join("src/main.ts").is_file());
    assert!(target.path().join("src/lib/util.ts").is_file());
    assert!(!target.path().join("src/test.ts").exists());
    assert!(!target.path().join("README.md").exists());
}

#[test]
fn test_use_replace_renames_inherited_files() {
    let templates = TempDir::new().unwrap();
    let target = TempDir::new().unwrap();
    install_template(
        templates.path(),
        "deno",
        &json!({"name": "deno"}),
        &[("deno.json", "{}"), ("src/main.ts", "main")],
    );
    install_template(
        templates.path(),
        "jsonc",
        &json!({
            "name": "jsonc",
            "use": {"name": "deno", "replace": [["deno.json", "deno.jsonc"], ["src/", "lib/"]]}
        }),
        &[],
    );

    let (result, _) = scaffold(
        templates.path(),
        "jsonc",
        target.path(),
        &ScriptedPrompter::silent(),
        &RecordingPlugins::default(),
        yes(),
    );

    result.unwrap();
    assert!(target.path().join("deno.jsonc").is_file());
    assert!(target.path().join("lib/main.ts").is_file());
    assert!(!target.path().join("deno.json").exists());
    assert!(!target.path().join("src").exists());
}

#[test]
fn test_use_arguments_bypass_prompting() {
    let templates = TempDir::new().unwrap();
    let target = TempDir::new().unwrap();
    install_template(
        templates.path(),
        "deno",
        &json!({
            "name": "deno",
            "arguments": {
                "unstable": {
                    "type": "boolean",
                    "accepts": true,
                    "description": "unstable APIs",
                    "match": [{"pattern": true, "then": {"create": ["deno.unstable.json"]}}]
                }
            }
        }),
        &[],
    );
    install_template(
        templates.path(),
        "child",
        &json!({"name": "child", "use": {"name": "deno", "arguments": {"unstable": true}}}),
        &[],
    );
    let prompter = ScriptedPrompter::silent();

    let (result, state) = scaffold(
        templates.path(),
        "child",
        target.path(),
        &prompter,
        &RecordingPlugins::default(),
        ScaffoldOptions::default(),
    );

    result.unwrap();
    assert_eq!(state, ScaffoldState::Complete);
    assert!(target.path().join("deno.unstable.json").is_file());
    assert!(prompter.asked().is_empty());
}

#[test]
fn test_cyclic_use_is_malformed() {
    let templates = TempDir::new().unwrap();
    let target = TempDir::new().unwrap();
    install_template(templates.path(), "first", &json!({"name": "first", "use": {"name": "second"}}), &[]);
    install_template(templates.path(), "second", &json!({"name": "second", "use": {"name": "first"}}), &[]);

    let (result, state) = scaffold(
        templates.path(),
        "first",
        target.path(),
        &ScriptedPrompter::silent(),
        &RecordingPlugins::default(),
        yes(),
    );

    assert!(matches!(result, Err(Error::MalformedTemplate { .. })));
    assert_eq!(state, ScaffoldState::Aborted);
}

#[test]
fn test_action_failure_aborts_and_keeps_changes() {
    let templates = TempDir::new().unwrap();
    let target = TempDir::new().unwrap();
    install_template(
        templates.path(),
        "broken",
        &json!({
            "name": "broken",
            "arguments": {
                "layout": {
                    "type": "string",
                    "accepts": ".*",
                    "description": "layout",
                    "default": "flat",
                    "match": [{"default": {"create": ["kept.txt"], "move": [["src/*/*.ts", "lib/"]]}}]
                }
            }
        }),
        &[],
    );

    let (result, state) = scaffold(
        templates.path(),
        "broken",
        target.path(),
        &ScriptedPrompter::silent(),
        &RecordingPlugins::default(),
        yes(),
    );

    assert!(matches!(result, Err(Error::ActionError(_))));
    assert_eq!(state, ScaffoldState::Aborted);
    assert!(target.path().join("kept.txt").is_file());
}

#[test]
fn test_unknown_template() {
    let templates = TempDir::new().unwrap();
    let target = TempDir::new().unwrap();

    let (result, state) = scaffold(
        templates.path(),
        "missing",
        target.path(),
        &ScriptedPrompter::silent(),
        &RecordingPlugins::default(),
        yes(),
    );

    assert!(matches!(result, Err(Error::TemplateDoesNotExistError { .. })));
    assert_eq!(state, ScaffoldState::Aborted);
}

#[test]
fn test_plugins_are_forwarded_in_order() {
    let templates = TempDir::new().unwrap();
    let target = TempDir::new().unwrap();
    install_template(
        templates.path(),
        "plugged",
        &json!({
            "name": "plugged",
            "arguments": {
                "license": {
                    "type": "string",
                    "accepts": ".*",
                    "description": "licence",
                    "default": "MIT",
                    "match": [{
                        "pattern": "MIT",
                        "then": {"plugins": [{"name": "license-writer", "arguments": ["$name"]}]}
                    }]
                }
            },
            "plugins": [{"name": "readme", "arguments": ["$license.default"]}]
        }),
        &[],
    );
    let plugins = RecordingPlugins::default();

    let (result, _) = scaffold(
        templates.path(),
        "plugged",
        target.path(),
        &ScriptedPrompter::silent(),
        &plugins,
        yes(),
    );

    result.unwrap();
    assert_eq!(
        plugins.calls(),
        vec![
            ("license-writer".to_string(), vec![json!("plugged")]),
            ("readme".to_string(), vec![json!("MIT")]),
        ]
    );
}
