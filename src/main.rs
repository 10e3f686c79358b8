//! Dédale's main application entry point.
//! Handles command-line argument parsing and wires the collaborators of a
//! scaffold session together.

use dedale::{
    cli::{get_args, Args, Command, InitArgs},
    config::Config,
    error::{default_error_handler, Error, Result},
    loader::LocalTemplateStore,
    plugin::RegisteredPlugins,
    processor::Processor,
    prompt::DialoguerPrompter,
    session::{Project, Session},
};

/// Main application entry point.
fn main() {
    let args = get_args();

    // Logger configuration
    env_logger::Builder::new()
        .filter_level(if args.verbose {
            log::LevelFilter::Trace
        } else {
            log::LevelFilter::Warn
        })
        .init();

    if let Err(err) = run(args) {
        default_error_handler(err);
    }
}

fn run(args: Args) -> Result<()> {
    match args.command {
        Command::Init(init) => init_project(init),
    }
}

/// Initialises a project directory from a template.
///
/// # Flow
/// 1. Locates and loads the configuration
/// 2. Resolves the template name, target directory and project name
/// 3. Runs the scaffold session
fn init_project(args: InitArgs) -> Result<()> {
    let cwd = std::env::current_dir()?;
    let session = Session::discover()?;

    let config_path = args.config.clone().unwrap_or_else(|| session.config_path(&cwd));
    let config = Config::load(&config_path)?;

    let template = args
        .template
        .clone()
        .or_else(|| config.default_template.clone())
        .ok_or_else(|| {
            Error::ConfigError("no template given and no defaultTemplate configured".to_string())
        })?;

    let directory = args.directory.clone().unwrap_or_else(|| cwd.clone());
    let project = Project::new(args.name.as_deref(), &directory);

    let store = LocalTemplateStore::new(&session.templates);
    let prompt = DialoguerPrompter::new();
    let plugins = RegisteredPlugins::new(&config.plugins);
    let processor = Processor::new(&store, &prompt, &plugins, args.scaffold_options());

    match processor.scaffold(&template, &project, &config) {
        Ok(_) => Ok(()),
        Err(Error::UserAbort) => {
            println!("{}", Error::UserAbort);
            Ok(())
        }
        Err(e) => Err(e),
    }
}
