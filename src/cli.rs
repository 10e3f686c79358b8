//! Command-line interface implementation for Dédale.
//! Provides argument parsing and help text formatting using clap.

use clap::{error::ErrorKind, CommandFactory, Parser, Subcommand};
use std::path::PathBuf;

use crate::matcher::{DefaultRule, MappingComparison, MatchOptions};
use crate::processor::ScaffoldOptions;

/// Command-line arguments structure for Dédale.
#[derive(Parser, Debug)]
#[command(name = "dedale", author, version, about = "Dédale: project manager for Deno", long_about = None)]
pub struct Args {
    /// Enable verbose logging output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Init new project
    Init(InitArgs),
}

#[derive(clap::Args, Debug)]
pub struct InitArgs {
    /// Name of the project, defaults to the directory name
    #[arg(value_name = "DIRECTORY_NAME")]
    pub name: Option<String>,

    /// Directory to setup
    #[arg(short, long, value_name = "PATH")]
    pub directory: Option<PathBuf>,

    /// Template to use
    #[arg(short, long)]
    pub template: Option<String>,

    /// Config file to use
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Skip template queries that have a default value
    #[arg(short, long)]
    pub yes: bool,

    /// Do not run `git init` in the initialised directory
    #[arg(long)]
    pub no_git: bool,

    /// Compare mapping patterns by key instead of by entry position
    #[arg(long)]
    pub match_by_key: bool,

    /// Only run `default` match rules when no pattern matched
    #[arg(long)]
    pub default_as_fallback: bool,
}

impl InitArgs {
    pub fn scaffold_options(&self) -> ScaffoldOptions {
        ScaffoldOptions {
            yes: self.yes,
            git_init: !self.no_git,
            match_options: MatchOptions {
                mappings: if self.match_by_key {
                    MappingComparison::ByKey
                } else {
                    MappingComparison::Positional
                },
                default_rule: if self.default_as_fallback {
                    DefaultRule::Fallback
                } else {
                    DefaultRule::Always
                },
            },
        }
    }
}

/// Prints the help text shown when a required argument is missing.
pub fn print_short_help() -> std::io::Result<()> {
    Args::command()
        .help_template(
            r#"{about-section}
{usage-heading} {usage}

{all-args}
{after-help}
"#,
        )
        .print_help()
}

/// Parses command line arguments and returns the Args structure.
///
/// # Exits
/// * With status code 1 if required arguments are missing
/// * With clap's default error handling for other argument errors
pub fn get_args() -> Args {
    match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            if e.kind() == ErrorKind::MissingRequiredArgument
                || e.kind() == ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
            {
                if let Err(e) = print_short_help() {
                    eprintln!("Unable to print help: {e}");
                }
                std::process::exit(1);
            } else {
                e.exit();
            }
        }
    }
}
