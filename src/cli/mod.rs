//! CLI interface for jaiml
//!
//! Defines all commands and their arguments using clap.

pub mod commands;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// jaiml - Jinja-templated AIML
#[derive(Debug, Parser)]
#[command(
    name = "jaiml",
    author,
    version,
    about = "Assemble AIML documents from Jinja-templated providers",
    propagate_version = true
)]
pub struct Cli {
    #[command(flatten)]
    pub common: CommonOpts,

    #[command(subcommand)]
    pub command: Command,
}

/// Common options available to all commands
#[derive(Debug, Clone, Args)]
pub struct CommonOpts {
    /// Override the config file path
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Reduce output to only errors
    #[arg(short, long, action = clap::ArgAction::SetTrue, global = true)]
    pub quiet: bool,

    /// Increase logging verbosity (stackable)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Output machine-readable JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Disable ANSI colors in output
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,

    /// Control color output
    #[arg(long, value_enum, default_value_t = ColorOption::Auto, global = true)]
    pub color: ColorOption,

    /// Do not change anything on disk
    #[arg(long = "dry-run", global = true)]
    pub dry_run: bool,
}

/// Color output option
#[derive(Debug, Clone, Copy, ValueEnum, Default)]
pub enum ColorOption {
    #[default]
    Auto,
    Always,
    Never,
}

/// Available commands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create the folder structure of a new project in an existing directory
    Create(CreateArgs),

    /// Render all providers into one document and print it
    Render(RenderArgs),

    /// Write providers to their own files
    Emit(EmitArgs),

    /// List providers in registration order
    List(ListArgs),

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },

    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Arguments for the create command
#[derive(Debug, Clone, Args)]
pub struct CreateArgs {
    /// Existing directory to create the project in
    pub path: PathBuf,
}

/// Provider selection shared by render, emit and list
#[derive(Debug, Clone, Args)]
pub struct ProviderArgs {
    /// Provider manifest (defaults to paths.manifest from config)
    #[arg(short, long, value_name = "PATH")]
    pub manifest: Option<PathBuf>,

    /// Fail on undefined template variables
    #[arg(long)]
    pub strict: bool,
}

/// Arguments for the render command
#[derive(Debug, Clone, Args)]
pub struct RenderArgs {
    #[command(flatten)]
    pub providers: ProviderArgs,

    /// Do not persist the document to the brain file
    #[arg(long)]
    pub no_brain_file: bool,
}

/// Arguments for the emit command
#[derive(Debug, Clone, Args)]
pub struct EmitArgs {
    /// Provider to emit (all providers when omitted)
    pub name: Option<String>,

    #[command(flatten)]
    pub providers: ProviderArgs,

    /// Wrap each file in the document header and footer
    #[arg(long, overrides_with = "no_wrap")]
    pub wrap: bool,

    /// Do not wrap, even when document.wrap is set in config
    #[arg(long, overrides_with = "wrap")]
    pub no_wrap: bool,

    /// Output file extension (defaults to document.extension from config)
    #[arg(long, value_name = "EXT")]
    pub ext: Option<String>,
}

/// Arguments for the list command
#[derive(Debug, Clone, Args)]
pub struct ListArgs {
    #[command(flatten)]
    pub providers: ProviderArgs,
}

/// Configuration subcommands
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show the effective configuration
    Show,

    /// Print the resolved config file path
    Path,

    /// Regenerate the default configuration file
    Reset,

    /// Set a configuration value
    Set(ConfigSetArgs),
}

/// Arguments for config set
#[derive(Debug, Clone, Args)]
pub struct ConfigSetArgs {
    /// Setting name, e.g. `header` or `paths.output_dir`
    pub key: String,

    /// New value as a TOML literal (bare words are taken as strings)
    pub value: String,
}

impl EmitArgs {
    /// `Some` when the command line decides wrapping, `None` to defer to config
    pub fn wrap_override(&self) -> Option<bool> {
        if self.no_wrap {
            Some(false)
        } else if self.wrap {
            Some(true)
        } else {
            None
        }
    }
}

impl CommonOpts {
    /// Get the effective log level
    pub fn log_level(&self) -> log::LevelFilter {
        if self.quiet {
            log::LevelFilter::Off
        } else if self.debug {
            log::LevelFilter::Debug
        } else {
            match self.verbose {
                0 => log::LevelFilter::Info,
                1 => log::LevelFilter::Debug,
                _ => log::LevelFilter::Trace,
            }
        }
    }
}
