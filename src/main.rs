//! jaiml - Jinja-templated AIML

use std::io::{self, IsTerminal, Write};
use std::process::ExitCode;

use clap::{CommandFactory, Parser};
use env_logger::fmt::WriteStyle;
use log::LevelFilter;

use jaiml::cli::commands::{
    handle_config, handle_create, handle_emit, handle_list, handle_render, Context,
};
use jaiml::cli::{Cli, ColorOption, Command};
use jaiml::error::Error;

fn main() -> ExitCode {
    let cli = Cli::parse();
    let json = cli.common.json;

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report_error(&err, json);
            ExitCode::from(err.exit_code() as u8)
        }
    }
}

fn report_error(err: &Error, json: bool) {
    let mut stderr = io::stderr();
    if json {
        let body = serde_json::json!({
            "status": "error",
            "kind": err.kind(),
            "message": err.to_string(),
            "exit_code": err.exit_code()
        });
        let _ = writeln!(stderr, "{}", body);
    } else {
        let _ = writeln!(stderr, "error: {}", err);
    }
}

fn run(cli: Cli) -> Result<(), Error> {
    init_logging(&cli)?;

    if let Command::Completions { shell } = cli.command {
        let mut cmd = Cli::command();
        clap_complete::generate(shell, &mut cmd, "jaiml", &mut io::stdout());
        return Ok(());
    }

    let ctx = Context::new(cli.common.clone())?;

    match cli.command {
        Command::Create(args) => handle_create(&ctx, args),
        Command::Render(args) => handle_render(&ctx, args),
        Command::Emit(args) => handle_emit(&ctx, args),
        Command::List(args) => handle_list(&ctx, args),
        Command::Config { command } => handle_config(&ctx, command),
        Command::Completions { .. } => Ok(()),
    }
}

fn init_logging(cli: &Cli) -> Result<(), Error> {
    let level = cli.common.log_level();

    if level == LevelFilter::Off {
        return Ok(());
    }

    let mut builder = env_logger::Builder::from_default_env();
    builder.filter_level(level);

    let use_colors = match cli.common.color {
        ColorOption::Always => true,
        ColorOption::Never => false,
        ColorOption::Auto => {
            !cli.common.no_color
                && std::env::var_os("NO_COLOR").is_none()
                && io::stderr().is_terminal()
        }
    };

    if use_colors {
        builder.write_style(WriteStyle::Auto);
    } else {
        builder.write_style(WriteStyle::Never);
    }

    builder
        .try_init()
        .map_err(|e| Error::Config(format!("initializing logger: {}", e)))?;

    Ok(())
}
