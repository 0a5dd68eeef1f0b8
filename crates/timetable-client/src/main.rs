//! timetable CLI entry point.

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::debug;

use timetable_client::cli::{Cli, Command, ConfigAction};
use timetable_client::commands;
use timetable_client::config::ClientConfig;
use timetable_client::error::{ClientError, ClientResult};
use timetable_client::menu::{Menu, prompt_filename};
use timetable_core::{TracingConfig, init_tracing};

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> ClientResult<()> {
    let Cli {
        config: config_override,
        debug,
        file,
        command,
    } = cli;

    // Load configuration
    let config_path = config_override
        .clone()
        .unwrap_or_else(ClientConfig::default_path);
    let config = if config_override.is_some() {
        ClientConfig::load_from(&config_path)?
    } else {
        ClientConfig::load()?
    };

    let tracing_config = if debug || config.debug {
        TracingConfig::cli_debug()
    } else {
        TracingConfig::default()
    };
    init_tracing(tracing_config)
        .map_err(|e| ClientError::Config(format!("failed to initialize tracing: {}", e)))?;
    debug!(config = %config_path.display(), "Configuration loaded");

    let file = file.or_else(|| config.data_file.clone());
    let sort = config.display.sort_on_display;

    match command.unwrap_or(Command::Menu) {
        Command::Config { action } => match action {
            ConfigAction::Dump => commands::config::dump(&config, &config_path),
            ConfigAction::Path => commands::config::path(&config_path),
        },
        Command::List { json } => {
            let file = require_file(file)?;
            commands::list::list(&file, json, sort, &mut io::stdout().lock())
        }
        Command::Menu => {
            let mut input = io::stdin().lock();
            let file = match file {
                Some(file) => file,
                None => prompt_filename(&mut input, &mut io::stdout())?,
            };
            Menu::new(input, io::stdout(), file)
                .with_sort_on_display(sort)
                .run()
        }
    }
}

fn require_file(file: Option<PathBuf>) -> ClientResult<PathBuf> {
    file.ok_or_else(|| {
        ClientError::Config("no timetable file given; use --file or set data_file".to_string())
    })
}
