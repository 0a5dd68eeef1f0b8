//! Command-line interface definition.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// timetable - Meetings, lectures and the venues they are booked in
#[derive(Debug, Parser)]
#[command(name = "timetable")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, short, env = "TIMETABLE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable debug output
    #[arg(long, short = 'v')]
    pub debug: bool,

    /// Timetable data file (prompted for when neither this nor the
    /// configured `data_file` is set)
    #[arg(long, short, env = "TIMETABLE_FILE")]
    pub file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the interactive menu (default)
    Menu,

    /// Print every venue and event in the data file
    List {
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Configuration commands
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Configuration actions.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Dump current configuration
    Dump,

    /// Show configuration file path
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn defaults_to_menu() {
        let cli = Cli::try_parse_from(["timetable", "--file", "tt.txt"]).unwrap();
        assert_eq!(cli.file, Some(PathBuf::from("tt.txt")));
        assert!(cli.command.is_none());
        assert!(!cli.debug);
    }

    #[test]
    fn list_with_json() {
        let cli = Cli::try_parse_from(["timetable", "-v", "list", "--json"]).unwrap();
        assert!(cli.debug);
        assert!(matches!(cli.command, Some(Command::List { json: true })));
    }

    #[test]
    fn config_path() {
        let cli = Cli::try_parse_from(["timetable", "config", "path"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Command::Config {
                action: ConfigAction::Path
            })
        ));
    }
}
