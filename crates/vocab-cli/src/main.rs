//! vocab CLI
//!
//! Command-line interface for vocab - file-backed vocabulary databases.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use vocab_core::{Config, MergeMode, Session};

mod commands;
mod logging;
mod output;
mod prompt;
mod quiz;

use output::{Output, OutputFormat};

#[derive(Parser)]
#[command(name = "vocab")]
#[command(about = "vocab - Local vocabulary databases and quizzes")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Use this config file instead of the default
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// More logging (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Quiz yourself on random words of a database
    Test {
        /// Database name
        db: String,
        /// Number of words to ask (defaults to quiz_size from config)
        #[arg(short = 'n', long)]
        count: Option<usize>,
    },
    /// Show a word
    Get {
        /// Database name
        db: String,
        /// Word to look up
        word: String,
    },
    /// Add translations to a word
    Add {
        /// Database name
        db: String,
        /// Word to add to
        word: String,
        /// One or more translations
        #[arg(required = true)]
        values: Vec<String>,
    },
    /// Remove a word, or one of its translations
    #[command(alias = "rm")]
    Remove {
        /// Database name
        db: String,
        /// Word to remove
        word: String,
        /// Only remove this translation
        value: Option<String>,
    },
    /// List attached databases
    #[command(alias = "ls")]
    List,
    /// Print every word of a database
    Print {
        /// Database name
        db: String,
    },
    /// Create a new empty database
    Create {
        /// Database name
        name: String,
        /// Backing file (defaults to <data_dir>/<name>.<codec>)
        #[arg(long)]
        path: Option<PathBuf>,
    },
    /// Attach an existing database file
    Attach {
        /// Path to the database file
        path: PathBuf,
    },
    /// Detach a database, keeping its file
    Detach {
        /// Database name
        name: String,
    },
    /// Detach a database and delete its file
    Delete {
        /// Database name
        name: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Link one database to another
    Link {
        /// Source database
        from: String,
        /// Target database
        to: String,
        /// Mark the link as reversed
        #[arg(long)]
        reverse: bool,
    },
    /// Remove a link between databases
    Unlink {
        /// Source database
        from: String,
        /// Target database
        to: String,
    },
    /// Merge every word of one database into another
    Merge {
        /// Database to read from
        from: String,
        /// Database to merge into
        to: String,
        /// override: replace records; extend: combine them
        #[arg(long, default_value = "extend")]
        mode: MergeMode,
    },
    /// Show or set configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand, Clone)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key (data_dir, codec, log_file, quiz_size)
        key: String,
        /// Configuration value
        value: String,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet));

    match run(cli, &output) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            output.error(&err);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli, output: &Output) -> Result<()> {
    let config_path = cli.config;

    // Config commands work on the file alone, without opening any database
    if let Commands::Config { command } = &cli.command {
        logging::init(cli.verbose, None);
        return handle_config_command(command.clone(), config_path.as_ref(), output);
    }

    let config = Config::load_with_cli_override(config_path.as_ref())
        .context("Failed to load configuration")?;
    logging::init(cli.verbose, config.log_file.as_deref());

    let config_path = config_path.unwrap_or_else(Config::config_file_path);
    let mut session = Session::open_with_config(config, config_path)?;

    match cli.command {
        Commands::Test { db, count } => commands::test::run(&mut session, db, count, output),
        Commands::Get { db, word } => commands::word::get(&session, db, word, output),
        Commands::Add { db, word, values } => {
            commands::word::add(&mut session, db, word, values, output)
        }
        Commands::Remove { db, word, value } => {
            commands::word::remove(&mut session, db, word, value, output)
        }
        Commands::List => commands::database::list(&session, output),
        Commands::Print { db } => commands::word::print(&session, db, output),
        Commands::Create { name, path } => {
            commands::database::create(&mut session, name, path, output)
        }
        Commands::Attach { path } => commands::database::attach(&mut session, path, output),
        Commands::Detach { name } => commands::database::detach(&mut session, name, output),
        Commands::Delete { name, yes } => {
            commands::database::delete(&mut session, name, yes, output)
        }
        Commands::Link { from, to, reverse } => {
            commands::link::link(&mut session, from, to, reverse, output)
        }
        Commands::Unlink { from, to } => commands::link::unlink(&mut session, from, to, output),
        Commands::Merge { from, to, mode } => {
            commands::database::merge(&mut session, from, to, mode, output)
        }
        Commands::Config { .. } => unreachable!(), // Handled above
    }
}

fn handle_config_command(
    command: Option<ConfigCommands>,
    config_path: Option<&PathBuf>,
    output: &Output,
) -> Result<()> {
    match command {
        Some(ConfigCommands::Show) | None => commands::config::show(config_path, output),
        Some(ConfigCommands::Set { key, value }) => {
            commands::config::set(key, value, config_path, output)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_add_with_many_values() {
        let cli = Cli::try_parse_from(["vocab", "add", "spanish", "dog", "perro", "can"]).unwrap();
        match cli.command {
            Commands::Add { db, word, values } => {
                assert_eq!(db, "spanish");
                assert_eq!(word, "dog");
                assert_eq!(values, vec!["perro", "can"]);
            }
            _ => panic!("expected add"),
        }
    }

    #[test]
    fn test_add_requires_a_value() {
        assert!(Cli::try_parse_from(["vocab", "add", "spanish", "dog"]).is_err());
    }

    #[test]
    fn test_parse_merge_mode() {
        let cli = Cli::try_parse_from(["vocab", "merge", "a", "b"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Merge {
                mode: MergeMode::Extend,
                ..
            }
        ));

        let cli = Cli::try_parse_from(["vocab", "merge", "a", "b", "--mode", "override"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Merge {
                mode: MergeMode::Override,
                ..
            }
        ));

        assert!(Cli::try_parse_from(["vocab", "merge", "a", "b", "--mode", "zip"]).is_err());
    }

    #[test]
    fn test_global_flags() {
        let cli = Cli::try_parse_from([
            "vocab", "list", "--json", "-vv", "--config", "/tmp/v.toml",
        ])
        .unwrap();
        assert!(cli.json);
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/v.toml")));
        assert!(matches!(cli.command, Commands::List));
    }

    #[test]
    fn test_parse_test_count() {
        let cli = Cli::try_parse_from(["vocab", "test", "spanish", "-n", "5"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Test { count: Some(5), .. }
        ));
    }
}
