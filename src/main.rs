//! cliq CLI - extract and cache keymaps from Neovim and tmux configs.

use cliq::cli::{CacheCommands, Cli, Commands, ConfigCommands};
use cliq::commands::{self, Output};
use cliq::config::{self, ConfigOverrides, LogLevel, ResolvedSettings};
use cliq::logging;
use clap::Parser;
use std::process;

fn main() {
    let cli = Cli::parse();
    let human = cli.human_readable;
    let overrides = overrides_from(&cli);

    let result = run_command(cli.command, &overrides, human);

    if let Err(e) = result {
        if human {
            eprintln!("Error: {}", e);
        } else {
            eprintln!("{}", serde_json::json!({ "error": e.to_string() }));
        }
        process::exit(1);
    }
}

fn overrides_from(cli: &Cli) -> ConfigOverrides {
    let mut overrides = ConfigOverrides::new();
    if let Some(ref path) = cli.nvim_path {
        overrides = overrides.with_nvim_path(path);
    }
    if let Some(ref path) = cli.tmux_path {
        overrides = overrides.with_tmux_path(path);
    }
    if cli.no_cache {
        overrides = overrides.with_no_cache();
    }
    if cli.verbose {
        overrides = overrides.with_log_level(LogLevel::Debug);
    }
    overrides
}

/// Resolve settings from config.kdl, auto-detection and CLI flags, then
/// start logging at the resolved level.
fn settings(overrides: &ConfigOverrides) -> Result<ResolvedSettings, cliq::Error> {
    let file_config = config::load_config()?;
    let settings = config::resolve_settings(&file_config, overrides)?;
    // Logging failures must not block the command itself.
    let _ = logging::init(settings.log_level());
    Ok(settings)
}

fn run_command(
    command: Commands,
    overrides: &ConfigOverrides,
    human: bool,
) -> Result<(), cliq::Error> {
    match command {
        Commands::Init { force } => {
            let result = commands::init(&settings(overrides)?, force)?;
            output(&result, human);
        }

        Commands::Show { target, all } => {
            let result = commands::show(&settings(overrides)?, target, all)?;
            output(&result, human);
        }

        Commands::Reload => {
            let result = commands::reload(&settings(overrides)?)?;
            output(&result, human);
        }

        Commands::Cache { command } => {
            let settings = settings(overrides)?;
            match command {
                CacheCommands::Status => {
                    let result = commands::cache_status(&settings)?;
                    output(&result, human);
                }
                CacheCommands::Clear => {
                    let result = commands::cache_clear(&settings)?;
                    output(&result, human);
                }
                CacheCommands::Path => {
                    let result = commands::cache_path(&settings)?;
                    output(&result, human);
                }
            }
        }

        // These work on config.kdl directly, so a broken file can still be
        // inspected and repaired.
        Commands::Config { command } => match command {
            ConfigCommands::Show => {
                let result = commands::config_show(&settings(overrides)?)?;
                output(&result, human);
            }
            ConfigCommands::Get { key } => {
                let _ = logging::init(overrides.log_level.unwrap_or_default());
                let result = commands::config_get(&key)?;
                output(&result, human);
            }
            ConfigCommands::Set { key, value } => {
                let _ = logging::init(overrides.log_level.unwrap_or_default());
                let result = commands::config_set(&key, &value)?;
                output(&result, human);
            }
            ConfigCommands::Path => {
                let result = commands::config_path()?;
                output(&result, human);
            }
        },

        Commands::Version => {
            output(&commands::version(), human);
        }
    }

    Ok(())
}

/// Print output in JSON or human-readable format.
fn output<T: Output>(result: &T, human: bool) {
    if human {
        println!("{}", result.to_human());
    } else {
        println!("{}", result.to_json());
    }
}
