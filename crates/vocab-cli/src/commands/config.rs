//! Config command handlers

use std::path::PathBuf;

use anyhow::{bail, Context, Result};

use vocab_core::{Codec, Config};

use crate::output::{Output, OutputFormat};

/// Show current configuration
pub fn show(config_path: Option<&PathBuf>, output: &Output) -> Result<()> {
    let config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "data_dir": config.data_dir,
                    "codec": config.codec,
                    "log_file": config.log_file,
                    "quiz_size": config.quiz_size,
                    "databases": config.databases.len(),
                })
            );
        }
        OutputFormat::Quiet => {
            println!("{}", config.data_dir.display());
        }
        OutputFormat::Human => {
            let effective_path = config_path
                .cloned()
                .unwrap_or_else(Config::config_file_path);
            println!("Configuration:");
            println!("  data_dir:  {}", config.data_dir.display());
            println!("  codec:     {}", config.codec);
            println!(
                "  log_file:  {}",
                config
                    .log_file
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "(not set)".to_string())
            );
            println!("  quiz_size: {}", config.quiz_size);
            println!("  databases: {}", config.databases.len());
            println!();
            println!("Config file: {}", effective_path.display());
        }
    }

    Ok(())
}

/// Set a configuration value
pub fn set(
    key: String,
    value: String,
    config_path: Option<&PathBuf>,
    output: &Output,
) -> Result<()> {
    let save_path = config_path
        .cloned()
        .unwrap_or_else(Config::config_file_path);

    // Start from the file itself so environment overrides are not written back
    let mut config = Config::load_file(&save_path).context("Failed to load configuration")?;

    apply(&mut config, &key, &value)?;

    config
        .save_to_path(&save_path)
        .context("Failed to save configuration")?;

    output.success(&format!("Set {} = {}", key, value));

    Ok(())
}

fn apply(config: &mut Config, key: &str, value: &str) -> Result<()> {
    match key {
        "data_dir" => {
            config.data_dir = value.into();
        }
        "codec" => {
            config.codec = value.parse::<Codec>()?;
        }
        "log_file" => {
            config.log_file = if value.is_empty() || value == "none" {
                None
            } else {
                Some(value.into())
            };
        }
        "quiz_size" => {
            let size: usize = value
                .parse()
                .context("Invalid value for quiz_size. Use a positive number.")?;
            if size == 0 {
                bail!("quiz_size must be at least 1");
            }
            config.quiz_size = size;
        }
        "databases" | "links" => {
            bail!(
                "'{}' is managed by the attach, detach, link and unlink commands",
                key
            );
        }
        _ => {
            bail!(
                "Unknown configuration key: '{}'\n\
                 Valid keys: data_dir, codec, log_file, quiz_size",
                key
            );
        }
    }
    Ok(())
}
