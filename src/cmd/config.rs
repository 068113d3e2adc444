//! Configuration view and validation commands (`issue-scout config`).

use std::path::Path;

use anyhow::Result;

use super::super::ConfigCommands;
use issue_scout::config::{Config, DEFAULT_CONFIG_FILE};

pub fn cmd_config(config: &Config, explicit: Option<&Path>, command: Option<ConfigCommands>) -> Result<()> {
    let config_path = explicit.unwrap_or(Path::new(DEFAULT_CONFIG_FILE));

    match command {
        None | Some(ConfigCommands::Show) => {
            println!();
            if config_path.exists() {
                println!("Config file: {}", config_path.display());
            } else {
                println!("No {} found; showing defaults.", config_path.display());
            }
            println!("Effective values (with env overrides):");
            println!();
            print!("{}", config.redacted().to_toml()?);
            println!();
            let mode = if config.is_mock_github() { "mock" } else { "oauth" };
            println!("GitHub auth mode: {}", mode);
            println!();
        }
        Some(ConfigCommands::Validate) => {
            let warnings = config.validate();
            if warnings.is_empty() {
                println!("Configuration is valid.");
            } else {
                println!("Configuration warnings:");
                for warning in warnings {
                    println!("  - {}", warning);
                }
            }
        }
        Some(ConfigCommands::Init) => {
            if config_path.exists() {
                println!("Config file already exists at {}", config_path.display());
                println!("Delete it first if you want to recreate it.");
                return Ok(());
            }

            Config::default().save(config_path)?;

            println!("Created {}", config_path.display());
            println!();
            println!("You can now customize:");
            println!("  - [server] host, port, frontend_url, allowed_origins");
            println!("  - [jobs] scan_threshold_secs, implementation_threshold_secs");
            println!("  - [github] client_id, client_secret");
            println!("  - [llm] model, temperature, max_tokens");
            println!();
        }
    }

    Ok(())
}
