use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use issue_scout::config::Config;
use issue_scout::logging::init_tracing;

mod cmd;

const DEFAULT_REPO_URL: &str = "https://github.com/saharmor/cursor-view";

#[derive(Parser)]
#[command(name = "issue-scout")]
#[command(version, about = "Find approachable GitHub issues and simulate an agent fixing them")]
pub struct Cli {
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Path to scout.toml. Defaults to ./scout.toml when present.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP API for the frontend
    Serve {
        /// Port to listen on (overrides scout.toml and SCOUT_PORT)
        #[arg(short, long)]
        port: Option<u16>,

        /// Interface to bind
        #[arg(long)]
        host: Option<String>,
    },
    /// Extract open issues from a GitHub repository and ask an LLM which to start with
    Extract {
        /// GitHub repository URL, e.g. https://github.com/owner/repo
        #[arg(default_value = DEFAULT_REPO_URL)]
        repo_url: String,

        /// Output JSON file path
        #[arg(short, long, default_value = "issues.json")]
        output: PathBuf,

        /// Skip the LLM recommendation
        #[arg(long)]
        no_llm: bool,

        /// Only keep issues labelled "good first issue"
        #[arg(long)]
        good_first_only: bool,
    },
    /// View, validate, or create scout.toml
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand, Clone)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Validate configuration and show any warnings
    Validate,
    /// Initialize a default scout.toml file
    Init,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.log_json);

    // `config init` writes the file, so it must not require one to exist.
    let config = match &cli.command {
        Commands::Config {
            command: Some(ConfigCommands::Init),
        } => Config::default(),
        _ => Config::resolve(cli.config.as_deref())?,
    };

    match cli.command {
        Commands::Serve { port, host } => cmd::cmd_serve(config, port, host).await?,
        Commands::Extract {
            repo_url,
            output,
            no_llm,
            good_first_only,
        } => {
            cmd::cmd_extract(
                &config,
                cmd::ExtractOptions {
                    repo_url,
                    output,
                    no_llm,
                    good_first_only,
                },
            )
            .await?
        }
        Commands::Config { command } => {
            cmd::cmd_config(&config, cli.config.as_deref(), command)?
        }
    }

    Ok(())
}
