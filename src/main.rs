use anyhow::Result;
use clap::{Parser, Subcommand};
use profile_rag::commands::{ask, run_repl, search, show_chunks, show_status};
use profile_rag::config::{Config, ConfigUpdate, get_config_dir, show_config};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "profile-rag")]
#[command(about = "Retrieve grounded context about a portfolio owner from their profile record")]
#[command(version)]
struct Cli {
    /// Directory holding config.toml, defaults to ~/.profile-rag
    #[arg(long, global = true)]
    config_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Inspect, create or update the configuration file
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,
        /// Ollama protocol, http or https
        #[arg(long)]
        protocol: Option<String>,
        /// Ollama host
        #[arg(long)]
        host: Option<String>,
        /// Ollama port
        #[arg(long)]
        port: Option<u16>,
        /// Ollama embedding model
        #[arg(long)]
        model: Option<String>,
        /// Minimum similarity a chunk must exceed to be returned
        #[arg(long)]
        threshold: Option<f32>,
        /// Default number of chunks to return
        #[arg(long)]
        top_k: Option<usize>,
    },
    /// Print the document chunks prepared from the profile record
    Chunks,
    /// Rank profile chunks against a query and show their scores
    Search {
        query: String,
        /// Maximum number of chunks to return
        #[arg(long)]
        top_k: Option<usize>,
    },
    /// Print the grounded system prompt for a question
    Ask {
        query: String,
        /// Maximum number of chunks to include as context
        #[arg(long)]
        top_k: Option<usize>,
    },
    /// Show provider connectivity and profile status
    Status,
    /// Interactive retrieval loop over a single long-lived index
    Repl,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config_dir = match cli.config_dir {
        Some(dir) => dir,
        None => get_config_dir()?,
    };
    let mut config = Config::load(&config_dir)?;

    match cli.command {
        Commands::Config {
            show,
            protocol,
            host,
            port,
            model,
            threshold,
            top_k,
        } => {
            let update = ConfigUpdate {
                ollama_protocol: protocol,
                ollama_host: host,
                ollama_port: port,
                ollama_model: model,
                similarity_threshold: threshold,
                top_k,
            };
            if !update.is_empty() || !config.config_file_path().exists() {
                update.apply(&mut config)?;
                config.save()?;
                eprintln!(
                    "Wrote configuration to {}",
                    config.config_file_path().display()
                );
            }
            if show {
                show_config(&config)?;
            }
        }
        Commands::Chunks => {
            show_chunks(&config)?;
        }
        Commands::Search { query, top_k } => {
            search(&config, &query, top_k).await?;
        }
        Commands::Ask { query, top_k } => {
            ask(&config, &query, top_k).await?;
        }
        Commands::Status => {
            show_status(&config).await?;
        }
        Commands::Repl => {
            run_repl(&config).await?;
        }
    }

    Ok(())
}
