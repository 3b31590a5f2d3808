//! Stoq CLI — supplier inventory upload client.
//!
//! Set STOQ_API_URL (or API_URL) to point at the backend. The session token
//! is stored as plain text at STOQ_TOKEN_PATH and obtained out of band from
//! the login flow.

use anyhow::Context;
use clap::{Parser, Subcommand};
use stoq_cli::{content_type_for, init_tracing};
use stoq_client::{ApiClient, FileTokenStore, TokenStore};
use stoq_core::{Config, SelectedFile};
use stoq_pipeline::{PipelineOutcome, UploadPipeline};

#[derive(Parser)]
#[command(name = "stoq", about = "Supplier inventory upload CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Store a session token for later uploads
    Login {
        /// Opaque session token from the login flow
        token: String,
    },
    /// Remove the stored session token
    Logout,
    /// Check whether the stored token is still valid
    Status,
    /// Validate and upload an inventory file (.tsv or .txt, max 25 MiB)
    Upload {
        /// Path to the inventory file
        file: std::path::PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    let config = Config::from_env();
    let store = FileTokenStore::new(config.token_path.clone());

    match cli.command {
        Commands::Login { token } => {
            store
                .save(token.trim())
                .await
                .context("Failed to store session token")?;
            println!("Token stored at {}", store.path().display());
        }
        Commands::Logout => {
            store
                .clear()
                .await
                .context("Failed to clear session token")?;
            println!("Logged out");
        }
        Commands::Status => {
            let client = ApiClient::from_config(&config)?;
            match store.load().await? {
                None => {
                    println!("No session token stored. Run `stoq login <token>` first.");
                    std::process::exit(1);
                }
                Some(token) => match client.verify_token(&token).await {
                    Ok(stoq_client::Verification::Valid) => println!("Token is valid"),
                    Ok(stoq_client::Verification::Invalid) => {
                        store.clear().await?;
                        println!("Token is invalid or expired. Please log in again.");
                        std::process::exit(1);
                    }
                    Err(e) => {
                        println!("Could not reach the backend: {e:#}. Try again later.");
                        std::process::exit(1);
                    }
                },
            }
        }
        Commands::Upload { file } => {
            let bytes = std::fs::read(&file)
                .with_context(|| format!("Failed to read file: {}", file.display()))?;
            let file_name = file
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("inventory.tsv")
                .to_string();
            let candidate = SelectedFile::new(file_name, content_type_for(&file), bytes);

            let client = ApiClient::from_config(&config)?;
            let mut pipeline = UploadPipeline::init(client.clone(), client, store).await?;

            pipeline.select_file(candidate);
            let outcome = pipeline.submit().await?;

            match outcome {
                PipelineOutcome::Succeeded => println!("Upload complete"),
                other => {
                    match other.as_error() {
                        Some(err) => println!("{err}. {}.", err.suggested_action()),
                        // Unreachable after submit resolves, but keep the CLI honest.
                        None => println!("No upload attempted"),
                    }
                    if pipeline.needs_login() {
                        println!("Run `stoq login <token>` and retry.");
                    }
                    std::process::exit(1);
                }
            }
        }
    }

    Ok(())
}
