// server/src/main.rs

// Entry point for the hospital backend: parses the command line, sets up
// logging and either serves the REST API or seeds an admin account.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use lib::{Database, DatabaseConfig};
use rest_api::{load_rest_api_config, start_server};

#[derive(Parser, Debug)]
#[command(name = "hospital-server")]
#[command(version = "0.1.0")]
#[command(about = "Hospital administration backend")]
struct CliArgs {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the REST API until interrupted
    Serve {
        #[arg(short = 'c', long = "config", value_name = "PATH", env = "HOSPITAL_CONFIG")]
        config: Option<PathBuf>,
        #[arg(short = 'p', long = "port", value_name = "PORT")]
        port: Option<u16>,
    },
    /// Create an admin account unless one with the same email exists
    CreateAdmin {
        #[arg(short = 'c', long = "config", value_name = "PATH", env = "HOSPITAL_CONFIG")]
        config: Option<PathBuf>,
        #[arg(long, default_value = "Admin")]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        return;
    }
    info!("Shutdown signal received.");
}

async fn serve(config: Option<PathBuf>, port: Option<u16>) -> Result<()> {
    let mut config = load_rest_api_config(config.as_deref())?;
    if let Some(port) = port {
        config.port = port;
    }
    start_server(config, shutdown_signal()).await
}

async fn create_admin(config: Option<PathBuf>, name: &str, email: &str, password: &str) -> Result<()> {
    let config = load_rest_api_config(config.as_deref())?;
    let db_config = DatabaseConfig {
        data_directory: config.database_path.clone().into(),
        bcrypt_cost: config.bcrypt_cost,
    };
    let db = Database::open(&db_config)
        .with_context(|| format!("Failed to open database at {}", config.database_path))?;

    let (user, created) = db
        .users
        .ensure_admin(name, email, password)
        .await
        .context("Failed to create admin user")?;
    db.flush().await.context("Failed to flush database")?;

    if created {
        println!("Admin user created: {} ({})", user.email, user.id);
    } else {
        println!("User already exists: {} ({}, role {})", user.email, user.id, user.role);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is fine; the environment may already be set.
    let _ = dotenvy::dotenv();
    init_tracing();

    let args = CliArgs::parse();
    match args.command {
        Command::Serve { config, port } => serve(config, port).await,
        Command::CreateAdmin {
            config,
            name,
            email,
            password,
        } => create_admin(config, &name, &email, &password).await,
    }
}
