//! PubMed MCP Server - Entry Point
//!
//! Provides both stdio (for desktop MCP clients) and HTTP transports, plus a
//! `setup` subcommand for storing NCBI credentials.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use pubmed_mcp::config::{ConfigFile, CredentialSources, Credentials};
use pubmed_mcp::setup::{self, SetupOptions};
use pubmed_mcp::{Config, PubMedClient, server::McpServer};

#[derive(Parser, Debug)]
#[command(name = "pubmed-mcp")]
#[command(about = "MCP server for PubMed via NCBI E-utilities")]
#[command(version)]
struct Cli {
    /// NCBI API key (optional, raises rate limit to 10 req/s)
    #[arg(long)]
    api_key: Option<String>,

    /// Contact email sent to NCBI with each request
    #[arg(long)]
    email: Option<String>,

    /// JSON config file with "api_key" and "email"
    #[arg(long)]
    config: Option<PathBuf>,

    /// Exit with an error when neither an API key nor an email is configured
    #[arg(long)]
    require_credentials: bool,

    /// Transport mode: stdio or http
    #[arg(long, default_value = "stdio")]
    transport: Transport,

    /// HTTP server port (only used with --transport http)
    #[arg(long, default_value = "3000", env = "PORT")]
    port: u16,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Store an NCBI API key and email, and print environment setup commands
    Setup {
        /// NCBI API key
        #[arg(long)]
        api_key: Option<String>,

        /// Email address for NCBI requests
        #[arg(long)]
        email: Option<String>,

        /// Path to the configuration file to write
        #[arg(long, default_value = "config.json")]
        config: PathBuf,

        /// Only show environment variable setup commands
        #[arg(long)]
        env_only: bool,
    },
}

#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
enum Transport {
    /// Standard input/output
    #[default]
    Stdio,
    /// JSON-RPC over HTTP POST
    Http,
}

/// Logs go to stderr; stdout belongs to the stdio transport.
fn init_tracing(log_level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let subscriber = tracing_subscriber::registry().with(filter);

    if json {
        subscriber
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        subscriber
            .with(tracing_subscriber::fmt::layer().compact().with_writer(std::io::stderr))
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env is normal.
    dotenv::dotenv().ok();

    let cli = Cli::parse();

    init_tracing(&cli.log_level, cli.json_logs);

    if let Some(Command::Setup { api_key, email, config, env_only }) = cli.command {
        let options = SetupOptions {
            api_key,
            email,
            config,
            env_only,
        };
        setup::run(&options, std::io::stdin().lock(), std::io::stdout().lock())?;
        return Ok(());
    }

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        transport = ?cli.transport,
        "Starting PubMed MCP server"
    );

    let credentials = CredentialSources {
        cli: Credentials::new(cli.api_key, cli.email),
        file: ConfigFile::load_or_default(cli.config.as_deref()).credentials(),
        env: Credentials::from_env(),
    }
    .resolve();

    if let Err(e) = credentials.require() {
        if cli.require_credentials {
            return Err(e.into());
        }
        tracing::warn!("{e}");
    }

    tracing::info!(
        api_key = credentials.api_key.is_some(),
        email = credentials.email.is_some(),
        "Resolved NCBI credentials"
    );

    let config = Config::new(credentials);
    let client = PubMedClient::new(config)?;
    let server = McpServer::new(client);

    match cli.transport {
        Transport::Stdio => server.run_stdio().await?,
        Transport::Http => server.run_http(cli.port).await?,
    }

    Ok(())
}
