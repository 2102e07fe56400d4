//! PubMed MCP Server
//!
//! A Model Context Protocol (MCP) server for PubMed, backed by the NCBI
//! E-utilities. Enables LLM agents to search the biomedical literature,
//! follow citation links, and read abstracts and open access full text.
//!
//! # Features
//!
//! - **11 MCP Tools**: search (plain, batch, author, journal, field-tagged),
//!   similar/cites/cited-by links, abstract, open access check, full text
//! - **Rate-limited**: 3 requests/second, 10 with an NCBI API key
//! - **Credentials** from CLI flags, a JSON config file or the environment
//!
//! # Example
//!
//! ```no_run
//! use pubmed_mcp::{client::PubMedClient, config::Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env();
//!     let client = PubMedClient::new(config)?;
//!
//!     let page = client.esearch("crispr[Title]", 0, 10).await?;
//!     println!("{:?}", page.esearchresult.map(|r| r.count));
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod formatters;
pub mod models;
pub mod server;
pub mod setup;
pub mod tools;

pub use client::PubMedClient;
pub use config::Config;
pub use error::{ClientError, ConfigError, ToolError};
