//! MCP tool implementations.
//!
//! Each tool:
//! 1. Parses and validates its arguments (no remote call on failure)
//! 2. Calls the E-utilities client
//! 3. Formats results as JSON or Markdown

mod content;
mod links;
mod search;

pub use content::*;
pub use links::*;
pub use search::*;

use std::sync::{Arc, LazyLock};

use regex::Regex;
use serde::de::DeserializeOwned;

use crate::client::PubMedClient;
use crate::config::api;
use crate::error::{ToolError, ToolResult};
use crate::formatters;
use crate::models::{Article, SearchResult, Validate};

/// Tool execution context.
pub struct ToolContext {
    /// API client.
    pub client: Arc<PubMedClient>,
}

impl ToolContext {
    /// Create a new tool context.
    #[must_use]
    pub fn new(client: Arc<PubMedClient>) -> Self {
        Self { client }
    }
}

/// Trait for MCP tools.
#[async_trait::async_trait]
pub trait McpTool: Send + Sync {
    /// Tool name (e.g., "pubmed_search").
    fn name(&self) -> &'static str;

    /// Tool description for LLM.
    fn description(&self) -> &'static str;

    /// JSON Schema for input parameters.
    fn input_schema(&self) -> serde_json::Value;

    /// Execute the tool with given input.
    async fn execute(&self, ctx: &ToolContext, input: serde_json::Value) -> ToolResult<String>;
}

/// Register all tools.
#[must_use]
pub fn register_all_tools() -> Vec<Box<dyn McpTool>> {
    vec![
        // Search tools (5)
        Box::new(search::SearchTool),
        Box::new(search::BatchSearchTool),
        Box::new(search::AuthorSearchTool),
        Box::new(search::AdvancedSearchTool),
        Box::new(search::JournalSearchTool),

        // Link tools (3)
        Box::new(links::SimilarTool),
        Box::new(links::CitesTool),
        Box::new(links::CitedByTool),

        // Content tools (3)
        Box::new(content::AbstractTool),
        Box::new(content::OpenAccessTool),
        Box::new(content::FullTextTool),
    ]
}

static MISSING_FIELD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"missing field `(\w+)`").expect("missing-field pattern is valid"));

/// Deserialize and validate tool arguments.
///
/// Every failure is a validation error, raised before any remote call.
///
/// # Errors
///
/// Returns `ToolError::Validation` naming the offending field when known.
pub fn parse_input<T>(input: serde_json::Value) -> ToolResult<T>
where
    T: DeserializeOwned + Validate,
{
    let input = if input.is_null() {
        serde_json::json!({})
    } else {
        input
    };

    let parsed: T = serde_json::from_value(input).map_err(|e| {
        let message = e.to_string();
        match MISSING_FIELD.captures(&message) {
            Some(caps) => ToolError::validation(&caps[1], "is required"),
            None => ToolError::validation("arguments", message),
        }
    })?;

    parsed.validate()?;
    Ok(parsed)
}

/// Clamp a requested page size to `[1, cap]`; absent or zero means the default.
#[must_use]
pub fn clamp_limit(limit: Option<i64>, cap: u32) -> u32 {
    let requested = match limit {
        None | Some(0) => i64::from(api::DEFAULT_LIMIT),
        Some(n) => n,
    };
    u32::try_from(requested.clamp(1, i64::from(cap))).unwrap_or(1)
}

/// Clamp a requested page to at least 1.
#[must_use]
pub fn clamp_page(page: Option<i64>) -> u64 {
    page.and_then(|p| u64::try_from(p).ok()).unwrap_or(1).max(1)
}

/// Fetch summaries for PMIDs in request order, batching per request limit.
///
/// # Errors
///
/// Returns an error if any summary request fails.
pub async fn fetch_articles(ctx: &ToolContext, pmids: &[String]) -> ToolResult<Vec<Article>> {
    let mut articles = Vec::with_capacity(pmids.len());

    for chunk in pmids.chunks(api::SUMMARY_BATCH_SIZE) {
        let response = ctx.client.esummary(chunk).await?;
        articles.extend(formatters::eutils::articles_from_summary(&response, chunk));
    }

    Ok(articles)
}

/// Run one search page: esearch for the PMIDs, then esummary for details.
///
/// # Errors
///
/// Returns a validation error if the page offset overflows, or an error if
/// either remote call fails or the search response is malformed.
pub async fn run_search(
    ctx: &ToolContext,
    term: &str,
    page: Option<i64>,
    limit: Option<i64>,
) -> ToolResult<SearchResult> {
    let limit = clamp_limit(limit, ctx.client.max_results());
    let retstart = (clamp_page(page) - 1)
        .checked_mul(u64::from(limit))
        .ok_or_else(|| ToolError::validation("page", "is too large"))?;

    tracing::debug!(term, retstart, limit, "Running PubMed search");

    let response = ctx.client.esearch(term, retstart, limit).await?;
    let (count, ids) = formatters::eutils::search_ids(&response)?;
    let articles = fetch_articles(ctx, &ids).await?;

    Ok(SearchResult { count, articles })
}

/// Shared `responseFormat` schema property.
fn response_format_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "string",
        "enum": ["json", "markdown"],
        "default": "json",
        "description": "Output format"
    })
}

/// Shared `pmid` schema property.
fn pmid_schema() -> serde_json::Value {
    serde_json::json!({
        "type": ["integer", "string"],
        "description": "PubMed ID (PMID), e.g. 31452104"
    })
}
