//! Search tools: pubmed_search, pubmed_batch_search, pubmed_author_search,
//! pubmed_advanced_search, pubmed_journal_search.

use futures::future::join_all;
use serde_json::json;

use super::{McpTool, ToolContext, parse_input, response_format_schema, run_search};
use crate::error::ToolResult;
use crate::formatters;
use crate::models::{
    AdvancedSearchInput, AuthorSearchInput, BatchItem, BatchSearchInput, JournalSearchInput,
    ResponseFormat, SearchField, SearchInput, SearchResult,
};

fn render_search(
    heading: &str,
    result: &SearchResult,
    format: ResponseFormat,
) -> ToolResult<String> {
    match format {
        ResponseFormat::Markdown => Ok(formatters::format_search_markdown(heading, result)),
        ResponseFormat::Json => {
            Ok(serde_json::to_string_pretty(&formatters::compact_search_result(result))?)
        }
    }
}

fn limit_schema() -> serde_json::Value {
    json!({
        "type": "integer",
        "minimum": 1,
        "default": 10,
        "description": "Results per page (max 100, or 200 with an API key)"
    })
}

/// Plain PubMed search tool.
pub struct SearchTool;

#[async_trait::async_trait]
impl McpTool for SearchTool {
    fn name(&self) -> &'static str {
        "pubmed_search"
    }

    fn description(&self) -> &'static str {
        "Search PubMed for articles matching a query. Supports PubMed field tags \
         and boolean operators. Returns titles, authors, journal, publication date, \
         PMID, PMC id and DOI, in relevance order."
    }

    fn input_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "PubMed query, e.g. \"crispr[Title] AND 2023[dp]\""
                },
                "page": {
                    "type": "integer",
                    "minimum": 1,
                    "default": 1,
                    "description": "1-based page number"
                },
                "limit": limit_schema(),
                "responseFormat": response_format_schema()
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, ctx: &ToolContext, input: serde_json::Value) -> ToolResult<String> {
        let params: SearchInput = parse_input(input)?;

        let result = run_search(ctx, params.query.trim(), params.page, params.limit).await?;

        render_search("PubMed search", &result, params.response_format)
    }
}

/// Batch search tool.
pub struct BatchSearchTool;

#[async_trait::async_trait]
impl McpTool for BatchSearchTool {
    fn name(&self) -> &'static str {
        "pubmed_batch_search"
    }

    fn description(&self) -> &'static str {
        "Run several PubMed searches concurrently. Results come back in input order; \
         a failing query is reported in place without failing the batch."
    }

    fn input_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "queries": {
                    "type": "array",
                    "items": {"type": "string"},
                    "minItems": 1,
                    "description": "PubMed queries"
                },
                "limit": limit_schema(),
                "responseFormat": response_format_schema()
            },
            "required": ["queries"]
        })
    }

    async fn execute(&self, ctx: &ToolContext, input: serde_json::Value) -> ToolResult<String> {
        let params: BatchSearchInput = parse_input(input)?;

        tracing::info!(queries = params.queries.len(), "Running batch search");

        let limit = params.limit;
        let searches = params.queries.iter().map(|query| async move {
            if query.trim().is_empty() {
                return BatchItem::failed(query.as_str(), "Query cannot be empty");
            }
            match run_search(ctx, query.trim(), None, limit).await {
                Ok(result) => BatchItem::ok(query.as_str(), result),
                Err(e) => {
                    tracing::warn!(query = %query, error = %e, "Batch query failed");
                    BatchItem::failed(query.as_str(), e.to_user_message())
                }
            }
        });

        let items = join_all(searches).await;

        match params.response_format {
            ResponseFormat::Markdown => Ok(formatters::format_batch_markdown(&items)),
            ResponseFormat::Json => {
                Ok(serde_json::to_string_pretty(&formatters::compact_batch(&items))?)
            }
        }
    }
}

/// Author search tool.
pub struct AuthorSearchTool;

#[async_trait::async_trait]
impl McpTool for AuthorSearchTool {
    fn name(&self) -> &'static str {
        "pubmed_author_search"
    }

    fn description(&self) -> &'static str {
        "Search PubMed for articles by an author. Give the name as \
         \"Last Name, First Initial\", e.g. \"Smith, J\"."
    }

    fn input_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "author": {
                    "type": "string",
                    "description": "Author name, e.g. \"Smith, J\""
                },
                "limit": limit_schema(),
                "responseFormat": response_format_schema()
            },
            "required": ["author"]
        })
    }

    async fn execute(&self, ctx: &ToolContext, input: serde_json::Value) -> ToolResult<String> {
        let params: AuthorSearchInput = parse_input(input)?;

        let term = SearchField::Author.apply(&params.author);
        let result = run_search(ctx, &term, None, params.limit).await?;

        let heading = format!("Articles by {}", params.author.trim());
        render_search(&heading, &result, params.response_format)
    }
}

/// Build an advanced query: tagged values joined with AND.
///
/// Unknown fields contribute their raw value; blank values are skipped.
#[must_use]
pub fn build_advanced_query(input: &AdvancedSearchInput) -> String {
    input
        .params
        .iter()
        .filter(|(_, value)| !value.trim().is_empty())
        .map(|(key, value)| match SearchField::from_key(key) {
            Some(field) => field.apply(value),
            None => value.trim().to_string(),
        })
        .collect::<Vec<_>>()
        .join(" AND ")
}

/// Field-tagged search tool.
pub struct AdvancedSearchTool;

#[async_trait::async_trait]
impl McpTool for AdvancedSearchTool {
    fn name(&self) -> &'static str {
        "pubmed_advanced_search"
    }

    fn description(&self) -> &'static str {
        "Search PubMed with field tags. Pass params such as \
         {\"author\": \"Smith J\", \"journal\": \"Nature\", \"year\": \"2020\", \
         \"title\": \"cancer\", \"mesh\": \"Drug Therapy\"}. Supported fields: author, \
         journal, year, title, mesh, affiliation, doi, keyword; other keys are added as free text."
    }

    fn input_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "params": {
                    "type": "object",
                    "additionalProperties": {"type": "string"},
                    "description": "Field name to value"
                },
                "limit": limit_schema(),
                "responseFormat": response_format_schema()
            },
            "required": ["params"]
        })
    }

    async fn execute(&self, ctx: &ToolContext, input: serde_json::Value) -> ToolResult<String> {
        let params: AdvancedSearchInput = parse_input(input)?;

        let term = build_advanced_query(&params);
        let result = run_search(ctx, &term, None, params.limit).await?;

        render_search(&format!("Advanced search: {term}"), &result, params.response_format)
    }
}

/// Journal search tool.
pub struct JournalSearchTool;

#[async_trait::async_trait]
impl McpTool for JournalSearchTool {
    fn name(&self) -> &'static str {
        "pubmed_journal_search"
    }

    fn description(&self) -> &'static str {
        "Search PubMed for articles published in a journal."
    }

    fn input_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "journal": {
                    "type": "string",
                    "description": "Journal title or abbreviation"
                },
                "limit": limit_schema(),
                "responseFormat": response_format_schema()
            },
            "required": ["journal"]
        })
    }

    async fn execute(&self, ctx: &ToolContext, input: serde_json::Value) -> ToolResult<String> {
        let params: JournalSearchInput = parse_input(input)?;

        let term = SearchField::Journal.apply(&params.journal);
        let result = run_search(ctx, &term, None, params.limit).await?;

        let heading = format!("Articles in {}", params.journal.trim());
        render_search(&heading, &result, params.response_format)
    }
}
