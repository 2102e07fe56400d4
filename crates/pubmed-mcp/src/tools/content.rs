//! Content tools: pubmed_abstract, pubmed_open_access, pubmed_full_text.

use serde_json::json;

use super::{McpTool, ToolContext, fetch_articles, parse_input, pmid_schema, response_format_schema};
use crate::error::{ToolError, ToolResult};
use crate::formatters;
use crate::models::{FullTextRecord, OpenAccessRecord, PmidInput, ResponseFormat};

fn pmid_only_schema() -> serde_json::Value {
    json!({
        "type": "object",
        "properties": {
            "pmid": pmid_schema(),
            "responseFormat": response_format_schema()
        },
        "required": ["pmid"]
    })
}

/// Whether PMC holds the full text, judged from the article's LinkOut URLs.
///
/// # Errors
///
/// Returns error if the elink call fails.
pub async fn check_open_access(ctx: &ToolContext, pmid: u64) -> ToolResult<bool> {
    let links = ctx.client.elink_llinks(pmid).await?;
    Ok(formatters::eutils::has_pmc_link(&links))
}

/// Abstract retrieval tool.
pub struct AbstractTool;

#[async_trait::async_trait]
impl McpTool for AbstractTool {
    fn name(&self) -> &'static str {
        "pubmed_abstract"
    }

    fn description(&self) -> &'static str {
        "Get the title and abstract of a PubMed article. Structured abstracts keep \
         their section labels (e.g. \"BACKGROUND: ...\")."
    }

    fn input_schema(&self) -> serde_json::Value {
        pmid_only_schema()
    }

    async fn execute(&self, ctx: &ToolContext, input: serde_json::Value) -> ToolResult<String> {
        let params: PmidInput = parse_input(input)?;

        let xml = ctx.client.efetch_abstract(params.pmid).await?;
        let record = formatters::xml::parse_abstract(&xml, params.pmid)?;

        match params.response_format {
            ResponseFormat::Markdown => Ok(formatters::format_abstract_markdown(&record)),
            ResponseFormat::Json => {
                Ok(serde_json::to_string_pretty(&formatters::compact_abstract(&record))?)
            }
        }
    }
}

/// Open access check tool.
pub struct OpenAccessTool;

#[async_trait::async_trait]
impl McpTool for OpenAccessTool {
    fn name(&self) -> &'static str {
        "pubmed_open_access"
    }

    fn description(&self) -> &'static str {
        "Check whether a PubMed article is open access, i.e. its full text is in PubMed Central."
    }

    fn input_schema(&self) -> serde_json::Value {
        pmid_only_schema()
    }

    async fn execute(&self, ctx: &ToolContext, input: serde_json::Value) -> ToolResult<String> {
        let params: PmidInput = parse_input(input)?;

        let open_access = check_open_access(ctx, params.pmid).await?;
        let record = OpenAccessRecord {
            pmid: params.pmid,
            open_access,
        };

        match params.response_format {
            ResponseFormat::Markdown => Ok(formatters::format_open_access_markdown(&record)),
            ResponseFormat::Json => {
                Ok(serde_json::to_string_pretty(&formatters::compact_open_access(&record))?)
            }
        }
    }
}

/// Full text retrieval tool.
pub struct FullTextTool;

#[async_trait::async_trait]
impl McpTool for FullTextTool {
    fn name(&self) -> &'static str {
        "pubmed_full_text"
    }

    fn description(&self) -> &'static str {
        "Get the full body text of an open access article from PubMed Central. \
         Fails for articles that are not open access."
    }

    fn input_schema(&self) -> serde_json::Value {
        pmid_only_schema()
    }

    async fn execute(&self, ctx: &ToolContext, input: serde_json::Value) -> ToolResult<String> {
        let params: PmidInput = parse_input(input)?;
        let pmid = params.pmid;

        if !check_open_access(ctx, pmid).await? {
            return Err(ToolError::unavailable(
                "This article is not open access or not available in PMC",
            ));
        }

        let pmcid = fetch_articles(ctx, &[pmid.to_string()])
            .await?
            .into_iter()
            .next()
            .and_then(|article| article.pmcid)
            .ok_or_else(|| ToolError::unavailable("No PMC ID found for this article"))?;

        tracing::debug!(pmid, pmcid = %pmcid, "Fetching PMC full text");

        let xml = ctx.client.efetch_pmc(&pmcid).await?;
        let paragraphs = formatters::xml::parse_full_text_paragraphs(&xml)?;
        let record = FullTextRecord {
            pmid,
            pmcid,
            paragraphs,
        };

        match params.response_format {
            ResponseFormat::Markdown => Ok(formatters::format_full_text_markdown(&record)),
            ResponseFormat::Json => {
                Ok(serde_json::to_string_pretty(&formatters::compact_full_text(&record))?)
            }
        }
    }
}
