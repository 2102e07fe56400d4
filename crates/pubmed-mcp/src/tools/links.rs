//! Link tools: pubmed_similar, pubmed_cites, pubmed_cited_by.

use serde_json::json;

use super::{
    McpTool, ToolContext, clamp_limit, fetch_articles, parse_input, pmid_schema,
    response_format_schema,
};
use crate::config::api;
use crate::error::ToolResult;
use crate::formatters;
use crate::models::{CitationList, LinkRelation, PmidInput, ResponseFormat, SimilarInput};

fn render_citations(list: &CitationList, format: ResponseFormat) -> ToolResult<String> {
    match format {
        ResponseFormat::Markdown => Ok(formatters::format_citations_markdown(list)),
        ResponseFormat::Json => {
            Ok(serde_json::to_string_pretty(&formatters::compact_citation_list(list))?)
        }
    }
}

/// Follow a history-server link set (references or citing articles).
///
/// A response without a stored set means the article has no such links.
async fn history_links(
    ctx: &ToolContext,
    pmid: u64,
    relation: LinkRelation,
) -> ToolResult<CitationList> {
    let link = ctx.client.elink_history(pmid, relation.linkname()).await?;

    let Some((webenv, query_key)) = formatters::eutils::history_handle(&link) else {
        tracing::debug!(pmid, linkname = relation.linkname(), "No link history returned");
        return Ok(CitationList {
            pmid,
            relation,
            articles: Vec::new(),
        });
    };

    let search = ctx
        .client
        .esearch_history(&webenv, &query_key, ctx.client.max_results())
        .await?;
    let (_, ids) = formatters::eutils::search_ids(&search)?;
    let articles = fetch_articles(ctx, &ids).await?;

    Ok(CitationList {
        pmid,
        relation,
        articles,
    })
}

/// Similar articles tool.
pub struct SimilarTool;

#[async_trait::async_trait]
impl McpTool for SimilarTool {
    fn name(&self) -> &'static str {
        "pubmed_similar"
    }

    fn description(&self) -> &'static str {
        "Find articles similar to a PubMed article, ranked by PubMed's relatedness score."
    }

    fn input_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "pmid": pmid_schema(),
                "limit": {
                    "type": "integer",
                    "minimum": 1,
                    "maximum": api::SIMILAR_RETMAX,
                    "description": "Maximum similar articles (default: all returned, up to 100)"
                },
                "responseFormat": response_format_schema()
            },
            "required": ["pmid"]
        })
    }

    async fn execute(&self, ctx: &ToolContext, input: serde_json::Value) -> ToolResult<String> {
        let params: SimilarInput = parse_input(input)?;

        let limit = match params.limit {
            None => api::SIMILAR_RETMAX,
            limit => clamp_limit(limit, api::SIMILAR_RETMAX),
        };

        let link = ctx.client.elink_similar(params.pmid, api::SIMILAR_RETMAX).await?;
        let source = params.pmid.to_string();
        let ids: Vec<String> = formatters::eutils::linked_ids(&link, LinkRelation::Similar)
            .into_iter()
            .filter(|id| *id != source)
            .take(usize::try_from(limit).unwrap_or(usize::MAX))
            .collect();

        let articles = fetch_articles(ctx, &ids).await?;
        let list = CitationList {
            pmid: params.pmid,
            relation: LinkRelation::Similar,
            articles,
        };

        render_citations(&list, params.response_format)
    }
}

/// References tool.
pub struct CitesTool;

#[async_trait::async_trait]
impl McpTool for CitesTool {
    fn name(&self) -> &'static str {
        "pubmed_cites"
    }

    fn description(&self) -> &'static str {
        "List the articles a PubMed article cites (its reference list, as indexed by PubMed)."
    }

    fn input_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "pmid": pmid_schema(),
                "responseFormat": response_format_schema()
            },
            "required": ["pmid"]
        })
    }

    async fn execute(&self, ctx: &ToolContext, input: serde_json::Value) -> ToolResult<String> {
        let params: PmidInput = parse_input(input)?;

        let list = history_links(ctx, params.pmid, LinkRelation::Cites).await?;

        render_citations(&list, params.response_format)
    }
}

/// Citing articles tool.
pub struct CitedByTool;

#[async_trait::async_trait]
impl McpTool for CitedByTool {
    fn name(&self) -> &'static str {
        "pubmed_cited_by"
    }

    fn description(&self) -> &'static str {
        "List PubMed articles that cite a given article."
    }

    fn input_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "pmid": pmid_schema(),
                "responseFormat": response_format_schema()
            },
            "required": ["pmid"]
        })
    }

    async fn execute(&self, ctx: &ToolContext, input: serde_json::Value) -> ToolResult<String> {
        let params: PmidInput = parse_input(input)?;

        let list = history_links(ctx, params.pmid, LinkRelation::CitedBy).await?;

        render_citations(&list, params.response_format)
    }
}
