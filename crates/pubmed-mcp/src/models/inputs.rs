//! Input models for MCP tool parameters.
//!
//! Serde handles presence and types; [`Validate`] covers what serde cannot
//! (blank strings, empty lists). Both run before any remote call.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

use super::ResponseFormat;
use crate::error::{ToolError, ToolResult};

/// Semantic checks on a deserialized input.
pub trait Validate {
    /// Reject inputs that would produce a meaningless remote call.
    fn validate(&self) -> ToolResult<()>;
}

fn require_text(field: &str, value: &str) -> ToolResult<()> {
    if value.trim().is_empty() {
        return Err(ToolError::validation(field, "cannot be empty"));
    }
    Ok(())
}

/// Accept a PMID as a JSON number or a string of digits.
fn deserialize_pmid<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(u64),
        Text(String),
    }

    let pmid = match Raw::deserialize(deserializer)? {
        Raw::Number(n) => n,
        Raw::Text(s) => s
            .trim()
            .parse::<u64>()
            .map_err(|_| D::Error::custom(format!("PMID must be a positive integer, got {s:?}")))?,
    };

    if pmid == 0 {
        return Err(D::Error::custom("PMID must be a positive integer"));
    }
    Ok(pmid)
}

/// Input for a plain PubMed search.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchInput {
    /// PubMed query, field tags allowed (e.g. "crispr[Title] AND 2023[dp]").
    pub query: String,

    /// 1-based page number.
    #[serde(default)]
    pub page: Option<i64>,

    /// Results per page.
    #[serde(default)]
    pub limit: Option<i64>,

    /// Output format.
    #[serde(default)]
    pub response_format: ResponseFormat,
}

impl Validate for SearchInput {
    fn validate(&self) -> ToolResult<()> {
        require_text("query", &self.query)
    }
}

/// Input for tools keyed by a single article.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PmidInput {
    /// PubMed identifier.
    #[serde(deserialize_with = "deserialize_pmid")]
    pub pmid: u64,

    /// Output format.
    #[serde(default)]
    pub response_format: ResponseFormat,
}

impl Validate for PmidInput {
    fn validate(&self) -> ToolResult<()> {
        Ok(())
    }
}

/// Input for similar-article lookup.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimilarInput {
    /// PubMed identifier.
    #[serde(deserialize_with = "deserialize_pmid")]
    pub pmid: u64,

    /// Maximum neighbours to return.
    #[serde(default)]
    pub limit: Option<i64>,

    /// Output format.
    #[serde(default)]
    pub response_format: ResponseFormat,
}

impl Validate for SimilarInput {
    fn validate(&self) -> ToolResult<()> {
        Ok(())
    }
}

/// Input for batch search.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchSearchInput {
    /// Queries to run; results come back in this order.
    pub queries: Vec<String>,

    /// Results per query.
    #[serde(default)]
    pub limit: Option<i64>,

    /// Output format.
    #[serde(default)]
    pub response_format: ResponseFormat,
}

impl Validate for BatchSearchInput {
    fn validate(&self) -> ToolResult<()> {
        if self.queries.is_empty() {
            return Err(ToolError::validation("queries", "must contain at least one query"));
        }
        Ok(())
    }
}

/// Input for author search.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorSearchInput {
    /// Author name, "Last Name, First Initial" (e.g. "Smith, J").
    pub author: String,

    /// Results per page.
    #[serde(default)]
    pub limit: Option<i64>,

    /// Output format.
    #[serde(default)]
    pub response_format: ResponseFormat,
}

impl Validate for AuthorSearchInput {
    fn validate(&self) -> ToolResult<()> {
        require_text("author", &self.author)
    }
}

/// Input for journal search.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JournalSearchInput {
    /// Journal title or abbreviation.
    pub journal: String,

    /// Results per page.
    #[serde(default)]
    pub limit: Option<i64>,

    /// Output format.
    #[serde(default)]
    pub response_format: ResponseFormat,
}

impl Validate for JournalSearchInput {
    fn validate(&self) -> ToolResult<()> {
        require_text("journal", &self.journal)
    }
}

/// Input for field-tagged search.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvancedSearchInput {
    /// Field name to value, e.g. {"author": "Smith J", "year": "2020"}.
    pub params: BTreeMap<String, String>,

    /// Results per page.
    #[serde(default)]
    pub limit: Option<i64>,

    /// Output format.
    #[serde(default)]
    pub response_format: ResponseFormat,
}

impl Validate for AdvancedSearchInput {
    fn validate(&self) -> ToolResult<()> {
        if self.params.values().all(|v| v.trim().is_empty()) {
            return Err(ToolError::validation(
                "params",
                "must contain at least one non-empty field",
            ));
        }
        Ok(())
    }
}
