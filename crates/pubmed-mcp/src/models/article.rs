//! Normalized PubMed records returned by the tools.

use serde::{Deserialize, Serialize};

use super::LinkRelation;
use crate::config::api;

/// Authors shown before collapsing the rest into "et al.".
pub const AUTHOR_DISPLAY_LIMIT: usize = 5;

/// A PubMed article summary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    /// PubMed identifier.
    pub pmid: u64,

    /// Article title.
    #[serde(default)]
    pub title: Option<String>,

    /// Personal authors in listed order.
    #[serde(default)]
    pub authors: Vec<String>,

    /// Publication date as NCBI formats it.
    #[serde(default)]
    pub pub_date: Option<String>,

    /// Journal name.
    #[serde(default)]
    pub journal: Option<String>,

    /// DOI.
    #[serde(default)]
    pub doi: Option<String>,

    /// PubMed Central id, e.g. "PMC1234567".
    #[serde(default)]
    pub pmcid: Option<String>,
}

impl Article {
    /// Get the title, falling back to "Untitled".
    #[must_use]
    pub fn title_or_default(&self) -> &str {
        self.title.as_deref().unwrap_or("Untitled")
    }

    /// Authors as "A, B, C, D, E et al. (N more)".
    #[must_use]
    pub fn author_display(&self) -> String {
        if self.authors.is_empty() {
            return "N/A".to_string();
        }

        let shown = self
            .authors
            .iter()
            .take(AUTHOR_DISPLAY_LIMIT)
            .cloned()
            .collect::<Vec<_>>();
        let mut out = shown.join(", ");
        if self.authors.len() > AUTHOR_DISPLAY_LIMIT {
            out.push_str(&format!(" et al. ({} more)", self.authors.len() - AUTHOR_DISPLAY_LIMIT));
        }
        out
    }

    /// PubMed page for this article.
    #[must_use]
    pub fn pubmed_url(&self) -> String {
        format!("{}/{}/", api::PUBMED_URL, self.pmid)
    }

    /// PMC page, when the article is in PMC.
    #[must_use]
    pub fn pmc_url(&self) -> Option<String> {
        self.pmcid.as_ref().map(|id| format!("{}/{}/", api::PMC_URL, id))
    }
}

/// One page of search results.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Total hits for the query, not just this page.
    pub count: u64,

    /// Articles on this page, in relevance order.
    pub articles: Vec<Article>,
}

/// Articles linked to one PMID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CitationList {
    /// The article the links start from.
    pub pmid: u64,

    /// Which link set was followed.
    pub relation: LinkRelation,

    /// Linked articles.
    pub articles: Vec<Article>,
}

/// Abstract of one article.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbstractRecord {
    /// PubMed identifier.
    pub pmid: u64,

    /// Article title, when present in the record.
    pub title: Option<String>,

    /// Abstract text; `None` when the article has no abstract.
    #[serde(rename = "abstract")]
    pub abstract_text: Option<String>,
}

impl AbstractRecord {
    /// Abstract text or the standard placeholder.
    #[must_use]
    pub fn text_or_placeholder(&self) -> &str {
        self.abstract_text.as_deref().unwrap_or("No abstract available")
    }
}

/// Open access status of one article.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenAccessRecord {
    /// PubMed identifier.
    pub pmid: u64,

    /// True when PMC carries the full text.
    pub open_access: bool,
}

/// Full text of an open access article.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FullTextRecord {
    /// PubMed identifier.
    pub pmid: u64,

    /// PubMed Central id the text came from.
    pub pmcid: String,

    /// Body paragraphs in document order.
    pub paragraphs: Vec<String>,
}

impl FullTextRecord {
    /// Paragraphs separated by blank lines.
    #[must_use]
    pub fn text(&self) -> String {
        self.paragraphs.join("\n\n")
    }
}

/// Outcome of one query inside a batch search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchItem {
    /// The query as given.
    pub query: String,

    /// Whether this query succeeded.
    pub success: bool,

    /// Failure message when `success` is false.
    pub error: Option<String>,

    /// Results when `success` is true.
    pub data: Option<SearchResult>,
}

impl BatchItem {
    /// A successful item.
    #[must_use]
    pub fn ok(query: impl Into<String>, data: SearchResult) -> Self {
        Self {
            query: query.into(),
            success: true,
            error: None,
            data: Some(data),
        }
    }

    /// A failed item.
    #[must_use]
    pub fn failed(query: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            success: false,
            error: Some(error.into()),
            data: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_author_display_truncates() {
        let article = Article {
            pmid: 1,
            authors: (1..=7).map(|i| format!("Author {i}")).collect(),
            ..Default::default()
        };
        assert_eq!(
            article.author_display(),
            "Author 1, Author 2, Author 3, Author 4, Author 5 et al. (2 more)"
        );
    }

    #[test]
    fn test_author_display_empty() {
        assert_eq!(Article::default().author_display(), "N/A");
    }

    #[test]
    fn test_abstract_placeholder() {
        let record = AbstractRecord {
            pmid: 1,
            title: None,
            abstract_text: None,
        };
        assert_eq!(record.text_or_placeholder(), "No abstract available");
    }
}
