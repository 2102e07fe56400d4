//! Enumeration types for API and tool parameters.

use serde::{Deserialize, Serialize};

/// Output format for tool responses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseFormat {
    /// Machine-readable JSON format.
    #[default]
    Json,
    /// Human-readable Markdown format.
    Markdown,
}

/// Which PubMed link set a citation lookup follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkRelation {
    /// Related articles by PubMed's neighbour score.
    Similar,
    /// Articles in this article's reference list.
    Cites,
    /// Articles whose reference list contains this article.
    CitedBy,
}

impl LinkRelation {
    /// The elink `linkname` for this relation.
    #[must_use]
    pub const fn linkname(self) -> &'static str {
        match self {
            Self::Similar => "pubmed_pubmed",
            Self::Cites => "pubmed_pubmed_refs",
            Self::CitedBy => "pubmed_pubmed_citedin",
        }
    }

    /// Heading used in Markdown output.
    #[must_use]
    pub const fn heading(self) -> &'static str {
        match self {
            Self::Similar => "Similar articles",
            Self::Cites => "Articles cited by",
            Self::CitedBy => "Articles citing",
        }
    }
}

/// Field tags understood by the advanced search tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchField {
    Author,
    Journal,
    Year,
    Title,
    Mesh,
    Affiliation,
    Doi,
    Keyword,
}

impl SearchField {
    /// Look up a field by the key callers use in `params`.
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        match key.trim().to_ascii_lowercase().as_str() {
            "author" => Some(Self::Author),
            "journal" => Some(Self::Journal),
            "year" => Some(Self::Year),
            "title" => Some(Self::Title),
            "mesh" => Some(Self::Mesh),
            "affiliation" => Some(Self::Affiliation),
            "doi" => Some(Self::Doi),
            "keyword" => Some(Self::Keyword),
            _ => None,
        }
    }

    /// PubMed search tag, brackets included.
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Author => "[Author]",
            Self::Journal => "[Journal]",
            Self::Year => "[Publication Date]",
            Self::Title => "[Title]",
            Self::Mesh => "[MeSH Terms]",
            Self::Affiliation => "[Affiliation]",
            Self::Doi => "[DOI]",
            Self::Keyword => "[Keyword]",
        }
    }

    /// Tag a value with this field.
    #[must_use]
    pub fn apply(self, value: &str) -> String {
        format!("{}{}", value.trim(), self.tag())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_format_is_json() {
        assert_eq!(ResponseFormat::default(), ResponseFormat::Json);
        let f: ResponseFormat = serde_json::from_str("\"markdown\"").unwrap();
        assert_eq!(f, ResponseFormat::Markdown);
    }

    #[test]
    fn test_search_field_lookup() {
        assert_eq!(SearchField::from_key("MeSH"), Some(SearchField::Mesh));
        assert_eq!(SearchField::from_key("volume"), None);
        assert_eq!(SearchField::Year.apply("2020"), "2020[Publication Date]");
    }
}
