//! Raw E-utilities JSON response shapes.
//!
//! NCBI is loose with types (counts arrive as strings, ids as strings or
//! numbers) and omits empty fields, so everything here is `#[serde(default)]`
//! and lenient. Normalization into [`crate::models::Article`] happens in the
//! formatters.

use serde::{Deserialize, Deserializer};

/// A value NCBI sends either as a JSON string or a JSON number.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum IdValue {
    Text(String),
    Number(u64),
}

impl IdValue {
    /// Render as the string form NCBI expects back.
    #[must_use]
    pub fn as_string(&self) -> String {
        match self {
            Self::Text(s) => s.trim().to_string(),
            Self::Number(n) => n.to_string(),
        }
    }
}

fn lenient_u64<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<IdValue>::deserialize(deserializer)? {
        Some(IdValue::Number(n)) => n,
        Some(IdValue::Text(s)) => s.trim().parse().unwrap_or(0),
        None => 0,
    })
}

// =============================================================================
// esearch
// =============================================================================

/// Top-level esearch response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ESearchResponse {
    /// Search result block; absent on malformed responses.
    #[serde(default)]
    pub esearchresult: Option<ESearchResult>,

    /// Request-level error.
    #[serde(default)]
    pub error: Option<String>,
}

/// The `esearchresult` block.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ESearchResult {
    /// Total number of matching records.
    #[serde(default, deserialize_with = "lenient_u64")]
    pub count: u64,

    /// PMIDs for the requested page.
    #[serde(default)]
    pub idlist: Vec<String>,

    /// Query-level error, e.g. an unparseable term.
    #[serde(default, rename = "ERROR")]
    pub error: Option<String>,
}

// =============================================================================
// esummary
// =============================================================================

/// Top-level esummary response.
///
/// `result` maps each PMID to a document, plus a `uids` key listing them.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ESummaryResponse {
    /// Documents keyed by PMID.
    #[serde(default)]
    pub result: Option<serde_json::Map<String, serde_json::Value>>,

    /// Request-level error.
    #[serde(default)]
    pub error: Option<String>,
}

impl ESummaryResponse {
    /// Look up the document for one PMID, skipping the `uids` index.
    #[must_use]
    pub fn document(&self, pmid: &str) -> Option<SummaryDocument> {
        if pmid == "uids" {
            return None;
        }
        let value = self.result.as_ref()?.get(pmid)?;
        match serde_json::from_value::<SummaryDocument>(value.clone()) {
            Ok(doc) if doc.error.is_none() => Some(doc),
            Ok(doc) => {
                tracing::debug!(pmid, error = ?doc.error, "esummary reported an error for id");
                None
            }
            Err(e) => {
                tracing::warn!(pmid, error = %e, "Skipping malformed esummary document");
                None
            }
        }
    }
}

/// One esummary document.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SummaryDocument {
    /// PMID.
    #[serde(default)]
    pub uid: String,

    /// Article title.
    #[serde(default)]
    pub title: String,

    /// Publication date as NCBI formats it (e.g. "2023 Jan 5").
    #[serde(default)]
    pub pubdate: String,

    /// Abbreviated journal name.
    #[serde(default)]
    pub source: String,

    /// Full journal name.
    #[serde(default)]
    pub fulljournalname: String,

    /// Author list, including collective authors.
    #[serde(default)]
    pub authors: Vec<SummaryAuthor>,

    /// Alternate identifiers (doi, pmc, pii, ...).
    #[serde(default)]
    pub articleids: Vec<ArticleId>,

    /// Per-document error (e.g. "cannot get document summary").
    #[serde(default)]
    pub error: Option<String>,
}

impl SummaryDocument {
    /// Find an identifier by type.
    #[must_use]
    pub fn article_id(&self, idtype: &str) -> Option<&str> {
        self.articleids
            .iter()
            .find(|id| id.idtype.eq_ignore_ascii_case(idtype))
            .map(|id| id.value.trim())
            .filter(|v| !v.is_empty())
    }
}

/// Author entry in an esummary document.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SummaryAuthor {
    /// Display name, e.g. "Smith J".
    #[serde(default)]
    pub name: Option<String>,

    /// "Author" for people, "CollectiveName" for groups.
    #[serde(default)]
    pub authtype: Option<String>,
}

/// Alternate identifier in an esummary document.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ArticleId {
    /// Identifier type, e.g. "doi" or "pmc".
    #[serde(default)]
    pub idtype: String,

    /// Identifier value.
    #[serde(default)]
    pub value: String,
}

// =============================================================================
// elink
// =============================================================================

/// Top-level elink response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ELinkResponse {
    /// One link set per input id.
    #[serde(default)]
    pub linksets: Vec<LinkSet>,

    /// Request-level error.
    #[serde(default, alias = "ERROR")]
    pub error: Option<String>,
}

/// Links for one source id.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LinkSet {
    /// Neighbour lists (`cmd=neighbor` / `neighbor_score`).
    #[serde(default)]
    pub linksetdbs: Vec<LinkSetDb>,

    /// History handle (`cmd=neighbor_history`).
    #[serde(default)]
    pub webenv: Option<String>,

    /// Query keys on the history server (`cmd=neighbor_history`).
    #[serde(default, alias = "linksetdbhistory")]
    pub linksetdbhistories: Vec<LinkSetDbHistory>,

    /// LinkOut URLs (`cmd=llinks`).
    #[serde(default, alias = "idurls")]
    pub idurllist: Vec<IdUrlSet>,
}

/// A named neighbour list.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LinkSetDb {
    /// e.g. "pubmed_pubmed".
    #[serde(default)]
    pub linkname: String,

    /// Linked ids, bare or with scores.
    #[serde(default)]
    pub links: Vec<LinkEntry>,
}

/// A linked id; `neighbor_score` wraps it with a score.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum LinkEntry {
    Scored {
        id: IdValue,
        #[serde(default)]
        score: Option<serde_json::Value>,
    },
    Plain(IdValue),
}

impl LinkEntry {
    /// The linked PMID.
    #[must_use]
    pub fn id(&self) -> String {
        match self {
            Self::Scored { id, .. } | Self::Plain(id) => id.as_string(),
        }
    }
}

/// A query key for a link set stored on the history server.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LinkSetDbHistory {
    /// Link name the key belongs to.
    #[serde(default)]
    pub linkname: Option<String>,

    /// Query key.
    #[serde(default)]
    pub querykey: Option<IdValue>,
}

/// LinkOut URLs for one id.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IdUrlSet {
    /// Source id.
    #[serde(default)]
    pub id: Option<IdValue>,

    /// Provider links.
    #[serde(default)]
    pub objurls: Vec<ObjUrl>,

    /// Flat URL form some responses use instead of `objurls`.
    #[serde(default)]
    pub url: Option<UrlField>,
}

/// One LinkOut provider link.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ObjUrl {
    /// Target URL.
    #[serde(default)]
    pub url: Option<UrlField>,

    /// Provider metadata.
    #[serde(default)]
    pub provider: Option<Provider>,
}

/// URLs arrive as plain strings or as `{"value": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum UrlField {
    Plain(String),
    Wrapped { value: String },
}

impl UrlField {
    /// The URL text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Plain(s) | Self::Wrapped { value: s } => s,
        }
    }
}

/// LinkOut provider.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Provider {
    /// Provider name.
    #[serde(default)]
    pub name: Option<String>,

    /// Short provider code, "PMC" for PubMed Central.
    #[serde(default)]
    pub nameabbr: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_esearch_count_as_string() {
        let resp: ESearchResponse = serde_json::from_value(json!({
            "esearchresult": {"count": "42", "idlist": ["1", "2"]}
        }))
        .unwrap();
        let result = resp.esearchresult.unwrap();
        assert_eq!(result.count, 42);
        assert_eq!(result.idlist, vec!["1", "2"]);
    }

    #[test]
    fn test_link_entry_forms() {
        let db: LinkSetDb = serde_json::from_value(json!({
            "linkname": "pubmed_pubmed",
            "links": ["11", 12, {"id": "13", "score": 99}]
        }))
        .unwrap();
        let ids: Vec<String> = db.links.iter().map(LinkEntry::id).collect();
        assert_eq!(ids, vec!["11", "12", "13"]);
    }

    #[test]
    fn test_summary_skips_uids_and_errors() {
        let resp: ESummaryResponse = serde_json::from_value(json!({
            "result": {
                "uids": ["1", "2"],
                "1": {"uid": "1", "title": "One"},
                "2": {"uid": "2", "error": "cannot get document summary"}
            }
        }))
        .unwrap();
        assert!(resp.document("uids").is_none());
        assert_eq!(resp.document("1").unwrap().title, "One");
        assert!(resp.document("2").is_none());
    }

    #[test]
    fn test_history_alias() {
        let set: LinkSet = serde_json::from_value(json!({
            "webenv": "MCID_1",
            "linksetdbhistory": [{"querykey": "1"}]
        }))
        .unwrap();
        assert_eq!(set.linksetdbhistories.len(), 1);
    }
}
