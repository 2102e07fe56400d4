//! Normalization of E-utilities JSON responses into records.

use crate::error::{ToolError, ToolResult};
use crate::models::eutils::{ELinkResponse, ESearchResponse, ESummaryResponse, SummaryDocument};
use crate::models::{Article, LinkRelation};

/// Total count and PMIDs from an esearch response.
pub fn search_ids(response: &ESearchResponse) -> ToolResult<(u64, Vec<String>)> {
    let result = response
        .esearchresult
        .as_ref()
        .ok_or_else(|| ToolError::parse("Invalid response from PubMed"))?;

    if let Some(message) = &result.error {
        return Err(ToolError::parse(format!("PubMed rejected the query: {message}")));
    }

    let ids = result
        .idlist
        .iter()
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
        .collect();

    Ok((result.count, ids))
}

/// Build articles for the requested PMIDs, in request order.
///
/// PMIDs the summary does not cover are skipped.
#[must_use]
pub fn articles_from_summary(response: &ESummaryResponse, pmids: &[String]) -> Vec<Article> {
    pmids
        .iter()
        .filter_map(|pmid| {
            let doc = response.document(pmid)?;
            let numeric = pmid.trim().parse::<u64>().ok()?;
            Some(article_from_document(numeric, &doc))
        })
        .collect()
}

/// Normalize one esummary document.
#[must_use]
pub fn article_from_document(pmid: u64, doc: &SummaryDocument) -> Article {
    let authors = doc
        .authors
        .iter()
        .filter(|a| a.authtype.as_deref() == Some("Author"))
        .filter_map(|a| a.name.as_deref())
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(String::from)
        .collect();

    let journal = non_empty(&doc.fulljournalname).or_else(|| non_empty(&doc.source));

    let pmcid = doc
        .article_id("pmc")
        .filter(|v| v.starts_with("PMC"))
        .map(String::from);

    Article {
        pmid,
        title: non_empty(&doc.title),
        authors,
        pub_date: non_empty(&doc.pubdate),
        journal,
        doi: doc.article_id("doi").map(String::from),
        pmcid,
    }
}

fn non_empty(s: &str) -> Option<String> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Neighbour PMIDs for `relation` from an elink `neighbor_score` response.
#[must_use]
pub fn linked_ids(response: &ELinkResponse, relation: LinkRelation) -> Vec<String> {
    response
        .linksets
        .iter()
        .flat_map(|set| &set.linksetdbs)
        .find(|db| db.linkname == relation.linkname())
        .map(|db| db.links.iter().map(|link| link.id()).collect())
        .unwrap_or_default()
}

/// WebEnv and query key from an elink `neighbor_history` response.
///
/// `None` means PubMed stored no link set (the article has no such links).
#[must_use]
pub fn history_handle(response: &ELinkResponse) -> Option<(String, String)> {
    let set = response.linksets.first()?;
    let webenv = set.webenv.as_deref().map(str::trim).filter(|w| !w.is_empty())?;
    let query_key = set
        .linksetdbhistories
        .first()?
        .querykey
        .as_ref()
        .map(|k| k.as_string())
        .filter(|k| !k.is_empty())?;
    Some((webenv.to_string(), query_key))
}

/// True when any LinkOut URL points at PubMed Central.
#[must_use]
pub fn has_pmc_link(response: &ELinkResponse) -> bool {
    fn is_pmc_url(url: &str) -> bool {
        let url = url.to_ascii_lowercase();
        url.contains("pmc/articles") || url.contains("pmc.ncbi.nlm.nih.gov")
    }

    response.linksets.iter().flat_map(|set| &set.idurllist).any(|idurls| {
        idurls.url.as_ref().is_some_and(|u| is_pmc_url(u.as_str()))
            || idurls.objurls.iter().any(|obj| {
                obj.url.as_ref().is_some_and(|u| is_pmc_url(u.as_str()))
                    || obj
                        .provider
                        .as_ref()
                        .and_then(|p| p.nameabbr.as_deref())
                        .is_some_and(|abbr| abbr.eq_ignore_ascii_case("PMC"))
            })
    })
}
