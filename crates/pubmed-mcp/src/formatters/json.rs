//! JSON output formatting with token efficiency.

use serde_json::{Value, json};

use crate::models::{
    AbstractRecord, Article, BatchItem, CitationList, FullTextRecord, OpenAccessRecord,
    SearchResult,
};

/// Create a compact article representation for JSON output.
///
/// Authors collapse to one display string; absent fields are omitted.
#[must_use]
pub fn compact_article(article: &Article) -> Value {
    let mut obj = json!({
        "pmid": article.pmid.to_string(),
        "title": article.title_or_default(),
        "authors": article.author_display(),
        "url": article.pubmed_url(),
    });

    if let Some(date) = &article.pub_date {
        obj["pubDate"] = json!(date);
    }

    if let Some(journal) = &article.journal {
        obj["journal"] = json!(journal);
    }

    if let Some(doi) = &article.doi {
        obj["doi"] = json!(doi);
    }

    if let Some(pmcid) = &article.pmcid {
        obj["pmcid"] = json!(pmcid);
    }

    obj
}

/// One search page: total hit count plus compact articles.
#[must_use]
pub fn compact_search_result(result: &SearchResult) -> Value {
    json!({
        "count": result.count,
        "returned": result.articles.len(),
        "articles": result.articles.iter().map(compact_article).collect::<Vec<_>>(),
    })
}

/// A citation or similarity list.
#[must_use]
pub fn compact_citation_list(list: &CitationList) -> Value {
    json!({
        "pmid": list.pmid.to_string(),
        "relation": list.relation,
        "count": list.articles.len(),
        "articles": list.articles.iter().map(compact_article).collect::<Vec<_>>(),
    })
}

/// Abstract record; a missing abstract is `null`.
#[must_use]
pub fn compact_abstract(record: &AbstractRecord) -> Value {
    json!({
        "pmid": record.pmid.to_string(),
        "title": record.title,
        "abstract": record.abstract_text,
    })
}

/// Open access status.
#[must_use]
pub fn compact_open_access(record: &OpenAccessRecord) -> Value {
    json!({
        "pmid": record.pmid.to_string(),
        "openAccess": record.open_access,
    })
}

/// Full text joined into a single string.
#[must_use]
pub fn compact_full_text(record: &FullTextRecord) -> Value {
    json!({
        "pmid": record.pmid.to_string(),
        "pmcid": record.pmcid,
        "paragraphs": record.paragraphs.len(),
        "fullText": record.text(),
    })
}

/// Batch results in query order.
#[must_use]
pub fn compact_batch(items: &[BatchItem]) -> Value {
    Value::Array(
        items
            .iter()
            .map(|item| {
                json!({
                    "query": item.query,
                    "success": item.success,
                    "error": item.error,
                    "data": item.data.as_ref().map(compact_search_result),
                })
            })
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compact_article() {
        let article = Article {
            pmid: 31452104,
            title: Some("Test Article".to_string()),
            authors: (1..=6).map(|i| format!("Author {i}")).collect(),
            journal: Some("Nature".to_string()),
            ..Default::default()
        };

        let compact = compact_article(&article);

        assert_eq!(compact["pmid"], "31452104");
        assert_eq!(compact["title"], "Test Article");
        assert_eq!(
            compact["authors"],
            "Author 1, Author 2, Author 3, Author 4, Author 5 et al. (1 more)"
        );
        assert_eq!(compact["journal"], "Nature");
        assert!(compact.get("doi").is_none());
        assert_eq!(compact["url"], "https://pubmed.ncbi.nlm.nih.gov/31452104/");
    }

    #[test]
    fn test_compact_batch_keeps_failures() {
        let items = vec![
            BatchItem::ok("a", SearchResult::default()),
            BatchItem::failed("b", "boom"),
        ];
        let value = compact_batch(&items);
        assert_eq!(value[0]["success"], true);
        assert_eq!(value[1]["error"], "boom");
        assert!(value[1]["data"].is_null());
    }
}
