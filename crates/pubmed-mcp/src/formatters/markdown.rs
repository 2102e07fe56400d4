//! Markdown output formatting.

use crate::models::{
    AbstractRecord, Article, BatchItem, CitationList, FullTextRecord, LinkRelation,
    OpenAccessRecord, SearchResult,
};

/// Format one search page as Markdown.
#[must_use]
pub fn format_search_markdown(heading: &str, result: &SearchResult) -> String {
    if result.articles.is_empty() {
        return "No articles found.".to_string();
    }

    let mut output = format!(
        "# {heading} ({} of {} results)\n\n",
        result.articles.len(),
        result.count
    );
    push_articles(&mut output, &result.articles);
    output
}

fn push_articles(output: &mut String, articles: &[Article]) {
    for (i, article) in articles.iter().enumerate() {
        output.push_str(&format_article_markdown(article, i + 1));
        output.push_str("\n---\n\n");
    }
}

/// Format a single article as Markdown.
#[must_use]
pub fn format_article_markdown(article: &Article, index: usize) -> String {
    let mut output = String::new();

    output.push_str(&format!("## {}. {}\n\n", index, article.title_or_default()));
    output.push_str(&format!("**Authors**: {}\n\n", article.author_display()));

    let mut meta = vec![format!("**PMID**: {}", article.pmid)];
    if let Some(journal) = &article.journal {
        meta.push(format!("**Journal**: {journal}"));
    }
    if let Some(date) = &article.pub_date {
        meta.push(format!("**Published**: {date}"));
    }
    output.push_str(&format!("{}\n\n", meta.join(" | ")));

    let mut links = vec![format!("[PubMed]({})", article.pubmed_url())];
    if let Some(pmc) = article.pmc_url() {
        links.push(format!("[PMC]({pmc})"));
    }
    if let Some(doi) = &article.doi {
        links.push(format!("[DOI](https://doi.org/{doi})"));
    }
    output.push_str(&format!("**Links**: {}\n", links.join(" | ")));

    output
}

/// Format a citation or similarity list.
#[must_use]
pub fn format_citations_markdown(list: &CitationList) -> String {
    if list.articles.is_empty() {
        let what = match list.relation {
            LinkRelation::Similar => "similar articles",
            LinkRelation::Cites => "references",
            LinkRelation::CitedBy => "citing articles",
        };
        return format!("No {what} found for PMID {}.", list.pmid);
    }

    let mut output = format!(
        "# {} PMID {} ({} results)\n\n",
        list.relation.heading(),
        list.pmid,
        list.articles.len()
    );
    push_articles(&mut output, &list.articles);
    output
}

/// Format an abstract.
#[must_use]
pub fn format_abstract_markdown(record: &AbstractRecord) -> String {
    let title = record.title.as_deref().unwrap_or("Untitled");
    format!(
        "# {title}\n\n**PMID**: [{pmid}](https://pubmed.ncbi.nlm.nih.gov/{pmid}/)\n\n## Abstract\n\n{}\n",
        record.text_or_placeholder(),
        pmid = record.pmid,
    )
}

/// Format an open access check.
#[must_use]
pub fn format_open_access_markdown(record: &OpenAccessRecord) -> String {
    if record.open_access {
        format!(
            "PMID {} is **open access**: full text is available in PubMed Central.",
            record.pmid
        )
    } else {
        format!("PMID {} is **not open access** in PubMed Central.", record.pmid)
    }
}

/// Format full text.
#[must_use]
pub fn format_full_text_markdown(record: &FullTextRecord) -> String {
    format!(
        "# Full text of PMID {} ({})\n\n{}\n",
        record.pmid,
        record.pmcid,
        record.text()
    )
}

/// Format batch search results, one section per query.
#[must_use]
pub fn format_batch_markdown(items: &[BatchItem]) -> String {
    let succeeded = items.iter().filter(|i| i.success).count();
    let mut output = format!("# Batch search ({succeeded}/{} succeeded)\n\n", items.len());

    for item in items {
        output.push_str(&format!("## Query: `{}`\n\n", item.query));
        match (&item.data, &item.error) {
            (Some(result), _) if !result.articles.is_empty() => {
                output.push_str(&format!(
                    "{} of {} results\n\n",
                    result.articles.len(),
                    result.count
                ));
                for (i, article) in result.articles.iter().enumerate() {
                    output.push_str(&format!(
                        "{}. {} (PMID {})\n",
                        i + 1,
                        article.title_or_default(),
                        article.pmid
                    ));
                }
                output.push('\n');
            }
            (Some(_), _) => output.push_str("No articles found.\n\n"),
            (None, error) => output.push_str(&format!(
                "**Error**: {}\n\n",
                error.as_deref().unwrap_or("unknown error")
            )),
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_article_links() {
        let article = Article {
            pmid: 42,
            title: Some("Title".to_string()),
            doi: Some("10.1000/xyz".to_string()),
            pmcid: Some("PMC7".to_string()),
            ..Default::default()
        };

        let md = format_article_markdown(&article, 1);
        assert!(md.contains("## 1. Title"));
        assert!(md.contains("**Authors**: N/A"));
        assert!(md.contains("[PubMed](https://pubmed.ncbi.nlm.nih.gov/42/)"));
        assert!(md.contains("[PMC](https://www.ncbi.nlm.nih.gov/pmc/articles/PMC7/)"));
        assert!(md.contains("[DOI](https://doi.org/10.1000/xyz)"));
    }

    #[test]
    fn test_empty_citations() {
        let list = CitationList {
            pmid: 5,
            relation: LinkRelation::CitedBy,
            articles: vec![],
        };
        assert_eq!(format_citations_markdown(&list), "No citing articles found for PMID 5.");
    }

    #[test]
    fn test_abstract_placeholder() {
        let record = AbstractRecord {
            pmid: 3,
            title: None,
            abstract_text: None,
        };
        assert!(format_abstract_markdown(&record).contains("No abstract available"));
    }
}
