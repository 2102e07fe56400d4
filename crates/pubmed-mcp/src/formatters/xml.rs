//! XML extraction for efetch responses (PubMed abstracts, PMC full text).

use std::borrow::Cow;
use std::sync::LazyLock;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, BytesText, Event};
use regex::Regex;

use crate::error::{ToolError, ToolResult};
use crate::models::AbstractRecord;

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

/// Collapse runs of whitespace and trim.
#[must_use]
pub fn normalize_whitespace(text: &str) -> String {
    WHITESPACE.replace_all(text, " ").trim().to_string()
}

fn make_reader(content: &str) -> Reader<&[u8]> {
    let mut reader = Reader::from_str(content);
    reader.config_mut().expand_empty_elements = true;
    reader
}

fn xml_error(err: impl std::fmt::Display) -> ToolError {
    ToolError::parse(format!("Malformed XML from E-utilities: {err}"))
}

fn unescape_lossy(text: &BytesText<'_>) -> String {
    text.unescape()
        .map_or_else(|_| String::from_utf8_lossy(text).into_owned(), Cow::into_owned)
}

fn attribute(start: &BytesStart<'_>, name: &[u8]) -> Option<String> {
    start
        .try_get_attribute(name)
        .ok()?
        .map(|a| String::from_utf8_lossy(&a.value).into_owned())
}

/// Read the text of the element whose start tag was just consumed,
/// flattening inline markup, and return it whitespace-normalized.
fn element_text(reader: &mut Reader<&[u8]>, tag: &[u8], buf: &mut Vec<u8>) -> ToolResult<String> {
    let mut text = String::new();
    let mut depth = 1u32;

    loop {
        match reader.read_event_into(buf).map_err(xml_error)? {
            Event::Start(e) if e.name().as_ref() == tag => depth += 1,
            Event::End(e) if e.name().as_ref() == tag => {
                depth -= 1;
                if depth == 0 {
                    break;
                }
            }
            Event::Text(e) => text.push_str(&unescape_lossy(&e)),
            Event::CData(e) => text.push_str(&String::from_utf8_lossy(&e)),
            Event::Eof => {
                let tag = String::from_utf8_lossy(tag);
                return Err(xml_error(format!("unexpected end of document in <{tag}>")));
            }
            _ => {}
        }
        buf.clear();
    }

    Ok(normalize_whitespace(&text))
}

/// Extract title and abstract from a PubMed efetch (`rettype=abstract`) document.
///
/// Labelled sections render as `"LABEL: text"`; sections join with a space.
///
/// # Errors
///
/// `EmptyResult` when the document holds no article, `Parse` when the XML is malformed.
pub fn parse_abstract(xml: &str, pmid: u64) -> ToolResult<AbstractRecord> {
    let mut reader = make_reader(xml);
    let mut buf = Vec::new();

    let mut in_article = false;
    let mut found = false;
    let mut title = None;
    let mut sections = Vec::new();

    loop {
        match reader.read_event_into(&mut buf).map_err(xml_error)? {
            Event::Start(e) => match e.name().as_ref() {
                b"PubmedArticle" | b"PubmedBookArticle" => {
                    in_article = true;
                    found = true;
                }
                b"ArticleTitle" | b"BookTitle" if in_article && title.is_none() => {
                    let name = e.name().as_ref().to_vec();
                    let text = element_text(&mut reader, &name, &mut Vec::new())?;
                    title = (!text.is_empty()).then_some(text);
                }
                b"AbstractText" if in_article => {
                    let label = attribute(&e, b"Label");
                    let text = element_text(&mut reader, b"AbstractText", &mut Vec::new())?;
                    if !text.is_empty() {
                        sections.push(match label.filter(|l| !l.trim().is_empty()) {
                            Some(label) => format!("{}: {text}", label.trim()),
                            None => text,
                        });
                    }
                }
                _ => {}
            },
            Event::End(e)
                if in_article
                    && matches!(e.name().as_ref(), b"PubmedArticle" | b"PubmedBookArticle") =>
            {
                break;
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if !found {
        return Err(ToolError::empty(format!("No article found for PMID {pmid}")));
    }

    let abstract_text = (!sections.is_empty()).then(|| sections.join(" "));
    Ok(AbstractRecord {
        pmid,
        title,
        abstract_text,
    })
}

/// Paragraph texts under `<body>` in a PMC JATS document, in document order.
///
/// # Errors
///
/// `Parse` when there is no `<body>` or the XML is malformed, `EmptyResult`
/// when the body has no text paragraphs.
pub fn parse_full_text_paragraphs(xml: &str) -> ToolResult<Vec<String>> {
    let mut reader = make_reader(xml);
    let mut buf = Vec::new();

    let mut in_body = false;
    let mut found_body = false;
    let mut paragraphs = Vec::new();

    loop {
        match reader.read_event_into(&mut buf).map_err(xml_error)? {
            Event::Start(e) => match e.name().as_ref() {
                b"body" if !found_body => {
                    in_body = true;
                    found_body = true;
                }
                b"p" if in_body => {
                    let text = element_text(&mut reader, b"p", &mut Vec::new())?;
                    if !text.is_empty() {
                        paragraphs.push(text);
                    }
                }
                _ => {}
            },
            Event::End(e) if in_body && e.name().as_ref() == b"body" => break,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if !found_body {
        return Err(ToolError::parse("Full text structure not found in PMC"));
    }
    if paragraphs.is_empty() {
        return Err(ToolError::empty("No paragraphs found in the full text"));
    }
    Ok(paragraphs)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ABSTRACT_XML: &str = r#"<?xml version="1.0" ?>
<PubmedArticleSet>
  <PubmedArticle>
    <MedlineCitation>
      <PMID Version="1">123</PMID>
      <Article>
        <ArticleTitle>CRISPR screens in <i>vivo</i>.</ArticleTitle>
        <Abstract>
          <AbstractText Label="BACKGROUND">Gene   editing
            is common.</AbstractText>
          <AbstractText Label="RESULTS">We found H<sub>2</sub>O &amp; more.</AbstractText>
        </Abstract>
      </Article>
    </MedlineCitation>
  </PubmedArticle>
</PubmedArticleSet>"#;

    #[test]
    fn test_labelled_sections_joined() {
        let record = parse_abstract(ABSTRACT_XML, 123).unwrap();
        assert_eq!(record.title.as_deref(), Some("CRISPR screens in vivo."));
        assert_eq!(
            record.abstract_text.as_deref(),
            Some("BACKGROUND: Gene editing is common. RESULTS: We found H2O & more.")
        );
    }

    #[test]
    fn test_unlabelled_abstract() {
        let xml = "<PubmedArticleSet><PubmedArticle><Article><ArticleTitle>T</ArticleTitle>\
                   <Abstract><AbstractText>Plain text.</AbstractText></Abstract>\
                   </Article></PubmedArticle></PubmedArticleSet>";
        let record = parse_abstract(xml, 1).unwrap();
        assert_eq!(record.abstract_text.as_deref(), Some("Plain text."));
    }

    #[test]
    fn test_article_without_abstract() {
        let xml = "<PubmedArticleSet><PubmedArticle><Article><ArticleTitle>T</ArticleTitle>\
                   </Article></PubmedArticle></PubmedArticleSet>";
        let record = parse_abstract(xml, 9).unwrap();
        assert!(record.abstract_text.is_none());
        assert_eq!(record.text_or_placeholder(), "No abstract available");
    }

    #[test]
    fn test_no_article_is_empty_result() {
        let err = parse_abstract("<PubmedArticleSet></PubmedArticleSet>", 5).unwrap_err();
        assert!(matches!(err, ToolError::EmptyResult(_)));
    }

    #[test]
    fn test_malformed_abstract_is_parse_error() {
        let xml = "<PubmedArticleSet><PubmedArticle><ArticleTitle>x</Abstract>";
        let err = parse_abstract(xml, 5).unwrap_err();
        assert!(matches!(err, ToolError::Parse(_)));
    }

    #[test]
    fn test_body_paragraphs() {
        let xml = r"<article><front><p>Front matter</p></front><body>
            <sec><title>Intro</title><p>First <italic>para</italic>.</p></sec>
            <sec><p>Second
               para.</p><p>   </p></sec>
            </body><back><p>Refs</p></back></article>";
        let paragraphs = parse_full_text_paragraphs(xml).unwrap();
        assert_eq!(paragraphs, vec!["First para.", "Second para."]);
    }

    #[test]
    fn test_missing_body() {
        let err = parse_full_text_paragraphs("<article><front/></article>").unwrap_err();
        assert_eq!(err.to_user_message(), "Parse error: Full text structure not found in PMC");
    }

    #[test]
    fn test_body_without_paragraphs() {
        let err = parse_full_text_paragraphs("<article><body><sec/></body></article>").unwrap_err();
        assert!(matches!(err, ToolError::EmptyResult(_)));
    }
}
