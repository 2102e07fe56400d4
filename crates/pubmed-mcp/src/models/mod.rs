//! Data models for PubMed E-utilities entities.
//!
//! Raw response shapes live in [`eutils`]; the normalized records the tools
//! return live in `article`.

mod article;
mod enums;
pub mod eutils;
mod inputs;

pub use article::{
    AUTHOR_DISPLAY_LIMIT, AbstractRecord, Article, BatchItem, CitationList, FullTextRecord,
    OpenAccessRecord, SearchResult,
};
pub use enums::{LinkRelation, ResponseFormat, SearchField};
pub use inputs::*;
