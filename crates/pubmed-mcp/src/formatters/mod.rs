//! Response parsing and output formatting.
//!
//! `eutils` and `xml` turn raw E-utilities responses into records; `json`
//! and `markdown` render records for tool output.

pub mod eutils;
mod json;
mod markdown;
pub mod xml;

pub use self::json::*;
pub use markdown::*;
