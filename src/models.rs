//! Data models for search candidates, extracted articles, and the
//! persisted generation index.
//!
//! Three lifetimes of data flow through the pipeline:
//! - [`SearchCandidate`]: ephemeral search hits, never persisted
//! - [`ExtractedArticle`]: a downloaded and parsed source article, immutable
//!   once built, consumed by the validator and the synthesis prompt
//! - [`CapsuleRecord`]: one persisted entry per successful synthesis,
//!   appended to the JSON index the static site reads

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// An unvalidated search hit with title/snippet metadata.
///
/// Produced by the search adapter, consumed by the link filter. Candidates
/// that survive filtering are handed to the content extractor; everything
/// else is dropped without another network call.
#[derive(Debug, Clone)]
pub struct SearchCandidate {
    /// Result title as returned by the search provider.
    pub title: String,
    /// Absolute URL of the result.
    pub link: String,
    /// Short excerpt the provider chose to display.
    pub snippet: String,
    /// Display domain of the result (e.g. `aaai.org`), `www.` stripped.
    pub source_domain: String,
}

/// A source article after download and parse, ready for validation.
///
/// Never mutated after creation; the synthesis prompt reads it verbatim
/// (modulo a per-article character budget).
#[derive(Debug, Clone)]
pub struct ExtractedArticle {
    /// Title recovered from the page.
    pub title: String,
    /// Body text, paragraph-joined.
    pub text: String,
    /// URL the article was fetched from.
    pub url: String,
    /// Publish date, when the page exposed one. Undated historical pages
    /// are common and remain eligible for synthesis.
    pub publish_date: Option<NaiveDate>,
    /// Host the article came from, `www.` stripped.
    pub source_domain: String,
}

/// One persisted index entry per successful synthesis.
///
/// Appended to the index exactly once, never updated or deleted. The `id`
/// is a timestamp-derived slug, so records are unique per run even though
/// content uniqueness is not enforced. Field names match the JSON schema
/// the site's listing page consumes.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct CapsuleRecord {
    /// Time-based unique slug, e.g. `analysis_20260829141503`.
    pub id: String,
    /// Title extracted from the generated fragment (or the fallback).
    pub title: String,
    /// Hook paragraph extracted from the generated fragment (or the fallback).
    pub summary: String,
    /// Site-relative path of the written HTML document, forward slashes.
    pub html_path: String,
    /// RFC 3339 timestamp of generation.
    pub generated_date: String,
    /// How many source articles fed the synthesis.
    pub original_sources_count: usize,
    /// Header image URL for the listing card.
    pub featured_image: String,
}
