//! Search query construction.
//!
//! One query per attempt: OR-of-quoted topic keywords for recall against a
//! small historical index, OR-of-publication terms to bias toward papers
//! and journals, the month-year label as a literal phrase, and `site:`
//! operators restricting results to the archival/academic allowlist.
//! Deterministic given its inputs.

use itertools::Itertools;

/// Build the full query string for one sampled month.
///
/// Shape: `("kw1" OR "kw2") ("paper" OR "journal") May 1990 (site:a.org OR site:b.edu)`
pub fn build_query(
    topic_keywords: &[String],
    publication_keywords: &[String],
    target_domains: &[String],
    date_label: &str,
) -> String {
    let topics = topic_keywords
        .iter()
        .map(|kw| format!("\"{}\"", kw))
        .join(" OR ");
    let publications = publication_keywords
        .iter()
        .map(|kw| format!("\"{}\"", kw))
        .join(" OR ");
    let sites = target_domains
        .iter()
        .map(|d| format!("site:{}", d))
        .join(" OR ");

    format!("({}) ({}) {} ({})", topics, publications, date_label, sites)
}
