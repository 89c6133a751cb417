//! Post-extraction relevance and historical-window validation.
//!
//! The link filter only saw a snippet; this validator re-runs the keyword
//! check against the complete title and body, catching false positives
//! the cheap pre-filter let through. The window check applies only when a
//! publish date was actually recovered: undated historical pages are
//! common and are not penalized.

use crate::models::ExtractedArticle;
use std::fmt;
use tracing::debug;

/// Why an extracted article was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    /// Full title and body contain none of the topic keywords.
    NotRelevant,
    /// A recovered publish date falls outside the inclusive window.
    OutsideWindow { year: i32 },
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::NotRelevant => write!(f, "no topic keyword in full content"),
            RejectReason::OutsideWindow { year } => {
                write!(f, "publish year {} outside historical window", year)
            }
        }
    }
}

/// Validates articles against the topic vocabulary and the historical window.
#[derive(Debug, Clone)]
pub struct RelevanceValidator {
    topic_keywords: Vec<String>,
    start_year: i32,
    end_year: i32,
}

impl RelevanceValidator {
    pub fn new(topic_keywords: &[String], start_year: i32, end_year: i32) -> Self {
        Self {
            topic_keywords: topic_keywords.iter().map(|s| s.to_lowercase()).collect(),
            start_year,
            end_year,
        }
    }

    /// Accept (`Ok`) or reject with a reason. Rejection short-circuits
    /// synthesis: the caller must not spend a generation call on it.
    pub fn validate(&self, article: &ExtractedArticle) -> Result<(), RejectReason> {
        let haystack = format!("{} {}", article.title, article.text).to_lowercase();
        if !self.topic_keywords.iter().any(|kw| haystack.contains(kw)) {
            debug!(url = %article.url, "Validator reject: not relevant");
            return Err(RejectReason::NotRelevant);
        }

        if let Some(date) = article.publish_date {
            use chrono::Datelike;
            let year = date.year();
            if year < self.start_year || year > self.end_year {
                debug!(url = %article.url, year, "Validator reject: outside window");
                return Err(RejectReason::OutsideWindow { year });
            }
        }

        Ok(())
    }
}
