//! Cheap pre-extraction link filter.
//!
//! Rejects obviously-wrong candidates before they cost a download: known
//! non-article path fragments, binary/asset extensions, platform domains
//! that never carry historical articles, and candidates whose title and
//! snippet mention no topic keyword at all. Deliberately permissive --
//! false positives pass through and the post-extraction validator catches
//! them against full text.

use crate::models::SearchCandidate;
use tracing::debug;
use url::Url;

/// Configured accept/reject decision for search candidates.
#[derive(Debug, Clone)]
pub struct LinkFilter {
    topic_keywords: Vec<String>,
    denied_fragments: Vec<String>,
    denied_extensions: Vec<String>,
    denied_platforms: Vec<String>,
}

impl LinkFilter {
    pub fn new(
        topic_keywords: &[String],
        denied_fragments: &[String],
        denied_extensions: &[String],
        denied_platforms: &[String],
    ) -> Self {
        let lower = |v: &[String]| v.iter().map(|s| s.to_lowercase()).collect();
        Self {
            topic_keywords: lower(topic_keywords),
            denied_fragments: lower(denied_fragments),
            denied_extensions: lower(denied_extensions),
            denied_platforms: lower(denied_platforms),
        }
    }

    /// Accept or reject a candidate on URL shape and title/snippet text.
    pub fn accept(&self, candidate: &SearchCandidate) -> bool {
        let link = candidate.link.to_lowercase();

        if let Some(fragment) = self.denied_fragments.iter().find(|f| link.contains(f.as_str())) {
            debug!(link = %candidate.link, %fragment, "Rejected: non-article path");
            return false;
        }

        if let Some(ext) = self
            .denied_extensions
            .iter()
            .find(|e| link.ends_with(e.as_str()))
        {
            debug!(link = %candidate.link, %ext, "Rejected: disallowed extension");
            return false;
        }

        if let Some(host) = Url::parse(&candidate.link)
            .ok()
            .and_then(|u| u.host_str().map(|h| h.to_lowercase()))
        {
            if let Some(platform) = self
                .denied_platforms
                .iter()
                .find(|p| host == **p || host.ends_with(&format!(".{}", p)))
            {
                debug!(link = %candidate.link, %platform, "Rejected: platform domain");
                return false;
            }
        }

        let haystack = format!("{} {}", candidate.title, candidate.snippet).to_lowercase();
        if !self.topic_keywords.iter().any(|kw| haystack.contains(kw)) {
            debug!(link = %candidate.link, "Rejected: no topic keyword in title/snippet");
            return false;
        }

        true
    }
}
