//! Article download and parse adapter.
//!
//! Turns a candidate URL into an [`ExtractedArticle`] or a typed
//! [`ExtractError`]. Every failure category is caught at this boundary --
//! a single bad page must not abort a multi-candidate scan, so callers
//! only ever see a `Result` to log and step past.

use crate::models::ExtractedArticle;
use crate::utils::extract_domain;
use chrono::{DateTime, NaiveDate};
use scraper::{Html, Selector};
use thiserror::Error;
use tracing::{debug, info, instrument};

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                          (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Why an extraction produced no article.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// Transport failure: DNS, connect, timeout, non-success status.
    #[error("unreachable: {0}")]
    Unreachable(String),
    /// The page downloaded but no usable structure came out of it.
    #[error("parse failure: {0}")]
    Parse(String),
    /// Title or body missing, or body below the minimum length.
    #[error("insufficient content: {0}")]
    Insufficient(String),
}

/// Collaborator seam the run controller extracts through.
pub trait ContentExtractor {
    async fn extract(&self, url: &str) -> Result<ExtractedArticle, ExtractError>;
}

/// Downloads pages and parses them into articles.
#[derive(Debug, Clone)]
pub struct PageExtractor {
    http: reqwest::Client,
    min_body_chars: usize,
}

impl PageExtractor {
    pub fn new(http: reqwest::Client, min_body_chars: usize) -> Self {
        Self {
            http,
            min_body_chars,
        }
    }
}

impl ContentExtractor for PageExtractor {
    /// Download and parse one candidate URL.
    #[instrument(level = "info", skip_all, fields(%url))]
    async fn extract(&self, url: &str) -> Result<ExtractedArticle, ExtractError> {
        let response = self
            .http
            .get(url)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .send()
            .await
            .map_err(|e| ExtractError::Unreachable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ExtractError::Unreachable(format!(
                "status {}",
                response.status()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| ExtractError::Unreachable(e.to_string()))?;

        let article = parse_article(url, &body, self.min_body_chars)?;
        info!(
            title = %article.title,
            bytes = article.text.len(),
            has_date = article.publish_date.is_some(),
            "Extracted article"
        );
        Ok(article)
    }
}

/// Parse downloaded HTML into an article. Pure; no I/O.
///
/// Title comes from `<title>` (first choice) or the first `<h1>`; the body
/// is the paragraph text joined with newlines. A recovered publish date is
/// best-effort from common meta tags and `<time datetime>`.
pub fn parse_article(
    url: &str,
    html: &str,
    min_body_chars: usize,
) -> Result<ExtractedArticle, ExtractError> {
    let document = Html::parse_document(html);

    let title_selector = Selector::parse("title").unwrap();
    let h1_selector = Selector::parse("h1").unwrap();
    let p_selector = Selector::parse("p").unwrap();

    let title = document
        .select(&title_selector)
        .chain(document.select(&h1_selector))
        .map(|el| el.text().collect::<Vec<_>>().join(" ").trim().to_string())
        .find(|t| !t.is_empty())
        .ok_or_else(|| ExtractError::Insufficient("missing title".to_string()))?;

    let text = document
        .select(&p_selector)
        .map(|el| el.text().collect::<Vec<_>>().join(" ").trim().to_string())
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join("\n");

    if text.is_empty() {
        return Err(ExtractError::Insufficient("missing body".to_string()));
    }
    if text.len() < min_body_chars {
        return Err(ExtractError::Insufficient(format!(
            "body too short ({} < {} chars)",
            text.len(),
            min_body_chars
        )));
    }

    let publish_date = recover_publish_date(&document);
    debug!(?publish_date, "Recovered publish date");

    Ok(ExtractedArticle {
        title,
        text,
        url: url.to_string(),
        publish_date,
        source_domain: extract_domain(url),
    })
}

/// Best-effort publish date recovery from page metadata.
fn recover_publish_date(document: &Html) -> Option<NaiveDate> {
    let meta_selectors = [
        "meta[property=\"article:published_time\"]",
        "meta[name=\"date\"]",
        "meta[name=\"dc.date\"]",
        "meta[name=\"publish-date\"]",
    ];

    for raw in meta_selectors {
        let selector = Selector::parse(raw).unwrap();
        if let Some(value) = document
            .select(&selector)
            .find_map(|el| el.value().attr("content"))
        {
            if let Some(date) = parse_date_value(value) {
                return Some(date);
            }
        }
    }

    let time_selector = Selector::parse("time[datetime]").unwrap();
    document
        .select(&time_selector)
        .find_map(|el| el.value().attr("datetime"))
        .and_then(parse_date_value)
}

fn parse_date_value(value: &str) -> Option<NaiveDate> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.date_naive());
    }
    for fmt in ["%Y-%m-%d", "%Y/%m/%d", "%B %d, %Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(value.get(..10).unwrap_or(value), fmt) {
            return Some(date);
        }
        if let Ok(date) = NaiveDate::parse_from_str(value, fmt) {
            return Some(date);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(title: &str, paragraphs: &[&str], meta: &str) -> String {
        let body = paragraphs
            .iter()
            .map(|p| format!("<p>{}</p>", p))
            .collect::<String>();
        format!(
            "<html><head><title>{}</title>{}</head><body>{}</body></html>",
            title, meta, body
        )
    }

    #[test]
    fn test_parse_article_happy_path() {
        let long = "Expert systems dominated commercial AI deployments. ".repeat(10);
        let html = page("AI Progress Report", &[&long], "");
        let article = parse_article("https://aaai.org/report", &html, 250).unwrap();
        assert_eq!(article.title, "AI Progress Report");
        assert!(article.text.len() >= 250);
        assert_eq!(article.source_domain, "aaai.org");
        assert!(article.publish_date.is_none());
    }

    #[test]
    fn test_parse_article_missing_title() {
        let html = "<html><body><p>Body only, no title element or h1.</p></body></html>";
        let err = parse_article("https://mit.edu/x", html, 10).unwrap_err();
        assert!(matches!(err, ExtractError::Insufficient(_)));
        assert!(err.to_string().contains("missing title"));
    }

    #[test]
    fn test_parse_article_short_body() {
        let html = page("Short", &["too short"], "");
        let err = parse_article("https://mit.edu/x", &html, 250).unwrap_err();
        assert!(matches!(err, ExtractError::Insufficient(_)));
        assert!(err.to_string().contains("too short"));
    }

    #[test]
    fn test_parse_article_missing_body() {
        let html = "<html><head><title>No paragraphs</title></head><body></body></html>";
        let err = parse_article("https://mit.edu/x", html, 10).unwrap_err();
        assert!(err.to_string().contains("missing body"));
    }

    #[test]
    fn test_recovers_rfc3339_meta_date() {
        let long = "Pattern recognition advances continued through the decade. ".repeat(10);
        let meta = r#"<meta property="article:published_time" content="1992-06-15T08:00:00+00:00">"#;
        let html = page("Dated", &[&long], meta);
        let article = parse_article("https://ieee.org/x", &html, 250).unwrap();
        assert_eq!(
            article.publish_date,
            Some(NaiveDate::from_ymd_opt(1992, 6, 15).unwrap())
        );
    }

    #[test]
    fn test_recovers_time_element_date() {
        let long = "Connectionism returned to favor among researchers. ".repeat(10);
        let html = format!(
            "<html><head><title>T</title></head><body><time datetime=\"1997-03-01\">March 1997</time>{}</body></html>",
            format!("<p>{}</p>", long)
        );
        let article = parse_article("https://cmu.edu/x", &html, 250).unwrap();
        assert_eq!(
            article.publish_date,
            Some(NaiveDate::from_ymd_opt(1997, 3, 1).unwrap())
        );
    }

    #[test]
    fn test_unparseable_meta_date_is_none() {
        let long = "Knowledge representation remained an open problem. ".repeat(10);
        let meta = r#"<meta name="date" content="sometime in the nineties">"#;
        let html = page("Undated", &[&long], meta);
        let article = parse_article("https://stanford.edu/x", &html, 250).unwrap();
        assert!(article.publish_date.is_none());
    }
}
