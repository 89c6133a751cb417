//! Generative synthesis: prompt construction and the Gemini client.
//!
//! The prompt is the durable contract with the provider: it embeds each
//! source article (truncated to a per-article character budget) plus a
//! fixed structural instruction set -- one hook paragraph, sub-section
//! headings, a blockquote, an ordered list, highlight spans, and section
//! dividers. The assembler's marker extraction depends on that list, so
//! changing it changes what downstream parsing can rely on.
//!
//! # Architecture
//!
//! - [`GenerateAsync`]: core trait for one prompt-in, text-out call
//! - [`GeminiClient`]: implements it against the generateContent API
//! - [`RetryGenerate`]: decorator adding exponential backoff with jitter
//! - [`GeminiSynthesizer`]: the pipeline-facing collaborator that builds
//!   the prompt and runs the call behind the retry decorator
//!
//! Retries here cover transient transport faults within one attempt; any
//! other failure abandons the attempt and the run controller resamples a
//! new random month instead.

use crate::config::GenerationParams;
use crate::models::ExtractedArticle;
use rand::{rng, Rng};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt;
use std::time::{Duration as StdDuration, Instant};
use tokio::time::sleep;
use tracing::{error, info, instrument, warn};

const GEMINI_ENDPOINT: &str = "https://generativelanguage.googleapis.com";

/// Trait for one async generation call.
pub trait GenerateAsync {
    async fn generate(&self, prompt: &str) -> Result<String, Box<dyn Error>>;
}

/// Collaborator seam the run controller synthesizes through.
///
/// Returns the raw HTML fragment, or a failure that abandons the attempt.
pub trait FragmentGenerator {
    async fn synthesize(
        &self,
        articles: &[ExtractedArticle],
        date_label: &str,
    ) -> Result<String, Box<dyn Error>>;
}

/// Decorator that adds exponential backoff retry to any [`GenerateAsync`].
///
/// Delay formula: `min(base_delay * 2^(attempt-1), max_delay) + jitter(0..250ms)`.
pub struct RetryGenerate<T> {
    inner: T,
    max_retries: usize,
    base_delay: StdDuration,
    max_delay: StdDuration,
}

impl<T> RetryGenerate<T>
where
    T: GenerateAsync,
{
    pub fn new(inner: T, max_retries: usize, base_delay: StdDuration) -> Self {
        Self {
            inner,
            max_retries,
            base_delay,
            max_delay: StdDuration::from_secs(30),
        }
    }
}

impl<T> fmt::Debug for RetryGenerate<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryGenerate")
            .field("max_retries", &self.max_retries)
            .field("base_delay", &self.base_delay)
            .field("max_delay", &self.max_delay)
            .finish()
    }
}

impl<T> GenerateAsync for RetryGenerate<T>
where
    T: GenerateAsync,
{
    #[instrument(level = "info", skip_all)]
    async fn generate(&self, prompt: &str) -> Result<String, Box<dyn Error>> {
        let total_t0 = Instant::now();
        let mut attempt = 0usize;

        loop {
            let attempt_t0 = Instant::now();
            match self.inner.generate(prompt).await {
                Ok(resp) => return Ok(resp),
                Err(e) => {
                    attempt += 1;
                    let attempt_dt = attempt_t0.elapsed();
                    let total_dt = total_t0.elapsed();

                    if attempt > self.max_retries {
                        error!(
                            attempt,
                            max = self.max_retries,
                            elapsed_ms_attempt = attempt_dt.as_millis() as u64,
                            elapsed_ms_total = total_dt.as_millis() as u64,
                            error = %e,
                            "generate() exhausted retries"
                        );
                        return Err(e);
                    }

                    let mut delay = self.base_delay.saturating_mul(1 << (attempt - 1));
                    if delay > self.max_delay {
                        delay = self.max_delay;
                    }
                    let jitter_ms: u64 = rng().random_range(0..=250);
                    let delay = delay + StdDuration::from_millis(jitter_ms);

                    warn!(
                        attempt,
                        max = self.max_retries,
                        elapsed_ms_attempt = attempt_dt.as_millis() as u64,
                        elapsed_ms_total = total_dt.as_millis() as u64,
                        ?delay,
                        error = %e,
                        "generate() attempt failed; backing off"
                    );
                    sleep(delay).await;
                }
            }
        }
    }
}

// --- Wire format for generateContent ---

#[derive(Debug, Serialize, Deserialize)]
struct GeminiPart {
    text: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    max_output_tokens: u32,
    temperature: f32,
    top_p: f32,
    top_k: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    generation_config: GeminiGenerationConfig,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: GeminiContent,
}

#[derive(Debug, Deserialize)]
struct GeminiApiError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    candidates: Option<Vec<GeminiCandidate>>,
    error: Option<GeminiApiError>,
}

/// Client for the Gemini generateContent API.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
    params: GenerationParams,
    endpoint: String,
}

impl GeminiClient {
    pub fn new(
        http: reqwest::Client,
        api_key: String,
        model: String,
        params: GenerationParams,
    ) -> Self {
        Self {
            http,
            api_key,
            model,
            params,
            endpoint: GEMINI_ENDPOINT.to_string(),
        }
    }
}

impl GenerateAsync for GeminiClient {
    #[instrument(level = "info", skip_all, fields(model = %self.model, prompt_len = prompt.len()))]
    async fn generate(&self, prompt: &str) -> Result<String, Box<dyn Error>> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.endpoint, self.model
        );
        let request = GeminiRequest {
            contents: vec![GeminiContent {
                parts: vec![GeminiPart {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: GeminiGenerationConfig {
                max_output_tokens: self.params.max_output_tokens,
                temperature: self.params.temperature,
                top_p: self.params.top_p,
                top_k: self.params.top_k,
            },
        };

        let t0 = Instant::now();
        let response = self
            .http
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let parsed: GeminiResponse = response.json().await?;
        let dt = t0.elapsed();

        if let Some(api_error) = parsed.error {
            warn!(status = %status, elapsed_ms = dt.as_millis() as u64, "Generation API error");
            return Err(api_error.message.into());
        }

        let text = parsed
            .candidates
            .and_then(|mut c| {
                if c.is_empty() {
                    None
                } else {
                    Some(c.remove(0))
                }
            })
            .map(|c| {
                c.content
                    .parts
                    .into_iter()
                    .map(|p| p.text)
                    .collect::<String>()
            })
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err("generation returned no candidates".into());
        }

        info!(
            elapsed_ms = dt.as_millis() as u64,
            fragment_len = text.len(),
            "Generation succeeded"
        );
        Ok(text)
    }
}

/// Build the synthesis prompt for one attempt.
///
/// Each source article contributes a header block (title, URL, date,
/// domain) and a body excerpt capped at `chars_per_article` characters.
pub fn build_prompt(
    articles: &[ExtractedArticle],
    date_label: &str,
    chars_per_article: usize,
) -> String {
    let mut combined = String::new();
    for (i, article) in articles.iter().enumerate() {
        let date = article
            .publish_date
            .map(|d| d.to_string())
            .unwrap_or_else(|| "Unknown".to_string());
        let excerpt: String = article.text.chars().take(chars_per_article).collect();
        combined.push_str(&format!(
            "--- Source Article {} ---\nTitle: {}\nURL: {}\nPublished Date (as scraped): {}\nSource Domain: {}\nContent Excerpt:\n{}...\n\n",
            i + 1,
            article.title,
            article.url,
            date,
            article.source_domain,
            excerpt
        ));
    }

    format!(
        "You are an AI News Detective and public intellectual. Your mission is to delve into \
historical technology discussions about Artificial Intelligence from the era of {label}, based \
on the provided articles, and synthesize them into a novel, deeply insightful retrospective.\n\n\
Analyze the dominant ideas, prevailing paradigms, hopes, and fears of AI research in {label}. \
Identify specific, striking predictions that proved prescient when viewed from today, and the \
significant advancements they missed or could not conceptualize. Weave in natural references to \
the source articles.\n\n\
Strict HTML structure (crucial): output a direct, parseable HTML snippet with NO <html>, <head>, \
or <body> wrappers. Required elements:\n\
- Start with ONE thought-provoking <p class=\"hook\"> paragraph (extracted for the index).\n\
- Multiple standard <p> paragraphs.\n\
- At least ONE <blockquote> for a prominent past insight or quote.\n\
- At least TWO <h3> sub-sections.\n\
- At least ONE ordered list (<ol>) with <li> items of key takeaways.\n\
- <span class=\"highlight\"> around particularly prescient insights.\n\
- <hr class=\"section-divider\"> between major sections.\n\n\
Combined content from source articles (analyze these):\n{content}\n\
Your synthesized article (HTML formatted, directly insertable):\n",
        label = date_label,
        content = combined
    )
}

/// Pipeline-facing synthesizer: prompt build plus retried Gemini call.
#[derive(Debug, Clone)]
pub struct GeminiSynthesizer {
    client: Option<GeminiClient>,
    chars_per_article: usize,
}

impl GeminiSynthesizer {
    /// `client` is `None` when no API key was configured; synthesis then
    /// fails fast per attempt instead of burning the retry budget.
    pub fn new(client: Option<GeminiClient>, chars_per_article: usize) -> Self {
        if client.is_none() {
            error!("GOOGLE_API_KEY not set; synthesis will fail every attempt");
        }
        Self {
            client,
            chars_per_article,
        }
    }
}

impl FragmentGenerator for GeminiSynthesizer {
    #[instrument(level = "info", skip_all, fields(sources = articles.len(), %date_label))]
    async fn synthesize(
        &self,
        articles: &[ExtractedArticle],
        date_label: &str,
    ) -> Result<String, Box<dyn Error>> {
        let Some(client) = &self.client else {
            return Err("generation client not configured".into());
        };
        if articles.is_empty() {
            return Err("no articles provided for synthesis".into());
        }

        let prompt = build_prompt(articles, date_label, self.chars_per_article);
        let api = RetryGenerate::new(client.clone(), 5, StdDuration::from_secs(1));
        let fragment = api.generate(&prompt).await?;
        if fragment.trim().is_empty() {
            return Err("generation returned empty fragment".into());
        }
        Ok(fragment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn article(title: &str, text: &str) -> ExtractedArticle {
        ExtractedArticle {
            title: title.to_string(),
            text: text.to_string(),
            url: "https://aaai.org/x".to_string(),
            publish_date: None,
            source_domain: "aaai.org".to_string(),
        }
    }

    #[test]
    fn test_build_prompt_truncates_each_article_body() {
        let long = "x".repeat(5000);
        let articles = vec![article("A", &long), article("B", &long)];
        let prompt = build_prompt(&articles, "May 1990", 100);
        // Two excerpts of 100 chars each, never the full 10k.
        assert!(prompt.len() < 3000);
        assert!(prompt.contains("--- Source Article 1 ---"));
        assert!(prompt.contains("--- Source Article 2 ---"));
    }

    #[test]
    fn test_build_prompt_carries_date_label_and_contract() {
        let articles = vec![article("Expert Systems", "body")];
        let prompt = build_prompt(&articles, "March 1987", 3000);
        assert!(prompt.contains("March 1987"));
        assert!(prompt.contains("<p class=\"hook\">"));
        assert!(prompt.contains("<blockquote>"));
        assert!(prompt.contains("<ol>"));
        assert!(prompt.contains("section-divider"));
    }

    #[test]
    fn test_gemini_request_wire_shape() {
        let request = GeminiRequest {
            contents: vec![GeminiContent {
                parts: vec![GeminiPart {
                    text: "hello".to_string(),
                }],
            }],
            generation_config: GeminiGenerationConfig {
                max_output_tokens: 2500,
                temperature: 0.8,
                top_p: 0.95,
                top_k: 40,
            },
        };
        let json = serde_json::to_string(&request).unwrap();
        assert!(json.contains("\"generationConfig\""));
        assert!(json.contains("\"maxOutputTokens\":2500"));
        assert!(json.contains("\"topP\""));
        assert!(json.contains("\"topK\""));
    }

    #[test]
    fn test_gemini_response_error_decoding() {
        let body = r#"{"error": {"message": "quota exceeded", "code": 429}}"#;
        let parsed: GeminiResponse = serde_json::from_str(body).unwrap();
        assert!(parsed.candidates.is_none());
        assert_eq!(parsed.error.unwrap().message, "quota exceeded");
    }

    #[test]
    fn test_gemini_response_candidate_decoding() {
        let body = r#"{"candidates": [{"content": {"parts": [{"text": "<p>hi</p>"}]}}]}"#;
        let parsed: GeminiResponse = serde_json::from_str(body).unwrap();
        let text: String = parsed.candidates.unwrap()[0]
            .content
            .parts
            .iter()
            .map(|p| p.text.clone())
            .collect();
        assert_eq!(text, "<p>hi</p>");
    }

    struct FlakyGenerate {
        calls: AtomicUsize,
        fail_first: usize,
    }

    impl GenerateAsync for FlakyGenerate {
        async fn generate(&self, _prompt: &str) -> Result<String, Box<dyn Error>> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if n < self.fail_first {
                Err("transient".into())
            } else {
                Ok("<p class=\"hook\">ok</p>".to_string())
            }
        }
    }

    #[tokio::test]
    async fn test_retry_generate_recovers_from_transient_failures() {
        let inner = FlakyGenerate {
            calls: AtomicUsize::new(0),
            fail_first: 2,
        };
        let api = RetryGenerate::new(inner, 5, StdDuration::from_millis(1));
        let out = api.generate("p").await.unwrap();
        assert!(out.contains("hook"));
    }

    #[tokio::test]
    async fn test_retry_generate_gives_up_after_budget() {
        let inner = FlakyGenerate {
            calls: AtomicUsize::new(0),
            fail_first: usize::MAX,
        };
        let api = RetryGenerate::new(inner, 2, StdDuration::from_millis(1));
        assert!(api.generate("p").await.is_err());
    }

    #[tokio::test]
    async fn test_synthesizer_without_client_fails_fast() {
        let synthesizer = GeminiSynthesizer::new(None, 3000);
        let err = synthesizer
            .synthesize(&[article("T", "body")], "May 1990")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("not configured"));
    }
}
