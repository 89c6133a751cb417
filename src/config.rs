//! Pipeline configuration.
//!
//! Every knob the attempt loop turns lives here as data: keyword sets,
//! site allowlist, link denylists, the historical window, attempt/target
//! counts, timeouts, and generation parameters. The whole struct
//! deserializes from an optional YAML file with per-field defaults, so a
//! missing file means "run with stock configuration" rather than an error.

use serde::{Deserialize, Serialize};
use std::error::Error;
use tracing::{info, instrument};

/// Sampling parameters for the generation call.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GenerationParams {
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_top_p")]
    pub top_p: f32,
    #[serde(default = "default_top_k")]
    pub top_k: u32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            max_output_tokens: default_max_output_tokens(),
            temperature: default_temperature(),
            top_p: default_top_p(),
            top_k: default_top_k(),
        }
    }
}

/// Full pipeline configuration.
///
/// The historical window is inclusive on both ends. Delays are plain
/// fixed backoffs; resampling a new random month is the resilience
/// strategy, not adaptive retry.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Vocabulary used for relevance judgement, matched case-insensitively
    /// as substrings against titles, snippets, and full body text.
    pub topic_keywords: Vec<String>,
    /// Publication-type terms ORed into the search query.
    pub publication_keywords: Vec<String>,
    /// Site allowlist turned into `site:` operators, biasing results
    /// toward archival and academic hosts likely to index 1985-2000 content.
    pub target_domains: Vec<String>,
    /// Path fragments that mark a link as a non-article page.
    pub denied_link_fragments: Vec<String>,
    /// File extensions never worth an extraction attempt.
    pub denied_extensions: Vec<String>,
    /// Hosting/cloud/social domains that never carry historical articles.
    pub denied_platform_domains: Vec<String>,

    /// First year of the historical window, inclusive.
    pub start_year: i32,
    /// Last year of the historical window, inclusive.
    pub end_year: i32,

    /// Successes to commit before the run stops.
    pub target_successes: usize,
    /// Attempt ceiling; sparse historical search means most sampled months
    /// yield nothing, so the loop must terminate deterministically.
    pub max_attempts: usize,
    /// Cap on source articles fed to one synthesis.
    pub max_articles_per_run: usize,
    /// Minimum body length for an extraction to count.
    pub min_body_chars: usize,
    /// Results requested per search call (provider max is 10).
    pub search_result_count: u8,
    /// Per-article character budget when building the synthesis prompt.
    pub prompt_chars_per_article: usize,

    /// Timeout applied to every outbound HTTP call.
    pub request_timeout_secs: u64,
    /// Pause between extraction attempts within one scan.
    pub politeness_delay_ms: u64,
    /// Pause after an attempt that found no candidates.
    pub empty_search_backoff_ms: u64,
    /// Pause after an attempt whose scan accepted no articles.
    pub no_articles_backoff_ms: u64,
    /// Pause after a full attempt cycle, successful or not.
    pub attempt_pause_ms: u64,

    /// Gemini model name for the generation call.
    pub gemini_model: String,
    /// Generation sampling parameters.
    pub generation: GenerationParams,

    /// Directory generated documents are written into.
    pub output_dir: String,
    /// Path of the persisted JSON index.
    pub index_file: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            topic_keywords: [
                "artificial intelligence",
                "machine learning",
                "deep learning",
                "neural network",
                "robotics",
                "computer vision",
                "expert system",
                "neural computing",
                "connectionism",
                "symbolic ai",
                "cognitive science",
                "knowledge representation",
                "fuzzy logic",
                "genetic algorithms",
                "cybernetics",
                "pattern recognition",
                "ai winter",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            publication_keywords: [
                "paper",
                "proceedings",
                "journal",
                "report",
                "technical report",
                "conference",
                "symposium",
                "magazine",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            target_domains: [
                "aaai.org",
                "jair.org",
                "mit.edu",
                "stanford.edu",
                "cmu.edu",
                "berkeley.edu",
                "ieee.org",
                "spectrum.ieee.org",
                "acm.org",
                "dl.acm.org",
                "sciencedirect.com",
                "onlinelibrary.wiley.com",
                "wired.com",
                "sciencedaily.com",
                "ijcai.org",
                "nips.cc",
                "icml.cc",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            denied_link_fragments: [
                "forum", "forums", "discussion", "comments", "blog", "/tag/", "/category/",
                "masthead", "contact", "about", "member", "privacy", "legal", "jobs", "careers",
                "login", "signup", "shop", "subscribe", "cart", "robots.txt",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            denied_extensions: [
                ".zip", ".exe", ".jpg", ".jpeg", ".png", ".gif", ".css", ".js", ".xml",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            denied_platform_domains: [
                "github.com",
                "aws.amazon.com",
                "azure.microsoft.com",
                "cloud.google.com",
                "facebook.com",
                "twitter.com",
                "linkedin.com",
                "support.google.com",
                "jobs.google.com",
                "developers.google.com",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            start_year: 1985,
            end_year: 2000,
            target_successes: 1,
            max_attempts: 100,
            max_articles_per_run: 3,
            min_body_chars: 250,
            search_result_count: 10,
            prompt_chars_per_article: 3000,
            request_timeout_secs: 25,
            politeness_delay_ms: 1500,
            empty_search_backoff_ms: 2000,
            no_articles_backoff_ms: 3000,
            attempt_pause_ms: 5000,
            gemini_model: "gemini-1.5-pro".to_string(),
            generation: GenerationParams::default(),
            output_dir: "generated_articles".to_string(),
            index_file: "ai_analyses_index.json".to_string(),
        }
    }
}

impl PipelineConfig {
    /// Reject configurations the pipeline cannot run with.
    ///
    /// The month sampler draws from `start_year..=end_year`; a reversed
    /// window must surface as a load-time error, not a panic mid-run.
    pub fn validate(&self) -> Result<(), Box<dyn Error>> {
        if self.start_year > self.end_year {
            return Err(format!(
                "start_year {} is after end_year {}",
                self.start_year, self.end_year
            )
            .into());
        }
        Ok(())
    }
}

fn default_max_output_tokens() -> u32 {
    2500
}
fn default_temperature() -> f32 {
    0.8
}
fn default_top_p() -> f32 {
    0.95
}
fn default_top_k() -> u32 {
    40
}

/// Load configuration from an optional YAML path.
///
/// `None` yields the stock configuration. A present-but-unreadable or
/// unparseable file is an error: a user who pointed at a config file
/// should not silently run with defaults.
#[instrument(level = "info")]
pub async fn load_config(path: Option<&str>) -> Result<PipelineConfig, Box<dyn Error>> {
    match path {
        None => {
            info!("No config file given; using stock configuration");
            Ok(PipelineConfig::default())
        }
        Some(p) => {
            let raw = tokio::fs::read_to_string(p).await?;
            let config: PipelineConfig = serde_yaml::from_str(&raw)?;
            config.validate()?;
            info!(path = p, "Loaded pipeline configuration");
            Ok(config)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_cover_historical_window() {
        let config = PipelineConfig::default();
        assert_eq!(config.start_year, 1985);
        assert_eq!(config.end_year, 2000);
        assert_eq!(config.target_successes, 1);
        assert!(config.max_attempts >= 1);
        assert!(config.max_articles_per_run >= 1);
    }

    #[test]
    fn test_partial_yaml_fills_defaults() {
        let yaml = "start_year: 1990\nend_year: 1995\nmax_attempts: 5\n";
        let config: PipelineConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.start_year, 1990);
        assert_eq!(config.end_year, 1995);
        assert_eq!(config.max_attempts, 5);
        // Untouched fields come from the defaults.
        assert_eq!(config.min_body_chars, 250);
        assert!(!config.topic_keywords.is_empty());
        assert_eq!(config.generation.max_output_tokens, 2500);
    }

    #[test]
    fn test_reversed_year_window_is_a_load_error() {
        let yaml = "start_year: 2000\nend_year: 1985\n";
        let config: PipelineConfig = serde_yaml::from_str(yaml).unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("start_year 2000 is after end_year 1985"));
    }

    #[test]
    fn test_default_config_validates() {
        assert!(PipelineConfig::default().validate().is_ok());
    }

    #[test]
    fn test_generation_params_partial() {
        let yaml = "generation:\n  temperature: 0.2\n";
        let config: PipelineConfig = serde_yaml::from_str(yaml).unwrap();
        assert!((config.generation.temperature - 0.2).abs() < f32::EPSILON);
        assert_eq!(config.generation.top_k, 40);
    }
}
