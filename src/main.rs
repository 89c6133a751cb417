//! # AI Time Capsule
//!
//! A discovery-and-synthesis pipeline that hunts for historical
//! (1985-2000) technology articles about artificial intelligence,
//! validates their relevance and era, feeds them to a generative model
//! to produce a new retrospective article, and renders the result as a
//! styled document indexed for a static site.
//!
//! ## Usage
//!
//! ```sh
//! GOOGLE_API_KEY=... GOOGLE_CSE_ID=... ai_time_capsule -c pipeline.yaml
//! ```
//!
//! ## Architecture
//!
//! One run is a bounded loop of attempts, fully sequential:
//! 1. **Sampling**: draw a uniform random month within the historical window
//! 2. **Searching**: query the Custom Search allowlist for that month
//! 3. **Scanning**: filter, extract, and validate candidates (shuffled)
//! 4. **Synthesizing**: one Gemini call over the accepted source articles
//! 5. **Committing**: write the assembled document and append to the index
//!
//! The loop stops at the configured success target or attempt ceiling;
//! the index is persisted either way.

use clap::Parser;
use std::error::Error;
use std::time::Duration;
use tracing::{debug, info, instrument};
use tracing_subscriber::{fmt as tfmt, EnvFilter};

mod assemble;
mod cli;
mod config;
mod extract;
mod filter;
mod models;
mod outputs;
mod query;
mod runner;
mod sampler;
mod search;
mod synthesis;
mod utils;
mod validate;

use cli::Cli;
use extract::PageExtractor;
use runner::RunController;
use search::SearchClient;
use synthesis::{GeminiClient, GeminiSynthesizer};
use utils::ensure_writable_dir;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("ai_time_capsule starting up");

    let args = Cli::parse();
    debug!(?args.config, ?args.output_dir, ?args.index_file, "Parsed CLI arguments");

    let mut pipeline_config = config::load_config(args.config.as_deref()).await?;
    if let Some(output_dir) = args.output_dir {
        pipeline_config.output_dir = output_dir;
    }
    if let Some(index_file) = args.index_file {
        pipeline_config.index_file = index_file;
    }

    // Early check: fail before the first attempt, not on the first success.
    ensure_writable_dir(&pipeline_config.output_dir).await?;

    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(pipeline_config.request_timeout_secs))
        .build()?;

    let search = SearchClient::new(
        http.clone(),
        args.google_api_key.clone(),
        args.google_cse_id.clone(),
    );
    let extractor = PageExtractor::new(http.clone(), pipeline_config.min_body_chars);
    let gemini = args.google_api_key.as_ref().map(|key| {
        GeminiClient::new(
            http.clone(),
            key.clone(),
            pipeline_config.gemini_model.clone(),
            pipeline_config.generation.clone(),
        )
    });
    let generator = GeminiSynthesizer::new(gemini, pipeline_config.prompt_chars_per_article);

    let index_file = pipeline_config.index_file.clone();
    let mut index = outputs::index::load_index(&index_file).await;
    let initial_count = index.len();

    let controller = RunController::new(pipeline_config);
    let report = controller
        .run(&search, &extractor, &generator, &mut index)
        .await;

    outputs::index::save_index(&index_file, &index).await?;

    let elapsed = start_time.elapsed();
    info!(
        attempts = report.attempts,
        added = report.successes,
        total_in_index = index.len(),
        previously_indexed = initial_count,
        secs = elapsed.as_secs(),
        "Run complete"
    );

    Ok(())
}
