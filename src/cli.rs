//! Command-line interface definitions.
//!
//! All options can be given as flags or environment variables; credentials
//! are expected via the environment in normal operation.

use clap::Parser;

/// Command-line arguments for the AI Time Capsule pipeline.
///
/// # Examples
///
/// ```sh
/// # Stock configuration, credentials from the environment
/// GOOGLE_API_KEY=... GOOGLE_CSE_ID=... ai_time_capsule
///
/// # Custom config file and output locations
/// ai_time_capsule -c pipeline.yaml -o ./site/generated_articles --index-file ./site/ai_analyses_index.json
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Optional path to a YAML pipeline configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Output directory for generated HTML documents (overrides config)
    #[arg(short, long)]
    pub output_dir: Option<String>,

    /// Path of the JSON index file (overrides config)
    #[arg(long)]
    pub index_file: Option<String>,

    /// Google Cloud API key, used for both Custom Search and Gemini
    #[arg(long, env = "GOOGLE_API_KEY")]
    pub google_api_key: Option<String>,

    /// Google Custom Search Engine identifier
    #[arg(long, env = "GOOGLE_CSE_ID")]
    pub google_cse_id: Option<String>,
}
