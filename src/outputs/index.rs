//! The persisted generation index.
//!
//! A single JSON document holding the ordered list of [`CapsuleRecord`],
//! read once at start and overwritten once at the end of every run --
//! including runs that added nothing. A missing or corrupt file is
//! "start fresh" with a warning, never fatal: the site would rather lose
//! its listing than the run refuse to produce new content.

use crate::models::CapsuleRecord;
use std::error::Error;
use tokio::fs;
use tracing::{info, instrument, warn};

/// Load the persisted index, tolerating absence and corruption.
#[instrument(level = "info", fields(%path))]
pub async fn load_index(path: &str) -> Vec<CapsuleRecord> {
    let raw = match fs::read_to_string(path).await {
        Ok(raw) => raw,
        Err(_) => {
            info!("No existing index; starting fresh");
            return Vec::new();
        }
    };

    match serde_json::from_str(&raw) {
        Ok(records) => {
            let records: Vec<CapsuleRecord> = records;
            info!(count = records.len(), "Loaded index");
            records
        }
        Err(e) => {
            warn!(error = %e, "Corrupt or empty index file; starting fresh");
            Vec::new()
        }
    }
}

/// Overwrite the index file with the full record list, pretty-printed so
/// the document serializes deterministically for a given sequence.
#[instrument(level = "info", skip_all, fields(%path, count = records.len()))]
pub async fn save_index(path: &str, records: &[CapsuleRecord]) -> Result<(), Box<dyn Error>> {
    let json = serde_json::to_string_pretty(records)?;
    fs::write(path, json).await?;
    info!("Saved index");
    Ok(())
}
