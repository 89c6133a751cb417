//! Generated document writer.
//!
//! One self-contained HTML file per successful synthesis, named by the
//! run's timestamp slug. Paths recorded in the index use forward slashes
//! regardless of platform, since the static site serves them as URLs.

use std::error::Error;
use tokio::fs;
use tracing::{info, instrument};

/// Write one generated document, returning the site-relative path.
#[instrument(level = "info", skip_all, fields(%output_dir, %slug))]
pub async fn write_document(
    output_dir: &str,
    slug: &str,
    html: &str,
) -> Result<String, Box<dyn Error>> {
    fs::create_dir_all(output_dir).await?;
    let relative_path = format!(
        "{}/ai_analysis_{}.html",
        output_dir.trim_end_matches('/'),
        slug
    );
    fs::write(&relative_path, html).await?;
    info!(path = %relative_path, bytes = html.len(), "Wrote generated document");
    Ok(relative_path.replace('\\', "/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_write_document_creates_dir_and_file() {
        let dir = std::env::temp_dir().join(format!("capsule_docs_{}", std::process::id()));
        let dir_str = dir.to_str().unwrap();

        let path = write_document(dir_str, "20260829120000", "<html></html>")
            .await
            .unwrap();
        assert!(path.ends_with("ai_analysis_20260829120000.html"));

        let written = tokio::fs::read_to_string(&path).await.unwrap();
        assert_eq!(written, "<html></html>");

        let _ = tokio::fs::remove_dir_all(&dir).await;
    }

    #[tokio::test]
    async fn test_write_document_path_uses_forward_slashes() {
        let dir = std::env::temp_dir().join(format!("capsule_docs_fs_{}", std::process::id()));
        let dir_str = dir.to_str().unwrap();
        let path = write_document(dir_str, "1", "<p></p>").await.unwrap();
        assert!(!path.contains('\\'));
        let _ = tokio::fs::remove_dir_all(&dir).await;
    }
}
