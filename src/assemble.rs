//! Document assembly: marker extraction and the page skeleton.
//!
//! The generated fragment is untrusted text. A leading `<h1>` supplies the
//! document title and a `<p class="hook">` supplies the index summary;
//! both are located by structural pattern match against the markers the
//! synthesis contract requires. When a marker is absent the fallback path
//! produces deterministic defaults from the date label -- an explicit
//! branch, not a side effect of failed matching. The rest of the fragment
//! is embedded verbatim; no validation of its HTML is attempted.

use once_cell::sync::Lazy;
use rand::{rng, Rng};
use regex::Regex;

static H1_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)<h1[^>]*>(.*?)</h1>").unwrap());
static HOOK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?is)<p\s+class="hook"[^>]*>(.*?)</p>"#).unwrap());

/// A complete output document plus the metadata the index needs.
#[derive(Debug, Clone)]
pub struct AssembledDocument {
    /// Extracted or fallback title.
    pub title: String,
    /// Extracted or fallback hook summary.
    pub hook: String,
    /// The full, self-contained HTML page.
    pub html: String,
}

/// Deterministic fallback title for a date label.
pub fn fallback_title(date_label: &str) -> String {
    format!("AI in the Era of {}", date_label)
}

const FALLBACK_HOOK: &str =
    "An insightful look back at historical AI concepts and their prescience.";

/// Random Unsplash header image URL with a cache-busting signature.
pub fn featured_image_url() -> String {
    let sig: u32 = rng().random_range(1..=1_000_000);
    format!(
        "https://source.unsplash.com/random/1080x720?technology,abstract,futuristic,circuit,neural,network,data,ai&sig={}",
        sig
    )
}

/// Wrap a generated fragment into a complete document.
///
/// Extracts the title and hook markers (removing each from the embedded
/// body once), falling back to defaults derived from `date_label` when a
/// marker is missing.
pub fn assemble(fragment: &str, date_label: &str, image_url: &str) -> AssembledDocument {
    let mut body = fragment.trim().to_string();

    let extracted_title = H1_RE.captures(&body).map(|caps| caps[1].trim().to_string());
    let title = match extracted_title {
        Some(title) => {
            body = H1_RE.replacen(&body, 1, "").trim().to_string();
            title
        }
        None => fallback_title(date_label),
    };

    let extracted_hook = HOOK_RE.captures(&body).map(|caps| caps[1].trim().to_string());
    let hook = match extracted_hook {
        Some(hook) => {
            body = HOOK_RE.replacen(&body, 1, "").trim().to_string();
            hook
        }
        None => FALLBACK_HOOK.to_string(),
    };

    let html = render_page(&title, &hook, &body, date_label, image_url);
    AssembledDocument { title, hook, html }
}

fn render_page(title: &str, hook: &str, body: &str, date_label: &str, image_url: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>{title} - AI Time Capsule</title>
<style>
:root{{--text-color:#E0E0E0;--bg-color:#111;--panel-border-color:#444;--highlight-color:#00BFFF;--quote-border-color:#4A90E2}}
body{{font-family:'Lora',serif;line-height:1.8;color:var(--text-color);background-color:var(--bg-color);margin:0;padding:2rem}}
.main-container{{max-width:800px;margin:2rem auto}}
.main-header{{text-align:center;margin-bottom:2rem}}
h1{{font-family:'Source Code Pro',monospace;font-size:2.8rem;color:#FFF;text-transform:uppercase;letter-spacing:.3em;margin:0}}
.article-image{{width:100%;height:auto;margin-bottom:2rem;border:1px solid var(--panel-border-color)}}
.content-panel{{background-color:rgba(18,18,18,.9);border:1px solid var(--panel-border-color);padding:2.5rem}}
.content-panel .hook{{font-size:1.3rem;font-style:italic;color:#BDBDBD;margin-bottom:2rem}}
.content-panel h3{{font-family:'Source Code Pro',monospace;font-size:1.5rem;margin-top:2.5rem;color:#FFF}}
.content-panel blockquote{{font-size:1.4rem;font-style:italic;border-left:4px solid var(--quote-border-color);padding-left:1.5rem;margin:2.5rem 0;color:#A7C7E7}}
.content-panel .highlight{{background-color:rgba(0,191,255,.15);padding:.1rem .3rem}}
.content-panel .section-divider{{border:0;height:1px;background-color:#444;margin:3rem 0}}
.action-button{{font-family:'Source Code Pro',monospace;color:var(--highlight-color);border:2px solid var(--highlight-color);padding:.7rem 1.2rem;text-decoration:none}}
</style>
</head>
<body>
<div class="main-container">
    <header class="main-header">
        <h1>{title}</h1>
        <p>A Historical AI Insight from {date_label}</p>
    </header>
    <main class="content-wrapper">
        <img src="{image_url}" alt="AI themed abstract image" class="article-image">
        <div class="content-panel">
            <p class="hook">{hook}</p>
            {body}
        </div>
        <div class="button-container">
            <a href="index.html" class="action-button">[ Back to Home ]</a>
            <a href="ai-time-capsule.html" class="action-button">[ Back to AI Time Capsule Index ]</a>
        </div>
    </main>
</div>
</body>
</html>
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assemble_extracts_markers() {
        let fragment = r#"<h1>The Echoes of 1990</h1>
<p class="hook">What they saw coming.</p>
<p>Body paragraph.</p>"#;
        let doc = assemble(fragment, "May 1990", "https://img.example/x.jpg");
        assert_eq!(doc.title, "The Echoes of 1990");
        assert_eq!(doc.hook, "What they saw coming.");
        // The extracted h1 must not appear a second time inside the panel.
        assert_eq!(doc.html.matches("The Echoes of 1990").count(), 2); // <title> + header
        assert!(doc.html.contains("<p>Body paragraph.</p>"));
    }

    #[test]
    fn test_assemble_fallback_branch_when_markers_absent() {
        let fragment = "<p>Just paragraphs, no markers.</p>";
        let doc = assemble(fragment, "March 1987", "https://img.example/x.jpg");
        assert_eq!(doc.title, "AI in the Era of March 1987");
        assert_eq!(doc.hook, FALLBACK_HOOK);
        assert!(doc.html.contains("<p>Just paragraphs, no markers.</p>"));
    }

    #[test]
    fn test_assemble_extracts_only_first_h1() {
        let fragment = "<h1>First</h1><p>x</p><h1>Second</h1>";
        let doc = assemble(fragment, "May 1990", "u");
        assert_eq!(doc.title, "First");
        assert!(doc.html.contains("<h1>Second</h1>"));
    }

    #[test]
    fn test_assemble_markers_match_case_insensitively_across_lines() {
        let fragment = "<H1>\nSpread Title\n</H1><P CLASS=\"hook\">hooked</P><p>b</p>";
        let doc = assemble(fragment, "May 1990", "u");
        assert_eq!(doc.title, "Spread Title");
        // Uppercase P attribute form is matched by the same grammar.
        assert_eq!(doc.hook, "hooked");
    }

    #[test]
    fn test_page_embeds_date_label_and_image() {
        let doc = assemble("<p>b</p>", "October 1995", "https://img.example/pic.jpg");
        assert!(doc.html.contains("A Historical AI Insight from October 1995"));
        assert!(doc.html.contains("https://img.example/pic.jpg"));
    }

    #[test]
    fn test_featured_image_url_shape() {
        let url = featured_image_url();
        assert!(url.starts_with("https://source.unsplash.com/random/1080x720?"));
        assert!(url.contains("&sig="));
    }
}
