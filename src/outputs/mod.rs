//! Output persistence: the JSON index and the generated HTML documents.
//!
//! # Submodules
//!
//! - [`index`]: load/append/save for the site's JSON listing index
//! - [`html`]: writes one self-contained document per successful synthesis
//!
//! # Output structure
//!
//! ```text
//! ai_analyses_index.json          # ordered list of CapsuleRecord
//! generated_articles/
//! └── ai_analysis_<timestamp>.html
//! ```

pub mod html;
pub mod index;
