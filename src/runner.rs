//! The run controller: the discovery-and-validation attempt loop.
//!
//! Each attempt samples a fresh random historical month, searches it,
//! scans the (shuffled, URL-deduped) candidates through the cheap filter,
//! the extractor, and the validator, then spends one generation call on
//! whatever survived. The loop ends when the success target is met or the
//! attempt budget runs out; budget exhaustion with zero successes is a
//! normal terminal outcome, not an error.
//!
//! Resilience is resampling, not retrying: a failed URL or a barren month
//! is abandoned and the next attempt draws a new random date. Delays are
//! fixed politeness pauses, never adaptive.

use crate::assemble::{assemble, featured_image_url};
use crate::config::PipelineConfig;
use crate::extract::ContentExtractor;
use crate::filter::LinkFilter;
use crate::models::CapsuleRecord;
use crate::outputs::html::write_document;
use crate::query::build_query;
use crate::sampler::{month_label, sample_month};
use crate::search::SearchProvider;
use crate::synthesis::FragmentGenerator;
use crate::utils::{timestamp_slug, truncate_for_log};
use crate::validate::RelevanceValidator;
use chrono::Local;
use itertools::Itertools;
use rand::seq::SliceRandom;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, error, info, instrument, warn};

/// What a run accomplished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunReport {
    /// Attempt cycles consumed.
    pub attempts: usize,
    /// Records committed to the index.
    pub successes: usize,
}

/// Drives the attempt loop over injected collaborators.
#[derive(Debug)]
pub struct RunController {
    config: PipelineConfig,
    filter: LinkFilter,
    validator: RelevanceValidator,
}

impl RunController {
    pub fn new(config: PipelineConfig) -> Self {
        let filter = LinkFilter::new(
            &config.topic_keywords,
            &config.denied_link_fragments,
            &config.denied_extensions,
            &config.denied_platform_domains,
        );
        let validator =
            RelevanceValidator::new(&config.topic_keywords, config.start_year, config.end_year);
        Self {
            config,
            filter,
            validator,
        }
    }

    /// Run attempts until the success target or the attempt budget is hit.
    ///
    /// Committed records are appended to `index` in generation order; the
    /// caller persists the index afterwards regardless of the outcome.
    #[instrument(level = "info", skip_all)]
    pub async fn run<S, E, G>(
        &self,
        search: &S,
        extractor: &E,
        generator: &G,
        index: &mut Vec<CapsuleRecord>,
    ) -> RunReport
    where
        S: SearchProvider,
        E: ContentExtractor,
        G: FragmentGenerator,
    {
        let cfg = &self.config;
        let mut successes = 0usize;
        let mut attempts = 0usize;

        while successes < cfg.target_successes && attempts < cfg.max_attempts {
            attempts += 1;

            let (year, month) = {
                let mut rng = rand::rng();
                sample_month(&mut rng, cfg.start_year, cfg.end_year)
            };
            let date_label = month_label(year, month);
            info!(
                attempt = attempts,
                max = cfg.max_attempts,
                %date_label,
                "Searching for articles"
            );

            let query = build_query(
                &cfg.topic_keywords,
                &cfg.publication_keywords,
                &cfg.target_domains,
                &date_label,
            );
            let mut candidates = search
                .search(&query, cfg.search_result_count)
                .await
                .into_iter()
                .unique_by(|c| c.link.clone())
                .collect::<Vec<_>>();

            if candidates.is_empty() {
                info!(%date_label, "No search results; trying next date");
                sleep(Duration::from_millis(cfg.empty_search_backoff_ms)).await;
                continue;
            }

            // Shuffle so repeated runs don't always chase the top-ranked hit.
            {
                let mut rng = rand::rng();
                candidates.shuffle(&mut rng);
            }

            let mut accepted = Vec::new();
            for candidate in &candidates {
                if accepted.len() >= cfg.max_articles_per_run {
                    break;
                }
                if !self.filter.accept(candidate) {
                    continue;
                }

                match extractor.extract(&candidate.link).await {
                    Ok(article) => match self.validator.validate(&article) {
                        Ok(()) => {
                            info!(
                                title = %article.title,
                                count = accepted.len() + 1,
                                "Accepted article for synthesis"
                            );
                            accepted.push(article);
                        }
                        Err(reason) => {
                            info!(link = %candidate.link, %reason, "Validator rejected article");
                        }
                    },
                    Err(e) => {
                        info!(link = %candidate.link, error = %e, "Extraction failed; skipping");
                    }
                }
                sleep(Duration::from_millis(cfg.politeness_delay_ms)).await;
            }

            if accepted.is_empty() {
                info!(%date_label, "No suitable articles after scanning; trying next date");
                sleep(Duration::from_millis(cfg.no_articles_backoff_ms)).await;
                continue;
            }

            info!(
                sources = accepted.len(),
                %date_label,
                "Requesting synthesis"
            );
            match generator.synthesize(&accepted, &date_label).await {
                Ok(fragment) => {
                    debug!(
                        preview = %truncate_for_log(&fragment, 300),
                        "Generated fragment received"
                    );
                    let image_url = featured_image_url();
                    let document = assemble(&fragment, &date_label, &image_url);
                    let slug = timestamp_slug();

                    match write_document(&cfg.output_dir, &slug, &document.html).await {
                        Ok(html_path) => {
                            index.push(CapsuleRecord {
                                id: format!("analysis_{}", slug),
                                title: document.title,
                                summary: document.hook,
                                html_path,
                                generated_date: Local::now().to_rfc3339(),
                                original_sources_count: accepted.len(),
                                featured_image: image_url,
                            });
                            successes += 1;
                            info!(%slug, successes, "Committed new analysis article");
                        }
                        Err(e) => {
                            error!(error = %e, "Failed to write generated document; attempt abandoned");
                        }
                    }
                }
                Err(e) => {
                    warn!(error = %e, "Generation failed for this attempt");
                }
            }
            sleep(Duration::from_millis(cfg.attempt_pause_ms)).await;
        }

        info!(attempts, successes, "Run loop finished");
        RunReport {
            attempts,
            successes,
        }
    }
}
