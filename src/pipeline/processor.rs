//! Ingest pipeline: classifies a snippet, resolves its section, writes the page.
//!
//! Flow:
//! 1. Classifier (pure) → routed message with a target section name
//! 2. Section resolver → section id, or a hard "not found"
//! 3. Page creation → created page, or a queued single retry
//!
//! An unresolved section is never replaced by a default section.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{GraphError, PipelineError};
use crate::graph::{CreatedPage, PageSink};
use crate::pipeline::queue::{PendingPage, RetryQueue};
use crate::pipeline::rules::Classifier;
use crate::pipeline::types::RoutedMessage;
use crate::sections::SectionResolver;

/// Result of ingesting one snippet.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum IngestOutcome {
    /// The page was written.
    Created {
        page: CreatedPage,
        section_id: String,
        routed: RoutedMessage,
    },
    /// Page creation failed; the page waits in the retry queue.
    Queued {
        entry_id: Uuid,
        section_id: String,
        routed: RoutedMessage,
    },
}

impl IngestOutcome {
    pub fn routed(&self) -> &RoutedMessage {
        match self {
            IngestOutcome::Created { routed, .. } | IngestOutcome::Queued { routed, .. } => routed,
        }
    }
}

/// Classifier + resolver + page sink.
pub struct LifelogPipeline {
    classifier: Classifier,
    resolver: SectionResolver,
    pages: Arc<dyn PageSink>,
    retries: Arc<RetryQueue>,
}

impl LifelogPipeline {
    pub fn new(
        classifier: Classifier,
        resolver: SectionResolver,
        pages: Arc<dyn PageSink>,
        retries: Arc<RetryQueue>,
    ) -> Self {
        Self {
            classifier,
            resolver,
            pages,
            retries,
        }
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    pub fn resolver(&self) -> &SectionResolver {
        &self.resolver
    }

    pub fn retries(&self) -> &Arc<RetryQueue> {
        &self.retries
    }

    pub fn pages(&self) -> &Arc<dyn PageSink> {
        &self.pages
    }

    /// Classify `text` and write it to its section.
    ///
    /// Missing tokens fail immediately; any other page-creation failure is
    /// queued for one retry.
    pub async fn ingest(
        &self,
        text: &str,
        source: Option<&str>,
    ) -> Result<IngestOutcome, PipelineError> {
        let routed = self.classifier.classify(text);
        info!(
            category = %routed.category,
            section = %routed.section,
            source = source.unwrap_or("unknown"),
            "Snippet classified"
        );

        let Some(section_id) = self.resolver.resolve(&routed.section).await else {
            return Err(PipelineError::SectionNotFound {
                section: routed.section,
            });
        };

        match self
            .pages
            .create_page(
                &section_id,
                &routed.title,
                &routed.html,
                &routed.classified_at,
            )
            .await
        {
            Ok(page) => Ok(IngestOutcome::Created {
                page,
                section_id,
                routed,
            }),
            Err(GraphError::Unauthorized) => Err(GraphError::Unauthorized.into()),
            Err(e) => {
                warn!(section = %routed.section, error = %e, "Page creation failed, queueing");
                let entry = PendingPage::new(
                    &routed.section,
                    &section_id,
                    &routed.title,
                    &routed.html,
                    &routed.classified_at,
                    e.to_string(),
                )
                .with_source(source);
                let entry_id = self.retries.push(entry).await;
                Ok(IngestOutcome::Queued {
                    entry_id,
                    section_id,
                    routed,
                })
            }
        }
    }
}
