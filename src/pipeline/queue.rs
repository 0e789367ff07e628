//! Retry queue: in-memory list of page creations that failed once.
//!
//! Each entry gets exactly one more attempt from the periodic sweep. A
//! second failure is terminal and logged; nothing is retried again.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::graph::PageSink;

/// Terminal entries kept for inspection.
const KEEP_TERMINAL: usize = 100;

/// Lifecycle of a queued page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RetryStatus {
    /// Waiting for its retry.
    Pending,
    /// Claimed by a running sweep.
    Retrying,
    /// Retry succeeded.
    Delivered,
    /// Retry failed; dropped.
    Failed,
}

impl RetryStatus {
    fn is_terminal(&self) -> bool {
        matches!(self, RetryStatus::Delivered | RetryStatus::Failed)
    }
}

/// A page whose first creation attempt failed.
#[derive(Debug, Clone, Serialize)]
pub struct PendingPage {
    pub id: Uuid,
    pub section: String,
    pub section_id: String,
    pub title: String,
    pub html: String,
    /// Classification time stamped on the page, kept for the retry.
    pub created: String,
    pub source: Option<String>,
    pub status: RetryStatus,
    pub first_error: String,
    pub last_error: Option<String>,
    pub page_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PendingPage {
    pub fn new(
        section: impl Into<String>,
        section_id: impl Into<String>,
        title: impl Into<String>,
        html: impl Into<String>,
        created: impl Into<String>,
        first_error: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            section: section.into(),
            section_id: section_id.into(),
            title: title.into(),
            html: html.into(),
            created: created.into(),
            source: None,
            status: RetryStatus::Pending,
            first_error: first_error.into(),
            last_error: None,
            page_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_source(mut self, source: Option<&str>) -> Self {
        self.source = source.map(String::from);
        self
    }
}

/// Outcome counts of one sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RetrySummary {
    pub delivered: usize,
    pub failed: usize,
}

/// In-memory retry queue.
pub struct RetryQueue {
    entries: RwLock<VecDeque<PendingPage>>,
}

impl RetryQueue {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            entries: RwLock::new(VecDeque::new()),
        })
    }

    /// Queue a failed page. Returns its entry id.
    pub async fn push(&self, entry: PendingPage) -> Uuid {
        let id = entry.id;
        info!(
            entry_id = %id,
            section = %entry.section,
            error = %entry.first_error,
            "Page queued for retry"
        );
        self.entries.write().await.push_back(entry);
        id
    }

    /// Entries still waiting for their retry.
    pub async fn pending(&self) -> Vec<PendingPage> {
        self.entries
            .read()
            .await
            .iter()
            .filter(|e| e.status == RetryStatus::Pending)
            .cloned()
            .collect()
    }

    pub async fn get(&self, id: Uuid) -> Option<PendingPage> {
        self.entries.read().await.iter().find(|e| e.id == id).cloned()
    }

    /// Total entries, terminal ones included.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Give every pending entry its single retry.
    pub async fn retry_pending(&self, sink: &dyn PageSink) -> RetrySummary {
        let claimed: Vec<PendingPage> = {
            let mut entries = self.entries.write().await;
            entries
                .iter_mut()
                .filter(|e| e.status == RetryStatus::Pending)
                .map(|e| {
                    e.status = RetryStatus::Retrying;
                    e.clone()
                })
                .collect()
        };

        if claimed.is_empty() {
            return RetrySummary::default();
        }
        debug!(count = claimed.len(), "Retrying queued pages");

        let mut results = Vec::with_capacity(claimed.len());
        for entry in &claimed {
            let result = sink
                .create_page(&entry.section_id, &entry.title, &entry.html, &entry.created)
                .await;
            results.push((entry.id, result));
        }

        let mut summary = RetrySummary::default();
        let mut entries = self.entries.write().await;
        for (id, result) in results {
            let Some(entry) = entries.iter_mut().find(|e| e.id == id) else {
                continue;
            };
            entry.updated_at = Utc::now();
            match result {
                Ok(page) => {
                    info!(entry_id = %id, page_id = %page.id, "Queued page delivered");
                    entry.status = RetryStatus::Delivered;
                    entry.page_id = Some(page.id);
                    summary.delivered += 1;
                }
                Err(e) => {
                    error!(
                        entry_id = %id,
                        section = %entry.section,
                        error = %e,
                        "Queued page failed again, dropping"
                    );
                    entry.status = RetryStatus::Failed;
                    entry.last_error = Some(e.to_string());
                    summary.failed += 1;
                }
            }
        }

        prune_terminal(&mut entries);
        summary
    }
}

/// Drop the oldest terminal entries beyond [`KEEP_TERMINAL`].
fn prune_terminal(entries: &mut VecDeque<PendingPage>) {
    let terminal = entries.iter().filter(|e| e.status.is_terminal()).count();
    let mut to_remove = terminal.saturating_sub(KEEP_TERMINAL);
    if to_remove == 0 {
        return;
    }
    entries.retain(|e| {
        if to_remove > 0 && e.status.is_terminal() {
            to_remove -= 1;
            false
        } else {
            true
        }
    });
}

/// Spawn a background task that periodically retries queued pages.
pub fn spawn_retry_task(
    queue: Arc<RetryQueue>,
    sink: Arc<dyn PageSink>,
    every: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        loop {
            interval.tick().await;
            let summary = queue.retry_pending(sink.as_ref()).await;
            if summary.delivered + summary.failed > 0 {
                info!(
                    delivered = summary.delivered,
                    failed = summary.failed,
                    "Retry sweep finished"
                );
            }
        }
    })
}
