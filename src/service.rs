//! Wiring: config → KV store, Graph client, resolver, pipeline.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::config::RouterConfig;
use crate::error::Result;
use crate::graph::{GraphClient, StaticTokenProvider};
use crate::pipeline::processor::LifelogPipeline;
use crate::pipeline::queue::RetryQueue;
use crate::pipeline::rules::Classifier;
use crate::sections::{SectionDirectory, SectionResolver};
use crate::store::{KvStore, LibSqlKv, MemoryKv};

/// How often expired rows are purged from a file-backed cache.
const PURGE_INTERVAL: Duration = Duration::from_secs(3600);

/// Open the configured KV backend.
pub async fn open_cache(config: &RouterConfig) -> Result<Arc<dyn KvStore>> {
    match &config.db_path {
        Some(path) => {
            let kv = Arc::new(LibSqlKv::new_local(path).await?);
            spawn_purge_task(Arc::clone(&kv));
            Ok(kv)
        }
        None => Ok(Arc::new(MemoryKv::new())),
    }
}

fn spawn_purge_task(kv: Arc<LibSqlKv>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(PURGE_INTERVAL);
        loop {
            interval.tick().await;
            if let Err(e) = kv.purge_expired().await {
                warn!(error = %e, "KV purge failed");
            }
        }
    })
}

/// Build the ingest pipeline from configuration.
pub async fn build_pipeline(config: &RouterConfig) -> Result<Arc<LifelogPipeline>> {
    let cache = open_cache(config).await?;

    let tokens = Arc::new(StaticTokenProvider::new(config.graph_token.clone()));
    let graph = Arc::new(GraphClient::new(&config.graph_base_url, tokens));

    let directory = SectionDirectory::new(config.static_sections.clone());
    for category in directory.missing_categories() {
        warn!(
            category = %category,
            section = category.section_name(),
            "No static section entry, relying on heal"
        );
    }

    info!(
        backend = cache.backend_name(),
        static_sections = directory.len(),
        notebook = %config.notebook,
        "Section resolver ready"
    );

    let resolver = SectionResolver::new(
        directory,
        cache,
        graph.clone(),
        config.notebook.clone(),
        config.cache_ttl,
    );

    Ok(Arc::new(LifelogPipeline::new(
        Classifier::new(config.timezone),
        resolver,
        graph,
        RetryQueue::new(),
    )))
}
