//! Section resolver: static table → KV cache → heal from Graph.
//!
//! A lookup ends in exactly one of the [`Resolution`] states. Listing
//! failures never cross this boundary as errors; they end the lookup as
//! [`Resolution::HealFailed`] and the caller decides what to do.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use super::directory::{SectionDirectory, hyphen_variant, lookup_variants};
use crate::error::GraphError;
use crate::graph::SectionLister;
use crate::store::KvStore;

/// Terminal state of a single lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Found in the static table.
    StaticHit(String),
    /// Found in the cached notebook map.
    CacheHit(String),
    /// Found after re-listing the notebook.
    Healed(String),
    /// Notebook listed and cached, name still absent.
    HealMissing,
    /// Listing the notebook failed; nothing was cached.
    HealFailed,
}

impl Resolution {
    pub fn section_id(&self) -> Option<&str> {
        match self {
            Resolution::StaticHit(id) | Resolution::CacheHit(id) | Resolution::Healed(id) => {
                Some(id)
            }
            Resolution::HealMissing | Resolution::HealFailed => None,
        }
    }

    pub fn into_section_id(self) -> Option<String> {
        match self {
            Resolution::StaticHit(id) | Resolution::CacheHit(id) | Resolution::Healed(id) => {
                Some(id)
            }
            Resolution::HealMissing | Resolution::HealFailed => None,
        }
    }

    /// Short tag for logs and API responses.
    pub fn via(&self) -> &'static str {
        match self {
            Resolution::StaticHit(_) => "static",
            Resolution::CacheHit(_) => "cache",
            Resolution::Healed(_) => "heal",
            Resolution::HealMissing => "heal-missing",
            Resolution::HealFailed => "heal-failed",
        }
    }
}

/// Read-through section directory.
pub struct SectionResolver {
    directory: SectionDirectory,
    cache: Arc<dyn KvStore>,
    lister: Arc<dyn SectionLister>,
    notebook: String,
    ttl: Duration,
}

impl SectionResolver {
    pub fn new(
        directory: SectionDirectory,
        cache: Arc<dyn KvStore>,
        lister: Arc<dyn SectionLister>,
        notebook: impl Into<String>,
        ttl: Duration,
    ) -> Self {
        Self {
            directory,
            cache,
            lister,
            notebook: notebook.into(),
            ttl,
        }
    }

    /// KV key holding the whole name → id map for the notebook.
    pub fn cache_key(&self) -> String {
        format!("sections:{}", self.notebook)
    }

    /// Section id for `name`, or `None` if it cannot be resolved.
    pub async fn resolve(&self, name: &str) -> Option<String> {
        self.resolve_traced(name).await.into_section_id()
    }

    /// Like [`resolve`](Self::resolve), reporting which tier answered.
    pub async fn resolve_traced(&self, name: &str) -> Resolution {
        if let Some(id) = self.directory.get(name) {
            debug!(section = name, "Section resolved from static table");
            return Resolution::StaticHit(id.to_string());
        }

        if let Some(map) = self.cached_map().await {
            if let Some(id) = lookup_variants(&map, name) {
                debug!(section = name, "Section resolved from cache");
                return Resolution::CacheHit(id.to_string());
            }
        }

        let map = match self.heal().await {
            Ok(map) => map,
            Err(e) => {
                warn!(
                    section = name,
                    notebook = %self.notebook,
                    error = %e,
                    "Section heal failed"
                );
                return Resolution::HealFailed;
            }
        };

        match lookup_variants(&map, name) {
            Some(id) => {
                info!(section = name, "Section resolved after heal");
                Resolution::Healed(id.to_string())
            }
            None => {
                warn!(
                    section = name,
                    notebook = %self.notebook,
                    known = map.len(),
                    "Section not found in notebook"
                );
                Resolution::HealMissing
            }
        }
    }

    /// The cached notebook map. Store errors and bad JSON read as a miss.
    async fn cached_map(&self) -> Option<HashMap<String, String>> {
        let key = self.cache_key();
        let raw = match self.cache.get(&key).await {
            Ok(raw) => raw?,
            Err(e) => {
                warn!(key = %key, error = %e, "Section cache read failed");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(map) => Some(map),
            Err(e) => {
                warn!(key = %key, error = %e, "Ignoring unreadable section cache entry");
                None
            }
        }
    }

    /// List the notebook once and cache the entire map.
    async fn heal(&self) -> Result<HashMap<String, String>, GraphError> {
        let sections = self.lister.list_sections(&self.notebook).await?;

        // Keys use the hyphen spelling; lookups try it for every query.
        let mut map = HashMap::with_capacity(sections.len());
        for section in sections {
            map.entry(hyphen_variant(section.name.trim()))
                .or_insert(section.id);
        }

        match serde_json::to_string(&map) {
            Ok(json) => {
                if let Err(e) = self.cache.set(&self.cache_key(), &json, self.ttl).await {
                    warn!(error = %e, "Failed to cache healed section map");
                }
            }
            Err(e) => warn!(error = %e, "Failed to serialize healed section map"),
        }

        info!(
            notebook = %self.notebook,
            sections = map.len(),
            ttl_secs = self.ttl.as_secs(),
            "Section directory healed"
        );
        Ok(map)
    }
}
