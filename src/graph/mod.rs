//! Microsoft Graph collaborators: section listing, page creation, tokens.
//!
//! The resolver and the pipeline only see the traits defined here; the
//! concrete [`GraphClient`] talks to OneNote over HTTP.

pub mod client;
pub mod token;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::GraphError;

pub use client::GraphClient;
pub use token::{StaticTokenProvider, TokenProvider};

/// A section of the configured notebook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionEntry {
    pub name: String,
    pub id: String,
}

/// A page created by the page-creation API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedPage {
    pub id: String,
    pub web_url: Option<String>,
    pub client_url: Option<String>,
}

/// Enumerates the sections of a notebook.
#[async_trait]
pub trait SectionLister: Send + Sync {
    async fn list_sections(&self, notebook: &str) -> Result<Vec<SectionEntry>, GraphError>;
}

/// Creates pages inside a section.
#[async_trait]
pub trait PageSink: Send + Sync {
    /// `created` is the RFC 3339 classification time stamped on the page.
    async fn create_page(
        &self,
        section_id: &str,
        title: &str,
        html: &str,
        created: &str,
    ) -> Result<CreatedPage, GraphError>;
}
