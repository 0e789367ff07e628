//! OneNote over Microsoft Graph: section listing and page creation.

use std::sync::Arc;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::{debug, info, warn};

use super::{CreatedPage, PageSink, SectionEntry, SectionLister, TokenProvider};
use crate::error::GraphError;
use crate::pipeline::render::escape_html;

// ── Wire types ──────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct NotebookList {
    #[serde(default)]
    value: Vec<Notebook>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Notebook {
    display_name: String,
    #[serde(default)]
    sections: Vec<Section>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Section {
    id: String,
    display_name: String,
}

#[derive(Debug, Deserialize)]
struct PageResponse {
    id: String,
    #[serde(default)]
    links: Option<PageLinks>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageLinks {
    one_note_client_url: Option<Link>,
    one_note_web_url: Option<Link>,
}

#[derive(Debug, Deserialize)]
struct Link {
    href: String,
}

// ── Client ──────────────────────────────────────────────────────────────

/// Graph HTTP client. Tokens come from the injected [`TokenProvider`].
pub struct GraphClient {
    base_url: String,
    tokens: Arc<dyn TokenProvider>,
    client: reqwest::Client,
}

impl GraphClient {
    pub fn new(base_url: impl Into<String>, tokens: Arc<dyn TokenProvider>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            tokens,
            client: reqwest::Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn token(&self) -> Result<SecretString, GraphError> {
        self.tokens
            .bearer_token()
            .await
            .ok_or(GraphError::Unauthorized)
    }

    /// Map a non-success response to a [`GraphError`].
    async fn error_for(resp: reqwest::Response) -> GraphError {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN
        {
            warn!(status = %status, "Graph rejected the access token");
            return GraphError::Unauthorized;
        }
        GraphError::Status {
            status: status.as_u16(),
            body,
        }
    }
}

/// Full XHTML document for the page-creation call.
///
/// `title` and `body` must already be HTML-escaped.
pub fn page_document(title: &str, body: &str, created: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n  <head>\n    <title>{title}</title>\n    \
         <meta name=\"created\" content=\"{}\" />\n  </head>\n  <body>\n{body}\n  </body>\n</html>\n",
        escape_html(created)
    )
}

#[async_trait]
impl SectionLister for GraphClient {
    async fn list_sections(&self, notebook: &str) -> Result<Vec<SectionEntry>, GraphError> {
        let token = self.token().await?;
        let resp = self
            .client
            .get(self.url("/me/onenote/notebooks"))
            .query(&[("$expand", "sections")])
            .bearer_auth(token.expose_secret())
            .send()
            .await
            .map_err(|e| GraphError::Http(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(Self::error_for(resp).await);
        }

        let list: NotebookList = resp
            .json()
            .await
            .map_err(|e| GraphError::InvalidResponse(e.to_string()))?;

        let found = list
            .value
            .into_iter()
            .find(|nb| nb.display_name == notebook)
            .ok_or_else(|| GraphError::NotebookNotFound(notebook.to_string()))?;

        let sections: Vec<SectionEntry> = found
            .sections
            .into_iter()
            .map(|s| SectionEntry {
                name: s.display_name,
                id: s.id,
            })
            .collect();

        debug!(notebook, count = sections.len(), "Listed notebook sections");
        Ok(sections)
    }
}

#[async_trait]
impl PageSink for GraphClient {
    async fn create_page(
        &self,
        section_id: &str,
        title: &str,
        html: &str,
        created: &str,
    ) -> Result<CreatedPage, GraphError> {
        let token = self.token().await?;
        let resp = self
            .client
            .post(self.url(&format!("/me/onenote/sections/{section_id}/pages")))
            .bearer_auth(token.expose_secret())
            .header(reqwest::header::CONTENT_TYPE, "text/html")
            .body(page_document(title, html, created))
            .send()
            .await
            .map_err(|e| GraphError::Http(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(Self::error_for(resp).await);
        }

        let page: PageResponse = resp
            .json()
            .await
            .map_err(|e| GraphError::InvalidResponse(e.to_string()))?;

        let (web_url, client_url) = match page.links {
            Some(links) => (
                links.one_note_web_url.map(|l| l.href),
                links.one_note_client_url.map(|l| l.href),
            ),
            None => (None, None),
        };

        info!(page_id = %page.id, section_id, "Page created");
        Ok(CreatedPage {
            id: page.id,
            web_url,
            client_url,
        })
    }
}
