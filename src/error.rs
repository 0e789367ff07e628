//! Error types for the lifelog router.

/// Top-level error type for the service.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Key-value store errors.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Migration failed: {0}")]
    Migration(String),
}

/// Microsoft Graph collaborator errors.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    #[error("No access token available")]
    Unauthorized,

    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("Graph returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Notebook not found: {0}")]
    NotebookNotFound(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Errors surfaced by the ingest pipeline.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Section not found: {section}")]
    SectionNotFound { section: String },

    #[error("Page creation failed: {0}")]
    PageCreation(#[from] GraphError),
}

/// Result type alias for the service.
pub type Result<T> = std::result::Result<T, Error>;
