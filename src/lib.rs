//! Lifelog router: classifies short snippets and files them as OneNote pages.

pub mod api;
pub mod config;
pub mod error;
pub mod graph;
pub mod pipeline;
pub mod sections;
pub mod service;
pub mod store;
