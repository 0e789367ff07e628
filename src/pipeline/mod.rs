//! Snippet processing pipeline.
//!
//! Every snippet from any source flows through:
//! 1. `Classifier::classify()`: ordered rule table, first match wins
//! 2. `SectionResolver::resolve()`: static table → KV cache → heal
//! 3. `PageSink::create_page()`: failures wait in the `RetryQueue`
//!
//! **No default section exists.** An unresolved section is a hard error.

pub mod processor;
pub mod queue;
pub mod render;
pub mod rules;
pub mod types;
