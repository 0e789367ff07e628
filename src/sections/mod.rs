//! Section name → section id resolution.

pub mod directory;
pub mod resolver;

pub use directory::SectionDirectory;
pub use resolver::{Resolution, SectionResolver};
