//! Key-value cache backends for the dynamic section directory.

pub mod libsql_backend;
pub mod memory;
pub mod migrations;
pub mod traits;

pub use libsql_backend::LibSqlKv;
pub use memory::MemoryKv;
pub use traits::KvStore;
