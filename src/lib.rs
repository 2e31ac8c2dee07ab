pub mod api;
pub mod backend;
pub mod config;
pub mod document;
pub mod index;
pub mod memory;
pub mod opensearch;
pub mod provision;
pub mod query;
pub mod ranking;
pub mod schema;
pub mod tokenizer;

// Re-export commonly used types
pub use api::{create_router, ApiError, AppState};
pub use backend::{EngineError, SearchBackend, WriteResult};
pub use config::{BackendKind, Config};
pub use document::{Book, BookDocument, BookHit};
pub use memory::MemoryBackend;
pub use opensearch::OpenSearchBackend;
pub use provision::{ensure_index, Provisioned};
pub use query::MultiMatchQuery;
pub use schema::{IndexSchema, BOOKS_INDEX};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
