//! Runtime configuration.
//!
//! Every option can be given on the command line or through the environment;
//! the defaults connect to an unauthenticated engine at `localhost:9200`.
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `BOOKSHELF_BIND` | 127.0.0.1:8000 | Address the HTTP API listens on |
//! | `OPENSEARCH_HOST` | localhost | Search engine host |
//! | `OPENSEARCH_PORT` | 9200 | Search engine port |
//! | `BOOKSHELF_INDEX` | books | Index holding the book documents |
//! | `BOOKSHELF_REQUEST_TIMEOUT` | 30 | Engine request timeout (seconds) |
//! | `BOOKSHELF_BACKEND` | opensearch | `opensearch` or `memory` |
//! | `BOOKSHELF_LOG_LEVEL` | info | Log level when `RUST_LOG` is unset |

use crate::schema::BOOKS_INDEX;
use clap::{Parser, ValueEnum};
use std::time::Duration;

/// Which search engine implementation serves requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BackendKind {
    /// OpenSearch over plain HTTP
    Opensearch,
    /// In-process engine, nothing persisted
    Memory,
}

#[derive(Debug, Clone, Parser)]
#[command(author, version, about = "HTTP API for storing and searching books", long_about = None)]
pub struct Config {
    /// Address to listen on.
    #[arg(long, env = "BOOKSHELF_BIND", default_value = "127.0.0.1:8000")]
    pub bind: String,

    /// Search engine host.
    #[arg(long, env = "OPENSEARCH_HOST", default_value = "localhost")]
    pub engine_host: String,

    /// Search engine port.
    #[arg(long, env = "OPENSEARCH_PORT", default_value_t = 9200)]
    pub engine_port: u16,

    /// Index holding the book documents.
    #[arg(long, env = "BOOKSHELF_INDEX", default_value = BOOKS_INDEX)]
    pub index: String,

    /// Timeout for each engine request, in seconds.
    #[arg(long, env = "BOOKSHELF_REQUEST_TIMEOUT", default_value_t = 30)]
    pub request_timeout: u64,

    /// Search engine implementation.
    #[arg(long, env = "BOOKSHELF_BACKEND", value_enum, default_value_t = BackendKind::Opensearch)]
    pub backend: BackendKind,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long, env = "BOOKSHELF_LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

impl Config {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8000".to_string(),
            engine_host: "localhost".to_string(),
            engine_port: 9200,
            index: BOOKS_INDEX.to_string(),
            request_timeout: 30,
            backend: BackendKind::Opensearch,
            log_level: "info".to_string(),
        }
    }
}
