//! Core trace functionality: configuration, classification, and the
//! probing engine.

pub mod classify;
pub mod config;
pub mod engine;
pub mod error;
pub mod types;

#[cfg(test)]
pub(crate) mod testutil;

// Re-export commonly used types
pub use classify::{classify, ClassifiedResponse, IcmpKind};
pub use config::{
    TraceConfig, TraceConfigBuilder, DEFAULT_BASE_PORT, DEFAULT_MAX_TTL, DEFAULT_NQUERIES,
    DEFAULT_PACKET_SIZE, DEFAULT_WAIT_SECS, MAX_PACKET_SIZE, PACKET_HEADER_LEN,
};
pub use engine::TraceEngine;
pub use error::TraceError;
pub use types::Target;
