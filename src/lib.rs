//! trace - a classic sequential UDP traceroute
//!
//! This library provides the core functionality for discovering the
//! network path to a destination: per-TTL probe transmission over UDP,
//! ICMP response correlation and classification, round-trip timing,
//! and termination detection. Probing is strictly sequential with one
//! probe outstanding at a time.

pub mod dns;
pub mod socket;
pub mod traceroute;

// Re-export core types for library users
pub use dns::{DnsResolver, HopResolver};
pub use socket::{probe_identity, ProbeTransport, RawSocketTransport};
pub use traceroute::{Target, TraceConfig, TraceConfigBuilder, TraceEngine, TraceError};
