//! Core types for trace operations

use serde::{Deserialize, Serialize};
use std::net::Ipv4Addr;

/// The resolved destination of a trace.
///
/// Created once by forward resolution before any socket is opened and
/// immutable for the trace's lifetime. `hostname` keeps whatever
/// string the user supplied (name or literal) for the header line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    /// Resolved IPv4 address probes are sent to
    pub addr: Ipv4Addr,
    /// The hostname or literal string the user supplied
    pub hostname: String,
}

impl Target {
    /// Create a target from a resolved address and the original input string
    pub fn new(addr: Ipv4Addr, hostname: impl Into<String>) -> Self {
        Self {
            addr,
            hostname: hostname.into(),
        }
    }
}
