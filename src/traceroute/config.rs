//! Configuration types for trace operations

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Fixed per-probe header overhead: the encapsulated IP + UDP headers
/// (20 + 8 bytes) that a compliant router echoes back in its ICMP
/// error. Probe packets must be at least this large.
pub const PACKET_HEADER_LEN: usize = 28;

/// Hard cap on the total probe datagram size.
pub const MAX_PACKET_SIZE: usize = 65535;

/// Default base destination port (the traditional traceroute port).
pub const DEFAULT_BASE_PORT: u16 = 33434;

/// Default maximum hop count probed.
pub const DEFAULT_MAX_TTL: u8 = 64;

/// Default number of probes per hop.
pub const DEFAULT_NQUERIES: u16 = 3;

/// Default per-probe wait bound in seconds.
pub const DEFAULT_WAIT_SECS: u64 = 3;

/// Default total probe datagram size in bytes.
pub const DEFAULT_PACKET_SIZE: usize = 40;

/// Configuration for one trace.
///
/// Constructed once from the command line and passed by reference into
/// the scheduler, transport and classifier; nothing mutates it after
/// validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceConfig {
    /// Target hostname or literal IPv4 address
    pub target: String,
    /// Print the arrival TTL of each response (`-l`)
    pub display_ttl: bool,
    /// Maximum hop count probed (`-m`, default 64)
    pub max_ttl: u8,
    /// Print numeric addresses only, never reverse-resolve (`-n`)
    pub numeric: bool,
    /// Base destination port for probes (`-p`, default 33434)
    pub base_port: u16,
    /// Probes per hop (`-q`, default 3)
    pub nqueries: u16,
    /// Print the ICMP kind of every response (`-v`)
    pub verbose: bool,
    /// Per-probe wait bound (`-w`, default 3 s)
    pub wait_time: Duration,
    /// Total probe datagram size in bytes (default 40)
    pub packet_size: usize,
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            target: String::new(),
            display_ttl: false,
            max_ttl: DEFAULT_MAX_TTL,
            numeric: false,
            base_port: DEFAULT_BASE_PORT,
            nqueries: DEFAULT_NQUERIES,
            verbose: false,
            wait_time: Duration::from_secs(DEFAULT_WAIT_SECS),
            packet_size: DEFAULT_PACKET_SIZE,
        }
    }
}

impl TraceConfig {
    /// Create a new TraceConfig builder
    pub fn builder() -> TraceConfigBuilder {
        TraceConfigBuilder::new()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.target.is_empty() {
            return Err("target must be specified".to_string());
        }
        if self.max_ttl < 1 {
            return Err("max_ttl must be at least 1".to_string());
        }
        if self.nqueries < 1 {
            return Err("nqueries must be at least 1".to_string());
        }
        if self.wait_time.as_secs() == 0 {
            return Err("waittime must be at least 1 second".to_string());
        }
        if self.packet_size < PACKET_HEADER_LEN {
            return Err(format!(
                "packetsize is too small, use {PACKET_HEADER_LEN} or more"
            ));
        }
        if self.packet_size > MAX_PACKET_SIZE {
            return Err(format!(
                "packetsize must not exceed {MAX_PACKET_SIZE}"
            ));
        }
        Ok(())
    }

    /// Probe payload length: total datagram size minus the fixed
    /// IP + UDP header overhead.
    pub fn payload_len(&self) -> usize {
        self.packet_size - PACKET_HEADER_LEN
    }
}

/// Builder for TraceConfig
pub struct TraceConfigBuilder {
    config: TraceConfig,
}

impl TraceConfigBuilder {
    /// Create a new builder with default values
    pub fn new() -> Self {
        Self {
            config: TraceConfig::default(),
        }
    }

    /// Set the target hostname or literal IPv4 address
    pub fn target(mut self, target: impl Into<String>) -> Self {
        self.config.target = target.into();
        self
    }

    /// Enable or disable printing the arrival TTL of each response
    pub fn display_ttl(mut self, display: bool) -> Self {
        self.config.display_ttl = display;
        self
    }

    /// Set the maximum hop count probed
    pub fn max_ttl(mut self, ttl: u8) -> Self {
        self.config.max_ttl = ttl;
        self
    }

    /// Enable or disable numeric-only output
    pub fn numeric(mut self, numeric: bool) -> Self {
        self.config.numeric = numeric;
        self
    }

    /// Set the base destination port for probes
    pub fn base_port(mut self, port: u16) -> Self {
        self.config.base_port = port;
        self
    }

    /// Set the number of probes per hop
    pub fn nqueries(mut self, nqueries: u16) -> Self {
        self.config.nqueries = nqueries;
        self
    }

    /// Enable or disable verbose ICMP kind output
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.config.verbose = verbose;
        self
    }

    /// Set the per-probe wait bound
    pub fn wait_time(mut self, wait: Duration) -> Self {
        self.config.wait_time = wait;
        self
    }

    /// Set the total probe datagram size in bytes
    pub fn packet_size(mut self, size: usize) -> Self {
        self.config.packet_size = size;
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<TraceConfig, String> {
        self.config.validate()?;
        Ok(self.config)
    }
}

impl Default for TraceConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
