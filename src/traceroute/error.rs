//! Error types for trace operations

use thiserror::Error;

/// Errors that abort a trace.
///
/// Probe timeouts and unrelated ICMP traffic are not errors: a
/// timeout is a normal observed outcome (rendered as `*`), and
/// foreign packets are discarded by re-waiting. Only conditions that
/// prevent the trace from starting or continuing appear here.
#[derive(Debug, Error)]
pub enum TraceError {
    /// Invalid configuration provided (e.g. packetsize out of bounds)
    #[error("invalid configuration: {0}")]
    Config(String),

    /// The target hostname could not be resolved to an IPv4 address
    #[error("failed to resolve host: {0}")]
    Resolution(String),

    /// The UDP probe socket could not be opened
    #[error("failed to open probe socket: {0}")]
    SocketOpen(String),

    /// The UDP probe socket could not be bound to the identity port
    #[error("failed to bind probe socket: {0}")]
    Bind(String),

    /// The raw ICMP receive socket could not be opened
    ///
    /// Distinct from [`TraceError::SocketOpen`] so the operator can
    /// tell a privilege problem (raw sockets need root or
    /// CAP_NET_RAW) apart from ordinary transport setup failures.
    #[error("failed to open ICMP socket (requires root or CAP_NET_RAW): {0}")]
    IcmpOpen(String),

    /// A probe failed to transmit; aborts the trace rather than retry
    #[error("failed to send probe: {0}")]
    Send(String),

    /// Writing to the output sink failed
    #[error("output error: {0}")]
    Io(#[from] std::io::Error),
}

impl TraceError {
    /// Process exit code for this error.
    ///
    /// Each fatal failure class gets its own code so scripts can tell
    /// them apart; code 2 is left to the argument parser's usage
    /// errors.
    pub fn exit_code(&self) -> i32 {
        match self {
            TraceError::Config(_) => 3,
            TraceError::Resolution(_) => 4,
            TraceError::SocketOpen(_) => 5,
            TraceError::Bind(_) => 6,
            TraceError::IcmpOpen(_) => 7,
            TraceError::Send(_) => 8,
            TraceError::Io(_) => 1,
        }
    }
}
