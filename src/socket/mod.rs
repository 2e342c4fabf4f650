//! Probe transport abstraction
//!
//! A trace needs exactly two communication endpoints: a connectionless
//! socket that emits UDP probe datagrams under a controllable TTL, and
//! a raw socket that receives the ICMP errors those probes provoke.
//! [`ProbeTransport`] is the seam between the scheduler and those
//! sockets; tests substitute a scripted implementation.

use anyhow::Result;
use std::time::Duration;

pub mod transport;

pub use transport::RawSocketTransport;

/// Per-process probe identity used as the UDP source port of every
/// outgoing probe. Derived from the process id with the high bit
/// forced set so the port stays clear of the reserved low ranges.
/// Constant for the process lifetime.
pub fn probe_identity() -> u16 {
    ((std::process::id() & 0x7fff) | 0x8000) as u16
}

/// Transport for one trace: probe emission and control-message receipt.
pub trait ProbeTransport {
    /// Send one probe datagram with the given TTL to the given
    /// destination port.
    ///
    /// The TTL is a per-packet property of the probe, not of the
    /// socket, and must be applied freshly before every send.
    fn send_probe(&mut self, ttl: u8, dest_port: u16) -> Result<()>;

    /// Wait up to `wait` for one control message and return its raw
    /// bytes, or `None` if the window elapsed without one.
    ///
    /// Every call arms a fresh full window; the caller decides how
    /// often to re-wait.
    fn recv_control(&mut self, wait: Duration) -> Result<Option<Vec<u8>>>;
}
