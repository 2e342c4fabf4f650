//! Raw-socket implementation of the probe transport

use super::ProbeTransport;
use crate::traceroute::TraceError;
use anyhow::{Context, Result};
use socket2::{Domain, Protocol, Socket, Type};
use std::io::ErrorKind;
use std::mem::MaybeUninit;
use std::net::{Ipv4Addr, SocketAddrV4, UdpSocket};
use std::time::Duration;

/// Receive buffer size for control messages.
const RECV_BUF_SIZE: usize = 4096;

/// Production transport: a UDP datagram socket bound to the probe
/// identity port for sending, and a raw ICMPv4 socket for receiving
/// the control messages probes provoke.
///
/// Both sockets are opened once per trace and live for its whole
/// duration. Opening the raw socket requires elevated privilege.
pub struct RawSocketTransport {
    probe_socket: UdpSocket,
    control_socket: Socket,
    target: Ipv4Addr,
    payload: Vec<u8>,
}

impl RawSocketTransport {
    /// Open and bind both sockets.
    ///
    /// The UDP socket is bound to `0.0.0.0:identity` so the source
    /// port of every probe is fixed and known in advance; received
    /// ICMP errors are correlated against it. Each failure maps to
    /// its own [`TraceError`] variant.
    pub fn open(target: Ipv4Addr, identity: u16, payload_len: usize) -> Result<Self, TraceError> {
        let probe = Socket::new(Domain::IPV4, Type::DGRAM, Some(Protocol::UDP))
            .map_err(|e| TraceError::SocketOpen(e.to_string()))?;

        let bind_addr = SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, identity);
        probe
            .bind(&bind_addr.into())
            .map_err(|e| TraceError::Bind(format!("port {identity}: {e}")))?;

        let control = Socket::new(Domain::IPV4, Type::RAW, Some(Protocol::ICMPV4))
            .map_err(|e| TraceError::IcmpOpen(e.to_string()))?;

        Ok(Self {
            probe_socket: probe.into(),
            control_socket: control,
            target,
            payload: vec![0u8; payload_len],
        })
    }
}

impl ProbeTransport for RawSocketTransport {
    fn send_probe(&mut self, ttl: u8, dest_port: u16) -> Result<()> {
        self.probe_socket
            .set_ttl(u32::from(ttl))
            .context("Failed to set TTL")?;

        let dest = SocketAddrV4::new(self.target, dest_port);
        self.probe_socket
            .send_to(&self.payload, dest)
            .context("Failed to send UDP probe")?;
        Ok(())
    }

    fn recv_control(&mut self, wait: Duration) -> Result<Option<Vec<u8>>> {
        self.control_socket
            .set_read_timeout(Some(wait))
            .context("Failed to set receive timeout")?;

        let mut recv_buf = [MaybeUninit::uninit(); RECV_BUF_SIZE];
        match self.control_socket.recv_from(&mut recv_buf) {
            Ok((size, _)) => {
                let initialized_part: &[MaybeUninit<u8>] = &recv_buf[..size];
                let packet_data: &[u8] =
                    unsafe { &*(initialized_part as *const [MaybeUninit<u8>] as *const [u8]) };
                Ok(Some(packet_data.to_vec()))
            }
            Err(e) if e.kind() == ErrorKind::WouldBlock || e.kind() == ErrorKind::TimedOut => {
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::socket::probe_identity;

    #[test]
    fn test_open_binds_identity_port() {
        // The UDP half needs no privilege; only the raw ICMP socket
        // does, so a permission failure here must surface as IcmpOpen.
        let identity = probe_identity();
        match RawSocketTransport::open(Ipv4Addr::LOCALHOST, identity, 12) {
            Ok(transport) => {
                let local = transport.probe_socket.local_addr().unwrap();
                assert_eq!(local.port(), identity);
                assert_eq!(transport.payload.len(), 12);
            }
            Err(TraceError::IcmpOpen(_)) => {
                // Expected when not running as root
            }
            Err(other) => panic!("unexpected open failure: {other}"),
        }
    }
}
