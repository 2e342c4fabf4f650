//! Response classification for received ICMP messages
//!
//! Given the raw bytes of one control message off the wire, decide
//! whether it belongs to this trace at all and, if so, whether it
//! means "more hops needed" or "destination reached". Correlation is
//! by the UDP source port echoed inside the ICMP error payload, which
//! every probe carries because the probe socket is bound to the
//! process-derived identity port.

use pnet::packet::ipv4::Ipv4Packet;
use serde::{Deserialize, Serialize};
use std::net::Ipv4Addr;

/// ICMP error header length in bytes
const ICMP_ERROR_HEADER_LEN: usize = 8;
/// IPv4 header minimum length in bytes
const IPV4_HEADER_MIN_LEN: usize = 20;
/// UDP header length in bytes
const UDP_HEADER_LEN: usize = 8;

/// ICMP time-exceeded type code
const ICMP_TIME_EXCEEDED: u8 = 11;

/// The kind of a received ICMP message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IcmpKind {
    /// Echo reply (type 0)
    EchoReply,
    /// Destination unreachable (type 3); port unreachable is the
    /// expected terminal answer from the true destination
    Unreachable,
    /// Source quench (type 4)
    SourceQuench,
    /// Redirect (type 5)
    Redirect,
    /// Echo request (type 8)
    Echo,
    /// Time exceeded in transit (type 11)
    TimeExceeded,
    /// Parameter problem (type 12)
    ParamProblem,
    /// Timestamp request (type 13)
    Timestamp,
    /// Timestamp reply (type 14)
    TimestampReply,
    /// Information request (type 15)
    InfoRequest,
    /// Information reply (type 16)
    InfoReply,
    /// Address mask request (type 17)
    MaskRequest,
    /// Address mask reply (type 18)
    MaskReply,
    /// Any type code not listed above
    Other(u8),
}

impl IcmpKind {
    /// Map a raw ICMP type code to a kind.
    pub fn from_type_code(code: u8) -> Self {
        match code {
            0 => IcmpKind::EchoReply,
            3 => IcmpKind::Unreachable,
            4 => IcmpKind::SourceQuench,
            5 => IcmpKind::Redirect,
            8 => IcmpKind::Echo,
            11 => IcmpKind::TimeExceeded,
            12 => IcmpKind::ParamProblem,
            13 => IcmpKind::Timestamp,
            14 => IcmpKind::TimestampReply,
            15 => IcmpKind::InfoRequest,
            16 => IcmpKind::InfoReply,
            17 => IcmpKind::MaskRequest,
            18 => IcmpKind::MaskReply,
            other => IcmpKind::Other(other),
        }
    }

    /// Display name used by verbose output.
    pub fn name(&self) -> &'static str {
        match self {
            IcmpKind::EchoReply => "ICMP_ECHOREPLY",
            IcmpKind::Unreachable => "ICMP_UNREACH",
            IcmpKind::SourceQuench => "ICMP_SOURCEQUENCH",
            IcmpKind::Redirect => "ICMP_REDIRECT",
            IcmpKind::Echo => "ICMP_ECHO",
            IcmpKind::TimeExceeded => "ICMP_TIMXCEED",
            IcmpKind::ParamProblem => "ICMP_PARAMPROB",
            IcmpKind::Timestamp => "ICMP_TSTAMP",
            IcmpKind::TimestampReply => "ICMP_TSTAMPREPLY",
            IcmpKind::InfoRequest => "ICMP_IREQ",
            IcmpKind::InfoReply => "ICMP_IREQREPLY",
            IcmpKind::MaskRequest => "ICMP_MASKREQ",
            IcmpKind::MaskReply => "ICMP_MASKREPLY",
            IcmpKind::Other(_) => "unknown ICMP",
        }
    }
}

/// Outcome of classifying one received control message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassifiedResponse {
    /// Not a response to one of our probes; the caller keeps waiting
    /// within the same query
    Unrelated,
    /// An intermediate router dropped the probe for exhausted TTL;
    /// more hops are needed
    InProgress {
        /// Address the message came from
        origin: Ipv4Addr,
        /// TTL of the message on arrival
        arrival_ttl: u8,
        /// Kind of the received message
        kind: IcmpKind,
    },
    /// Any non-time-exceeded answer; the trace terminates after the
    /// current TTL row
    Final {
        /// Address the message came from
        origin: Ipv4Addr,
        /// TTL of the message on arrival
        arrival_ttl: u8,
        /// Kind of the received message
        kind: IcmpKind,
    },
}

/// Classify one raw ICMP datagram against the probe identity.
///
/// The datagram is a full IPv4 packet as delivered by a raw ICMPv4
/// socket. If it is long enough to carry the echoed original probe
/// (ICMP error header + inner IPv4 header + inner UDP header), the
/// echoed UDP source port must match `expected_src_port` or the
/// message is someone else's and is classified [`ClassifiedResponse::Unrelated`].
/// Shorter messages skip the correlation check and are classified by
/// kind alone.
///
/// Only "time exceeded" means the trace continues. Every other kind,
/// including ones this tool does not recognize, is terminal.
pub fn classify(packet: &[u8], expected_src_port: u16) -> ClassifiedResponse {
    let Some(ip) = Ipv4Packet::new(packet) else {
        return ClassifiedResponse::Unrelated;
    };

    let origin = ip.get_source();
    let arrival_ttl = ip.get_ttl();

    let header_len = (ip.get_header_length() as usize) * 4;
    if header_len < IPV4_HEADER_MIN_LEN || packet.len() < header_len + ICMP_ERROR_HEADER_LEN {
        return ClassifiedResponse::Unrelated;
    }
    let icmp_data = &packet[header_len..];
    let type_code = icmp_data[0];

    // Correlate via the echoed original datagram when the message is
    // long enough to contain one.
    if icmp_data.len() >= ICMP_ERROR_HEADER_LEN + IPV4_HEADER_MIN_LEN + UDP_HEADER_LEN {
        let inner_data = &icmp_data[ICMP_ERROR_HEADER_LEN..];
        if let Some(inner_ip) = Ipv4Packet::new(inner_data) {
            let inner_header_len = (inner_ip.get_header_length() as usize) * 4;
            if inner_header_len >= IPV4_HEADER_MIN_LEN
                && inner_data.len() >= inner_header_len + UDP_HEADER_LEN
            {
                let src_port = u16::from_be_bytes([
                    inner_data[inner_header_len],
                    inner_data[inner_header_len + 1],
                ]);
                if src_port != expected_src_port {
                    return ClassifiedResponse::Unrelated;
                }
            }
        }
    }

    let kind = IcmpKind::from_type_code(type_code);
    match type_code {
        ICMP_TIME_EXCEEDED => ClassifiedResponse::InProgress {
            origin,
            arrival_ttl,
            kind,
        },
        _ => ClassifiedResponse::Final {
            origin,
            arrival_ttl,
            kind,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traceroute::testutil::{icmp_error_packet, icmp_error_packet_with_ihl};

    const OUR_PORT: u16 = 0x8123;

    #[test]
    fn test_time_exceeded_is_in_progress() {
        let origin = Ipv4Addr::new(10, 0, 0, 1);
        let packet = icmp_error_packet(origin, 62, 11, 0, OUR_PORT, 33434);

        let result = classify(&packet, OUR_PORT);
        assert_eq!(
            result,
            ClassifiedResponse::InProgress {
                origin,
                arrival_ttl: 62,
                kind: IcmpKind::TimeExceeded,
            }
        );
    }

    #[test]
    fn test_port_unreachable_is_final() {
        let origin = Ipv4Addr::new(93, 184, 216, 34);
        let packet = icmp_error_packet(origin, 55, 3, 3, OUR_PORT, 33436);

        match classify(&packet, OUR_PORT) {
            ClassifiedResponse::Final { origin: o, kind, .. } => {
                assert_eq!(o, origin);
                assert_eq!(kind, IcmpKind::Unreachable);
            }
            other => panic!("expected Final, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_kind_is_final() {
        // An unassigned type code still terminates the trace.
        let origin = Ipv4Addr::new(10, 9, 8, 7);
        let packet = icmp_error_packet(origin, 60, 42, 0, OUR_PORT, 33434);

        match classify(&packet, OUR_PORT) {
            ClassifiedResponse::Final { kind, .. } => {
                assert_eq!(kind, IcmpKind::Other(42));
                assert_eq!(kind.name(), "unknown ICMP");
            }
            other => panic!("expected Final, got {other:?}"),
        }
    }

    #[test]
    fn test_foreign_source_port_is_unrelated() {
        let origin = Ipv4Addr::new(10, 0, 0, 1);
        let packet = icmp_error_packet(origin, 62, 11, 0, 0x9999, 33434);

        assert_eq!(classify(&packet, OUR_PORT), ClassifiedResponse::Unrelated);
    }

    #[test]
    fn test_short_message_skips_port_check() {
        // A message too short to carry the echoed probe cannot be
        // correlated; it is classified by kind alone.
        let origin = Ipv4Addr::new(10, 0, 0, 1);
        let full = icmp_error_packet(origin, 62, 11, 0, 0x9999, 33434);
        let truncated = &full[..IPV4_HEADER_MIN_LEN + ICMP_ERROR_HEADER_LEN];

        match classify(truncated, OUR_PORT) {
            ClassifiedResponse::InProgress { origin: o, kind, .. } => {
                assert_eq!(o, origin);
                assert_eq!(kind, IcmpKind::TimeExceeded);
            }
            other => panic!("expected InProgress, got {other:?}"),
        }
    }

    #[test]
    fn test_outer_header_with_options() {
        // Outer IHL of 6 shifts the ICMP header by 4 bytes; the
        // classifier must follow the real header length.
        let origin = Ipv4Addr::new(172, 16, 0, 1);
        let packet = icmp_error_packet_with_ihl(origin, 60, 6, 11, 0, OUR_PORT, 33434);

        match classify(&packet, OUR_PORT) {
            ClassifiedResponse::InProgress { origin: o, .. } => assert_eq!(o, origin),
            other => panic!("expected InProgress, got {other:?}"),
        }
    }

    #[test]
    fn test_garbage_is_unrelated() {
        assert_eq!(classify(&[], OUR_PORT), ClassifiedResponse::Unrelated);
        assert_eq!(classify(&[0x45], OUR_PORT), ClassifiedResponse::Unrelated);

        // 20 bytes parse as an IP header but leave no room for ICMP.
        let bare_header = [0x45u8; 20];
        assert_eq!(
            classify(&bare_header, OUR_PORT),
            ClassifiedResponse::Unrelated
        );

        // Nonsense IHL (0) is rejected rather than misparsed.
        let mut bad_ihl = icmp_error_packet(Ipv4Addr::new(10, 0, 0, 1), 62, 11, 0, OUR_PORT, 33434);
        bad_ihl[0] = 0x40;
        assert_eq!(classify(&bad_ihl, OUR_PORT), ClassifiedResponse::Unrelated);
    }

    #[test]
    fn test_arrival_ttl_extracted() {
        let packet = icmp_error_packet(Ipv4Addr::new(10, 0, 0, 1), 249, 11, 0, OUR_PORT, 33434);
        match classify(&packet, OUR_PORT) {
            ClassifiedResponse::InProgress { arrival_ttl, .. } => assert_eq!(arrival_ttl, 249),
            other => panic!("expected InProgress, got {other:?}"),
        }
    }

    #[test]
    fn test_kind_names_match_display_table() {
        assert_eq!(IcmpKind::from_type_code(0).name(), "ICMP_ECHOREPLY");
        assert_eq!(IcmpKind::from_type_code(3).name(), "ICMP_UNREACH");
        assert_eq!(IcmpKind::from_type_code(11).name(), "ICMP_TIMXCEED");
        assert_eq!(IcmpKind::from_type_code(18).name(), "ICMP_MASKREPLY");
        assert_eq!(IcmpKind::from_type_code(200), IcmpKind::Other(200));
    }
}
