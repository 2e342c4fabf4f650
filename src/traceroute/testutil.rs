//! Hand-built ICMP packet fixtures shared by classifier and engine tests.

use std::net::Ipv4Addr;

/// Build a complete ICMP error datagram as a raw ICMPv4 socket would
/// deliver it: outer IPv4 header, ICMP error header, echoed inner
/// IPv4 header and echoed inner UDP header.
pub(crate) fn icmp_error_packet(
    src: Ipv4Addr,
    arrival_ttl: u8,
    icmp_type: u8,
    icmp_code: u8,
    inner_src_port: u16,
    inner_dst_port: u16,
) -> Vec<u8> {
    icmp_error_packet_with_ihl(
        src,
        arrival_ttl,
        5,
        icmp_type,
        icmp_code,
        inner_src_port,
        inner_dst_port,
    )
}

/// Same as [`icmp_error_packet`] with a configurable outer IHL (in
/// 32-bit words) to exercise option-bearing outer headers.
pub(crate) fn icmp_error_packet_with_ihl(
    src: Ipv4Addr,
    arrival_ttl: u8,
    outer_ihl_words: u8,
    icmp_type: u8,
    icmp_code: u8,
    inner_src_port: u16,
    inner_dst_port: u16,
) -> Vec<u8> {
    let outer_len = (outer_ihl_words as usize) * 4;
    let total = outer_len + 8 + 20 + 8;
    let mut p = vec![0u8; total];

    // Outer IPv4 header
    p[0] = 0x40 | outer_ihl_words;
    p[2..4].copy_from_slice(&(total as u16).to_be_bytes());
    p[8] = arrival_ttl;
    p[9] = 1; // ICMP
    p[12..16].copy_from_slice(&src.octets());
    p[16..20].copy_from_slice(&Ipv4Addr::new(192, 0, 2, 99).octets());

    // ICMP error header
    let icmp = outer_len;
    p[icmp] = icmp_type;
    p[icmp + 1] = icmp_code;

    // Echoed inner IPv4 header
    let inner = icmp + 8;
    p[inner] = 0x45;
    p[inner + 2..inner + 4].copy_from_slice(&28u16.to_be_bytes());
    p[inner + 8] = 1; // TTL as it expired
    p[inner + 9] = 17; // UDP
    p[inner + 12..inner + 16].copy_from_slice(&Ipv4Addr::new(192, 0, 2, 99).octets());
    p[inner + 16..inner + 20].copy_from_slice(&Ipv4Addr::new(203, 0, 113, 5).octets());

    // Echoed inner UDP header
    let udp = inner + 20;
    p[udp..udp + 2].copy_from_slice(&inner_src_port.to_be_bytes());
    p[udp + 2..udp + 4].copy_from_slice(&inner_dst_port.to_be_bytes());
    p[udp + 4..udp + 6].copy_from_slice(&8u16.to_be_bytes());

    p
}
