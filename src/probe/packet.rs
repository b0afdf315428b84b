//! ICMP echo request/reply encoding

use crate::error::{AppError, Result};

/// Size of the ICMP echo header (type, code, checksum, identifier, sequence)
pub const ICMP_HEADER_LEN: usize = 8;

/// Payload size used by classic ping (64 byte packets on the wire)
pub const DEFAULT_PAYLOAD_LEN: usize = 56;

const ICMPV4_ECHO_REQUEST: u8 = 8;
const ICMPV4_ECHO_REPLY: u8 = 0;
const ICMPV6_ECHO_REQUEST: u8 = 128;
const ICMPV6_ECHO_REPLY: u8 = 129;

/// IP family of an ICMP exchange
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IcmpVersion {
    V4,
    V6,
}

impl IcmpVersion {
    fn request_type(self) -> u8 {
        match self {
            IcmpVersion::V4 => ICMPV4_ECHO_REQUEST,
            IcmpVersion::V6 => ICMPV6_ECHO_REQUEST,
        }
    }

    fn reply_type(self) -> u8 {
        match self {
            IcmpVersion::V4 => ICMPV4_ECHO_REPLY,
            IcmpVersion::V6 => ICMPV6_ECHO_REPLY,
        }
    }
}

/// Outgoing echo request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EchoRequest {
    pub identifier: u16,
    pub sequence: u16,
    pub payload: Vec<u8>,
}

impl EchoRequest {
    /// Request with a payload of `payload_len` bytes (0x00, 0x01, ... repeating)
    pub fn new(identifier: u16, sequence: u16, payload_len: usize) -> Self {
        let payload = (0..payload_len).map(|i| (i % 256) as u8).collect();
        Self {
            identifier,
            sequence,
            payload,
        }
    }

    /// Encode to wire format. ICMPv6 checksums cover a pseudo header and are
    /// filled in by the kernel, so the field is left zero for V6.
    pub fn encode(&self, version: IcmpVersion) -> Vec<u8> {
        let mut packet = Vec::with_capacity(ICMP_HEADER_LEN + self.payload.len());
        packet.push(version.request_type());
        packet.push(0);
        packet.extend_from_slice(&[0, 0]);
        packet.extend_from_slice(&self.identifier.to_be_bytes());
        packet.extend_from_slice(&self.sequence.to_be_bytes());
        packet.extend_from_slice(&self.payload);

        if version == IcmpVersion::V4 {
            let sum = checksum(&packet);
            packet[2..4].copy_from_slice(&sum.to_be_bytes());
        }

        packet
    }
}

/// Echo reply parsed from the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EchoMessage {
    pub identifier: u16,
    pub sequence: u16,
    /// ICMP message size (header + payload), as ping reports it
    pub size: usize,
}

/// Parse a received datagram.
///
/// Raw IPv4 sockets (and datagram sockets on some platforms) deliver the IP
/// header too; it is skipped. Returns `Ok(None)` for ICMP messages that are
/// not echo replies, e.g. our own request looped back on a raw socket.
pub fn parse_reply(datagram: &[u8], version: IcmpVersion) -> Result<Option<EchoMessage>> {
    let icmp = match version {
        IcmpVersion::V4 => strip_ipv4_header(datagram)?,
        IcmpVersion::V6 => datagram,
    };

    if icmp.len() < ICMP_HEADER_LEN {
        return Err(AppError::parse(format!(
            "ICMP message too short: {} bytes",
            icmp.len()
        )));
    }

    if icmp[0] != version.reply_type() || icmp[1] != 0 {
        return Ok(None);
    }

    Ok(Some(EchoMessage {
        identifier: u16::from_be_bytes([icmp[4], icmp[5]]),
        sequence: u16::from_be_bytes([icmp[6], icmp[7]]),
        size: icmp.len(),
    }))
}

fn strip_ipv4_header(datagram: &[u8]) -> Result<&[u8]> {
    match datagram.first() {
        Some(first) if first >> 4 == 4 => {
            let header_len = usize::from(first & 0x0f) * 4;
            if header_len < 20 || datagram.len() < header_len {
                return Err(AppError::parse("Truncated IPv4 header"));
            }
            Ok(&datagram[header_len..])
        }
        _ => Ok(datagram),
    }
}

/// RFC 1071 Internet checksum
pub fn checksum(data: &[u8]) -> u16 {
    let mut sum: u32 = 0;
    let mut chunks = data.chunks_exact(2);
    for chunk in &mut chunks {
        sum += u32::from(u16::from_be_bytes([chunk[0], chunk[1]]));
    }
    if let [last] = chunks.remainder() {
        sum += u32::from(*last) << 8;
    }
    while sum >> 16 != 0 {
        sum = (sum & 0xffff) + (sum >> 16);
    }
    !(sum as u16)
}
