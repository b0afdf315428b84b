//! ICMP echo probe over socket2 sockets
//!
//! An unprivileged datagram ICMP socket is tried first (Linux with
//! `net.ipv4.ping_group_range`, macOS), then a raw socket (root or
//! CAP_NET_RAW). The socket is non-blocking and driven by tokio, so
//! dropping a probe future stops the wait at once.

use super::packet::{parse_reply, EchoMessage, EchoRequest, IcmpVersion, DEFAULT_PAYLOAD_LEN};
use super::{EchoReply, Probe, ProbeOutcome};
use crate::error::{AppError, Result};
use async_trait::async_trait;
use socket2::{Domain, Protocol, Socket, Type};
use std::io;
use std::net::{IpAddr, SocketAddr};
use std::sync::atomic::{AtomicU16, Ordering};
use std::time::{Duration, Instant};
use tokio::net::UdpSocket;

/// How the socket was opened; datagram sockets get their identifier
/// rewritten by the kernel, so replies are matched on sequence only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SocketKind {
    Datagram,
    Raw,
}

/// Probe sending real ICMP echo requests
pub struct IcmpProbe {
    identifier: u16,
    sequence: AtomicU16,
}

impl IcmpProbe {
    pub fn new() -> Self {
        Self {
            identifier: (std::process::id() & 0xffff) as u16,
            sequence: AtomicU16::new(0),
        }
    }

    fn next_sequence(&self) -> u16 {
        self.sequence.fetch_add(1, Ordering::Relaxed).wrapping_add(1)
    }
}

impl Default for IcmpProbe {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Probe for IcmpProbe {
    async fn probe(&self, host: &str, timeout: Duration) -> Result<ProbeOutcome> {
        let address = resolve_host(host).await?;
        let request = EchoRequest::new(self.identifier, self.next_sequence(), DEFAULT_PAYLOAD_LEN);

        echo(address, request, timeout).await
    }

    async fn resolve(&self, host: &str) -> Result<Option<IpAddr>> {
        resolve_host(host).await.map(Some)
    }
}

/// Resolve a host name or literal address, preferring IPv4
pub async fn resolve_host(host: &str) -> Result<IpAddr> {
    if let Ok(address) = host.parse::<IpAddr>() {
        return Ok(address);
    }

    let addresses: Vec<IpAddr> = tokio::net::lookup_host((host, 0))
        .await
        .map_err(|e| AppError::dns_resolution(format!("Cannot resolve {}: {}", host, e)))?
        .map(|socket_addr| socket_addr.ip())
        .collect();

    addresses
        .iter()
        .find(|address| address.is_ipv4())
        .or_else(|| addresses.first())
        .copied()
        .ok_or_else(|| AppError::dns_resolution(format!("No addresses found for {}", host)))
}

fn open_socket(version: IcmpVersion) -> Result<(UdpSocket, SocketKind)> {
    let (domain, protocol) = match version {
        IcmpVersion::V4 => (Domain::IPV4, Protocol::ICMPV4),
        IcmpVersion::V6 => (Domain::IPV6, Protocol::ICMPV6),
    };

    let (socket, kind) = match Socket::new(domain, Type::DGRAM, Some(protocol)) {
        Ok(socket) => (socket, SocketKind::Datagram),
        Err(datagram_error) => match Socket::new(domain, Type::RAW, Some(protocol)) {
            Ok(socket) => (socket, SocketKind::Raw),
            Err(raw_error) => {
                return Err(socket_error(
                    raw_error,
                    &format!("cannot open ICMP socket (datagram: {})", datagram_error),
                ))
            }
        },
    };

    socket
        .set_nonblocking(true)
        .map_err(|e| socket_error(e, "cannot make ICMP socket non-blocking"))?;
    let socket = UdpSocket::from_std(socket.into())
        .map_err(|e| socket_error(e, "cannot register ICMP socket"))?;

    Ok((socket, kind))
}

fn socket_error(error: io::Error, context: &str) -> AppError {
    match error.kind() {
        io::ErrorKind::PermissionDenied => AppError::permission(format!("{}: {}", context, error)),
        _ => AppError::network(format!("{}: {}", context, error)),
    }
}

async fn echo(address: IpAddr, request: EchoRequest, timeout: Duration) -> Result<ProbeOutcome> {
    let version = match address {
        IpAddr::V4(_) => IcmpVersion::V4,
        IpAddr::V6(_) => IcmpVersion::V6,
    };
    let (socket, kind) = open_socket(version)?;
    let packet = request.encode(version);

    let started = Instant::now();
    socket
        .send_to(&packet, SocketAddr::new(address, 0))
        .await
        .map_err(|e| socket_error(e, &format!("send to {} failed", address)))?;

    let wait = wait_for_reply(&socket, kind, address, &request, version);
    let message = match tokio::time::timeout(timeout, wait).await {
        Ok(message) => message?,
        Err(_) => return Ok(ProbeOutcome::Timeout),
    };

    Ok(ProbeOutcome::Reply(EchoReply {
        latency_ms: started.elapsed().as_secs_f64() * 1000.0,
        bytes: message.size,
        sequence: Some(message.sequence),
        address: Some(address),
    }))
}

/// Read datagrams until the echo reply matching `request` arrives
async fn wait_for_reply(
    socket: &UdpSocket,
    kind: SocketKind,
    address: IpAddr,
    request: &EchoRequest,
    version: IcmpVersion,
) -> Result<EchoMessage> {
    let mut buffer = [0u8; 2048];
    loop {
        let (received, from) = match socket.recv_from(&mut buffer).await {
            Ok(result) => result,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(socket_error(e, "receive failed")),
        };

        if from.ip() != address {
            continue;
        }

        let message = match parse_reply(&buffer[..received], version) {
            Ok(Some(message)) => message,
            // Not ours or not an echo reply; keep waiting
            Ok(None) | Err(_) => continue,
        };

        let identifier_matches =
            kind == SocketKind::Datagram || message.identifier == request.identifier;
        if identifier_matches && message.sequence == request.sequence {
            return Ok(message);
        }
    }
}
