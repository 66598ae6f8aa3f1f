use crate::error::{LedgerError, Result};
use crate::network::peers::{to_ipv6_peer, PeerSet};
use log::{debug, warn};
use std::io::ErrorKind;
use std::net::{SocketAddr, SocketAddrV6, UdpSocket};
use std::sync::Arc;
use std::time::Duration;

/// Largest datagram read in one call
pub const MAX_DATAGRAM_LEN: usize = 1500;

/// How long `receive` blocks on a freshly bound socket
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_millis(500);

/// A datagram channel with a registry of known peers
pub trait Transport: Send + Sync {
    /// `None` broadcasts to a random sample of known peers
    fn send(&self, data: &[u8], peer: Option<SocketAddrV6>) -> Result<()>;

    /// `Ok(None)` when the read timed out with nothing to deliver
    fn receive(&self) -> Result<Option<(Vec<u8>, SocketAddrV6)>>;

    fn peers(&self) -> &PeerSet;
}

pub struct UdpTransport {
    socket: UdpSocket,
    peers: Arc<PeerSet>,
    max_broadcast_peers: usize,
}

impl UdpTransport {
    /// Reads time out after `DEFAULT_READ_TIMEOUT` until told otherwise
    pub fn bind(
        addr: SocketAddr,
        peers: Arc<PeerSet>,
        max_broadcast_peers: usize,
    ) -> Result<UdpTransport> {
        let socket = UdpSocket::bind(addr)
            .map_err(|e| LedgerError::Network(format!("Failed to bind to {addr}: {e}")))?;
        let transport = UdpTransport {
            socket,
            peers,
            max_broadcast_peers,
        };
        transport.set_read_timeout(Some(DEFAULT_READ_TIMEOUT))?;
        Ok(transport)
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.socket.local_addr()?)
    }

    /// `None` makes `receive` block until a datagram arrives
    pub fn set_read_timeout(&self, timeout: Option<Duration>) -> Result<()> {
        self.socket
            .set_read_timeout(timeout)
            .map_err(|e| LedgerError::Network(format!("Failed to set read timeout: {e}")))
    }
}

impl Transport for UdpTransport {
    fn send(&self, data: &[u8], peer: Option<SocketAddrV6>) -> Result<()> {
        if let Some(peer) = peer {
            self.socket
                .send_to(data, peer)
                .map_err(|e| LedgerError::Network(format!("Unable to send to {peer}: {e}")))?;
            return Ok(());
        }

        let targets = self.peers.random_sample(self.max_broadcast_peers);
        let mut sent = 0;
        for target in &targets {
            match self.socket.send_to(data, target) {
                Ok(_) => sent += 1,
                Err(e) => warn!("Unable to send to {target}: {e}"),
            }
        }
        debug!("Broadcast {} bytes to {sent}/{} peers", data.len(), targets.len());
        Ok(())
    }

    fn receive(&self) -> Result<Option<(Vec<u8>, SocketAddrV6)>> {
        let mut buffer = [0u8; MAX_DATAGRAM_LEN];
        match self.socket.recv_from(&mut buffer) {
            Ok((len, from)) => {
                let from = to_ipv6_peer(from);
                self.peers.add(from);
                Ok(Some((buffer[..len].to_vec(), from)))
            }
            Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => Ok(None),
            Err(e) => Err(LedgerError::Network(format!("Receive failed: {e}"))),
        }
    }

    fn peers(&self) -> &PeerSet {
        &self.peers
    }
}
