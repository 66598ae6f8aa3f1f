//! Peer addresses: the keepalive payload codec and the shared peer set

use log::debug;
use rand::seq::IteratorRandom;
use std::collections::HashSet;
use std::net::{Ipv6Addr, SocketAddr, SocketAddrV6};
use std::sync::{PoisonError, RwLock};

/// Peers carried by one keepalive
pub const KEEPALIVE_PEERS: usize = 8;
const PEER_ENTRY_LEN: usize = 18;
pub const KEEPALIVE_PAYLOAD_LEN: usize = KEEPALIVE_PEERS * PEER_ENTRY_LEN;
/// Known peers kept unless configured otherwise
pub const DEFAULT_MAX_PEERS: usize = 1024;

/// The unspecified address with port 0, used as padding
pub fn empty_peer() -> SocketAddrV6 {
    SocketAddrV6::new(Ipv6Addr::UNSPECIFIED, 0, 0, 0)
}

/// IPv4 peers become IPv4-mapped IPv6 addresses
pub fn to_ipv6_peer(addr: SocketAddr) -> SocketAddrV6 {
    match addr {
        SocketAddr::V4(v4) => SocketAddrV6::new(v4.ip().to_ipv6_mapped(), v4.port(), 0, 0),
        SocketAddr::V6(v6) => v6,
    }
}

/// Pack up to eight peers as 16-byte address plus 2-byte port, padded with
/// empty entries to exactly eight.
///
/// Ports go out little-endian, which is what peers on the live network send.
pub fn pack_peers(peers: &[SocketAddrV6]) -> Vec<u8> {
    let mut out = Vec::with_capacity(KEEPALIVE_PAYLOAD_LEN);
    let padding = std::iter::repeat(empty_peer());
    for peer in peers.iter().copied().chain(padding).take(KEEPALIVE_PEERS) {
        out.extend_from_slice(&peer.ip().octets());
        out.extend_from_slice(&peer.port().to_le_bytes());
    }
    out
}

/// Inverse of `pack_peers`. Short input is zero-padded; bytes past the
/// eighth entry are ignored.
pub fn unpack_peers(data: &[u8]) -> Vec<SocketAddrV6> {
    let mut padded = [0u8; KEEPALIVE_PAYLOAD_LEN];
    let len = data.len().min(KEEPALIVE_PAYLOAD_LEN);
    padded[..len].copy_from_slice(&data[..len]);

    padded
        .chunks_exact(PEER_ENTRY_LEN)
        .map(|entry| {
            let mut octets = [0u8; 16];
            octets.copy_from_slice(&entry[..16]);
            let port = u16::from_le_bytes([entry[16], entry[17]]);
            SocketAddrV6::new(Ipv6Addr::from(octets), port, 0, 0)
        })
        .collect()
}

/// Known peers, shared between the receive and keepalive workers.
///
/// Holds at most `limit` peers; once full, new peers are dropped.
#[derive(Debug)]
pub struct PeerSet {
    inner: RwLock<HashSet<SocketAddrV6>>,
    limit: usize,
}

impl Default for PeerSet {
    fn default() -> Self {
        PeerSet::with_limit(DEFAULT_MAX_PEERS)
    }
}

impl PeerSet {
    pub fn new() -> PeerSet {
        PeerSet::default()
    }

    pub fn with_limit(limit: usize) -> PeerSet {
        PeerSet {
            inner: RwLock::new(HashSet::new()),
            limit,
        }
    }

    pub fn with_peers<I: IntoIterator<Item = SocketAddrV6>>(peers: I, limit: usize) -> PeerSet {
        let set = PeerSet::with_limit(limit);
        set.add_all(peers);
        set
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Padding entries (unspecified address or port 0) are skipped, as is
    /// any new peer once the set is full. Returns whether the peer was new.
    pub fn add(&self, peer: SocketAddrV6) -> bool {
        if peer.ip().is_unspecified() || peer.port() == 0 {
            return false;
        }
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        if inner.len() >= self.limit && !inner.contains(&peer) {
            debug!("Peer set full, dropping {peer}");
            return false;
        }
        let added = inner.insert(peer);
        if added {
            debug!("New peer {peer}");
        }
        added
    }

    pub fn add_all<I: IntoIterator<Item = SocketAddrV6>>(&self, peers: I) -> usize {
        peers.into_iter().filter(|peer| self.add(*peer)).count()
    }

    pub fn all(&self) -> Vec<SocketAddrV6> {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        inner.iter().copied().collect()
    }

    /// Up to `n` distinct peers, uniformly chosen
    pub fn random_sample(&self, n: usize) -> Vec<SocketAddrV6> {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        inner
            .iter()
            .copied()
            .choose_multiple(&mut rand::thread_rng(), n)
    }

    pub fn contains(&self, peer: &SocketAddrV6) -> bool {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        inner.contains(peer)
    }

    pub fn len(&self) -> usize {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
