//! Peer-to-peer networking over UDP
//!
//! This module handles message framing, the keepalive peer payload, the
//! shared peer set, the datagram transport and the node's workers.

pub mod message;
pub mod peers;
pub mod server;
pub mod transport;

pub use message::{
    message_decode, message_encode, Message, MessageHeader, MessageType, Network, Protocol,
};
pub use peers::{pack_peers, unpack_peers, PeerSet};
pub use server::{Handled, Server};
pub use transport::{Transport, UdpTransport};
