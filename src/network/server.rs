use crate::config::Settings;
use crate::core::block::{Block, BlockType};
use crate::core::proof_of_work::WorkThreshold;
use crate::core::types::BlockHash;
use crate::error::Result;
use crate::network::message::{encode, message_decode, MessageType, Protocol};
use crate::network::peers::{pack_peers, unpack_peers, PeerSet, KEEPALIVE_PEERS};
use crate::network::transport::{Transport, UdpTransport};
use crate::storage::{BlockStore, SledStore};
use log::{debug, error, info, warn};
use std::net::SocketAddrV6;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// How often the keepalive worker looks at the stop flag
const POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Shortest keepalive period the node will use
pub const MIN_KEEPALIVE_INTERVAL: Duration = Duration::from_secs(1);

/// What the node did with one message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Handled {
    Peers {
        added: usize,
    },
    Block {
        block_type: BlockType,
        hash: BlockHash,
        work_valid: bool,
        stored: bool,
    },
    Ignored(MessageType),
}

/// The node: a receive worker and a keepalive worker sharing one transport
pub struct Server {
    transport: Arc<dyn Transport>,
    store: Arc<dyn BlockStore>,
    protocol: Protocol,
    threshold: WorkThreshold,
    keepalive_interval: Duration,
    running: Arc<AtomicBool>,
}

impl Server {
    /// `keepalive_interval` is raised to `MIN_KEEPALIVE_INTERVAL` if shorter.
    /// The transport's `receive` must time out for `stop` to take effect.
    pub fn new(
        transport: Arc<dyn Transport>,
        store: Arc<dyn BlockStore>,
        protocol: Protocol,
        threshold: WorkThreshold,
        keepalive_interval: Duration,
    ) -> Server {
        Server {
            transport,
            store,
            protocol,
            threshold,
            keepalive_interval: keepalive_interval.max(MIN_KEEPALIVE_INTERVAL),
            running: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Bind the UDP socket and open the sled store the settings name
    pub fn from_settings(settings: &Settings) -> Result<Server> {
        let peers = Arc::new(PeerSet::with_peers(settings.peers(), settings.max_peers));
        let transport = UdpTransport::bind(
            settings.bind_addr()?,
            peers,
            settings.max_broadcast_peers,
        )?;
        info!("Listening on {}", transport.local_addr()?);

        let store = SledStore::open(settings.db_path())?;
        Ok(Server::new(
            Arc::new(transport),
            Arc::new(store),
            settings.protocol(),
            settings.threshold()?,
            settings.keepalive_interval(),
        ))
    }

    pub fn peers(&self) -> &PeerSet {
        self.transport.peers()
    }

    pub fn keepalive_interval(&self) -> Duration {
        self.keepalive_interval
    }

    /// Set this flag to false (or call `stop`) to end `run`. A stop issued
    /// before `run` makes it return at once.
    pub fn running_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.running)
    }

    pub fn stop(&self) {
        self.running.store(false, Ordering::Relaxed);
    }

    /// Run both workers until stopped. The receive worker runs on the
    /// calling thread.
    pub fn run(&self) -> Result<()> {
        if !self.running.load(Ordering::Relaxed) {
            info!("Node was stopped before it started");
            return Ok(());
        }
        info!(
            "Starting node on the {} network with {} known peers",
            self.protocol.network,
            self.peers().len()
        );

        let keepalive = {
            let transport = Arc::clone(&self.transport);
            let running = Arc::clone(&self.running);
            let protocol = self.protocol;
            let interval = self.keepalive_interval;
            thread::Builder::new()
                .name("keepalive".to_string())
                .spawn(move || keepalive_loop(transport.as_ref(), &protocol, interval, &running))?
        };

        while self.running.load(Ordering::Relaxed) {
            match self.transport.receive() {
                Ok(Some((data, from))) => self.process(&data, from),
                Ok(None) => continue,
                Err(e) => error!("{e}"),
            }
        }

        if keepalive.join().is_err() {
            error!("Keepalive worker panicked");
        }
        info!("Node stopped");
        Ok(())
    }

    fn process(&self, data: &[u8], from: SocketAddrV6) {
        match self.handle_message(data) {
            Ok(handled) => debug!("{from}: {handled:?}"),
            Err(e) => warn!("Dropping message from {from}: {e}"),
        }
    }

    /// Decode one datagram and act on it: merge keepalive peers, or log and
    /// store a carried block whose work is valid.
    pub fn handle_message(&self, data: &[u8]) -> Result<Handled> {
        let message = message_decode(&self.protocol, data)?;
        let message_type = message.message_type();
        let block_type = message.block_type();

        if message_type == MessageType::Keepalive {
            let peers = unpack_peers(&message.block);
            info!("Got keepalive peers: {peers:?}");
            let added = self.peers().add_all(peers);
            return Ok(Handled::Peers { added });
        }

        if !message_type.carries_block() {
            debug!("Ignoring {message_type} message");
            return Ok(Handled::Ignored(message_type));
        }
        if !block_type.is_block() {
            warn!("Unknown block type {block_type} in {message_type} message");
            return Ok(Handled::Ignored(message_type));
        }

        let block = Block::from_network_bytes(block_type, &message.block)?;
        let hash = *block.hash();
        let work_valid = block.work_valid_for(self.threshold);
        info!("Block hash: {hash}, work valid: {work_valid}, block type: {block_type}");

        if work_valid {
            self.store.put_block(&block, self.threshold)?;
        }
        Ok(Handled::Block {
            block_type,
            hash,
            work_valid,
            stored: work_valid,
        })
    }

    /// Broadcast a keepalive carrying `peers`
    pub fn send_keepalive(&self, peers: &[SocketAddrV6]) -> Result<()> {
        send_keepalive(self.transport.as_ref(), &self.protocol, peers)
    }
}

fn send_keepalive(
    transport: &dyn Transport,
    protocol: &Protocol,
    peers: &[SocketAddrV6],
) -> Result<()> {
    let message = encode(
        protocol,
        MessageType::Keepalive,
        BlockType::Invalid,
        &[],
        &pack_peers(peers),
    );
    transport.send(&message, None)
}

/// An empty keepalive first, then a sample of known peers every `interval`
fn keepalive_loop(
    transport: &dyn Transport,
    protocol: &Protocol,
    interval: Duration,
    running: &AtomicBool,
) {
    if let Err(e) = send_keepalive(transport, protocol, &[]) {
        error!("Initial keepalive failed: {e}");
    }

    let mut last = Instant::now();
    while running.load(Ordering::Relaxed) {
        thread::sleep(POLL_INTERVAL.min(interval));
        if last.elapsed() < interval {
            continue;
        }
        last = Instant::now();
        let peers = transport.peers().random_sample(KEEPALIVE_PEERS);
        if let Err(e) = send_keepalive(transport, protocol, &peers) {
            error!("Keepalive failed: {e}");
        }
    }
}
