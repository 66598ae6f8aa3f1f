use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "lattice-ledger")]
pub struct Opt {
    #[arg(long, global = true, help = "TOML settings file (defaults to $LATTICE_CONFIG)")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    #[command(name = "address", about = "Derive the keys and address at a seed index")]
    Address {
        #[arg(long, help = "Wallet seed, 64 hex characters")]
        seed: String,
        #[arg(long, default_value_t = 0, help = "Key index")]
        index: u32,
    },
    #[command(name = "validate", about = "Check an address checksum")]
    Validate {
        #[arg(help = "The xrb_ address")]
        address: String,
    },
    #[command(name = "account-key", about = "Print the verifying key of an address")]
    AccountKey {
        #[arg(help = "The xrb_ address")]
        address: String,
    },
    #[command(name = "decode", about = "Decode a hex message as JSON")]
    Decode {
        #[arg(help = "Message bytes in hex, header included")]
        message: String,
    },
    #[command(name = "work", about = "Search for a work nonce")]
    Work {
        #[arg(long, help = "Previous block hash, or the account key of an open block")]
        root: String,
        #[arg(long, help = "Emit the nonce in state block (big-endian) order")]
        state: bool,
        #[arg(long, help = "Hex threshold, overriding the configured one")]
        threshold: Option<String>,
        #[arg(long = "timeout-secs", help = "Give up after this many seconds")]
        timeout_secs: Option<u64>,
    },
    #[command(name = "getblock", about = "Print a stored block")]
    GetBlock {
        #[arg(help = "Block hash")]
        hash: String,
        #[arg(long = "type", help = "Block type; searches every block table if omitted")]
        block_type: Option<String>,
    },
    #[command(name = "startnode", about = "Start a node")]
    StartNode,
}
