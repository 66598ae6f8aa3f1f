// This is my entry point for the lattice ledger CLI
// Everything here is thin glue: the real work lives in the library modules
use clap::Parser;
use lattice_ledger::cli::BlockSummary;
use lattice_ledger::{
    address_to_verifying_key, address_valid, summarize, utils, Account, BlockHash, BlockStore,
    BlockType, Command, Opt, ProofOfWork, Seed, Server, Settings, SledStore, WorkEncoding,
    WorkThreshold, GLOBAL_CONFIG,
};
use log::{error, info, LevelFilter};
use std::process;
use std::thread;
use std::time::{Duration, Instant};

// How often I check on a running work search
const WORK_POLL_INTERVAL: Duration = Duration::from_millis(100);

fn main() {
    // Info level by default; RUST_LOG still wins when set
    env_logger::builder()
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .init();

    let opt = Opt::parse();

    if let Err(e) = run(opt) {
        error!("Error: {e}");
        process::exit(1);
    }
}

fn run(opt: Opt) -> Result<(), Box<dyn std::error::Error>> {
    // I load the settings once and publish them process-wide
    GLOBAL_CONFIG.replace(Settings::load(opt.config.as_deref())?);
    let settings = GLOBAL_CONFIG.settings();

    match opt.command {
        Command::Address { seed, index } => {
            let seed = Seed::from_hex(&seed)?;
            let account = Account::from_seed(&seed, index);
            if let Some(signing_key) = account.signing_key() {
                println!("Signing key:   {}", signing_key.to_hex());
            }
            println!("Verifying key: {}", account.verifying_key());
            println!("Address:       {}", account.address());
        }
        Command::Validate { address } => {
            if !address_valid(&address) {
                return Err(format!("Invalid address: {address}").into());
            }
            println!("{address} is valid");
        }
        Command::AccountKey { address } => {
            if !address_valid(&address) {
                return Err(format!("Invalid address: {address}").into());
            }
            println!("{}", address_to_verifying_key(&address)?);
        }
        Command::Decode { message } => {
            let data = utils::hex_to_bytes(message.trim())?;
            let summary = summarize(&settings.protocol(), &data, settings.threshold()?)?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        Command::Work {
            root,
            state,
            threshold,
            timeout_secs,
        } => {
            let root = BlockHash::from_hex(&root)?;
            let threshold = match threshold {
                Some(hex) => WorkThreshold::from_hex(&hex)?,
                None => settings.threshold()?,
            };
            let encoding = if state {
                WorkEncoding::BigEndian
            } else {
                WorkEncoding::LittleEndian
            };

            info!("Searching for work on {root} above {}", threshold.to_hex());
            let handle = ProofOfWork::new(*root.as_bytes(), threshold, encoding).spawn()?;

            // I cancel the search myself when the deadline passes
            if let Some(secs) = timeout_secs {
                let deadline = Instant::now() + Duration::from_secs(secs);
                while !handle.is_finished() && Instant::now() < deadline {
                    thread::sleep(WORK_POLL_INTERVAL);
                }
                handle.cancel();
            }
            println!("{}", handle.join()?);
        }
        Command::GetBlock { hash, block_type } => {
            let hash = BlockHash::from_hex(&hash)?;
            let store = SledStore::open(settings.db_path())?;
            let block = match block_type {
                Some(name) => store.get_block(name.parse::<BlockType>()?, &hash)?,
                None => store.find_block(&hash)?,
            };
            let block = block.ok_or_else(|| format!("Block {hash} not found"))?;

            println!("Type: {}", block.block_type());
            println!("Next: {}", block.next());
            let summary = BlockSummary::new(&block, settings.threshold()?);
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        Command::StartNode => {
            let server = Server::from_settings(&settings)?;
            server.run()?;
        }
    }
    Ok(())
}
