use crate::core::types::Work;
use crate::error::{LedgerError, Result};
use crate::utils::blake2b_64;
use log::{debug, info};
use rand::Rng;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Live network threshold; a work value must be strictly above it
pub const DEFAULT_WORK_THRESHOLD: u64 = 0xFFFF_FFC0_0000_0000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WorkThreshold(u64);

impl WorkThreshold {
    pub const fn new(value: u64) -> WorkThreshold {
        WorkThreshold(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }

    pub fn accepts(&self, work_value: u64) -> bool {
        work_value > self.0
    }

    pub fn from_hex(text: &str) -> Result<WorkThreshold> {
        let trimmed = text.trim_start_matches("0x").trim_start_matches("0X");
        u64::from_str_radix(trimmed, 16)
            .map(WorkThreshold)
            .map_err(|e| LedgerError::Format(format!("Invalid work threshold {text}: {e}")))
    }

    pub fn to_hex(&self) -> String {
        format!("{:016X}", self.0)
    }
}

impl Default for WorkThreshold {
    fn default() -> Self {
        WorkThreshold(DEFAULT_WORK_THRESHOLD)
    }
}

/// Byte order a block uses when it serializes its work nonce.
///
/// Legacy blocks write the nonce little-endian, state blocks big-endian.
/// The hash always sees the little-endian form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkEncoding {
    LittleEndian,
    BigEndian,
}

impl WorkEncoding {
    fn hash_input(&self, work: &Work) -> [u8; 8] {
        let mut bytes = *work.as_bytes();
        if *self == WorkEncoding::BigEndian {
            bytes.reverse();
        }
        bytes
    }
}

/// Work check and nonce search against one root (previous block hash, or
/// the account key for the first block of a chain).
#[derive(Debug, Clone)]
pub struct ProofOfWork {
    root: [u8; 32],
    threshold: WorkThreshold,
    encoding: WorkEncoding,
}

impl ProofOfWork {
    pub fn new(root: [u8; 32], threshold: WorkThreshold, encoding: WorkEncoding) -> ProofOfWork {
        ProofOfWork {
            root,
            threshold,
            encoding,
        }
    }

    pub fn root(&self) -> &[u8; 32] {
        &self.root
    }

    pub fn threshold(&self) -> WorkThreshold {
        self.threshold
    }

    /// Blake2b-64 of nonce and root, read as a little-endian integer
    /// (the byte-reversed digest taken big-endian).
    pub fn work_value(&self, work: &Work) -> u64 {
        let nonce = self.encoding.hash_input(work);
        u64::from_le_bytes(blake2b_64(&[nonce.as_slice(), self.root.as_slice()]))
    }

    pub fn validate(&self, work: &Work) -> bool {
        self.threshold.accepts(self.work_value(work))
    }

    /// Draw random nonces until one passes or `stop` is raised.
    pub fn run(&self, stop: &AtomicBool) -> Option<Work> {
        let mut rng = rand::thread_rng();
        let mut nonce = [0u8; 8];
        let mut attempts: u64 = 0;
        while !stop.load(Ordering::Relaxed) {
            rng.fill(&mut nonce);
            attempts += 1;
            let work = Work::from_bytes(nonce);
            if self.validate(&work) {
                info!("Found work {} after {} attempts", work, attempts);
                return Some(work);
            }
        }
        debug!("Work search stopped after {} attempts", attempts);
        None
    }

    /// Run the search on its own thread.
    pub fn spawn(self) -> Result<WorkHandle> {
        let stop = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&stop);
        let handle = thread::Builder::new()
            .name("work-generator".to_string())
            .spawn(move || self.run(&flag))
            .map_err(|e| LedgerError::Mining(format!("Failed to start work thread: {e}")))?;
        Ok(WorkHandle { stop, handle })
    }
}

/// A running nonce search. Dropping the handle leaves the thread running;
/// call `cancel` to stop it.
pub struct WorkHandle {
    stop: Arc<AtomicBool>,
    handle: JoinHandle<Option<Work>>,
}

impl WorkHandle {
    pub fn cancel(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    pub fn join(self) -> Result<Work> {
        match self.handle.join() {
            Ok(Some(work)) => Ok(work),
            Ok(None) => Err(LedgerError::Mining("Work generation cancelled".to_string())),
            Err(_) => Err(LedgerError::Mining("Work thread panicked".to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::BlockHash;

    // Genesis open block: the root is the account key
    const GENESIS_KEY: &str = "E89208DD038FBB269987689621D52292AE9C35941A7484756ECCED92A65093BA";
    const GENESIS_WORK: &str = "91B63FDD1754F062";

    fn genesis_pow(threshold: WorkThreshold) -> ProofOfWork {
        let root = BlockHash::from_hex(GENESIS_KEY).unwrap();
        ProofOfWork::new(*root.as_bytes(), threshold, WorkEncoding::LittleEndian)
    }

    #[test]
    fn test_genesis_work_value() {
        let pow = genesis_pow(WorkThreshold::default());
        let work = Work::from_hex(GENESIS_WORK).unwrap();
        assert_eq!(pow.work_value(&work), 0xFFFF_FFF4_000D_3DAC);
        assert!(pow.validate(&work));
    }

    #[test]
    fn test_threshold_is_strict() {
        let work = Work::from_hex(GENESIS_WORK).unwrap();
        let value = genesis_pow(WorkThreshold::default()).work_value(&work);

        assert!(!genesis_pow(WorkThreshold::new(value)).validate(&work));
        assert!(genesis_pow(WorkThreshold::new(value - 1)).validate(&work));
    }

    #[test]
    fn test_state_work_is_reversed_before_hashing() {
        let previous =
            BlockHash::from_hex("1ED7BB8BBF43DBD9AA5D81E1EDC5F59F95DB714056C0CBE86C9E48AD1C1EF3AE")
                .unwrap();
        let work = Work::from_hex("FCB4E6B3F4DA6EAE").unwrap();

        let state = ProofOfWork::new(
            *previous.as_bytes(),
            WorkThreshold::default(),
            WorkEncoding::BigEndian,
        );
        assert!(state.validate(&work));

        let legacy = ProofOfWork::new(
            *previous.as_bytes(),
            WorkThreshold::default(),
            WorkEncoding::LittleEndian,
        );
        assert!(!legacy.validate(&work));
    }

    #[test]
    fn test_threshold_hex() {
        assert_eq!(
            WorkThreshold::from_hex("FFFFFFC000000000").unwrap(),
            WorkThreshold::default()
        );
        assert_eq!(WorkThreshold::from_hex("0x10").unwrap().value(), 16);
        assert!(WorkThreshold::from_hex("not hex").is_err());
        assert_eq!(WorkThreshold::default().to_hex(), "FFFFFFC000000000");
    }

    #[test]
    fn test_run_finds_work_with_low_threshold() {
        let pow = genesis_pow(WorkThreshold::new(0xF000_0000_0000_0000));
        let stop = AtomicBool::new(false);
        let work = pow.run(&stop).unwrap();
        assert!(pow.validate(&work));
    }

    #[test]
    fn test_run_returns_none_when_stopped() {
        let pow = genesis_pow(WorkThreshold::new(u64::MAX));
        let stop = AtomicBool::new(true);
        assert_eq!(pow.run(&stop), None);
    }

    #[test]
    fn test_spawned_search_can_be_cancelled() {
        // Nothing is above u64::MAX, so only cancel ends this search
        let handle = genesis_pow(WorkThreshold::new(u64::MAX)).spawn().unwrap();
        handle.cancel();
        assert!(matches!(handle.join(), Err(LedgerError::Mining(_))));
    }

    #[test]
    fn test_spawned_search_finds_work() {
        let pow = genesis_pow(WorkThreshold::new(0xC000_0000_0000_0000));
        let check = pow.clone();
        let work = pow.spawn().unwrap().join().unwrap();
        assert!(check.validate(&work));
    }
}
