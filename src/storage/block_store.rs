use crate::core::block::{Block, BlockType};
use crate::core::proof_of_work::WorkThreshold;
use crate::core::types::BlockHash;
use crate::error::{LedgerError, Result};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::{PoisonError, RwLock};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Send,
    Receive,
    Open,
    Change,
    State,
    Accounts,
    Frontiers,
    Pending,
    Representation,
    Checksum,
    Meta,
    Unchecked,
    Vote,
}

impl Table {
    pub const ALL: [Table; 13] = [
        Table::Send,
        Table::Receive,
        Table::Open,
        Table::Change,
        Table::State,
        Table::Accounts,
        Table::Frontiers,
        Table::Pending,
        Table::Representation,
        Table::Checksum,
        Table::Meta,
        Table::Unchecked,
        Table::Vote,
    ];

    pub const BLOCKS: [Table; 5] = [
        Table::Send,
        Table::Receive,
        Table::Open,
        Table::Change,
        Table::State,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Table::Send => "send",
            Table::Receive => "receive",
            Table::Open => "open",
            Table::Change => "change",
            Table::State => "state",
            Table::Accounts => "accounts",
            Table::Frontiers => "frontiers",
            Table::Pending => "pending",
            Table::Representation => "representation",
            Table::Checksum => "checksum",
            Table::Meta => "meta",
            Table::Unchecked => "unchecked",
            Table::Vote => "vote",
        }
    }

    /// The table holding blocks of `block_type`
    pub fn for_block(block_type: BlockType) -> Option<Table> {
        match block_type {
            BlockType::Send => Some(Table::Send),
            BlockType::Receive => Some(Table::Receive),
            BlockType::Open => Some(Table::Open),
            BlockType::Change => Some(Table::Change),
            BlockType::State => Some(Table::State),
            BlockType::Invalid | BlockType::NotABlock => None,
        }
    }

    pub fn block_type(&self) -> Option<BlockType> {
        match self {
            Table::Send => Some(BlockType::Send),
            Table::Receive => Some(BlockType::Receive),
            Table::Open => Some(BlockType::Open),
            Table::Change => Some(BlockType::Change),
            Table::State => Some(BlockType::State),
            _ => None,
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Table {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self> {
        Table::ALL
            .into_iter()
            .find(|table| table.name() == s)
            .ok_or_else(|| LedgerError::UnknownType(format!("Unknown table: {s}")))
    }
}

/// A byte store of named tables keyed by 32-byte values.
///
/// Implementors supply `put` and `get`; the block helpers are built on them.
pub trait BlockStore: Send + Sync {
    /// Overwrites any existing value under `key`
    fn put(&self, table: Table, key: &[u8; 32], value: &[u8]) -> Result<()>;

    fn get(&self, table: Table, key: &[u8; 32]) -> Result<Option<Vec<u8>>>;

    /// Store a block in its type's table, in storage form
    fn put_block(&self, block: &Block, threshold: WorkThreshold) -> Result<()> {
        let table = Table::for_block(block.block_type()).ok_or_else(|| {
            LedgerError::Database(format!("No table for {} blocks", block.block_type()))
        })?;
        let mut data = block.pack_for(threshold)?;
        data.extend_from_slice(block.next().as_bytes());
        self.put(table, block.hash().as_bytes(), &data)
    }

    fn get_block(&self, block_type: BlockType, hash: &BlockHash) -> Result<Option<Block>> {
        let Some(table) = Table::for_block(block_type) else {
            return Ok(None);
        };
        match self.get(table, hash.as_bytes())? {
            Some(data) => Ok(Some(Block::from_storage_bytes(block_type, &data)?)),
            None => Ok(None),
        }
    }

    /// Look a hash up in every block table
    fn find_block(&self, hash: &BlockHash) -> Result<Option<Block>> {
        for table in Table::BLOCKS {
            if let Some(block_type) = table.block_type() {
                if let Some(block) = self.get_block(block_type, hash)? {
                    return Ok(Some(block));
                }
            }
        }
        Ok(None)
    }
}

/// In-process store, for tests and for nodes that do not persist
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<HashMap<(Table, [u8; 32]), Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> MemoryStore {
        MemoryStore::default()
    }

    pub fn len(&self, table: Table) -> usize {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        inner.keys().filter(|(t, _)| *t == table).count()
    }

    pub fn is_empty(&self) -> bool {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        inner.is_empty()
    }
}

impl BlockStore for MemoryStore {
    fn put(&self, table: Table, key: &[u8; 32], value: &[u8]) -> Result<()> {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        inner.insert((table, *key), value.to_vec());
        Ok(())
    }

    fn get(&self, table: Table, key: &[u8; 32]) -> Result<Option<Vec<u8>>> {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        Ok(inner.get(&(table, *key)).cloned())
    }
}
