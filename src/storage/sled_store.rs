use crate::error::{LedgerError, Result};
use crate::storage::block_store::{BlockStore, Table};
use log::info;
use sled::{Db, Tree};
use std::collections::HashMap;
use std::path::Path;

/// Persistent store: one sled tree per table
pub struct SledStore {
    db: Db,
    trees: HashMap<Table, Tree>,
}

impl SledStore {
    /// Open (or create) the database and every table in it
    pub fn open<P: AsRef<Path>>(path: P) -> Result<SledStore> {
        let path = path.as_ref();
        let db = sled::open(path).map_err(|e| {
            LedgerError::Database(format!("Failed to open database at {}: {e}", path.display()))
        })?;

        let mut trees = HashMap::with_capacity(Table::ALL.len());
        for table in Table::ALL {
            let tree = db.open_tree(table.name()).map_err(|e| {
                LedgerError::Database(format!("Failed to open {table} tree: {e}"))
            })?;
            trees.insert(table, tree);
        }

        info!("Opened block store at {}", path.display());
        Ok(SledStore { db, trees })
    }

    fn tree(&self, table: Table) -> Result<&Tree> {
        self.trees
            .get(&table)
            .ok_or_else(|| LedgerError::Database(format!("Table {table} is not open")))
    }

    /// Number of entries in a table
    pub fn len(&self, table: Table) -> Result<usize> {
        Ok(self.tree(table)?.len())
    }

    pub fn flush(&self) -> Result<()> {
        self.db
            .flush()
            .map_err(|e| LedgerError::Database(format!("Failed to flush database: {e}")))?;
        Ok(())
    }
}

impl BlockStore for SledStore {
    fn put(&self, table: Table, key: &[u8; 32], value: &[u8]) -> Result<()> {
        self.tree(table)?
            .insert(key, value)
            .map_err(|e| LedgerError::Database(format!("Failed to write to {table}: {e}")))?;
        Ok(())
    }

    fn get(&self, table: Table, key: &[u8; 32]) -> Result<Option<Vec<u8>>> {
        let value = self
            .tree(table)?
            .get(key)
            .map_err(|e| LedgerError::Database(format!("Failed to read from {table}: {e}")))?;
        Ok(value.map(|ivec| ivec.to_vec()))
    }
}
