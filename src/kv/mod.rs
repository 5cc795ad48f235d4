//! Ordered key-value abstraction (C2): named tables over a single-writer
//! MVCC store, with duplicate-key tables whose values are ordered and
//! fixed-size. Backed by `heed` (a safe LMDB binding; see `DESIGN.md`).

pub mod codec;

use crate::error::LwsResult;
use heed::types::Bytes;
use heed::{Database, DatabaseFlags, EnvOpenOptions};
use std::path::Path;

pub type RoTxn<'a> = heed::RoTxn<'a>;
pub type RwTxn<'a> = heed::RwTxn<'a>;
pub type Table = Database<Bytes, Bytes>;

/// Process-wide shared handle to the on-disk environment and its named
/// tables (§4.C3). Reader and writer transactions are obtained per request
/// and never shared across threads.
#[derive(Clone)]
pub struct Environment {
    env: heed::Env,
    pub accounts_by_address: Table,
    pub accounts_by_id: Table,
    pub outputs: Table,
    pub spends: Table,
    pub images: Table,
    pub requests: Table,
    pub blocks: Table,
}

impl Environment {
    pub fn open(path: &Path, map_size: usize) -> LwsResult<Self> {
        std::fs::create_dir_all(path)?;
        let env = unsafe {
            EnvOpenOptions::new()
                .map_size(map_size)
                .max_dbs(8)
                .open(path)?
        };

        let mut wtxn = env.write_txn()?;
        let accounts_by_address = env.create_database(&mut wtxn, Some("accounts_by_address"))?;
        let accounts_by_id = env.create_database(&mut wtxn, Some("accounts_by_id"))?;
        let outputs = env
            .database_options()
            .types::<Bytes, Bytes>()
            .flags(DatabaseFlags::DUP_SORT)
            .name("outputs")
            .create(&mut wtxn)?;
        let spends = env
            .database_options()
            .types::<Bytes, Bytes>()
            .flags(DatabaseFlags::DUP_SORT)
            .name("spends")
            .create(&mut wtxn)?;
        let images = env
            .database_options()
            .types::<Bytes, Bytes>()
            .flags(DatabaseFlags::DUP_SORT)
            .name("images")
            .create(&mut wtxn)?;
        let requests = env.create_database(&mut wtxn, Some("requests"))?;
        let blocks = env
            .database_options()
            .types::<Bytes, Bytes>()
            .flags(DatabaseFlags::DUP_SORT)
            .name("blocks")
            .create(&mut wtxn)?;
        wtxn.commit()?;

        Ok(Environment {
            env,
            accounts_by_address,
            accounts_by_id,
            outputs,
            spends,
            images,
            requests,
            blocks,
        })
    }

    /// Opens a reader's MVCC snapshot (C4's `start_read`).
    pub fn read_txn(&self) -> LwsResult<RoTxn<'_>> {
        Ok(self.env.read_txn()?)
    }

    pub fn write_txn(&self) -> LwsResult<RwTxn<'_>> {
        Ok(self.env.write_txn()?)
    }
}

/// A typed cursor over a duplicate-key table's distinct keys (C2's
/// key-iterator). Each call to [`advance_key`](Self::advance_key) returns
/// the next key together with the full ordered set of values for it,
/// invalidating any value-range returned by a previous call — exactly the
/// cursor-invalidation semantics §9 asks for, enforced here by Rust's
/// ownership (the previous `Vec` is simply a disconnected snapshot, not a
/// live handle into the cursor).
pub struct KeyCursor<'txn> {
    iter: heed::RoIter<'txn, Bytes, Bytes>,
    peeked: Option<(&'txn [u8], &'txn [u8])>,
}

impl<'txn> KeyCursor<'txn> {
    /// C2's `seek_first()`.
    pub fn seek_first(table: Table, txn: &'txn RoTxn<'txn>) -> LwsResult<Self> {
        let mut iter = table.iter(txn)?;
        let peeked = iter.next().transpose()?;
        Ok(KeyCursor { iter, peeked })
    }

    /// C2's `advance_key()`. Returns `None` once the table is exhausted.
    pub fn advance_key(&mut self) -> LwsResult<Option<(Vec<u8>, Vec<Vec<u8>>)>> {
        let (key, first_value) = match self.peeked.take() {
            Some(kv) => kv,
            None => return Ok(None),
        };
        let key_owned = key.to_vec();
        let mut values = vec![first_value.to_vec()];
        loop {
            match self.iter.next().transpose()? {
                Some((k, v)) if k == key => values.push(v.to_vec()),
                Some((k, v)) => {
                    self.peeked = Some((k, v));
                    break;
                }
                None => break,
            }
        }
        Ok(Some((key_owned, values)))
    }
}

/// C2's `seek_key(k)` + value-iterator, for tables addressed by a single
/// known key (e.g. all outputs of one account).
pub fn seek_key(table: Table, txn: &RoTxn<'_>, key: &[u8]) -> LwsResult<Vec<Vec<u8>>> {
    let values = match table.get_duplicates(txn, key)? {
        Some(iter) => iter
            .map(|r| r.map(|(_, v)| v.to_vec()))
            .collect::<Result<Vec<_>, _>>()?,
        None => Vec::new(),
    };
    Ok(values)
}

/// Looks up a single value in a unique-key table.
pub fn get(table: Table, txn: &RoTxn<'_>, key: &[u8]) -> LwsResult<Option<Vec<u8>>> {
    Ok(table.get(txn, key)?.map(|v| v.to_vec()))
}

/// Inserts into a unique-key table, returning whether a prior value existed.
pub fn put(table: Table, txn: &mut RwTxn<'_>, key: &[u8], value: &[u8]) -> LwsResult<bool> {
    let existed = table.get(txn, key)?.is_some();
    table.put(txn, key, value)?;
    Ok(existed)
}

/// Appends one value into a duplicate-key table.
pub fn put_dup(table: Table, txn: &mut RwTxn<'_>, key: &[u8], value: &[u8]) -> LwsResult<()> {
    table.put(txn, key, value)?;
    Ok(())
}

/// Deletes a single key (and all its duplicate values) from a table.
pub fn delete(table: Table, txn: &mut RwTxn<'_>, key: &[u8]) -> LwsResult<bool> {
    Ok(table.delete(txn, key)?)
}
