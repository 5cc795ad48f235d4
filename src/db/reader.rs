//! C4: per-request read snapshots. A `Reader` borrows one MVCC snapshot;
//! every cursor it hands out observes that same snapshot. Handlers must
//! call [`Reader::finish`] (or simply drop it) before making any upstream
//! oracle call, per §9's "finalise readers before awaiting oracle I/O" note.

use crate::db::account::{self, Account};
use crate::db::block::{self, BlockRef};
use crate::db::common::Address;
use crate::db::image;
use crate::db::output::{self, Output};
use crate::db::request::{self, PendingRequest, RequestKind};
use crate::db::spend::{self, Spend};
use crate::kv::{self, Environment, RoTxn};
use crate::LwsResult;

pub struct Reader<'env> {
    env: &'env Environment,
    txn: RoTxn<'env>,
}

impl<'env> Reader<'env> {
    pub fn start(env: &'env Environment) -> LwsResult<Self> {
        let txn = env.read_txn()?;
        Ok(Reader { env, txn })
    }

    /// Explicitly releases the snapshot early. Equivalent to dropping the
    /// reader, spelled out for call sites that want the release to be
    /// visible at the point they finish their DB work.
    pub fn finish(self) {
        drop(self);
    }

    pub fn find_account_by_address(&self, address: &Address) -> LwsResult<Option<Account>> {
        let key = account::address_key(address);
        let Some(value) = kv::get(self.env.accounts_by_address, &self.txn, &key)? else {
            return Ok(None);
        };
        let (status, id) = account::decode_address_value(&value)?;
        let id_key = account::id_key(status, id);
        let Some(record) = kv::get(self.env.accounts_by_id, &self.txn, &id_key)? else {
            return Ok(None);
        };
        Ok(Some(account::decode_account(&record)?))
    }

    /// Outputs for one account, already sorted ascending by `id` (the table
    /// guarantees this; no re-sort is performed).
    pub fn list_outputs(&self, account_id: u32) -> LwsResult<Vec<Output>> {
        let key = output::account_key(account_id);
        kv::seek_key(self.env.outputs, &self.txn, &key)?
            .iter()
            .map(|bytes| output::decode_output(bytes))
            .collect()
    }

    /// Spends for one account, sorted ascending by `(link, source)`.
    pub fn list_spends(&self, account_id: u32) -> LwsResult<Vec<Spend>> {
        let key = spend::account_key(account_id);
        kv::seek_key(self.env.spends, &self.txn, &key)?
            .iter()
            .map(|bytes| spend::decode_spend(bytes))
            .collect()
    }

    /// All key-images recorded against one output, ascending.
    pub fn list_images(&self, output_id: crate::db::common::OutputId) -> LwsResult<Vec<[u8; 32]>> {
        let key = image::output_key(output_id);
        kv::seek_key(self.env.images, &self.txn, &key)?
            .into_iter()
            .map(|bytes| {
                bytes
                    .try_into()
                    .map_err(|_| crate::error::LwsError::new(crate::error::ErrorKind::InvariantViolation))
            })
            .collect()
    }

    pub fn pending_request(
        &self,
        kind: RequestKind,
        address: &Address,
    ) -> LwsResult<Option<PendingRequest>> {
        let key = request::key(kind, address);
        let Some(value) = kv::get(self.env.requests, &self.txn, &key)? else {
            return Ok(None);
        };
        let (view_key, start_height) = request::decode_value(&value)?;
        Ok(Some(PendingRequest {
            kind,
            address: *address,
            view_key,
            start_height,
        }))
    }

    /// The retained ring of recent block references, ascending by height.
    pub fn recent_blocks(&self) -> LwsResult<Vec<BlockRef>> {
        kv::seek_key(self.env.blocks, &self.txn, block::SINGLETON_KEY)?
            .iter()
            .map(|bytes| block::decode_block_ref(bytes))
            .collect()
    }

    /// The chain height implied by the most recently observed block, or 0
    /// if the scanner hasn't recorded any yet.
    pub fn blockchain_height(&self) -> LwsResult<u64> {
        Ok(self.recent_blocks()?.last().map(|b| b.height + 1).unwrap_or(0))
    }
}
