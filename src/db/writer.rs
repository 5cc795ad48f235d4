//! C5: serialised mutations, each committed atomically.

use crate::db::account::{self, Account, AccountStatus};
use crate::db::block::{self, BlockRef, BLOCK_BUFFER_CAPACITY};
use crate::db::common::Address;
use crate::db::request::{self, PendingRequest, RequestKind};
use crate::error::{ErrorKind, LwsError};
use crate::kv::{self, Environment, RwTxn};
use crate::LwsResult;

pub struct Writer<'env> {
    env: &'env Environment,
    txn: RwTxn<'env>,
    max_pending_requests: u64,
}

#[derive(Debug, Clone, Copy)]
pub struct ImportOutcome {
    pub new_request: bool,
    pub request_fulfilled: bool,
}

impl<'env> Writer<'env> {
    pub fn start(env: &'env Environment, max_pending_requests: u64) -> LwsResult<Self> {
        let txn = env.write_txn()?;
        Ok(Writer {
            env,
            txn,
            max_pending_requests,
        })
    }

    pub fn commit(self) -> LwsResult<()> {
        self.txn.commit()?;
        Ok(())
    }

    fn account_by_address(&self, address: &Address) -> LwsResult<Option<Account>> {
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

    fn check_queue_capacity(&self) -> LwsResult<()> {
        let count = self.env.requests.len(&self.txn)?;
        if count >= self.max_pending_requests {
            return Err(LwsError::new(ErrorKind::CreateQueueMax));
        }
        Ok(())
    }

    /// §4.C5 `creation_request`: queues a `CreateAccount` request.
    pub fn creation_request(&mut self, address: &Address, view_key: [u8; 32]) -> LwsResult<()> {
        if self.account_by_address(address)?.is_some() {
            return Err(LwsError::new(ErrorKind::AccountExists));
        }
        let key = request::key(RequestKind::CreateAccount, address);
        if kv::get(self.env.requests, &self.txn, &key)?.is_some() {
            return Err(LwsError::new(ErrorKind::DuplicateRequest));
        }
        self.check_queue_capacity()?;
        let value = request::encode_value(&view_key, 0);
        kv::put(self.env.requests, &mut self.txn, &key, &value)?;
        Ok(())
    }

    /// §4.C5 `import_request`: queues an `ImportScan` request. An account
    /// whose `start_height == 0` is immediately "fulfilled" (§4.C7).
    pub fn import_request(
        &mut self,
        account: &Account,
        start_height: u64,
    ) -> LwsResult<ImportOutcome> {
        let key = request::key(RequestKind::ImportScan, &account.address);
        if kv::get(self.env.requests, &self.txn, &key)?.is_some() {
            return Err(LwsError::new(ErrorKind::DuplicateRequest));
        }
        if account.start_height == 0 {
            return Ok(ImportOutcome {
                new_request: false,
                request_fulfilled: true,
            });
        }
        self.check_queue_capacity()?;
        let value = request::encode_value(&account.view_key, start_height);
        kv::put(self.env.requests, &mut self.txn, &key, &value)?;
        Ok(ImportOutcome {
            new_request: true,
            request_fulfilled: false,
        })
    }

    /// Test-double surface for the external admin-approval path named in
    /// §3's lifecycles: promotes a pending `CreateAccount` request into a
    /// real, `Active` account.
    pub fn approve_create_account(&mut self, address: &Address, next_id: u32) -> LwsResult<()> {
        let req_key = request::key(RequestKind::CreateAccount, address);
        let Some(value) = kv::get(self.env.requests, &self.txn, &req_key)? else {
            return Err(LwsError::new(ErrorKind::NoSuchAccount));
        };
        let (view_key, start_height) = request::decode_value(&value)?;

        let account = Account {
            id: next_id,
            address: *address,
            view_key,
            status: AccountStatus::Active,
            scan_height: start_height,
            start_height,
            access_time: 0,
            creation_time: 0,
        };
        let addr_key = account::address_key(address);
        let addr_value = account::address_value(AccountStatus::Active, next_id);
        kv::put(self.env.accounts_by_address, &mut self.txn, &addr_key, &addr_value)?;
        let id_key = account::id_key(AccountStatus::Active, next_id);
        kv::put(self.env.accounts_by_id, &mut self.txn, &id_key, &account::encode_account(&account))?;
        kv::delete(self.env.requests, &mut self.txn, &req_key)?;
        Ok(())
    }

    /// Test/admin-double surface: directly overwrites an account's status,
    /// re-keying `accounts_by_id` (whose key embeds status) and
    /// `accounts_by_address`'s pointer to it.
    pub fn set_status(&mut self, address: &Address, status: AccountStatus) -> LwsResult<()> {
        let Some(account) = self.account_by_address(address)? else {
            return Err(LwsError::new(ErrorKind::NoSuchAccount));
        };
        let old_id_key = account::id_key(account.status, account.id);
        kv::delete(self.env.accounts_by_id, &mut self.txn, &old_id_key)?;

        let mut updated = account;
        updated.status = status;
        let new_id_key = account::id_key(status, updated.id);
        kv::put(
            self.env.accounts_by_id,
            &mut self.txn,
            &new_id_key,
            &account::encode_account(&updated),
        )?;
        let addr_key = account::address_key(address);
        kv::put(
            self.env.accounts_by_address,
            &mut self.txn,
            &addr_key,
            &account::address_value(status, updated.id),
        )?;
        Ok(())
    }

    /// Test-double surface: removes a pending request without promoting it.
    pub fn reject_request(&mut self, kind: RequestKind, address: &Address) -> LwsResult<()> {
        let key = request::key(kind, address);
        if !kv::delete(self.env.requests, &mut self.txn, &key)? {
            return Err(LwsError::new(ErrorKind::NoSuchAccount));
        }
        Ok(())
    }

    /// Test-double surface for the external scanner: advances
    /// `scan_height` and appends a block reference, evicting the oldest
    /// retained reference once the bounded window (§3) would otherwise be
    /// exceeded.
    pub fn record_scan_progress(
        &mut self,
        account: &Account,
        scan_height: u64,
        new_block: Option<BlockRef>,
    ) -> LwsResult<()> {
        let mut updated = account.clone();
        updated.scan_height = scan_height;
        let id_key = account::id_key(updated.status, updated.id);
        kv::put(
            self.env.accounts_by_id,
            &mut self.txn,
            &id_key,
            &account::encode_account(&updated),
        )?;

        if let Some(block_ref) = new_block {
            // Values sort ascending by height (big-endian prefix), so the
            // first entries are the oldest. Rebuild the window with the
            // oldest evicted once it would otherwise exceed the bounded
            // capacity (§3); a residual overflow after eviction would
            // indicate a logic error upstream.
            let mut existing = kv::seek_key(self.env.blocks, &self.txn, block::SINGLETON_KEY)?;
            existing.push(block::encode_block_ref(&block_ref));
            let overflow = existing.len().saturating_sub(BLOCK_BUFFER_CAPACITY);
            let retained = &existing[overflow..];
            if retained.len() > BLOCK_BUFFER_CAPACITY {
                return Err(LwsError::new(ErrorKind::ExceededBlockchainBuffer));
            }
            kv::delete(self.env.blocks, &mut self.txn, block::SINGLETON_KEY)?;
            for value in retained {
                kv::put_dup(self.env.blocks, &mut self.txn, block::SINGLETON_KEY, value)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::reader::Reader;
    use tempfile::tempdir;

    fn open_env() -> (tempfile::TempDir, Environment) {
        let dir = tempdir().unwrap();
        let env = Environment::open(dir.path(), 10 * 1024 * 1024).unwrap();
        (dir, env)
    }

    fn addr(b: u8) -> Address {
        Address {
            spend_public: [b; 32],
            view_public: [b.wrapping_add(1); 32],
        }
    }

    #[test]
    fn creation_request_then_approval_makes_account_reachable() {
        let (_dir, env) = open_env();
        let a = addr(1);

        let mut w = Writer::start(&env, 10).unwrap();
        w.creation_request(&a, [9u8; 32]).unwrap();
        w.commit().unwrap();

        {
            let r = Reader::start(&env).unwrap();
            assert!(r.find_account_by_address(&a).unwrap().is_none());
        }

        let mut w = Writer::start(&env, 10).unwrap();
        w.approve_create_account(&a, 1).unwrap();
        w.commit().unwrap();

        let r = Reader::start(&env).unwrap();
        let account = r.find_account_by_address(&a).unwrap().unwrap();
        assert_eq!(account.status, AccountStatus::Active);
        assert_eq!(account.view_key, [9u8; 32]);
    }

    #[test]
    fn duplicate_creation_request_is_rejected() {
        let (_dir, env) = open_env();
        let a = addr(2);
        let mut w = Writer::start(&env, 10).unwrap();
        w.creation_request(&a, [1u8; 32]).unwrap();
        let err = w.creation_request(&a, [1u8; 32]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DuplicateRequest);
    }

    #[test]
    fn creation_request_for_existing_account_is_rejected() {
        let (_dir, env) = open_env();
        let a = addr(3);
        let mut w = Writer::start(&env, 10).unwrap();
        w.creation_request(&a, [1u8; 32]).unwrap();
        w.approve_create_account(&a, 1).unwrap();
        let err = w.creation_request(&a, [1u8; 32]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AccountExists);
    }

    #[test]
    fn queue_capacity_is_enforced() {
        let (_dir, env) = open_env();
        let mut w = Writer::start(&env, 1).unwrap();
        w.creation_request(&addr(10), [1u8; 32]).unwrap();
        let err = w.creation_request(&addr(11), [1u8; 32]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CreateQueueMax);
    }
}
