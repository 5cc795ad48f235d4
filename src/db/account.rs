//! `accounts_by_address` and `accounts_by_id` (§4.C3).
//!
//! Grounded on `full-service/src/db/account.rs`'s `AccountModel` shape
//! (create/get/update as a cohesive set of operations over one entity) —
//! reworked here against the KV tables instead of a Diesel model.

use crate::db::common::Address;
use crate::kv::codec::{push_bytes32, push_u32_be, push_u32_le, push_u64_le, push_u8, Reader};
use crate::LwsResult;
use zeroize::Zeroize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountStatus {
    Active,
    Inactive,
    Hidden,
}

impl AccountStatus {
    pub fn to_byte(self) -> u8 {
        match self {
            AccountStatus::Active => 0,
            AccountStatus::Inactive => 1,
            AccountStatus::Hidden => 2,
        }
    }

    pub fn from_byte(b: u8) -> Option<Self> {
        match b {
            0 => Some(AccountStatus::Active),
            1 => Some(AccountStatus::Inactive),
            2 => Some(AccountStatus::Hidden),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Account {
    pub id: u32,
    pub address: Address,
    /// Secret view key. Never serialised into a client-facing response.
    pub view_key: [u8; 32],
    pub status: AccountStatus,
    pub scan_height: u64,
    pub start_height: u64,
    pub access_time: u32,
    pub creation_time: u32,
}

impl Drop for Account {
    /// Wipes the secret view key once the in-memory `Account` goes out of
    /// scope, mirroring `KeystoneHQ-serai`'s manual `Zeroize`/`Drop` pattern
    /// on scanner state holding view-key material (see `DESIGN.md`).
    fn drop(&mut self) {
        self.view_key.zeroize();
    }
}

/// `accounts_by_address`'s key: the raw 64-byte address.
pub fn address_key(address: &Address) -> [u8; 64] {
    address.to_key()
}

/// `accounts_by_address`'s value: `(status, account_id)`.
pub fn address_value(status: AccountStatus, account_id: u32) -> Vec<u8> {
    let mut buf = Vec::with_capacity(5);
    push_u8(&mut buf, status.to_byte());
    push_u32_le(&mut buf, account_id);
    buf
}

pub fn decode_address_value(bytes: &[u8]) -> LwsResult<(AccountStatus, u32)> {
    let mut r = Reader::new(bytes);
    let status_byte = r.read_u8()?;
    let status = AccountStatus::from_byte(status_byte).unwrap_or(AccountStatus::Hidden);
    let id = r.read_u32_le()?;
    Ok((status, id))
}

/// `accounts_by_id`'s key: `(status, account_id)`, status first and
/// account_id big-endian so per-status scans are contiguous and ascending.
pub fn id_key(status: AccountStatus, account_id: u32) -> Vec<u8> {
    let mut buf = Vec::with_capacity(5);
    push_u8(&mut buf, status.to_byte());
    push_u32_be(&mut buf, account_id);
    buf
}

pub fn encode_account(a: &Account) -> Vec<u8> {
    let mut buf = Vec::with_capacity(125);
    push_u32_le(&mut buf, a.id);
    push_bytes32(&mut buf, &a.address.spend_public);
    push_bytes32(&mut buf, &a.address.view_public);
    push_bytes32(&mut buf, &a.view_key);
    push_u8(&mut buf, a.status.to_byte());
    push_u64_le(&mut buf, a.scan_height);
    push_u64_le(&mut buf, a.start_height);
    push_u32_le(&mut buf, a.access_time);
    push_u32_le(&mut buf, a.creation_time);
    buf
}

pub fn decode_account(bytes: &[u8]) -> LwsResult<Account> {
    let mut r = Reader::new(bytes);
    let id = r.read_u32_le()?;
    let spend_public = r.read_bytes32()?;
    let view_public = r.read_bytes32()?;
    let view_key = r.read_bytes32()?;
    let status_byte = r.read_u8()?;
    let status = AccountStatus::from_byte(status_byte).unwrap_or(AccountStatus::Hidden);
    let scan_height = r.read_u64_le()?;
    let start_height = r.read_u64_le()?;
    let access_time = r.read_u32_le()?;
    let creation_time = r.read_u32_le()?;
    Ok(Account {
        id,
        address: Address {
            spend_public,
            view_public,
        },
        view_key,
        status,
        scan_height,
        start_height,
        access_time,
        creation_time,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Account {
        Account {
            id: 7,
            address: Address {
                spend_public: [1u8; 32],
                view_public: [2u8; 32],
            },
            view_key: [3u8; 32],
            status: AccountStatus::Active,
            scan_height: 100,
            start_height: 10,
            access_time: 1_700_000_000,
            creation_time: 1_600_000_000,
        }
    }

    #[test]
    fn account_round_trips() {
        let a = sample();
        let decoded = decode_account(&encode_account(&a)).unwrap();
        assert_eq!(decoded.id, a.id);
        assert_eq!(decoded.address, a.address);
        assert_eq!(decoded.view_key, a.view_key);
        assert_eq!(decoded.status, a.status);
        assert_eq!(decoded.scan_height, a.scan_height);
        assert_eq!(decoded.start_height, a.start_height);
    }

    #[test]
    fn id_key_orders_by_status_then_id() {
        let k_active_1 = id_key(AccountStatus::Active, 1);
        let k_active_9 = id_key(AccountStatus::Active, 9);
        let k_hidden_0 = id_key(AccountStatus::Hidden, 0);
        assert!(k_active_1 < k_active_9);
        assert!(k_active_9 < k_hidden_0);
    }
}
