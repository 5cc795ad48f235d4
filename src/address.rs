//! Address base58 codec. Explicitly out of scope to reimplement from first
//! principles (§1); this is a thin wrapper over a vetted third-party
//! base58 crate around the fixed `{tag, spend_public, view_public,
//! checksum}` layout.

use crate::db::common::Address;
use crate::error::{ErrorKind, LwsError, LwsResult};
use tiny_keccak::{Hasher, Keccak};

/// Network tag byte prepended before the two public keys. The specific
/// value isn't prescribed by the persisted/wire format (only the
/// `{spend_public, view_public}` shape is); `0x12` is this deployment's
/// fixed convention, analogous to Monero mainnet's standard-address tag.
const ADDRESS_TAG: u8 = 0x12;

fn checksum(payload: &[u8]) -> [u8; 4] {
    let mut hasher = Keccak::v256();
    hasher.update(payload);
    let mut out = [0u8; 32];
    hasher.finalize(&mut out);
    [out[0], out[1], out[2], out[3]]
}

pub fn encode(address: &Address) -> String {
    let mut payload = Vec::with_capacity(65);
    payload.push(ADDRESS_TAG);
    payload.extend_from_slice(&address.spend_public);
    payload.extend_from_slice(&address.view_public);
    let sum = checksum(&payload);
    payload.extend_from_slice(&sum);
    bs58::encode(payload).into_string()
}

pub fn decode(s: &str) -> LwsResult<Address> {
    let payload = bs58::decode(s)
        .into_vec()
        .map_err(|_| LwsError::new(ErrorKind::BadAddress))?;
    if payload.len() != 69 {
        return Err(LwsError::new(ErrorKind::BadAddress));
    }
    let (body, sum) = payload.split_at(65);
    if checksum(body) != sum {
        return Err(LwsError::new(ErrorKind::BadAddress));
    }
    if body[0] != ADDRESS_TAG {
        return Err(LwsError::new(ErrorKind::BadAddress));
    }
    let spend_public: [u8; 32] = body[1..33].try_into().unwrap();
    let view_public: [u8; 32] = body[33..65].try_into().unwrap();
    Ok(Address {
        spend_public,
        view_public,
    })
}
