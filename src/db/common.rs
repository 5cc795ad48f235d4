//! Record fragments shared by more than one table (§3).

use crate::kv::codec::{push_bytes32, push_u64_be, push_u64_le, Reader};
use crate::LwsResult;

/// `{block_height, amount_index}` — the chain-global identity of a received
/// output. Encoded big-endian so ascending byte order matches ascending
/// numeric order (§4.C3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct OutputId {
    pub block_height: u64,
    pub low: u64,
}

impl OutputId {
    pub fn encode_be(&self, buf: &mut Vec<u8>) {
        push_u64_be(buf, self.block_height);
        push_u64_be(buf, self.low);
    }

    pub fn decode_be(r: &mut Reader<'_>) -> LwsResult<Self> {
        Ok(OutputId {
            block_height: r.read_u64_be()?,
            low: r.read_u64_be()?,
        })
    }
}

/// `{height, tx_hash}` — identifies the transaction an output or spend
/// belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TxLink {
    pub height: u64,
    pub tx_hash: [u8; 32],
}

impl TxLink {
    /// Big-endian height so it sorts numerically; the hash is opaque bytes
    /// and is compared bitwise, which is sufficient for a total order.
    pub fn encode_be(&self, buf: &mut Vec<u8>) {
        push_u64_be(buf, self.height);
        push_bytes32(buf, &self.tx_hash);
    }

    pub fn decode_be(r: &mut Reader<'_>) -> LwsResult<Self> {
        Ok(TxLink {
            height: r.read_u64_be()?,
            tx_hash: r.read_bytes32()?,
        })
    }

    /// Little-endian height, used where this link is a plain payload field
    /// rather than part of a dup-sort key.
    pub fn encode_le(&self, buf: &mut Vec<u8>) {
        push_u64_le(buf, self.height);
        push_bytes32(buf, &self.tx_hash);
    }

    pub fn decode_le(r: &mut Reader<'_>) -> LwsResult<Self> {
        Ok(TxLink {
            height: r.read_u64_le()?,
            tx_hash: r.read_bytes32()?,
        })
    }
}

/// `{spend_public, view_public}`, each 32 bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Address {
    pub spend_public: [u8; 32],
    pub view_public: [u8; 32],
}

impl Address {
    /// The 64-byte form used as `accounts_by_address`'s key.
    pub fn to_key(&self) -> [u8; 64] {
        let mut out = [0u8; 64];
        out[..32].copy_from_slice(&self.spend_public);
        out[32..].copy_from_slice(&self.view_public);
        out
    }

    pub fn from_key(key: &[u8]) -> LwsResult<Self> {
        let mut r = Reader::new(key);
        Ok(Address {
            spend_public: r.read_bytes32()?,
            view_public: r.read_bytes32()?,
        })
    }
}
