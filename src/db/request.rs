//! `requests`, a unique table keyed by `(kind, address)` (§3, §4.C3).

use crate::db::common::Address;
use crate::kv::codec::{push_bytes32, push_u64_le, push_u8, Reader};
use crate::LwsResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    CreateAccount,
    ImportScan,
}

impl RequestKind {
    pub fn to_byte(self) -> u8 {
        match self {
            RequestKind::CreateAccount => 0,
            RequestKind::ImportScan => 1,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PendingRequest {
    pub kind: RequestKind,
    pub address: Address,
    pub view_key: [u8; 32],
    pub start_height: u64,
}

pub fn key(kind: RequestKind, address: &Address) -> Vec<u8> {
    let mut buf = Vec::with_capacity(65);
    push_u8(&mut buf, kind.to_byte());
    buf.extend_from_slice(&address.to_key());
    buf
}

pub fn encode_value(view_key: &[u8; 32], start_height: u64) -> Vec<u8> {
    let mut buf = Vec::with_capacity(40);
    push_bytes32(&mut buf, view_key);
    push_u64_le(&mut buf, start_height);
    buf
}

pub fn decode_value(bytes: &[u8]) -> LwsResult<([u8; 32], u64)> {
    let mut r = Reader::new(bytes);
    let view_key = r.read_bytes32()?;
    let start_height = r.read_u64_le()?;
    Ok((view_key, start_height))
}
