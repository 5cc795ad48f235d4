//! `blocks`, a duplicate-key table with a single singleton key holding an
//! ordered, bounded ring of recent `(height, hash)` pairs for reorg
//! detection (§3, §4.C3).

use crate::kv::codec::{push_bytes32, push_u64_be, Reader};
use crate::LwsResult;

/// Number of recent block references retained. Chosen to comfortably cover
/// typical reorg depths on CryptoNote-family chains without unbounded growth.
pub const BLOCK_BUFFER_CAPACITY: usize = 20;

pub const SINGLETON_KEY: &[u8] = b"\0";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockRef {
    pub height: u64,
    pub hash: [u8; 32],
}

pub fn encode_block_ref(b: &BlockRef) -> Vec<u8> {
    let mut buf = Vec::with_capacity(40);
    push_u64_be(&mut buf, b.height);
    push_bytes32(&mut buf, &b.hash);
    buf
}

pub fn decode_block_ref(bytes: &[u8]) -> LwsResult<BlockRef> {
    let mut r = Reader::new(bytes);
    let height = r.read_u64_be()?;
    let hash = r.read_bytes32()?;
    Ok(BlockRef { height, hash })
}
