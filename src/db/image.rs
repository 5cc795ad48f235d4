//! `images`, a duplicate-key table keyed by the chain-global `output.id`,
//! values an ascending set of 32-byte key-images (§3, §4.C3). Keyed
//! globally rather than per-account since `output.id` already identifies a
//! specific on-chain output.

use crate::db::common::OutputId;

pub fn output_key(id: OutputId) -> Vec<u8> {
    let mut buf = Vec::with_capacity(16);
    id.encode_be(&mut buf);
    buf
}
