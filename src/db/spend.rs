//! `spends`, a duplicate-key table keyed by `account_id`, values sorted by
//! `(link, source)` ascending (§3, §4.C3).

use crate::db::common::{OutputId, TxLink};
use crate::kv::codec::{push_bytes32, push_u32_le, push_u64_le, Reader};
use crate::LwsResult;

#[derive(Debug, Clone)]
pub struct Spend {
    pub source: OutputId,
    pub link: TxLink,
    pub image: [u8; 32],
    pub mixin_count: u32,
    pub timestamp: u64,
    pub unlock_time: u64,
}

pub fn account_key(account_id: u32) -> Vec<u8> {
    account_id.to_le_bytes().to_vec()
}

pub fn encode_spend(s: &Spend) -> Vec<u8> {
    let mut buf = Vec::with_capacity(108);
    s.link.encode_be(&mut buf);
    s.source.encode_be(&mut buf);
    push_bytes32(&mut buf, &s.image);
    push_u32_le(&mut buf, s.mixin_count);
    push_u64_le(&mut buf, s.timestamp);
    push_u64_le(&mut buf, s.unlock_time);
    buf
}

pub fn decode_spend(bytes: &[u8]) -> LwsResult<Spend> {
    let mut r = Reader::new(bytes);
    let link = TxLink::decode_be(&mut r)?;
    let source = OutputId::decode_be(&mut r)?;
    let image = r.read_bytes32()?;
    let mixin_count = r.read_u32_le()?;
    let timestamp = r.read_u64_le()?;
    let unlock_time = r.read_u64_le()?;
    Ok(Spend {
        source,
        link,
        image,
        mixin_count,
        timestamp,
        unlock_time,
    })
}
