//! `outputs`, a duplicate-key table keyed by `account_id`, values sorted by
//! `output.id` ascending (§3, §4.C3).

use crate::db::common::{OutputId, TxLink};
use crate::kv::codec::{push_bytes32, push_u32_le, push_u64_le, push_u8, Reader};
use crate::LwsResult;

pub const MAX_BLOCK_NUMBER: u64 = 500_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtraFlags {
    pub coinbase: bool,
    pub ringct: bool,
}

impl ExtraFlags {
    pub fn to_byte(self) -> u8 {
        (self.coinbase as u8) | ((self.ringct as u8) << 1)
    }

    pub fn from_byte(b: u8) -> Self {
        ExtraFlags {
            coinbase: b & 0b01 != 0,
            ringct: b & 0b10 != 0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Output {
    pub id: OutputId,
    pub link: TxLink,
    pub index: u32,
    pub amount: u64,
    pub mixin_count: u32,
    pub timestamp: u64,
    pub tx_public: [u8; 32],
    pub tx_prefix_hash: [u8; 32],
    pub unlock_time: u64,
    pub extra: ExtraFlags,
    pub ringct_mask: [u8; 32],
    /// Raw payment-id bytes, `payment_id_len` of which (0, 8, or 32) are
    /// meaningful; the rest is zero padding.
    pub payment_id: [u8; 32],
    pub payment_id_len: u8,
}

impl Output {
    /// Whether the output is still locked at `chain_height`, per the general
    /// `unlock_time` rule adopted in §9's resolved open question: coinbase
    /// outputs use a depth check, everything else consults `unlock_time`.
    pub fn is_locked(&self, chain_height: u64, coinbase_unlock_window: u64, now_unix: u64) -> bool {
        if self.extra.coinbase {
            chain_height <= self.id.block_height + coinbase_unlock_window
        } else if self.unlock_time > MAX_BLOCK_NUMBER {
            self.unlock_time > now_unix
        } else {
            self.unlock_time > chain_height
        }
    }
}

/// `outputs`' key: the owning account's id.
pub fn account_key(account_id: u32) -> Vec<u8> {
    account_id.to_le_bytes().to_vec()
}

pub fn encode_output(o: &Output) -> Vec<u8> {
    let mut buf = Vec::with_capacity(218);
    o.id.encode_be(&mut buf);
    o.link.encode_le(&mut buf);
    push_u32_le(&mut buf, o.index);
    push_u64_le(&mut buf, o.amount);
    push_u32_le(&mut buf, o.mixin_count);
    push_u64_le(&mut buf, o.timestamp);
    push_bytes32(&mut buf, &o.tx_public);
    push_bytes32(&mut buf, &o.tx_prefix_hash);
    push_u64_le(&mut buf, o.unlock_time);
    push_u8(&mut buf, o.extra.to_byte());
    push_u8(&mut buf, o.payment_id_len);
    push_bytes32(&mut buf, &o.ringct_mask);
    push_bytes32(&mut buf, &o.payment_id);
    buf
}

pub fn decode_output(bytes: &[u8]) -> LwsResult<Output> {
    let mut r = Reader::new(bytes);
    let id = OutputId::decode_be(&mut r)?;
    let link = TxLink::decode_le(&mut r)?;
    let index = r.read_u32_le()?;
    let amount = r.read_u64_le()?;
    let mixin_count = r.read_u32_le()?;
    let timestamp = r.read_u64_le()?;
    let tx_public = r.read_bytes32()?;
    let tx_prefix_hash = r.read_bytes32()?;
    let unlock_time = r.read_u64_le()?;
    let extra = ExtraFlags::from_byte(r.read_u8()?);
    let payment_id_len = r.read_u8()?;
    let ringct_mask = r.read_bytes32()?;
    let payment_id = r.read_bytes32()?;
    Ok(Output {
        id,
        link,
        index,
        amount,
        mixin_count,
        timestamp,
        tx_public,
        tx_prefix_hash,
        unlock_time,
        extra,
        ringct_mask,
        payment_id,
        payment_id_len,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(block_height: u64, low: u64) -> Output {
        Output {
            id: OutputId { block_height, low },
            link: TxLink {
                height: block_height,
                tx_hash: [4u8; 32],
            },
            index: 0,
            amount: 1_000,
            mixin_count: 5,
            timestamp: 1_700_000_000,
            tx_public: [5u8; 32],
            tx_prefix_hash: [6u8; 32],
            unlock_time: 0,
            extra: ExtraFlags {
                coinbase: false,
                ringct: true,
            },
            ringct_mask: [7u8; 32],
            payment_id: [0u8; 32],
            payment_id_len: 0,
        }
    }

    #[test]
    fn output_round_trips() {
        let o = sample(100, 5);
        let decoded = decode_output(&encode_output(&o)).unwrap();
        assert_eq!(decoded.id, o.id);
        assert_eq!(decoded.amount, o.amount);
        assert_eq!(decoded.extra, o.extra);
        assert_eq!(decoded.ringct_mask, o.ringct_mask);
    }

    #[test]
    fn encoded_values_sort_by_id_ascending() {
        let a = encode_output(&sample(100, 1));
        let b = encode_output(&sample(100, 2));
        let c = encode_output(&sample(101, 0));
        assert!(a < b);
        assert!(b < c);
    }

    #[test]
    fn unlock_time_above_max_block_number_is_wall_clock() {
        let mut o = sample(100, 0);
        o.unlock_time = MAX_BLOCK_NUMBER + 1;
        assert!(o.is_locked(1_000, 10, MAX_BLOCK_NUMBER));
        assert!(!o.is_locked(1_000, 10, MAX_BLOCK_NUMBER + 2));
    }

    #[test]
    fn unlock_time_at_max_block_number_is_block_height() {
        let mut o = sample(100, 0);
        o.unlock_time = MAX_BLOCK_NUMBER;
        // treated as a block height: locked while chain_height < unlock_time.
        assert!(o.is_locked(MAX_BLOCK_NUMBER - 1, 10, 0));
        assert!(!o.is_locked(MAX_BLOCK_NUMBER + 1, 10, 0));
    }

    #[test]
    fn coinbase_uses_depth_rule() {
        let mut o = sample(100, 0);
        o.extra.coinbase = true;
        assert!(o.is_locked(105, 10, 0));
        assert!(!o.is_locked(111, 10, 0));
    }
}
