//! `/get_address_txs` (§4.C7): merges outputs and spends into one entry per
//! transaction, keyed by `(tx_height, tx_hash)`.

use std::collections::BTreeMap;

use itertools::Itertools;

use crate::address;
use crate::auth;
use crate::db::output::Output;
use crate::db::reader::Reader;
use crate::db::spend::Spend;
use crate::error::{ErrorKind, LwsError, LwsResult};
use crate::json;
use crate::json::requests::AddressViewKeyRequest;
use crate::json::responses::{AddressTxsResponse, SpentOutputJson, TxJson};

use super::AppState;

struct TxEntry {
    id: u64,
    hash: [u8; 32],
    height: u64,
    timestamp: u64,
    total_received: u64,
    total_sent: u64,
    unlock_time: u64,
    coinbase: bool,
    mixin: u32,
    spent_outputs: Vec<SpentOutputJson>,
}

/// Sanity check of invariant 2: the store guarantees outputs ascend by `id`
/// and spends ascend by `(link, source)`; a violation here means the KV
/// layer itself is corrupt, not a client-facing condition.
fn verify_monotonic(outputs: &[Output], spends: &[Spend]) -> LwsResult<()> {
    for pair in outputs.windows(2) {
        if pair[1].id <= pair[0].id {
            return Err(LwsError::new(ErrorKind::InvariantViolation));
        }
    }
    for pair in spends.windows(2) {
        let a = (pair[0].link.height, pair[0].link.tx_hash, pair[0].source);
        let b = (pair[1].link.height, pair[1].link.tx_hash, pair[1].source);
        if b <= a {
            return Err(LwsError::new(ErrorKind::InvariantViolation));
        }
    }
    Ok(())
}

pub fn handle(state: &AppState, req: AddressViewKeyRequest) -> LwsResult<AddressTxsResponse> {
    let address = address::decode(&req.address)?;
    let view_key = json::from_hex32(&req.view_key).ok_or_else(|| LwsError::new(ErrorKind::BadViewKey))?;

    let reader = Reader::start(&state.env)?;
    let account = auth::authenticate(&reader, &address, &view_key)?;
    let outputs = reader.list_outputs(account.id)?;
    let spends = reader.list_spends(account.id)?;
    let blockchain_height = reader.blockchain_height()?;
    reader.finish();

    verify_monotonic(&outputs, &spends)?;

    let mut total_received = 0u64;
    let mut by_tx: BTreeMap<(u64, [u8; 32]), TxEntry> = BTreeMap::new();

    let outputs_by_link = outputs
        .iter()
        .sorted_by_key(|o| (o.link.height, o.link.tx_hash));
    for ((height, hash), group) in &outputs_by_link.group_by(|o| (o.link.height, o.link.tx_hash)) {
        let group: Vec<&Output> = group.collect();
        let amount: u64 = group.iter().map(|o| o.amount).sum();
        total_received = total_received.saturating_add(amount);
        let first = group[0];
        by_tx.insert(
            (height, hash),
            TxEntry {
                id: first.id.low,
                hash,
                height,
                timestamp: first.timestamp,
                total_received: amount,
                total_sent: 0,
                unlock_time: first.unlock_time,
                coinbase: group.iter().any(|o| o.extra.coinbase),
                mixin: first.mixin_count,
                spent_outputs: Vec::new(),
            },
        );
    }

    let output_by_id: BTreeMap<_, &Output> = outputs.iter().map(|o| (o.id, o)).collect();
    let spends_by_link = spends
        .iter()
        .sorted_by_key(|s| (s.link.height, s.link.tx_hash));
    for ((height, hash), group) in &spends_by_link.group_by(|s| (s.link.height, s.link.tx_hash)) {
        for spend in group {
            let source = output_by_id
                .get(&spend.source)
                .ok_or_else(|| LwsError::new(ErrorKind::InvariantViolation))?;
            let entry = by_tx.entry((height, hash)).or_insert_with(|| TxEntry {
                id: spend.source.low,
                hash,
                height,
                timestamp: spend.timestamp,
                total_received: 0,
                total_sent: 0,
                unlock_time: spend.unlock_time,
                coinbase: false,
                mixin: spend.mixin_count,
                spent_outputs: Vec::new(),
            });
            entry.total_sent = entry.total_sent.saturating_add(source.amount);
            entry.spent_outputs.push(SpentOutputJson {
                amount: json::format_amount(source.amount),
                key_image: json::to_hex(&spend.image),
                tx_pub_key: json::to_hex(&source.tx_public),
                out_index: source.index as u64,
                mixin: spend.mixin_count,
            });
        }
    }

    let transactions = by_tx
        .into_values()
        .map(|e| TxJson {
            id: e.id,
            hash: json::to_hex(&e.hash),
            timestamp: json::format_timestamp(e.timestamp),
            total_received: json::format_amount(e.total_received),
            total_sent: json::format_amount(e.total_sent),
            unlock_time: e.unlock_time,
            height: e.height,
            spent_outputs: e.spent_outputs,
            coinbase: e.coinbase,
            mempool: false,
            mixin: e.mixin,
        })
        .collect();

    Ok(AddressTxsResponse {
        total_received: json::format_amount(total_received),
        scanned_height: account.scan_height,
        scanned_block_height: account.scan_height,
        start_height: account.start_height,
        transaction_height: blockchain_height,
        blockchain_height,
        transactions,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::common::{Address, OutputId, TxLink};
    use crate::db::output::{encode_output, ExtraFlags, Output};
    use crate::db::spend::encode_spend;
    use crate::db::writer::Writer;
    use crate::kv::Environment;
    use crate::oracle::OracleClient;
    use std::time::Duration;
    use tempfile::tempdir;

    fn state() -> (tempfile::TempDir, AppState) {
        let dir = tempdir().unwrap();
        let env = Environment::open(dir.path(), 10 * 1024 * 1024).unwrap();
        let oracle = OracleClient::new("http://127.0.0.1:1", Duration::from_secs(1), Duration::from_secs(1));
        (dir, AppState::new(env, oracle, 10))
    }

    #[test]
    fn two_outputs_in_one_tx_collapse_and_a_spend_attaches() {
        let (_dir, state) = state();
        let view_key = [2u8; 32];
        let view_public = crate::crypto::derive_public(&view_key).unwrap();
        let address = Address {
            spend_public: [1u8; 32],
            view_public,
        };
        let mut w = Writer::start(&state.env, 10).unwrap();
        w.creation_request(&address, view_key).unwrap();
        w.approve_create_account(&address, 1).unwrap();
        w.commit().unwrap();

        let tx_hash = [5u8; 32];
        let output_a = Output {
            id: OutputId { block_height: 10, low: 0 },
            link: TxLink { height: 10, tx_hash },
            index: 0,
            amount: 1_000,
            mixin_count: 3,
            timestamp: 1_700_000_000,
            tx_public: [1u8; 32],
            tx_prefix_hash: [2u8; 32],
            unlock_time: 0,
            extra: ExtraFlags { coinbase: false, ringct: false },
            ringct_mask: [0u8; 32],
            payment_id: [0u8; 32],
            payment_id_len: 0,
        };
        let mut output_b = output_a.clone();
        output_b.id.low = 1;
        output_b.amount = 500;

        let spend = crate::db::spend::Spend {
            source: output_a.id,
            link: output_a.link,
            image: [9u8; 32],
            mixin_count: 3,
            timestamp: output_a.timestamp,
            unlock_time: 0,
        };

        let mut wtxn = state.env.write_txn().unwrap();
        crate::kv::put_dup(state.env.outputs, &mut wtxn, &crate::db::output::account_key(1), &encode_output(&output_a)).unwrap();
        crate::kv::put_dup(state.env.outputs, &mut wtxn, &crate::db::output::account_key(1), &encode_output(&output_b)).unwrap();
        crate::kv::put_dup(state.env.spends, &mut wtxn, &crate::db::spend::account_key(1), &encode_spend(&spend)).unwrap();
        wtxn.commit().unwrap();

        let req = AddressViewKeyRequest {
            address: crate::address::encode(&address),
            view_key: hex::encode(view_key),
        };
        let resp = handle(&state, req).unwrap();
        assert_eq!(resp.total_received, "1500");
        assert_eq!(resp.transactions.len(), 1);
        let tx = &resp.transactions[0];
        assert_eq!(tx.total_received, "1500");
        assert_eq!(tx.total_sent, "1000");
        assert_eq!(tx.spent_outputs.len(), 1);
    }
}
