//! `/get_address_info` (§4.C7 steps 1-6).

use crate::address;
use crate::auth;
use crate::db::reader::Reader;
use crate::error::{ErrorKind, LwsError, LwsResult};
use crate::json;
use crate::json::requests::AddressViewKeyRequest;
use crate::json::responses::{AddressInfoResponse, SpentOutputJson};

use super::{now_unix, AppState, COINBASE_UNLOCK_WINDOW};

pub fn handle(state: &AppState, req: AddressViewKeyRequest) -> LwsResult<AddressInfoResponse> {
    let address = address::decode(&req.address)?;
    let view_key = json::from_hex32(&req.view_key).ok_or_else(|| LwsError::new(ErrorKind::BadViewKey))?;

    let reader = Reader::start(&state.env)?;
    let account = auth::authenticate(&reader, &address, &view_key)?;

    // Step 2-4: walk outputs once, summing totals and keeping the
    // already-`id`-ascending list around to resolve spends by binary search.
    let outputs = reader.list_outputs(account.id)?;
    let spends = reader.list_spends(account.id)?;
    let blockchain_height = reader.blockchain_height()?;
    reader.finish();

    let now = now_unix();
    let mut total_received = 0u64;
    let mut locked_funds = 0u64;
    for output in &outputs {
        total_received = total_received.saturating_add(output.amount);
        if output.is_locked(blockchain_height, COINBASE_UNLOCK_WINDOW, now) {
            locked_funds = locked_funds.saturating_add(output.amount);
        }
    }

    // Step 5: resolve each spend's source output by binary search; a miss is
    // invariant 1's violation (every spend must have a source output).
    let mut total_sent = 0u64;
    let mut spent_outputs = Vec::with_capacity(spends.len());
    for spend in &spends {
        let idx = outputs
            .binary_search_by_key(&spend.source, |o| o.id)
            .map_err(|_| LwsError::new(ErrorKind::InvariantViolation))?;
        let source = &outputs[idx];
        total_sent = total_sent.saturating_add(source.amount);
        spent_outputs.push(SpentOutputJson {
            amount: json::format_amount(source.amount),
            key_image: json::to_hex(&spend.image),
            tx_pub_key: json::to_hex(&source.tx_public),
            out_index: source.index as u64,
            mixin: spend.mixin_count,
        });
    }

    // Step 6: exchange rates are best-effort; failures are logged, never
    // propagated to the caller.
    let rates = match state.oracle.exchange_rates() {
        Ok(rates) => serde_json::to_value(
            rates
                .into_iter()
                .collect::<std::collections::BTreeMap<String, f64>>(),
        )
        .ok(),
        Err(e) => {
            log::warn!("exchange rate fetch failed for account {}: {}", account.id, e);
            None
        }
    };

    Ok(AddressInfoResponse {
        locked_funds: json::format_amount(locked_funds),
        total_received: json::format_amount(total_received),
        total_sent: json::format_amount(total_sent),
        scanned_height: account.scan_height,
        scanned_block_height: account.scan_height,
        start_height: account.start_height,
        transaction_height: blockchain_height,
        blockchain_height,
        spent_outputs,
        rates,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::common::{Address, OutputId, TxLink};
    use crate::db::output::{ExtraFlags, Output};
    use crate::db::spend::Spend;
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

    fn sample_output(block_height: u64, low: u64, amount: u64) -> Output {
        Output {
            id: OutputId { block_height, low },
            link: TxLink {
                height: block_height,
                tx_hash: [low as u8; 32],
            },
            index: 0,
            amount,
            mixin_count: 5,
            timestamp: 1_700_000_000,
            tx_public: [9u8; 32],
            tx_prefix_hash: [8u8; 32],
            unlock_time: 0,
            extra: ExtraFlags {
                coinbase: false,
                ringct: false,
            },
            ringct_mask: [0u8; 32],
            payment_id: [0u8; 32],
            payment_id_len: 0,
        }
    }

    fn seed_account(env: &Environment, view_key: [u8; 32]) -> Address {
        let view_public = crate::crypto::derive_public(&view_key).unwrap();
        let address = Address {
            spend_public: [1u8; 32],
            view_public,
        };
        let mut w = Writer::start(env, 10).unwrap();
        w.creation_request(&address, view_key).unwrap();
        w.approve_create_account(&address, 1).unwrap();
        w.commit().unwrap();
        address
    }

    #[test]
    fn totals_sum_unspent_outputs() {
        let (_dir, state) = state();
        let view_key = [2u8; 32];
        let address = seed_account(&state.env, view_key);

        let mut wtxn = state.env.write_txn().unwrap();
        crate::kv::put_dup(
            state.env.outputs,
            &mut wtxn,
            &crate::db::output::account_key(1),
            &crate::db::output::encode_output(&sample_output(100, 0, 1_000)),
        )
        .unwrap();
        crate::kv::put_dup(
            state.env.outputs,
            &mut wtxn,
            &crate::db::output::account_key(1),
            &crate::db::output::encode_output(&sample_output(100, 1, 2_500)),
        )
        .unwrap();
        wtxn.commit().unwrap();

        let req = AddressViewKeyRequest {
            address: crate::address::encode(&address),
            view_key: hex::encode(view_key),
        };
        let resp = handle(&state, req).unwrap();
        assert_eq!(resp.total_received, "3500");
        assert_eq!(resp.total_sent, "0");
        assert_eq!(resp.locked_funds, "0");
        assert!(resp.spent_outputs.is_empty());
    }

    #[test]
    fn spend_reduces_to_total_sent() {
        let (_dir, state) = state();
        let view_key = [2u8; 32];
        let address = seed_account(&state.env, view_key);

        let output = sample_output(100, 1, 2_500);
        let spend = Spend {
            source: output.id,
            link: output.link,
            image: [7u8; 32],
            mixin_count: 4,
            timestamp: output.timestamp,
            unlock_time: 0,
        };

        let mut wtxn = state.env.write_txn().unwrap();
        crate::kv::put_dup(
            state.env.outputs,
            &mut wtxn,
            &crate::db::output::account_key(1),
            &crate::db::output::encode_output(&output),
        )
        .unwrap();
        crate::kv::put_dup(
            state.env.spends,
            &mut wtxn,
            &crate::db::spend::account_key(1),
            &crate::db::spend::encode_spend(&spend),
        )
        .unwrap();
        wtxn.commit().unwrap();

        let req = AddressViewKeyRequest {
            address: crate::address::encode(&address),
            view_key: hex::encode(view_key),
        };
        let resp = handle(&state, req).unwrap();
        assert_eq!(resp.total_sent, "2500");
        assert_eq!(resp.spent_outputs.len(), 1);
        assert_eq!(resp.spent_outputs[0].mixin, 4);
    }
}
