//! `/get_unspent_outs` (§4.C7, §4.C8, §9's dispatch-before-open /
//! await-after-finish oracle pattern).

use crate::address;
use crate::auth;
use crate::db::reader::Reader;
use crate::error::{ErrorKind, LwsError, LwsResult};
use crate::json;
use crate::json::requests::GetUnspentOutsRequest;
use crate::json::responses::{GetUnspentOutsResponse, RctJson, UnspentOutputJson};
use crate::project;

use super::AppState;

pub fn handle(state: &AppState, req: GetUnspentOutsRequest) -> LwsResult<GetUnspentOutsResponse> {
    let address = address::decode(&req.address)?;
    let view_key = json::from_hex32(&req.view_key).ok_or_else(|| LwsError::new(ErrorKind::BadViewKey))?;
    let requested_amount =
        json::parse_amount(&req.amount).ok_or_else(|| LwsError::new(ErrorKind::ExpectedUnsigned))?;
    let mixin = req.mixin.unwrap_or(0);
    let threshold = if req.use_dust.unwrap_or(false) {
        0
    } else {
        req.dust_threshold
            .as_deref()
            .and_then(json::parse_amount)
            .unwrap_or(0)
    };

    // Dispatch the fee-estimate call before the reader opens, and only await
    // it after the reader has finished, per §9's "finalise readers before
    // awaiting oracle responses" pattern. The oracle is a blocking client
    // with no async runtime in this crate, so the overlap is realised with
    // a plain OS thread.
    let oracle = state.oracle.clone();
    let fee_call = std::thread::spawn(move || oracle.estimate_fee());

    let reader = Reader::start(&state.env)?;
    let account = auth::authenticate(&reader, &address, &view_key)?;
    let outputs = reader.list_outputs(account.id)?;
    let mut survivors = Vec::new();
    let mut surviving_total = 0u64;
    for output in &outputs {
        if output.amount < threshold || output.mixin_count < mixin {
            continue;
        }
        let key_images = reader.list_images(output.id)?;
        surviving_total = surviving_total.saturating_add(output.amount);
        survivors.push((output, key_images));
    }
    reader.finish();

    if surviving_total < requested_amount {
        return Err(LwsError::new(ErrorKind::NoSuchAccount));
    }

    let mut out_json = Vec::with_capacity(survivors.len());
    for (output, key_images) in &survivors {
        let projected =
            project::project_output(output, &view_key, &account.address.spend_public, key_images.clone())?;
        out_json.push(UnspentOutputJson {
            amount: json::format_amount(output.amount),
            public_key: json::to_hex(&projected.public_key),
            // §9's resolved open question: `id.low` emitted verbatim as both
            // `tx_id` and `global_index`.
            index: output.id.low,
            global_index: output.id.low,
            rct: projected.ringct.as_ref().map(|r| RctJson {
                commitment: json::to_hex(&r.commitment),
                mask: json::to_hex(&r.mask_enc),
                amount: r.amount_enc.to_string(),
            }),
            tx_id: output.id.low,
            tx_hash: json::to_hex(&output.link.tx_hash),
            tx_prefix_hash: json::to_hex(&output.tx_prefix_hash),
            tx_pub_key: json::to_hex(&output.tx_public),
            timestamp: json::format_timestamp(output.timestamp),
            height: output.link.height,
            spend_key_images: key_images.iter().map(|k| json::to_hex(k)).collect(),
            unlock_time: output.unlock_time,
        });
    }

    let per_kb_fee = fee_call
        .join()
        .map_err(|_| LwsError::new(ErrorKind::InvariantViolation))??;

    Ok(GetUnspentOutsResponse {
        per_kb_fee,
        amount: json::format_amount(requested_amount),
        outputs: out_json,
    })
}
