//! `/get_random_outs` (§4.C7). Doesn't authenticate an address itself;
//! requires a recent login from the same peer (see `DESIGN.md`'s resolved
//! gap on `context.logged_in`).

use std::net::IpAddr;

use crate::error::{ErrorKind, LwsError, LwsResult};
use crate::json;
use crate::json::requests::GetRandomOutsRequest;
use crate::json::responses::{AmountOutsJson, GetRandomOutsResponse, OutputOutJson};

use super::AppState;

const MAX_COUNT: u64 = 50;
const MAX_AMOUNTS: usize = 10;

pub fn handle(state: &AppState, req: GetRandomOutsRequest, peer: IpAddr) -> LwsResult<GetRandomOutsResponse> {
    if !state.logins.is_logged_in(peer) {
        return Err(LwsError::new(ErrorKind::NoSuchAccount));
    }
    if req.count > MAX_COUNT || req.amounts.len() > MAX_AMOUNTS {
        return Err(LwsError::new(ErrorKind::ExceededRestRequestLimit));
    }

    let amounts: Vec<u64> = req
        .amounts
        .iter()
        .map(|s| json::parse_amount(s).ok_or_else(|| LwsError::new(ErrorKind::ExpectedUnsigned)))
        .collect::<LwsResult<_>>()?;

    let random = state.oracle.random_outputs(&amounts, req.count)?;

    // `OracleClient::output_keys` returns entries in the same order as the
    // requests it was given, so the two oracle responses join positionally
    // rather than needing a lookup keyed by public key.
    let mut requests = Vec::new();
    for group in &random.amount_outs {
        for o in &group.outputs {
            requests.push((group.amount, o.global_index));
        }
    }
    let keys = state.oracle.output_keys(&requests)?;
    if keys.len() != requests.len() {
        return Err(LwsError::new(ErrorKind::BadDaemonResponse));
    }

    let mut cursor = 0usize;
    let mut amount_outs = Vec::with_capacity(random.amount_outs.len());
    for group in &random.amount_outs {
        let mut outputs = Vec::with_capacity(group.outputs.len());
        for o in &group.outputs {
            let entry = keys
                .get(cursor)
                .ok_or_else(|| LwsError::new(ErrorKind::BadDaemonResponse))?;
            outputs.push(OutputOutJson {
                global_index: o.global_index.to_string(),
                public_key: json::to_hex(&entry.key),
            });
            cursor += 1;
        }
        amount_outs.push(AmountOutsJson {
            amount: json::format_amount(group.amount),
            outputs,
        });
    }

    Ok(GetRandomOutsResponse { amount_outs })
}
