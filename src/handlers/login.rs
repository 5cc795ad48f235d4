//! `/login` (§4.C7, §6). Confirms an existing account, rejects a hidden or
//! absent one unless `create_account` is set, in which case it queues a
//! `CreateAccount` request instead of failing.

use std::net::IpAddr;

use crate::address;
use crate::auth;
use crate::db::reader::Reader;
use crate::db::writer::Writer;
use crate::error::{ErrorKind, LwsError, LwsResult};
use crate::json;
use crate::json::requests::LoginRequest;
use crate::json::responses::LoginResponse;

use super::AppState;

pub fn handle(state: &AppState, req: LoginRequest, peer: IpAddr) -> LwsResult<LoginResponse> {
    let address = address::decode(&req.address)?;
    let view_key = json::from_hex32(&req.view_key).ok_or_else(|| LwsError::new(ErrorKind::BadViewKey))?;

    let reader = Reader::start(&state.env)?;
    let result = auth::authenticate(&reader, &address, &view_key);
    reader.finish();

    match result {
        Ok(_account) => {
            // `create_account=true` against an already-reachable account is
            // just a normal login; `logged_in` is set either way here.
            state.logins.mark(peer);
            Ok(LoginResponse { new_address: false })
        }
        Err(e) if e.kind() == ErrorKind::NoSuchAccount && req.create_account => {
            let mut writer = Writer::start(&state.env, state.max_pending_requests)?;
            writer.creation_request(&address, view_key)?;
            writer.commit()?;
            // §4.C7: creating an account does not set `logged_in`.
            Ok(LoginResponse { new_address: true })
        }
        Err(e) => Err(e),
    }
}
