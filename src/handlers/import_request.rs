//! `/import_request` (§4.C5/§4.C7). Queues an `ImportScan` request for the
//! account's own `start_height`; an account already scanning from genesis
//! (`start_height == 0`) has nothing to import and is fulfilled immediately.

use crate::address;
use crate::auth;
use crate::db::reader::Reader;
use crate::db::writer::Writer;
use crate::error::{ErrorKind, LwsError, LwsResult};
use crate::json;
use crate::json::requests::AddressViewKeyRequest;
use crate::json::responses::ImportRequestResponse;

use super::AppState;

pub fn handle(state: &AppState, req: AddressViewKeyRequest) -> LwsResult<ImportRequestResponse> {
    let address = address::decode(&req.address)?;
    let view_key = json::from_hex32(&req.view_key).ok_or_else(|| LwsError::new(ErrorKind::BadViewKey))?;

    let reader = Reader::start(&state.env)?;
    let account = auth::authenticate(&reader, &address, &view_key)?;
    reader.finish();

    let mut writer = Writer::start(&state.env, state.max_pending_requests)?;
    let outcome = writer.import_request(&account, account.start_height)?;
    writer.commit()?;

    Ok(ImportRequestResponse {
        import_fee: json::format_amount(0),
        new_request: outcome.new_request,
        request_fulfilled: outcome.request_fulfilled,
        status: "OK".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::common::Address;
    use crate::db::writer::Writer as DbWriter;
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

    fn seed_account(env: &Environment, view_key: [u8; 32]) -> Address {
        let view_public = crate::crypto::derive_public(&view_key).unwrap();
        let address = Address { spend_public: [1u8; 32], view_public };
        let mut w = DbWriter::start(env, 10).unwrap();
        w.creation_request(&address, view_key).unwrap();
        w.approve_create_account(&address, 1).unwrap();
        w.commit().unwrap();
        address
    }

    #[test]
    fn genesis_start_height_is_fulfilled_immediately() {
        let (_dir, state) = state();
        let view_key = [2u8; 32];
        let address = seed_account(&state.env, view_key);

        let req = AddressViewKeyRequest {
            address: crate::address::encode(&address),
            view_key: hex::encode(view_key),
        };
        let resp = handle(&state, req).unwrap();
        assert!(!resp.new_request);
        assert!(resp.request_fulfilled);
    }
}
