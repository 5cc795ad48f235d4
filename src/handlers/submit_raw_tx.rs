//! `/submit_raw_tx` (§4.C7). Transaction wire-format parsing isn't part of
//! this core's data model (§3 models only received outputs and spends, not
//! a transaction structure), so "validate as a transaction" is implemented
//! as hex-decoding plus a non-empty check; the daemon performs real
//! validation when the blob is relayed.

use std::net::IpAddr;

use crate::error::{ErrorKind, LwsError, LwsResult};
use crate::json::requests::SubmitRawTxRequest;
use crate::json::responses::SubmitRawTxResponse;

use super::AppState;

pub fn handle(state: &AppState, req: SubmitRawTxRequest, peer: IpAddr) -> LwsResult<SubmitRawTxResponse> {
    if !state.logins.is_logged_in(peer) {
        return Err(LwsError::new(ErrorKind::NoSuchAccount));
    }

    let tx_bytes = hex::decode(&req.tx).map_err(|_| LwsError::new(ErrorKind::BadClientTx))?;
    if tx_bytes.is_empty() {
        return Err(LwsError::new(ErrorKind::BadClientTx));
    }

    let relayed = state.oracle.relay_tx(&req.tx)?;
    if !relayed {
        return Err(LwsError::new(ErrorKind::TxRelayFailed));
    }

    Ok(SubmitRawTxResponse { status: "OK".to_string() })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::Environment;
    use crate::oracle::OracleClient;
    use std::net::{IpAddr, Ipv4Addr};
    use std::time::Duration;
    use tempfile::tempdir;

    fn state() -> (tempfile::TempDir, AppState) {
        let dir = tempdir().unwrap();
        let env = Environment::open(dir.path(), 10 * 1024 * 1024).unwrap();
        let oracle = OracleClient::new("http://127.0.0.1:1", Duration::from_secs(1), Duration::from_secs(1));
        (dir, AppState::new(env, oracle, 10))
    }

    fn peer() -> IpAddr {
        IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1))
    }

    #[test]
    fn without_a_recent_login_fails_as_no_such_account() {
        let (_dir, state) = state();
        let req = SubmitRawTxRequest { tx: "ab".to_string() };
        let err = handle(&state, req, peer()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NoSuchAccount);
    }

    #[test]
    fn non_hex_body_is_bad_client_tx() {
        let (_dir, state) = state();
        state.logins.mark(peer());
        let req = SubmitRawTxRequest { tx: "not hex".to_string() };
        let err = handle(&state, req, peer()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::BadClientTx);
    }

    #[test]
    fn empty_body_is_bad_client_tx() {
        let (_dir, state) = state();
        state.logins.mark(peer());
        let req = SubmitRawTxRequest { tx: "".to_string() };
        let err = handle(&state, req, peer()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::BadClientTx);
    }
}
