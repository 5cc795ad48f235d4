//! Rocket route wiring (§6): one `#[post]` route per endpoint, rather than
//! a single JSON-RPC dispatch function, since §6 specifies distinct REST
//! paths. Status-code mapping follows §6/§7 exactly.
//!
//! Grounded on `full-service/src/api/wallet_api.rs`'s route-function shape.

use std::net::IpAddr;

use rocket::data::{Data, Limits, ToByteUnit};
use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::{catch, catchers, post, routes, Build, Rocket, State};

use crate::error::{ErrorKind, LwsError};
use crate::handlers::{self, AppState};
use crate::json::requests::{
    AddressViewKeyRequest, GetRandomOutsRequest, GetUnspentOutsRequest, LoginRequest, SubmitRawTxRequest,
};
use crate::json::responses::ErrorResponse;

/// `submit_raw_tx`'s 50 KiB body limit (§6) is distinct from every other
/// endpoint's 2 KiB `json` limit, which `Json<T>`'s data guard can't express
/// per-route — it always reads Rocket's single global `json` limit. Read the
/// body manually against a dedicated `submit-raw-tx-json` limit instead.
const SUBMIT_RAW_TX_LIMIT_NAME: &str = "submit-raw-tx-json";

async fn read_submit_raw_tx_body(
    limits: &Limits,
    data: Data<'_>,
) -> Result<SubmitRawTxRequest, (Status, Json<ErrorResponse>)> {
    let limit = limits.get(SUBMIT_RAW_TX_LIMIT_NAME).unwrap_or_else(|| 50.kibibytes());
    let bytes = data
        .open(limit)
        .into_bytes()
        .await
        .map_err(|_| bad_request_body())?;
    if !bytes.is_complete() {
        return Err((
            Status::BadRequest,
            Json(ErrorResponse {
                status: "error".to_string(),
                reason: "body exceeded the 50 KiB limit".to_string(),
            }),
        ));
    }
    serde_json::from_slice(&bytes.into_inner()).map_err(|_| bad_request_body())
}

fn bad_request_body() -> (Status, Json<ErrorResponse>) {
    (
        Status::BadRequest,
        Json(ErrorResponse {
            status: "error".to_string(),
            reason: "malformed request body".to_string(),
        }),
    )
}

/// Maps a handler's [`LwsError`] onto the HTTP status §6/§7 assign it. §7's
/// mapping is only 403/NoSuchAccount, 503/timeout, 500 otherwise — 400 is
/// reserved for the framing guards (body-size and JSON-parse failures,
/// already handled by the `#[catch(400)]` below and `submit_raw_tx`'s own
/// size check), not for any handler-returned error kind.
fn status_for(err: &LwsError) -> Status {
    match err.kind() {
        ErrorKind::NoSuchAccount | ErrorKind::BadViewKey => Status::Forbidden,
        ErrorKind::DaemonTimeout => Status::ServiceUnavailable,
        _ => Status::InternalServerError,
    }
}

/// Wraps a handler error into the `(status, body)` pair Rocket serialises;
/// fatal invariant violations are logged at `error` per §7/§10.1 before the
/// generic 500 body goes out.
fn respond_err(err: LwsError) -> (Status, Json<ErrorResponse>) {
    let status = status_for(&err);
    if status == Status::InternalServerError {
        log::error!("unhandled defect: {}", err);
    } else {
        log::debug!("request failed: {}", err);
    }
    (
        status,
        Json(ErrorResponse {
            status: "error".to_string(),
            reason: err.to_string(),
        }),
    )
}

type HandlerResult<T> = Result<Json<T>, (Status, Json<ErrorResponse>)>;

fn peer_ip(remote: Option<std::net::SocketAddr>) -> IpAddr {
    remote
        .map(|s| s.ip())
        .unwrap_or(IpAddr::V4(std::net::Ipv4Addr::UNSPECIFIED))
}

#[post("/login", format = "json", data = "<body>")]
fn login(
    state: &State<AppState>,
    body: Json<LoginRequest>,
    remote: std::net::SocketAddr,
) -> HandlerResult<crate::json::responses::LoginResponse> {
    handlers::login::handle(state, body.into_inner(), peer_ip(Some(remote)))
        .map(Json)
        .map_err(respond_err)
}

#[post("/get_address_info", format = "json", data = "<body>")]
fn get_address_info(
    state: &State<AppState>,
    body: Json<AddressViewKeyRequest>,
) -> HandlerResult<crate::json::responses::AddressInfoResponse> {
    handlers::address_info::handle(state, body.into_inner())
        .map(Json)
        .map_err(respond_err)
}

#[post("/get_address_txs", format = "json", data = "<body>")]
fn get_address_txs(
    state: &State<AppState>,
    body: Json<AddressViewKeyRequest>,
) -> HandlerResult<crate::json::responses::AddressTxsResponse> {
    handlers::address_txs::handle(state, body.into_inner())
        .map(Json)
        .map_err(respond_err)
}

#[post("/get_unspent_outs", format = "json", data = "<body>")]
fn get_unspent_outs(
    state: &State<AppState>,
    body: Json<GetUnspentOutsRequest>,
) -> HandlerResult<crate::json::responses::GetUnspentOutsResponse> {
    handlers::unspent_outs::handle(state, body.into_inner())
        .map(Json)
        .map_err(respond_err)
}

#[post("/get_random_outs", format = "json", data = "<body>")]
fn get_random_outs(
    state: &State<AppState>,
    body: Json<GetRandomOutsRequest>,
    remote: std::net::SocketAddr,
) -> HandlerResult<crate::json::responses::GetRandomOutsResponse> {
    handlers::random_outs::handle(state, body.into_inner(), peer_ip(Some(remote)))
        .map(Json)
        .map_err(respond_err)
}

#[post("/import_request", format = "json", data = "<body>")]
fn import_request(
    state: &State<AppState>,
    body: Json<AddressViewKeyRequest>,
) -> HandlerResult<crate::json::responses::ImportRequestResponse> {
    handlers::import_request::handle(state, body.into_inner())
        .map(Json)
        .map_err(respond_err)
}

#[post("/submit_raw_tx", data = "<data>")]
async fn submit_raw_tx(
    state: &State<AppState>,
    limits: &Limits,
    data: Data<'_>,
    remote: std::net::SocketAddr,
) -> HandlerResult<crate::json::responses::SubmitRawTxResponse> {
    let body = read_submit_raw_tx_body(limits, data).await?;
    handlers::submit_raw_tx::handle(state, body, peer_ip(Some(remote)))
        .map(Json)
        .map_err(respond_err)
}

/// §6: an endpoint with a null handler (e.g. `/get_txt_records`) answers 501
/// rather than 404, distinguishing "known but unimplemented" from "unknown".
#[post("/get_txt_records", format = "json", data = "<_body>")]
fn get_txt_records(_body: Json<serde_json::Value>) -> Status {
    Status::NotImplemented
}

#[catch(404)]
fn not_found() -> (Status, Json<ErrorResponse>) {
    (
        Status::NotFound,
        Json(ErrorResponse {
            status: "error".to_string(),
            reason: "unknown path".to_string(),
        }),
    )
}

#[catch(405)]
fn method_not_allowed() -> (Status, Json<ErrorResponse>) {
    (
        Status::MethodNotAllowed,
        Json(ErrorResponse {
            status: "error".to_string(),
            reason: "method not allowed".to_string(),
        }),
    )
}

#[catch(400)]
fn bad_request() -> (Status, Json<ErrorResponse>) {
    (
        Status::BadRequest,
        Json(ErrorResponse {
            status: "error".to_string(),
            reason: "malformed request body".to_string(),
        }),
    )
}

/// Builds the full router with per-endpoint body-size limits (§6): 2 KiB for
/// the six small JSON bodies, 50 KiB for `submit_raw_tx`'s hex blob. `base`
/// carries the caller's address/port/worker-count configuration; the JSON
/// body limits are merged on top of it here.
pub fn build(state: AppState, base: rocket::figment::Figment) -> Rocket<Build> {
    let limits = Limits::default()
        .limit("json", 2.kibibytes())
        .limit("submit-raw-tx-json", 50.kibibytes());

    let figment = base.merge(("limits", limits));

    rocket::custom(figment)
        .manage(state)
        .mount(
            "/",
            routes![
                login,
                get_address_info,
                get_address_txs,
                get_unspent_outs,
                get_random_outs,
                import_request,
                submit_raw_tx,
                get_txt_records,
            ],
        )
        .register("/", catchers![not_found, method_not_allowed, bad_request])
}
