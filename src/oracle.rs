//! C9: upstream daemon RPC oracle. Request/response pair with per-call send
//! and receive timeouts; each logical call clones a lightweight client
//! handle rather than sharing one live connection (§4.C9).
//!
//! Grounded on `full-service/src/service/network.rs`'s
//! `reqwest::blocking::get(...)` pattern, generalised into typed
//! request/response pairs with explicit timeouts (see `DESIGN.md`).

use crate::error::{ErrorKind, LwsError, LwsResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Clone)]
pub struct OracleClient {
    base_url: String,
    send_timeout: Duration,
    recv_timeout: Duration,
}

impl OracleClient {
    pub fn new(base_url: impl Into<String>, send_timeout: Duration, recv_timeout: Duration) -> Self {
        OracleClient {
            base_url: base_url.into(),
            send_timeout,
            recv_timeout,
        }
    }

    /// A fresh, stateless client handle for one logical call — never reused
    /// across calls, per §4.C9/§5's shared-resource policy.
    fn http(&self) -> LwsResult<reqwest::blocking::Client> {
        Ok(reqwest::blocking::Client::builder()
            .connect_timeout(self.send_timeout)
            .timeout(self.send_timeout + self.recv_timeout)
            .build()?)
    }

    fn post<Req: Serialize, Resp: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        body: &Req,
    ) -> LwsResult<Resp> {
        let url = format!("{}{}", self.base_url, path);
        let resp = self
            .http()?
            .post(url)
            .json(body)
            .send()
            .map_err(|e| {
                if e.is_timeout() {
                    LwsError::new(ErrorKind::DaemonTimeout)
                } else {
                    LwsError::with_detail(ErrorKind::BadDaemonResponse, e.to_string())
                }
            })?;
        resp.json::<Resp>()
            .map_err(|e| LwsError::with_detail(ErrorKind::BadDaemonResponse, e.to_string()))
    }

    /// Per-kB fee estimate, in atomic units, used by `get_unspent_outs`.
    pub fn estimate_fee(&self) -> LwsResult<u64> {
        #[derive(Serialize)]
        struct Req {}
        #[derive(Deserialize)]
        struct Resp {
            fee_per_kb: u64,
        }
        let resp: Resp = self.post("/get_fee_estimate", &Req {})?;
        Ok(resp.fee_per_kb)
    }

    /// Optional fiat exchange rates; failures here are logged and never
    /// fail the enclosing response (§4.C7).
    pub fn exchange_rates(&self) -> LwsResult<Vec<(String, f64)>> {
        #[derive(Serialize)]
        struct Req {}
        #[derive(Deserialize)]
        struct Resp {
            rates: Vec<(String, f64)>,
        }
        let resp: Resp = self.post("/get_exchange_rates", &Req {})?;
        Ok(resp.rates)
    }

    /// First oracle call of `get_random_outs`: random output indices for
    /// each requested amount.
    pub fn random_outputs(&self, amounts: &[u64], count: u64) -> LwsResult<RandomOutputsResponse> {
        #[derive(Serialize)]
        struct Req<'a> {
            amounts: &'a [u64],
            count: u64,
        }
        self.post("/get_random_outs", &Req { amounts, count })
    }

    /// Second oracle call of `get_random_outs`: resolves each
    /// `(amount, global_index)` pair to its on-chain public key.
    pub fn output_keys(&self, requests: &[(u64, u64)]) -> LwsResult<Vec<OutputKeyEntry>> {
        #[derive(Serialize)]
        struct OutSpec {
            amount: u64,
            index: u64,
        }
        #[derive(Serialize)]
        struct Req {
            outputs: Vec<OutSpec>,
        }
        #[derive(Deserialize)]
        struct Resp {
            outs: Vec<OutputKeyEntry>,
        }
        let req = Req {
            outputs: requests
                .iter()
                .map(|(amount, index)| OutSpec {
                    amount: *amount,
                    index: *index,
                })
                .collect(),
        };
        let resp: Resp = self.post("/get_outs", &req)?;
        Ok(resp.outs)
    }

    /// Relays a raw transaction blob; returns whether the daemon accepted
    /// it for relay.
    pub fn relay_tx(&self, tx_hex: &str) -> LwsResult<bool> {
        #[derive(Serialize)]
        struct Req<'a> {
            tx_as_hex: &'a str,
        }
        #[derive(Deserialize)]
        struct Resp {
            not_relayed: bool,
        }
        let resp: Resp = self.post("/send_raw_transaction", &Req { tx_as_hex: tx_hex })?;
        Ok(!resp.not_relayed)
    }
}

#[derive(Debug, Deserialize)]
pub struct RandomOutputsResponse {
    pub amount_outs: Vec<RandomAmountOutputs>,
}

#[derive(Debug, Deserialize)]
pub struct RandomAmountOutputs {
    pub amount: u64,
    pub outputs: Vec<RandomOutputEntry>,
}

#[derive(Debug, Deserialize)]
pub struct RandomOutputEntry {
    pub global_index: u64,
}

#[derive(Debug, Deserialize)]
pub struct OutputKeyEntry {
    #[serde(deserialize_with = "hex_bytes32")]
    pub key: [u8; 32],
}

fn hex_bytes32<'de, D>(deserializer: D) -> Result<[u8; 32], D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Error;
    let s = String::deserialize(deserializer)?;
    let bytes = hex::decode(&s).map_err(D::Error::custom)?;
    bytes
        .try_into()
        .map_err(|_| D::Error::custom("expected 32-byte hex string"))
}
