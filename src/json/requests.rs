use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub address: String,
    pub view_key: String,
    #[serde(default)]
    pub create_account: bool,
}

#[derive(Debug, Deserialize)]
pub struct AddressViewKeyRequest {
    pub address: String,
    pub view_key: String,
}

#[derive(Debug, Deserialize)]
pub struct GetUnspentOutsRequest {
    pub address: String,
    pub view_key: String,
    pub amount: String,
    #[serde(default)]
    pub mixin: Option<u32>,
    #[serde(default)]
    pub use_dust: Option<bool>,
    #[serde(default)]
    pub dust_threshold: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GetRandomOutsRequest {
    pub count: u64,
    pub amounts: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct SubmitRawTxRequest {
    pub tx: String,
}
