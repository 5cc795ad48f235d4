use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub new_address: bool,
}

#[derive(Debug, Serialize)]
pub struct SpentOutputJson {
    pub amount: String,
    pub key_image: String,
    pub tx_pub_key: String,
    pub out_index: u64,
    pub mixin: u32,
}

#[derive(Debug, Serialize)]
pub struct AddressInfoResponse {
    pub locked_funds: String,
    pub total_received: String,
    pub total_sent: String,
    pub scanned_height: u64,
    pub scanned_block_height: u64,
    pub start_height: u64,
    pub transaction_height: u64,
    pub blockchain_height: u64,
    pub spent_outputs: Vec<SpentOutputJson>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rates: Option<serde_json::Value>,
}

#[derive(Debug, Serialize)]
pub struct TxJson {
    pub id: u64,
    pub hash: String,
    pub timestamp: String,
    pub total_received: String,
    pub total_sent: String,
    pub unlock_time: u64,
    pub height: u64,
    pub spent_outputs: Vec<SpentOutputJson>,
    pub coinbase: bool,
    pub mempool: bool,
    pub mixin: u32,
}

#[derive(Debug, Serialize)]
pub struct AddressTxsResponse {
    pub total_received: String,
    pub scanned_height: u64,
    pub scanned_block_height: u64,
    pub start_height: u64,
    pub transaction_height: u64,
    pub blockchain_height: u64,
    pub transactions: Vec<TxJson>,
}

#[derive(Debug, Serialize)]
pub struct RctJson {
    pub commitment: String,
    pub mask: String,
    pub amount: String,
}

#[derive(Debug, Serialize)]
pub struct UnspentOutputJson {
    pub amount: String,
    pub public_key: String,
    pub index: u64,
    pub global_index: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rct: Option<RctJson>,
    pub tx_id: u64,
    pub tx_hash: String,
    pub tx_prefix_hash: String,
    pub tx_pub_key: String,
    pub timestamp: String,
    pub height: u64,
    pub spend_key_images: Vec<String>,
    pub unlock_time: u64,
}

#[derive(Debug, Serialize)]
pub struct GetUnspentOutsResponse {
    pub per_kb_fee: u64,
    pub amount: String,
    pub outputs: Vec<UnspentOutputJson>,
}

#[derive(Debug, Serialize)]
pub struct OutputOutJson {
    pub global_index: String,
    pub public_key: String,
}

#[derive(Debug, Serialize)]
pub struct AmountOutsJson {
    pub amount: String,
    pub outputs: Vec<OutputOutJson>,
}

#[derive(Debug, Serialize)]
pub struct GetRandomOutsResponse {
    pub amount_outs: Vec<AmountOutsJson>,
}

#[derive(Debug, Serialize)]
pub struct ImportRequestResponse {
    pub import_fee: String,
    pub new_request: bool,
    pub request_fulfilled: bool,
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct SubmitRawTxResponse {
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub status: String,
    pub reason: String,
}
