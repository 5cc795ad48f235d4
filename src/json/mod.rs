//! Wire-format JSON request/response types and the conventions from §6:
//! large integers as decimal strings, lowercase unprefixed hex, and UTC
//! timestamps formatted `YYYY-MM-DDTHH:MM:SS.0-00:00`.

pub mod requests;
pub mod responses;

use chrono::{TimeZone, Utc};

pub fn format_amount(v: u64) -> String {
    v.to_string()
}

pub fn parse_amount(s: &str) -> Option<u64> {
    s.parse().ok()
}

pub fn to_hex(bytes: &[u8]) -> String {
    hex::encode(bytes)
}

pub fn from_hex32(s: &str) -> Option<[u8; 32]> {
    let bytes = hex::decode(s).ok()?;
    bytes.try_into().ok()
}

pub fn format_timestamp(unix_secs: u64) -> String {
    let dt = Utc.timestamp_opt(unix_secs as i64, 0).single().unwrap_or_else(|| Utc.timestamp_opt(0, 0).unwrap());
    format!("{}.0-00:00", dt.format("%Y-%m-%dT%H:%M:%S"))
}
