//! Core of a light-wallet server: account/output store plus the request
//! handlers that project it into client responses.

pub mod address;
pub mod auth;
pub mod config;
pub mod crypto;
pub mod db;
pub mod error;
pub mod handlers;
pub mod http;
pub mod json;
pub mod kv;
pub mod oracle;
pub mod project;

pub use error::{Condition, ErrorKind, LwsError, LwsResult};
