//! Uniform value-or-error carrier used across every module boundary.
//!
//! [`LwsError`] pairs a stable, numbered [`ErrorKind`] with an optional
//! human-readable detail message. `Display` text for each kind comes from a
//! `displaydoc` doc-comment template, the same way the wallet-service error
//! types in this codebase's lineage generate their client-facing messages.

use displaydoc::Display;
use std::fmt;

/// Stable, numbered error categories. The numeric value is part of the
/// wire/logging contract: once assigned, a discriminant is never reused for
/// a different meaning.
#[derive(Display, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum ErrorKind {
    /// account already exists
    AccountExists = 1,
    /// invalid address
    BadAddress = 2,
    /// invalid view key
    BadViewKey = 3,
    /// blockchain data is invalid
    BadBlockchain = 4,
    /// submitted transaction is invalid
    BadClientTx = 5,
    /// daemon returned a malformed response
    BadDaemonResponse = 6,
    /// blockchain reorganisation detected
    BlockchainReorg = 7,
    /// pending request queue is full
    CreateQueueMax = 8,
    /// daemon request timed out
    DaemonTimeout = 9,
    /// duplicate pending request
    DuplicateRequest = 10,
    /// exceeded retained block-hash buffer
    ExceededBlockchainBuffer = 11,
    /// exceeded REST request limit
    ExceededRestRequestLimit = 12,
    /// exchange rates are disabled
    ExchangeRatesDisabled = 13,
    /// failed to fetch exchange rates
    ExchangeRatesFetch = 14,
    /// exchange rates are stale
    ExchangeRatesOld = 15,
    /// no such account
    NoSuchAccount = 16,
    /// process abort signalled
    SignalAbortProcess = 17,
    /// scan abort signalled
    SignalAbortScan = 18,
    /// unknown signal
    SignalUnknown = 19,
    /// system clock out of valid range
    SystemClockInvalidRange = 20,
    /// failed to relay transaction
    TxRelayFailed = 21,

    /// request body exceeded the size limit
    BufferOverflow = 40,
    /// expected a JSON array
    ExpectedArray = 41,
    /// expected a JSON boolean
    ExpectedBool = 42,
    /// expected a JSON number (double)
    ExpectedDouble = 43,
    /// expected a JSON number (float)
    ExpectedFloat = 44,
    /// expected a JSON object
    ExpectedObject = 45,
    /// expected a JSON string
    ExpectedString = 46,
    /// expected an unsigned JSON number
    ExpectedUnsigned = 47,
    /// invalid hex encoding
    InvalidHex = 48,
    /// missing required field
    MissingField = 49,
    /// numeric overflow
    Overflow = 50,
    /// unexpected field
    UnexpectedField = 51,
    /// numeric underflow
    Underflow = 52,

    /// internal invariant violated
    InvariantViolation = 90,
    /// cryptographic derivation failed
    CryptoFailure = 91,
    /// bind URI has an invalid scheme
    InvalidUriScheme = 92,
    /// invalid or unset error code
    InvalidErrorCode = 0,
}

impl Default for ErrorKind {
    fn default() -> Self {
        ErrorKind::InvalidErrorCode
    }
}

/// Generic, POSIX-like conditions that several distinct [`ErrorKind`]s may be
/// semantically equivalent to, independent of their specific numeric identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Condition {
    TimedOut,
    Interrupted,
    NotFound,
    AlreadyExists,
    InvalidArgument,
}

impl ErrorKind {
    /// Maps this kind onto the generic condition it is equivalent to, if any.
    pub fn condition(self) -> Option<Condition> {
        use ErrorKind::*;
        match self {
            DaemonTimeout => Some(Condition::TimedOut),
            SignalAbortProcess | SignalAbortScan | SignalUnknown => Some(Condition::Interrupted),
            NoSuchAccount => Some(Condition::NotFound),
            AccountExists | DuplicateRequest => Some(Condition::AlreadyExists),
            BadAddress | BadViewKey | BadClientTx | ExceededRestRequestLimit => {
                Some(Condition::InvalidArgument)
            }
            _ => None,
        }
    }
}

/// A categorised error with an optional human-readable detail message.
#[derive(Debug, Clone)]
pub struct LwsError {
    kind: ErrorKind,
    detail: Option<String>,
}

impl LwsError {
    pub fn new(kind: ErrorKind) -> Self {
        LwsError { kind, detail: None }
    }

    pub fn with_detail(kind: ErrorKind, detail: impl Into<String>) -> Self {
        LwsError {
            kind,
            detail: Some(detail.into()),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn condition(&self) -> Option<Condition> {
        self.kind.condition()
    }
}

impl Default for LwsError {
    fn default() -> Self {
        LwsError::new(ErrorKind::InvalidErrorCode)
    }
}

impl PartialEq<Condition> for LwsError {
    fn eq(&self, other: &Condition) -> bool {
        self.kind.condition().as_ref() == Some(other)
    }
}

impl fmt::Display for LwsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.detail {
            Some(detail) => write!(f, "{}: {}", self.kind, detail),
            None => write!(f, "{}", self.kind),
        }
    }
}

impl std::error::Error for LwsError {}

/// Result-of-value and result-of-unit both use this alias; `Result<(), E>`
/// already satisfies the same comparison operators as `Result<T, E>` in
/// Rust, so no separate "result-of-unit" type is needed.
pub type LwsResult<T> = Result<T, LwsError>;

macro_rules! from_kind_only {
    ($src:ty, $kind:expr) => {
        impl From<$src> for LwsError {
            fn from(e: $src) -> Self {
                LwsError::with_detail($kind, e.to_string())
            }
        }
    };
}

from_kind_only!(heed::Error, ErrorKind::InvariantViolation);
from_kind_only!(serde_json::Error, ErrorKind::ExpectedObject);
from_kind_only!(hex::FromHexError, ErrorKind::InvalidHex);
from_kind_only!(std::io::Error, ErrorKind::InvariantViolation);

impl From<reqwest::Error> for LwsError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            LwsError::with_detail(ErrorKind::DaemonTimeout, e.to_string())
        } else if e.is_decode() {
            LwsError::with_detail(ErrorKind::BadDaemonResponse, e.to_string())
        } else {
            LwsError::with_detail(ErrorKind::BadDaemonResponse, e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_error_is_invalid_error_code() {
        let e = LwsError::default();
        assert_eq!(e.kind(), ErrorKind::InvalidErrorCode);
    }

    #[test]
    fn daemon_timeout_matches_generic_timed_out() {
        let e = LwsError::new(ErrorKind::DaemonTimeout);
        assert_eq!(e, Condition::TimedOut);
        assert_ne!(e, Condition::NotFound);
    }

    #[test]
    fn abort_signals_map_to_interrupted() {
        assert_eq!(LwsError::new(ErrorKind::SignalAbortProcess), Condition::Interrupted);
        assert_eq!(LwsError::new(ErrorKind::SignalAbortScan), Condition::Interrupted);
        assert_eq!(LwsError::new(ErrorKind::SignalUnknown), Condition::Interrupted);
    }

    #[test]
    fn no_such_account_matches_not_found() {
        assert_eq!(LwsError::new(ErrorKind::NoSuchAccount), Condition::NotFound);
    }
}
