//! C6: `derive_public(secret) == stored_view_public` gate applied on every
//! address-bearing request.

use crate::crypto;
use crate::db::account::{Account, AccountStatus};
use crate::db::common::Address;
use crate::db::reader::Reader;
use crate::error::{ErrorKind, LwsError, LwsResult};

/// Authenticates `(address, view_key)` against the stored account.
/// Indistinguishable-from-absent semantics (§4.C6, §7): a bad view key and
/// a genuinely absent or hidden account both surface as `NoSuchAccount`
/// once the handler maps this to HTTP — but the two are still
/// distinguished internally by kind, since §8's testable property 4 checks
/// for `BadViewKey` specifically before the wire-level collapse.
pub fn authenticate(reader: &Reader<'_>, address: &Address, view_key: &[u8; 32]) -> LwsResult<Account> {
    let derived = crypto::derive_public(view_key)?;
    if derived != address.view_public {
        return Err(LwsError::new(ErrorKind::BadViewKey));
    }

    let account = reader
        .find_account_by_address(address)?
        .ok_or_else(|| LwsError::new(ErrorKind::NoSuchAccount))?;

    if account.status == AccountStatus::Hidden {
        return Err(LwsError::new(ErrorKind::NoSuchAccount));
    }

    Ok(account)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::writer::Writer;
    use crate::kv::Environment;
    use tempfile::tempdir;

    fn open_env() -> (tempfile::TempDir, Environment) {
        let dir = tempdir().unwrap();
        let env = Environment::open(dir.path(), 10 * 1024 * 1024).unwrap();
        (dir, env)
    }

    #[test]
    fn bad_view_key_is_rejected_before_any_lookup() {
        let (_dir, env) = open_env();
        let address = Address {
            spend_public: [1u8; 32],
            view_public: crypto::derive_public(&[2u8; 32]).unwrap(),
        };
        let reader = Reader::start(&env).unwrap();
        let err = authenticate(&reader, &address, &[3u8; 32]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::BadViewKey);
    }

    #[test]
    fn unknown_account_is_no_such_account() {
        let (_dir, env) = open_env();
        let view_key = [2u8; 32];
        let address = Address {
            spend_public: [1u8; 32],
            view_public: crypto::derive_public(&view_key).unwrap(),
        };
        let reader = Reader::start(&env).unwrap();
        let err = authenticate(&reader, &address, &view_key).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NoSuchAccount);
    }

    #[test]
    fn hidden_account_is_indistinguishable_from_absent() {
        let (_dir, env) = open_env();
        let view_key = [2u8; 32];
        let address = Address {
            spend_public: [1u8; 32],
            view_public: crypto::derive_public(&view_key).unwrap(),
        };
        let mut w = Writer::start(&env, 10).unwrap();
        w.creation_request(&address, view_key).unwrap();
        w.approve_create_account(&address, 1).unwrap();
        w.commit().unwrap();

        let mut w = Writer::start(&env, 10).unwrap();
        w.set_status(&address, AccountStatus::Hidden).unwrap();
        w.commit().unwrap();

        let reader = Reader::start(&env).unwrap();
        let err = authenticate(&reader, &address, &view_key).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NoSuchAccount);
    }
}
