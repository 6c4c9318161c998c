//! Keychain storage for the artifact API token.
//!
//! Uses the system keychain (macOS Keychain, Linux Secret Service, Windows Credential Manager).

use crate::{Error, ErrorCode, Result};
use keyring::Entry;
use serde_json::Value;

const SERVICE_NAME: &str = "rcpack";

fn keyring_error(e: keyring::Error) -> Error {
    Error::new(
        ErrorCode::InternalUnexpected,
        format!("Keychain error: {}", e),
        Value::Null,
    )
}

fn entry(account: &str) -> Result<Entry> {
    Entry::new(SERVICE_NAME, account).map_err(keyring_error)
}

/// Stores a token for `account` (the `<owner>/<repo>` it authenticates against).
pub fn store(account: &str, token: &str) -> Result<()> {
    entry(account)?.set_password(token).map_err(keyring_error)
}

/// Returns `None` if no token is stored.
pub fn get(account: &str) -> Result<Option<String>> {
    match entry(account)?.get_password() {
        Ok(value) => Ok(Some(value)),
        Err(keyring::Error::NoEntry) => Ok(None),
        Err(e) => Err(keyring_error(e)),
    }
}

/// Deletes the stored token. Returns whether one existed.
pub fn delete(account: &str) -> Result<bool> {
    match entry(account)?.delete_credential() {
        Ok(()) => Ok(true),
        Err(keyring::Error::NoEntry) => Ok(false),
        Err(e) => Err(keyring_error(e)),
    }
}
