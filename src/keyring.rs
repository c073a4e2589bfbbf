//! System keychain storage for the model server API key

use keyring::Entry;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::warn;

const KEYRING_SERVICE: &str = "blockcoach";
const KEYRING_USERNAME: &str = "model_api_key";

static KEYRING_ERROR_WARNED: AtomicBool = AtomicBool::new(false);

fn keyring_disabled() -> bool {
    if cfg!(test) {
        return true;
    }
    matches!(
        std::env::var("BLOCKCOACH_DISABLE_KEYRING")
            .unwrap_or_default()
            .to_lowercase()
            .as_str(),
        "1" | "true" | "yes"
    )
}

fn keyring_entry() -> Result<Entry, keyring::Error> {
    Entry::new(KEYRING_SERVICE, KEYRING_USERNAME)
}

/// Warn about keychain errors only once per process
fn warn_keychain_error_once(err: &keyring::Error) {
    if KEYRING_ERROR_WARNED.swap(true, Ordering::Relaxed) {
        return;
    }
    warn!(
        "couldn't read the system keychain ({}); set BLOCKCOACH_API_KEY to bypass it",
        err
    );
}

fn read_key() -> Result<Option<String>, keyring::Error> {
    match keyring_entry()?.get_password() {
        Ok(key) => Ok(Some(key)),
        Err(keyring::Error::NoEntry) => Ok(None),
        Err(err) => Err(err),
    }
}

pub fn get_api_key() -> Option<String> {
    if keyring_disabled() {
        return None;
    }
    match read_key() {
        Ok(key) => key,
        Err(err) => {
            warn_keychain_error_once(&err);
            None
        }
    }
}

/// Store the key and verify it reads back
pub fn set_api_key(key: &str) -> Result<(), String> {
    if keyring_disabled() {
        return Err("Keychain access is disabled (BLOCKCOACH_DISABLE_KEYRING)".to_string());
    }
    keyring_entry()
        .and_then(|entry| entry.set_password(key))
        .map_err(|e| format!("Failed to store API key in system keychain: {}", e))?;

    match read_key() {
        Ok(Some(stored)) if stored == key => Ok(()),
        Ok(_) => Err(
            "API key verification failed: keychain did not return the stored key. \
             You can set the BLOCKCOACH_API_KEY environment variable instead."
                .to_string(),
        ),
        Err(err) => Err(format!(
            "API key verification failed: couldn't read back from keychain ({})",
            err
        )),
    }
}
