#![cfg(test)]

use std::path::Path;
use std::sync::Mutex;

use crate::settings::ENDPOINT_ENV;

static ENV_MUTEX: Mutex<()> = Mutex::new(());

/// Runs `func` with `HOME` pointing at a fresh directory and the decode
/// endpoint override set to `endpoint` (or cleared).
pub(crate) fn with_isolated_env<F, R>(endpoint: Option<&str>, func: F) -> R
where
    F: FnOnce(&Path) -> R,
{
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    let dir = tempfile::tempdir().expect("tempdir");
    let saved = [
        ("HOME", std::env::var("HOME").ok()),
        (ENDPOINT_ENV, std::env::var(ENDPOINT_ENV).ok()),
    ];
    // Every test touching these variables holds ENV_MUTEX.
    unsafe {
        std::env::set_var("HOME", dir.path());
        match endpoint {
            Some(endpoint) => std::env::set_var(ENDPOINT_ENV, endpoint),
            None => std::env::remove_var(ENDPOINT_ENV),
        }
    }
    let result = func(dir.path());
    for (key, value) in saved {
        match value {
            Some(value) => unsafe { std::env::set_var(key, value) },
            None => unsafe { std::env::remove_var(key) },
        }
    }
    result
}

pub(crate) fn with_temp_home<F, R>(func: F) -> R
where
    F: FnOnce(&Path) -> R,
{
    with_isolated_env(None, func)
}
