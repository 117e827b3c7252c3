use std::sync::Arc;

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use tokio::sync::watch;
use tracing::{debug, info};

use crate::cache::KeyValueStore;

/// Store key of the persisted "access granted" flag. Lives outside the
/// cache namespace so clearing the cache keeps the grant.
pub const ACCESS_FLAG_KEY: &str = "classRecordAccessGranted";

/// SHA-256 of the stock access key `classrecord`.
pub const DEFAULT_KEY_HASH: &str = "721a57120df8535ec92f61a4a6e25dfbfbf142613f766381b5a877461424d89c";

/// One-shot "access granted" signal. Clones share the same state; once
/// granted it stays granted.
#[derive(Clone, Debug)]
pub struct AccessSignal {
    tx: Arc<watch::Sender<bool>>,
}

impl Default for AccessSignal {
    fn default() -> Self {
        Self::new()
    }
}

impl AccessSignal {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// A signal that is already granted.
    pub fn granted() -> Self {
        let signal = Self::new();
        signal.grant();
        signal
    }

    pub fn grant(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_granted(&self) -> bool {
        *self.tx.borrow()
    }

    /// Resolves once access has been granted; immediately if it already was.
    pub async fn wait(&self) {
        let mut rx = self.tx.subscribe();
        // The sender lives in `self`, so the channel cannot close while waiting
        let _ = rx.wait_for(|granted| *granted).await;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verification {
    pub ok: bool,
    pub message: Option<String>,
}

impl Verification {
    fn accepted() -> Self {
        Self { ok: true, message: None }
    }

    fn rejected(message: &str) -> Self {
        Self {
            ok: false,
            message: Some(message.to_string()),
        }
    }
}

/// Client-side access check. This only hides the data behind a shared key;
/// anyone with the files can read them.
pub struct AccessGate {
    store: Arc<dyn KeyValueStore>,
    key_hash: String,
    signal: AccessSignal,
}

impl AccessGate {
    /// `key_hash` is the hex SHA-256 of the access key; `None` uses the
    /// stock key.
    pub fn new(store: Arc<dyn KeyValueStore>, key_hash: Option<String>) -> Self {
        let key_hash = key_hash
            .map(|h| h.trim().to_ascii_lowercase())
            .unwrap_or_else(|| DEFAULT_KEY_HASH.to_string());
        let signal = AccessSignal::new();

        match store.get(ACCESS_FLAG_KEY) {
            Ok(Some(flag)) if flag == "true" => {
                debug!("Access previously granted");
                signal.grant();
            }
            Ok(_) => {}
            Err(e) => debug!(error = %e, "Failed to read access flag"),
        }

        Self {
            store,
            key_hash,
            signal,
        }
    }

    pub fn signal(&self) -> &AccessSignal {
        &self.signal
    }

    pub fn is_granted(&self) -> bool {
        self.signal.is_granted()
    }

    pub async fn wait_for_access_granted(&self) {
        self.signal.wait().await
    }

    /// Check a candidate key. On success the grant is persisted and every
    /// waiter is released.
    pub fn verify(&self, candidate: &str) -> Result<Verification> {
        let candidate = candidate.trim();
        if candidate.is_empty() {
            return Ok(Verification::rejected("Please enter the access key."));
        }

        if digest_hex(candidate) != self.key_hash {
            debug!("Access key rejected");
            return Ok(Verification::rejected("Incorrect access key, please try again."));
        }

        self.store
            .set(ACCESS_FLAG_KEY, "true")
            .context("Failed to persist access grant")?;
        self.signal.grant();
        info!("Access granted");
        Ok(Verification::accepted())
    }

    /// Forget the persisted grant. Waiters already released stay released;
    /// the next session starts locked.
    pub fn clear_access(&self) -> Result<()> {
        self.store.remove(ACCESS_FLAG_KEY)
    }
}

/// Lowercase hex SHA-256 of `value`.
pub fn digest_hex(value: &str) -> String {
    hex::encode(Sha256::digest(value.as_bytes()))
}
