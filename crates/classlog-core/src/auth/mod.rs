//! Access gate guarding the data loads.
//!
//! This module provides:
//! - `AccessSignal`: one-shot "access granted" signal every loader awaits
//! - `AccessGate`: verifies the shared access key and persists the grant

pub mod gate;

pub use gate::{digest_hex, AccessGate, AccessSignal, Verification, ACCESS_FLAG_KEY, DEFAULT_KEY_HASH};
