//! Truncated SHA-256 fingerprint of the session key.
//!
//! Logged when session settings are resolved so operators can tell which key
//! a replica runs with. The key material itself never reaches the logs.

use actix_web::cookie::Key;
use sha2::{Digest, Sha256};

const FINGERPRINT_BYTES: usize = 8;

/// Lower-case hex of the first eight bytes of `SHA-256(signing key)`.
///
/// ```rust
/// use actix_web::cookie::Key;
/// use helpdesk::inbound::http::session_config::fingerprint::key_fingerprint;
///
/// let fingerprint = key_fingerprint(&Key::generate());
/// assert_eq!(fingerprint.len(), 16);
/// ```
#[must_use]
pub fn key_fingerprint(key: &Key) -> String {
    let digest = Sha256::digest(key.signing());
    hex::encode(&digest[..FINGERPRINT_BYTES])
}
