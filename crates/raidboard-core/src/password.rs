//! Password digests for account records.
//!
//! The board stores a bare SHA-256 of the UTF-8 password bytes, lower-case
//! hex encoded, to stay compatible with existing account files. There is no
//! salt and no work factor; that is a known weakness of the record format,
//! kept for compatibility rather than silently upgraded to a KDF.

use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

/// Digest a password for storage.
pub fn hash_password(password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

/// Compare a candidate password against a stored digest.
///
/// The digest comparison is constant-time so the check leaks nothing about
/// how much of the digest matched.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    let digest = hash_password(password);
    let digest_bytes = digest.as_bytes();
    let stored_bytes = stored_hash.as_bytes();

    digest_bytes.len() == stored_bytes.len()
        && digest_bytes.ct_eq(stored_bytes).unwrap_u8() == 1
}
