//! Password verification and hashing
//!
//! Stored passwords are plaintext: `hash_password` applies no cryptographic
//! transformation and `verify_password` is a plain string comparison. The
//! persisted data depends on this pass-through behavior; swapping in a real
//! hash would invalidate every stored credential.

/// Compare a candidate password against the stored value
///
/// Byte-for-byte, case-sensitive equality. Total over all string inputs;
/// two empty strings compare equal.
pub fn verify_password(candidate: &str, stored: &str) -> bool {
    candidate == stored
}

/// "Hash" a password for storage
///
/// Identity pass-through: the store holds the password exactly as
/// submitted.
pub fn hash_password(plain: &str) -> String {
    plain.to_string()
}
