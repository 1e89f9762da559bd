//! Address derivation for accepted candidates.
//!
//! The ledger re-derives every address on the CPU before accepting a
//! candidate; the kernel's output is never trusted on its own.

use ed25519_dalek::SigningKey;

/// The base58 alphabet used for encoded public keys.
pub const BASE58_ALPHABET: &str =
    "123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

/// Derive the public key for a 32-byte secret seed.
pub fn derive_public_key(seed: &[u8; 32]) -> [u8; 32] {
    SigningKey::from_bytes(seed).verifying_key().to_bytes()
}

/// Derive the base58 address for a 32-byte secret seed.
pub fn derive_address(seed: &[u8; 32]) -> String {
    bs58::encode(derive_public_key(seed)).into_string()
}

/// Whether `character` may appear in a search pattern.
pub fn is_base58_character(character: char) -> bool {
    BASE58_ALPHABET.contains(character)
}
