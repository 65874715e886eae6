//! Hash functions used by transactions and addresses.

use alloy_primitives::B256;
use ripemd::Ripemd160;
use sha2::{Digest, Sha256};

/// A 20-byte `RIPEMD160(SHA256(x))` digest, as committed to by P2PKH and P2SH scripts.
pub type Hash160 = [u8; 20];

/// Double SHA-256, returned in the order the hash function produces it.
#[inline]
pub fn sha256d(data: &[u8]) -> B256 {
    let first = Sha256::digest(data);
    B256::from_slice(&Sha256::digest(first))
}

/// `RIPEMD160(SHA256(data))`.
#[inline]
pub fn hash160(data: &[u8]) -> Hash160 {
    Ripemd160::digest(Sha256::digest(data)).into()
}
