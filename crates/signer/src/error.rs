//! Error types for key derivation and signing.

use post_office_primitives::PrimitivesError;
use thiserror::Error;

/// Errors that can occur when deriving keys or signing inputs.
#[derive(Debug, Error)]
pub enum SignerError {
    /// The mnemonic phrase is not a valid English BIP-39 phrase.
    #[error("invalid mnemonic: {0}")]
    InvalidMnemonic(String),

    /// The derived secret is not a usable secp256k1 scalar.
    #[error("invalid signing key")]
    InvalidKey,

    /// The signature hash could not be computed.
    #[error(transparent)]
    Sighash(#[from] PrimitivesError),

    /// The signing operation failed.
    #[error(transparent)]
    Ecdsa(#[from] k256::ecdsa::Error),
}
