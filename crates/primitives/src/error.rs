//! Error types for the post-office-primitives crate
//!
//! The crate uses a two-level error hierarchy:
//!
//! - `PrimitivesError`: The top-level error type that wraps all other errors
//! - Component-specific errors: [`ScriptError`], [`AddressError`] and
//!   [`DecodeError`] from the script tokenizer, the CashAddr codec and the
//!   transaction deserializer.
//!
//! ## Example Usage
//!
//! ```
//! use post_office_primitives::error::{PrimitivesError, Result};
//! use post_office_primitives::Transaction;
//!
//! fn parse(hex: &str) -> Result<Transaction> {
//!     Transaction::from_hex(hex)
//! }
//!
//! match parse("00") {
//!     Err(PrimitivesError::Decode(err)) => println!("bad transaction: {err}"),
//!     Err(other) => println!("other error: {other}"),
//!     Ok(_) => unreachable!(),
//! }
//! ```

use thiserror::Error;

/// Result type for operations in the primitives crate
pub type Result<T> = std::result::Result<T, PrimitivesError>;

/// Main error type for the primitives crate
#[derive(Error, Debug)]
pub enum PrimitivesError {
    /// Errors from script tokenizing
    #[error(transparent)]
    Script(#[from] ScriptError),

    /// Errors from address encoding and decoding
    #[error(transparent)]
    Address(#[from] AddressError),

    /// Errors from transaction deserialization
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// The requested input does not exist in the transaction
    #[error("input index {index} out of range for transaction with {inputs} inputs")]
    InputIndex {
        /// The requested index.
        index: usize,
        /// The number of inputs in the transaction.
        inputs: usize,
    },

    /// Input/output errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Hex decoding errors
    #[error("hex error: {0}")]
    Hex(#[from] alloy_primitives::hex::FromHexError),
}

/// Errors raised while splitting a script into tokens.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScriptError {
    /// A push opcode announced more bytes than the script holds.
    #[error("push at offset {offset} needs {needed} bytes, {available} available")]
    Truncated {
        /// Offset of the push opcode.
        offset: usize,
        /// Bytes announced by the opcode.
        needed: usize,
        /// Bytes left in the script.
        available: usize,
    },
}

/// Errors raised by the CashAddr codec.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    /// The address has no `prefix:` part.
    #[error("address has no prefix")]
    MissingPrefix,

    /// The address mixes upper and lower case characters.
    #[error("address mixes upper and lower case")]
    MixedCase,

    /// A character outside the CashAddr alphabet.
    #[error("invalid character {0:?}")]
    InvalidCharacter(char),

    /// The checksum does not match the prefix and payload.
    #[error("invalid checksum")]
    InvalidChecksum,

    /// The payload has padding bits set or the wrong size.
    #[error("invalid payload length {0}")]
    InvalidLength(usize),

    /// The version byte names an unsupported kind or hash size.
    #[error("unsupported version byte {0:#04x}")]
    UnsupportedVersion(u8),

    /// The script is neither P2PKH nor P2SH.
    #[error("script has no address form")]
    NonStandardScript,
}

/// Errors raised while deserializing a transaction.
#[derive(Error, Debug)]
pub enum DecodeError {
    /// The buffer ended before the transaction did.
    #[error("unexpected end of transaction data")]
    UnexpectedEof(#[from] std::io::Error),

    /// A length prefix larger than the remaining data.
    #[error("length prefix {0} exceeds remaining data")]
    OversizedLength(u64),

    /// Bytes left over after the lock time.
    #[error("{0} trailing bytes after transaction")]
    TrailingBytes(usize),
}
