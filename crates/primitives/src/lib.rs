//! Core primitives for a Bitcoin Cash postage service
//!
//! This crate provides the wire-level types the post office works with:
//! transactions and their serialization, scripts and the script tokenizer,
//! CashAddr addresses, the P2PKH size model and replay-protected signature
//! hashes.
//!
//! ## Key Components
//!
//! - **Transactions**: [`Transaction`], [`TxIn`], [`TxOut`], [`OutPoint`], [`Txid`]
//! - **Scripts**: [`Script`] and its token stream ([`ScriptToken`])
//! - **Addresses**: [`CashAddress`] in Bitcoin Cash and SLP form
//! - **Signing support**: [`SighashType`] and [`Transaction::signature_hash`]
//! - **Fees**: [`byte_count`]
//!
//! ## Usage Examples
//!
//! ```
//! use post_office_primitives::{CashAddress, Transaction};
//!
//! let tx = Transaction::from_hex(
//!     "0200000000010000000000000000026a0000000000",
//! ).unwrap();
//! assert!(tx.outputs[0].script_pubkey.is_op_return());
//!
//! let address: CashAddress = "simpleledger:qz27uwddwgczpkvg0eqnyemlaqnlax75vuqte26mpx"
//!     .parse()
//!     .unwrap();
//! assert_eq!(address.prefix(), "simpleledger");
//! ```

#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

// Re-export dependencies that are part of our public API
pub use bytes;

pub mod address;
mod encode;
pub mod error;
mod fee;
mod hash;
pub mod script;
mod sighash;
pub mod transaction;

// Re-export core types
pub use address::{AddressKind, CashAddress};
pub use encode::varint_len;
pub use error::{AddressError, DecodeError, PrimitivesError, Result, ScriptError};
pub use fee::{P2PKH_INPUT_SIZE, P2PKH_OUTPUT_SIZE, byte_count};
pub use hash::{Hash160, hash160, sha256d};
pub use script::{Script, ScriptBuilder, ScriptToken};
pub use sighash::SighashType;
pub use transaction::{OutPoint, SEQUENCE_FINAL, Transaction, TxIn, TxOut, Txid};
