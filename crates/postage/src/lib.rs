//! Postage for SLP token transactions.
//!
//! A wallet holding only SLP tokens cannot pay the network fee of its own
//! token transfers. A post office sells it the fee: the wallet routes some
//! tokens to the post office inside the transfer, and the post office attaches
//! small bare outputs of its own, called stamps, to cover the fee.
//!
//! # Core Types
//!
//! - [`SlpMetadata`]: The decoded SLP `SEND` message of a transaction
//! - [`PostageRate`]: The published price list
//! - [`PostageAccountant`]: How many stamps a transaction has paid for
//! - [`StampInventory`]: Chooses stamps and funding outputs from the ledger
//! - [`StampGenerator`]: Splits funding outputs into new stamps
//! - [`TransactionAssembler`]: Attaches and signs stamps
//! - [`InputValidator`]: Checks that sender inputs spend tokens
//!
//! # Traits
//!
//! - [`Ledger`]: UTXO queries, token validation and broadcast
//! - [`InputSigner`]: Signs inputs spending the post office's outputs
//!
//! # Servicing a request
//!
//! ```
//! use std::sync::Arc;
//! use post_office_postage::{PostageAccountant, PostageRate, SlpMetadata};
//! # use post_office_postage::AcceptedStamp;
//! # use post_office_primitives::{Script, Transaction, TxOut};
//! # let rate = PostageRate {
//! #     version: 1,
//! #     address: "simpleledger:qz27uwddwgczpkvg0eqnyemlaqnlax75vuqte26mpx".into(),
//! #     weight: 365,
//! #     transaction_ttl: None,
//! #     stamps: vec![AcceptedStamp {
//! #         name: "Test".into(),
//! #         symbol: "TEST".into(),
//! #         token_id: "38e97c5d7d3585a2cbf3f9580c82ca33985f9cb0845d4dcce220cb709f9538b0".parse().unwrap(),
//! #         decimals: 6,
//! #         rate: 1.into(),
//! #     }],
//! # };
//! # let mut tx = Transaction::new(2);
//! # let send = alloy_primitives::hex::decode(
//! #     "6a04534c5000510453454e442038e97c5d7d3585a2cbf3f9580c82ca33985f9cb0845d4dcce220cb709f9538b00800000022ecb25c00",
//! # ).unwrap();
//! # tx.outputs.push(TxOut::new(0, Script::new(send)));
//! # tx.outputs.push(TxOut::new(546, rate.receiving_address().unwrap().to_script()));
//! let accountant = PostageAccountant::new(Arc::new(rate))?;
//! let metadata = SlpMetadata::parse(&tx.outputs)?;
//! assert_eq!(accountant.needed_stamps(&tx, &metadata)?, 150_000);
//! # Ok::<(), post_office_postage::PostageError>(())
//! ```

#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

mod accountant;
mod assembler;
mod error;
mod generator;
mod inventory;
mod ledger;
mod memory;
mod rate;
mod signer;
mod slp;
mod validation;

#[cfg(test)]
mod test_utils;

pub use accountant::PostageAccountant;
pub use assembler::{AssembledTransaction, TransactionAssembler};
pub use error::{BoxError, PostageError, Shortfall};
pub use generator::{SplitPlan, StampGenerator};
pub use inventory::{StampBatch, StampInventory};
pub use ledger::{Ledger, TokenValidity, UnspentOutput};
pub use memory::{MemoryLedger, MemoryLedgerError};
pub use rate::{AcceptedStamp, PostageRate};
pub use signer::InputSigner;
pub use slp::{SlpMetadata, TokenId};
pub use validation::InputValidator;

pub use rust_decimal::Decimal;

/// Output holding the SLP message.
pub const SLP_OP_RETURN_VOUT: usize = 0;

/// Script token holding the lokad id.
pub const LOKAD_ID_INDEX: usize = 1;

/// The SLP lokad id, `"SLP\0"`.
pub const LOKAD_ID: [u8; 4] = *b"SLP\0";

/// Script token holding the token id of a `SEND`.
pub const TOKEN_ID_INDEX: usize = 4;

/// Fixed overhead, in satoshis, added to the stamp weight: the cost of the
/// input that spends a stamp.
pub const MIN_BYTES_INPUT: u64 = 181;

/// Fee rate in satoshis per ten bytes (1.4 sat/byte).
pub const FEE_RATE_PER_TEN_BYTES: u64 = 14;

/// Change at or below this value is left to the fee.
pub const CHANGE_DUST_THRESHOLD: u64 = 1082;

/// Splits that would mint more stamps than this are clamped.
pub const MAX_STAMPS_PER_SPLIT: u64 = 100;

/// The stamp count used when a split is clamped.
pub const CLAMPED_STAMPS_PER_SPLIT: u64 = 50;

/// Returns the fee for a transaction of `bytes` bytes, rounded down.
#[inline]
pub const fn fee_for_bytes(bytes: usize) -> u64 {
    (bytes as u64).saturating_mul(FEE_RATE_PER_TEN_BYTES) / 10
}
