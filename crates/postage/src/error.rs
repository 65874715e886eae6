//! Error types for postage operations.

use std::fmt;

use post_office_primitives::{PrimitivesError, Txid};
use rust_decimal::Decimal;
use thiserror::Error;

use crate::TokenId;

/// A boxed collaborator error, surfaced without interpretation.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur while stamping or replenishing.
#[derive(Debug, Error)]
pub enum PostageError {
    /// The metadata output is missing or is not an SLP message.
    #[error("invalid SLP metadata: {0}")]
    InvalidMetadata(&'static str),

    /// The sender paid the post office nothing, or too little.
    #[error("insufficient postage: {0}")]
    InsufficientPostage(Shortfall),

    /// The token paid with is not an accepted stamp.
    #[error("unsupported SLP token: {0}")]
    UnsupportedToken(TokenId),

    /// Not enough bare outputs to cover the stamps owed.
    #[error("unavailable stamps: needed {needed}, available {available}")]
    UnavailableStamps {
        /// Stamps owed for the request.
        needed: usize,
        /// Bare outputs the inventory could offer.
        available: usize,
    },

    /// Nothing is large enough to be split into stamps.
    #[error("insufficient balance for stamp generation (minimum {minimum} satoshis)")]
    InsufficientBalance {
        /// The threshold that was not met.
        minimum: u64,
    },

    /// Stamp generation was asked to spend nothing.
    #[error("cannot build a stamp transaction without inputs")]
    EmptyInputSet,

    /// A sender input does not come from a valid token transaction.
    #[error("invalid payment: input from {0} is not a valid SLP transaction")]
    InvalidPayment(Txid),

    /// The incoming transaction could not be decoded.
    #[error("invalid transaction: {0}")]
    Transaction(#[from] PrimitivesError),

    /// The postage configuration is unusable.
    #[error("invalid postage configuration: {0}")]
    Config(&'static str),

    /// The ledger client failed.
    #[error("ledger error: {0}")]
    Ledger(#[source] BoxError),

    /// The key service failed to sign.
    #[error("signing error: {0}")]
    Signing(#[source] BoxError),
}

impl PostageError {
    /// Returns `true` if the error is reported back to the requester rather
    /// than treated as an internal failure.
    pub const fn is_caller_visible(&self) -> bool {
        matches!(
            self,
            Self::InvalidMetadata(_)
                | Self::InsufficientPostage(_)
                | Self::UnsupportedToken(_)
                | Self::UnavailableStamps { .. }
                | Self::InvalidPayment(_)
                | Self::Transaction(_)
        )
    }

    /// Wraps a ledger client error.
    pub fn ledger<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Ledger(Box::new(err))
    }

    /// Wraps a signer error.
    pub fn signing<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Signing(Box::new(err))
    }
}

/// Why the postage paid falls short.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shortfall {
    /// No output pays the post office.
    NoPayment,
    /// The metadata carries no amount for the paying output.
    MissingAmount {
        /// The paying output.
        vout: usize,
    },
    /// The amount paid is below the minimum for the transaction's shape.
    Underpaid {
        /// Token base units paid.
        paid: u64,
        /// Token base units required, possibly fractional.
        required: Decimal,
    },
}

impl fmt::Display for Shortfall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoPayment => f.write_str("no output pays the post office"),
            Self::MissingAmount { vout } => write!(f, "no token amount for output {vout}"),
            Self::Underpaid { paid, required } => {
                write!(f, "paid {paid}, required {required}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_caller_visibility() {
        assert!(PostageError::InvalidMetadata("x").is_caller_visible());
        assert!(PostageError::InsufficientPostage(Shortfall::NoPayment).is_caller_visible());
        assert!(PostageError::UnsupportedToken(TokenId::ZERO).is_caller_visible());
        assert!(
            PostageError::UnavailableStamps { needed: 2, available: 1 }.is_caller_visible()
        );
        assert!(PostageError::InvalidPayment(Txid::ZERO).is_caller_visible());

        assert!(!PostageError::InsufficientBalance { minimum: 0 }.is_caller_visible());
        assert!(!PostageError::EmptyInputSet.is_caller_visible());
        assert!(!PostageError::Config("x").is_caller_visible());
        assert!(!PostageError::ledger(std::io::Error::other("down")).is_caller_visible());
    }

    #[test]
    fn test_display() {
        let err = PostageError::InsufficientPostage(Shortfall::Underpaid {
            paid: 22,
            required: Decimal::from(2_000_000),
        });
        assert_eq!(err.to_string(), "insufficient postage: paid 22, required 2000000");

        let err = PostageError::InsufficientPostage(Shortfall::Underpaid {
            paid: 0,
            required: Decimal::new(45, 2),
        });
        assert_eq!(err.to_string(), "insufficient postage: paid 0, required 0.45");

        let err = PostageError::UnavailableStamps { needed: 2, available: 1 };
        assert_eq!(err.to_string(), "unavailable stamps: needed 2, available 1");
    }
}
