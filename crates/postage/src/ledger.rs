//! Ledger client trait for UTXO queries, token validation and broadcast.

use std::sync::Arc;

use post_office_primitives::{CashAddress, OutPoint, Txid};

/// An unspent output as reported by the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UnspentOutput {
    /// Transaction holding the output.
    pub txid: Txid,
    /// Output position.
    pub vout: u32,
    /// Value in satoshis.
    pub value: u64,
    /// Confirmation height, 0 while unconfirmed.
    pub height: u32,
}

impl UnspentOutput {
    /// Creates a new unspent output record.
    #[inline]
    pub const fn new(txid: Txid, vout: u32, value: u64, height: u32) -> Self {
        Self { txid, vout, value, height }
    }

    /// Returns the outpoint that spends this output.
    #[inline]
    pub const fn outpoint(&self) -> OutPoint {
        OutPoint::new(self.txid, self.vout)
    }
}

/// The token-validity oracle's verdict on one transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenValidity {
    /// The transaction asked about.
    pub txid: Txid,
    /// `true` if the transaction is a valid SLP token transaction, meaning its
    /// outputs may carry tokens.
    pub valid: bool,
}

/// A blocking client for the ledger the post office spends on.
///
/// Implementations own their own timeout and retry policy; the post office
/// propagates every error immediately.
pub trait Ledger {
    /// The error type returned by ledger operations.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Returns the unspent outputs paying `address`, in ledger order.
    fn fetch_utxos(&self, address: &CashAddress) -> Result<Vec<UnspentOutput>, Self::Error>;

    /// Reports which of `txids` are valid SLP token transactions.
    fn check_token_validity(&self, txids: &[Txid]) -> Result<Vec<TokenValidity>, Self::Error>;

    /// Submits a signed transaction, returning its id.
    fn broadcast(&self, transaction: &[u8]) -> Result<Txid, Self::Error>;
}

impl<L: Ledger + ?Sized> Ledger for &L {
    type Error = L::Error;

    fn fetch_utxos(&self, address: &CashAddress) -> Result<Vec<UnspentOutput>, Self::Error> {
        (**self).fetch_utxos(address)
    }

    fn check_token_validity(&self, txids: &[Txid]) -> Result<Vec<TokenValidity>, Self::Error> {
        (**self).check_token_validity(txids)
    }

    fn broadcast(&self, transaction: &[u8]) -> Result<Txid, Self::Error> {
        (**self).broadcast(transaction)
    }
}

impl<L: Ledger + ?Sized> Ledger for Arc<L> {
    type Error = L::Error;

    fn fetch_utxos(&self, address: &CashAddress) -> Result<Vec<UnspentOutput>, Self::Error> {
        (**self).fetch_utxos(address)
    }

    fn check_token_validity(&self, txids: &[Txid]) -> Result<Vec<TokenValidity>, Self::Error> {
        (**self).check_token_validity(txids)
    }

    fn broadcast(&self, transaction: &[u8]) -> Result<Txid, Self::Error> {
        (**self).broadcast(transaction)
    }
}
