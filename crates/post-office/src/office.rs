//! The request-servicing workflow: stamping sender transactions.

use std::sync::Arc;

use post_office_postage::{
    AssembledTransaction, InputSigner, InputValidator, Ledger, PostageAccountant, PostageError,
    PostageRate, SlpMetadata, StampInventory, TransactionAssembler,
};
use post_office_primitives::{Transaction, Txid};
use tracing::{error, info, warn};

/// Completes sender transactions with stamps from the post office's own
/// outputs.
///
/// Every request works from a fresh view of the ledger; nothing is reserved
/// between requests, so two concurrent requests may pick the same stamps and
/// the second broadcast is the one the network rejects.
#[derive(Debug)]
pub struct PostOffice<L, S> {
    rate: Arc<PostageRate>,
    accountant: PostageAccountant,
    assembler: TransactionAssembler,
    ledger: L,
    signer: S,
}

impl<L: Ledger, S: InputSigner> PostOffice<L, S> {
    /// Creates a post office selling postage at `rate`.
    ///
    /// # Errors
    ///
    /// Returns [`PostageError::Config`] if the rate's receiving address does
    /// not parse.
    pub fn new(rate: Arc<PostageRate>, ledger: L, signer: S) -> Result<Self, PostageError> {
        let accountant = PostageAccountant::new(Arc::clone(&rate))?;
        info!(
            receiving = %accountant.receiving_address(),
            stamps = %signer.address(),
            accepted = rate.stamps.len(),
            "post office open"
        );
        Ok(Self { rate, accountant, assembler: TransactionAssembler::new(), ledger, signer })
    }

    /// Returns the published postage rate.
    #[inline]
    pub fn postage_rate(&self) -> &PostageRate {
        &self.rate
    }

    /// Returns the ledger client.
    #[inline]
    pub const fn ledger(&self) -> &L {
        &self.ledger
    }

    /// Returns the signer.
    #[inline]
    pub const fn signer(&self) -> &S {
        &self.signer
    }

    /// Stamps a serialized sender transaction.
    ///
    /// The sender inputs must all spend token outputs, the transaction must
    /// carry an SLP `SEND` paying the receiving address, and that payment must
    /// cover at least one stamp per output the transaction adds. The stamps
    /// paid for are appended as inputs and signed.
    ///
    /// # Errors
    ///
    /// - [`PostageError::Transaction`] if `raw` is not a transaction
    /// - [`PostageError::InvalidPayment`] if a sender input spends a non-token output
    /// - [`PostageError::InvalidMetadata`] if there is no SLP `SEND` message
    /// - [`PostageError::InsufficientPostage`] if the payment is missing or too small
    /// - [`PostageError::UnsupportedToken`] if the token is not accepted
    /// - [`PostageError::UnavailableStamps`] if the post office is out of stamps
    /// - [`PostageError::Ledger`] or [`PostageError::Signing`] if a collaborator fails
    pub fn stamp_transaction(&self, raw: &[u8]) -> Result<AssembledTransaction, PostageError> {
        self.stamp(raw).inspect_err(log_rejection)
    }

    /// Stamps a serialized sender transaction and broadcasts the result.
    ///
    /// # Errors
    ///
    /// Any error of [`PostOffice::stamp_transaction`], or
    /// [`PostageError::Ledger`] if the broadcast fails.
    pub fn stamp_and_broadcast(&self, raw: &[u8]) -> Result<Txid, PostageError> {
        let assembled = self.stamp_transaction(raw)?;
        let txid = self
            .ledger
            .broadcast(&assembled.to_bytes())
            .map_err(PostageError::ledger)
            .inspect_err(log_rejection)?;
        info!(%txid, stamps = assembled.stamps().len(), "broadcast stamped transaction");
        Ok(txid)
    }

    fn stamp(&self, raw: &[u8]) -> Result<AssembledTransaction, PostageError> {
        let transaction = Transaction::decode(raw)?;
        InputValidator::new(&self.ledger).validate_inputs(&transaction)?;

        let metadata = SlpMetadata::parse(&transaction.outputs)?;
        let needed = self.accountant.needed_stamps(&transaction, &metadata)?;

        let inventory = StampInventory::new(&self.ledger, self.rate.weight);
        let stamps = inventory
            .select_stamps(usize::try_from(needed).unwrap_or(usize::MAX), &self.signer.address())?;

        self.assembler.attach_and_sign(transaction, stamps, &self.signer)
    }
}

fn log_rejection(err: &PostageError) {
    if err.is_caller_visible() {
        warn!(%err, "rejected postage request");
    } else {
        error!(%err, "postage request failed");
    }
}
