//! Postage accounting: how many stamps a transaction has paid for.

use std::sync::Arc;

use post_office_primitives::{CashAddress, Transaction};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use tracing::debug;

use crate::{PostageError, PostageRate, Shortfall, SlpMetadata};

/// Computes the stamps owed for an incoming token transaction.
///
/// The sender pays postage by routing token units to the post office's
/// receiving address inside the transaction's own SLP `SEND`. Each stamp
/// costs [`AcceptedStamp::stamp_rate`](crate::AcceptedStamp::stamp_rate) base
/// units of the token paid with, which need not be a whole number.
#[derive(Debug, Clone)]
pub struct PostageAccountant {
    rate: Arc<PostageRate>,
    receiving_address: CashAddress,
}

impl PostageAccountant {
    /// Creates an accountant for the given postage rate.
    ///
    /// # Errors
    ///
    /// Returns [`PostageError::Config`] if the receiving address does not parse.
    pub fn new(rate: Arc<PostageRate>) -> Result<Self, PostageError> {
        let receiving_address = rate.receiving_address()?;
        Ok(Self { rate, receiving_address })
    }

    /// Returns the address postage must be paid to.
    #[inline]
    pub const fn receiving_address(&self) -> &CashAddress {
        &self.receiving_address
    }

    /// Returns the number of stamps `transaction` has paid for.
    ///
    /// The paying output is the last output, after the metadata output, whose
    /// destination is the receiving address. The sender must pay for at least
    /// `outputs - inputs + 1` stamps; the count returned is the amount paid
    /// divided by the exact stamp rate, rounded up.
    ///
    /// # Errors
    ///
    /// - [`PostageError::InsufficientPostage`] if nothing is paid to the
    ///   receiving address, or less than the minimum
    /// - [`PostageError::UnsupportedToken`] if the token is not accepted
    /// - [`PostageError::Config`] if the accepted stamp is mispriced
    pub fn needed_stamps(
        &self,
        transaction: &Transaction,
        metadata: &SlpMetadata,
    ) -> Result<u64, PostageError> {
        let vout = self
            .payment_output(transaction)
            .ok_or(PostageError::InsufficientPostage(Shortfall::NoPayment))?;

        let stamp = self
            .rate
            .stamp(&metadata.token_id())
            .ok_or(PostageError::UnsupportedToken(metadata.token_id()))?;
        let stamp_rate = stamp.stamp_rate()?;

        let minimum_stamps = transaction.outputs.len() as i64 - transaction.inputs.len() as i64 + 1;

        let paid = metadata
            .amount(vout)
            .ok_or(PostageError::InsufficientPostage(Shortfall::MissingAmount { vout }))?;

        let required = stamp_rate
            .checked_mul(Decimal::from(minimum_stamps))
            .ok_or(PostageError::Config("stamp rate overflows"))?;
        if Decimal::from(paid) < required {
            return Err(PostageError::InsufficientPostage(Shortfall::Underpaid {
                paid,
                required: required.normalize(),
            }));
        }

        // saturates when a sub-unit rate prices more stamps than a u64 counts
        let needed = Decimal::from(paid)
            .checked_div(stamp_rate)
            .and_then(|stamps| stamps.ceil().to_u64())
            .unwrap_or(u64::MAX);
        debug!(
            vout,
            paid,
            %stamp_rate,
            minimum_stamps,
            needed,
            token_id = %metadata.token_id(),
            "computed postage"
        );
        Ok(needed)
    }

    fn payment_output(&self, transaction: &Transaction) -> Option<usize> {
        let prefix = self.receiving_address.prefix();
        transaction
            .outputs
            .iter()
            .enumerate()
            .skip(crate::SLP_OP_RETURN_VOUT + 1)
            .filter(|(_, output)| {
                CashAddress::from_script(&output.script_pubkey, prefix)
                    .is_ok_and(|address| address.same_destination(&self.receiving_address))
            })
            .map(|(vout, _)| vout)
            .next_back()
    }
}
