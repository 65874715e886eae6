//! Sender input validation.

use post_office_primitives::{Transaction, Txid};
use tracing::warn;

use crate::{Ledger, PostageError};

/// Checks that every input of an incoming transaction spends a token output.
///
/// A postage request only ever spends tokens; an input coming from a plain
/// transaction means the sender is asking the post office to sign something
/// other than a token transfer.
#[derive(Debug, Clone)]
pub struct InputValidator<L> {
    ledger: L,
}

impl<L: Ledger> InputValidator<L> {
    /// Creates a validator backed by `ledger`'s token oracle.
    pub const fn new(ledger: L) -> Self {
        Self { ledger }
    }

    /// Validates the sender inputs of `transaction`.
    ///
    /// # Errors
    ///
    /// - [`PostageError::InvalidPayment`] naming the first source transaction
    ///   the oracle does not confirm as a valid token transaction
    /// - [`PostageError::Ledger`] if the ledger client fails
    pub fn validate_inputs(&self, transaction: &Transaction) -> Result<(), PostageError> {
        let txids: Vec<Txid> = transaction
            .inputs
            .iter()
            .map(|input| input.previous_output.txid)
            .collect();
        if txids.is_empty() {
            return Ok(());
        }

        let verdicts = self
            .ledger
            .check_token_validity(&txids)
            .map_err(PostageError::ledger)?;

        for txid in &txids {
            let valid = verdicts
                .iter()
                .any(|verdict| verdict.txid == *txid && verdict.valid);
            if !valid {
                warn!(%txid, "sender input is not from a valid token transaction");
                return Err(PostageError::InvalidPayment(*txid));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryLedger;
    use crate::test_utils::{VALID_METADATA, slp_transaction};

    #[test]
    fn test_token_inputs_pass() {
        let ledger = MemoryLedger::new();
        let tx = slp_transaction(VALID_METADATA, 2);
        for input in &tx.inputs {
            ledger.mark_token_transaction(input.previous_output.txid);
        }
        InputValidator::new(&ledger).validate_inputs(&tx).unwrap();
    }

    #[test]
    fn test_plain_input_rejected() {
        let ledger = MemoryLedger::new();
        let tx = slp_transaction(VALID_METADATA, 2);
        ledger.mark_token_transaction(tx.inputs[0].previous_output.txid);

        let result = InputValidator::new(&ledger).validate_inputs(&tx);
        assert!(matches!(
            result,
            Err(PostageError::InvalidPayment(txid)) if txid == tx.inputs[1].previous_output.txid
        ));
    }

    #[test]
    fn test_no_inputs() {
        let ledger = MemoryLedger::new();
        let tx = slp_transaction(VALID_METADATA, 0);
        InputValidator::new(&ledger).validate_inputs(&tx).unwrap();
    }
}
