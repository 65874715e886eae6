//! Key service trait for signing post office inputs.

use std::sync::Arc;

use post_office_primitives::{CashAddress, Script, SighashType, Transaction};

/// Signs inputs that spend outputs of the post office's own key.
///
/// Signing is deterministic: the same transaction, index, value and hash type
/// always produce the same unlocking script.
pub trait InputSigner {
    /// The error type returned when signing fails.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Returns the Bitcoin Cash address of the signing key.
    fn address(&self) -> CashAddress;

    /// Returns the locking script of the signing key's outputs.
    fn locking_script(&self) -> Script {
        self.address().to_script()
    }

    /// Produces the unlocking script for input `index` of `transaction`,
    /// which spends an output worth `value`.
    ///
    /// # Errors
    ///
    /// Returns an error if `index` is out of range or the key cannot sign.
    fn sign_input(
        &self,
        transaction: &Transaction,
        index: usize,
        value: u64,
        sighash_type: SighashType,
    ) -> Result<Script, Self::Error>;
}

impl<S: InputSigner + ?Sized> InputSigner for &S {
    type Error = S::Error;

    fn address(&self) -> CashAddress {
        (**self).address()
    }

    fn locking_script(&self) -> Script {
        (**self).locking_script()
    }

    fn sign_input(
        &self,
        transaction: &Transaction,
        index: usize,
        value: u64,
        sighash_type: SighashType,
    ) -> Result<Script, Self::Error> {
        (**self).sign_input(transaction, index, value, sighash_type)
    }
}

impl<S: InputSigner + ?Sized> InputSigner for Arc<S> {
    type Error = S::Error;

    fn address(&self) -> CashAddress {
        (**self).address()
    }

    fn locking_script(&self) -> Script {
        (**self).locking_script()
    }

    fn sign_input(
        &self,
        transaction: &Transaction,
        index: usize,
        value: u64,
        sighash_type: SighashType,
    ) -> Result<Script, Self::Error> {
        (**self).sign_input(transaction, index, value, sighash_type)
    }
}
