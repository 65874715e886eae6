//! Attaching stamps to an incoming transaction and signing them.

use post_office_primitives::{SighashType, Transaction, TxIn, Txid};
use tracing::info;

use crate::{InputSigner, PostageError, StampBatch};

/// A sender transaction completed with signed stamp inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembledTransaction {
    transaction: Transaction,
    stamps: StampBatch,
}

impl AssembledTransaction {
    /// Returns the completed transaction.
    #[inline]
    pub const fn transaction(&self) -> &Transaction {
        &self.transaction
    }

    /// Returns the stamps spent by the transaction.
    #[inline]
    pub const fn stamps(&self) -> &StampBatch {
        &self.stamps
    }

    /// Returns the transaction id.
    pub fn txid(&self) -> Txid {
        self.transaction.txid()
    }

    /// Serializes the transaction for broadcast.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.transaction.encode()
    }

    /// Serializes the transaction as hex.
    pub fn to_hex(&self) -> String {
        self.transaction.to_hex()
    }

    /// Consumes the assembly, returning the transaction.
    pub fn into_transaction(self) -> Transaction {
        self.transaction
    }
}

/// Appends stamps to sender transactions and signs them.
#[derive(Debug, Clone, Copy, Default)]
pub struct TransactionAssembler;

impl TransactionAssembler {
    /// Creates a new assembler.
    pub const fn new() -> Self {
        Self
    }

    /// Appends every stamp in `stamps` as an input of `transaction` and signs
    /// the appended inputs with `signer`.
    ///
    /// Sender inputs keep their position and unlocking scripts. Each stamp is
    /// signed with `SIGHASH_ALL | SIGHASH_FORKID` against the value of the
    /// output it spends, as reported by the ledger, not against the configured
    /// [`PostageRate::stamp_value`](crate::PostageRate::stamp_value). Stamps
    /// minted by [`StampGenerator`](crate::StampGenerator) carry exactly that
    /// value; any other bare output on the address still gets a valid
    /// signature.
    ///
    /// # Errors
    ///
    /// Returns [`PostageError::Signing`] if a stamp input cannot be signed;
    /// nothing signed so far is kept.
    pub fn attach_and_sign<S: InputSigner>(
        &self,
        mut transaction: Transaction,
        stamps: StampBatch,
        signer: &S,
    ) -> Result<AssembledTransaction, PostageError> {
        let first_stamp = transaction.inputs.len();
        transaction
            .inputs
            .extend(stamps.as_slice().iter().map(|stamp| TxIn::unsigned(stamp.outpoint())));

        for (offset, stamp) in stamps.as_slice().iter().enumerate() {
            let index = first_stamp + offset;
            let script_sig = signer
                .sign_input(&transaction, index, stamp.value, SighashType::ALL_FORKID)
                .map_err(PostageError::signing)?;
            transaction.inputs[index].script_sig = script_sig;
        }

        info!(
            txid = %transaction.txid(),
            sender_inputs = first_stamp,
            stamps = stamps.len(),
            "attached stamps"
        );
        Ok(AssembledTransaction { transaction, stamps })
    }
}
