//! Stamp generation: splitting large outputs into many stamp-sized ones.

use post_office_primitives::{SighashType, Transaction, TxIn, TxOut, byte_count};
use tracing::{debug, info};

use crate::{
    CHANGE_DUST_THRESHOLD, CLAMPED_STAMPS_PER_SPLIT, InputSigner, MAX_STAMPS_PER_SPLIT,
    PostageError, UnspentOutput, fee_for_bytes,
};

const TX_VERSION: i32 = 2;

/// The shape of a stamp-splitting transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitPlan {
    /// Number of stamp outputs.
    pub stamps: u64,
    /// Value of each stamp output.
    pub stamp_value: u64,
    /// Fee budgeted for the transaction.
    pub fee: u64,
    /// Value of the change output, if one is worth creating.
    pub change: Option<u64>,
}

impl SplitPlan {
    /// Returns the total value of all outputs.
    pub const fn output_value(&self) -> u64 {
        let change = match self.change {
            Some(change) => change,
            None => 0,
        };
        self.stamps * self.stamp_value + change
    }

    /// Returns the number of outputs.
    pub const fn output_count(&self) -> u64 {
        self.stamps + self.change.is_some() as u64
    }
}

/// Builds and signs transactions that mint stamps.
#[derive(Debug, Clone, Copy)]
pub struct StampGenerator {
    stamp_value: u64,
}

impl StampGenerator {
    /// Creates a generator minting stamps worth `stamp_value` satoshis.
    pub const fn new(stamp_value: u64) -> Self {
        Self { stamp_value }
    }

    /// Returns the value of each minted stamp.
    #[inline]
    pub const fn stamp_value(&self) -> u64 {
        self.stamp_value
    }

    /// Plans how `amount` satoshis spread over `inputs` inputs are split.
    ///
    /// The fee is estimated for as many stamps as the amount could buy, the
    /// stamp count is recomputed from what remains after that fee, and the
    /// fee is then re-derived for the count actually chosen. Splits of more
    /// than [`MAX_STAMPS_PER_SPLIT`] stamps mint [`CLAMPED_STAMPS_PER_SPLIT`]
    /// instead. Change above [`CHANGE_DUST_THRESHOLD`] gets its own output.
    pub fn plan(&self, inputs: usize, amount: u64) -> SplitPlan {
        let stamp_value = self.stamp_value.max(1);

        let possible = amount / stamp_value;
        let estimated_fee = fee_for_bytes(byte_count(inputs, possible as usize));

        let mut stamps = amount.saturating_sub(estimated_fee) / stamp_value;
        if stamps > MAX_STAMPS_PER_SPLIT {
            stamps = CLAMPED_STAMPS_PER_SPLIT;
        }

        let fee = fee_for_bytes(byte_count(inputs, stamps as usize));
        let remaining = amount.saturating_sub(stamps * stamp_value).saturating_sub(fee);
        let change = (remaining > CHANGE_DUST_THRESHOLD).then_some(remaining);

        SplitPlan { stamps, stamp_value, fee, change }
    }

    /// Spends `funding` into stamp outputs, plus change, paying the signer's
    /// own address, and signs every input against its value.
    ///
    /// # Errors
    ///
    /// - [`PostageError::EmptyInputSet`] if `funding` is empty
    /// - [`PostageError::InsufficientBalance`] if the split would have no outputs
    /// - [`PostageError::Signing`] if an input cannot be signed
    pub fn split_into_stamps<S: InputSigner>(
        &self,
        funding: &[UnspentOutput],
        signer: &S,
    ) -> Result<Transaction, PostageError> {
        if funding.is_empty() {
            return Err(PostageError::EmptyInputSet);
        }

        let amount = funding.iter().fold(0u64, |sum, utxo| sum.saturating_add(utxo.value));
        let plan = self.plan(funding.len(), amount);
        debug!(
            inputs = funding.len(),
            amount,
            stamps = plan.stamps,
            fee = plan.fee,
            change = ?plan.change,
            "planned stamp split"
        );

        if plan.output_count() == 0 {
            return Err(PostageError::InsufficientBalance {
                minimum: self.stamp_value + fee_for_bytes(byte_count(funding.len(), 1)),
            });
        }

        let script = signer.locking_script();
        let mut tx = Transaction::new(TX_VERSION);
        tx.inputs
            .extend(funding.iter().map(|utxo| TxIn::unsigned(utxo.outpoint())));
        for _ in 0..plan.stamps {
            tx.outputs.push(TxOut::new(plan.stamp_value, script.clone()));
        }
        if let Some(change) = plan.change {
            tx.outputs.push(TxOut::new(change, script));
        }

        for (index, utxo) in funding.iter().enumerate() {
            let script_sig = signer
                .sign_input(&tx, index, utxo.value, SighashType::ALL_FORKID)
                .map_err(PostageError::signing)?;
            tx.inputs[index].script_sig = script_sig;
        }

        info!(
            txid = %tx.txid(),
            stamps = plan.stamps,
            change = ?plan.change,
            "built stamp transaction"
        );
        Ok(tx)
    }
}
