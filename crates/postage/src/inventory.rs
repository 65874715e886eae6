//! Stamp inventory: choosing outputs to spend as stamps or to split into stamps.

use std::collections::HashSet;

use post_office_primitives::{CashAddress, Txid};
use tracing::debug;

use crate::{Ledger, PostageError, UnspentOutput};

/// Outputs chosen to pay the network fee of one request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StampBatch(Vec<UnspentOutput>);

impl StampBatch {
    /// Creates a batch from already chosen stamps.
    #[inline]
    pub const fn new(stamps: Vec<UnspentOutput>) -> Self {
        Self(stamps)
    }

    /// Returns the number of stamps.
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the batch holds no stamps.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the stamps in spend order.
    #[inline]
    pub fn as_slice(&self) -> &[UnspentOutput] {
        &self.0
    }

    /// Returns the total value of the stamps.
    pub fn total_value(&self) -> u64 {
        self.0.iter().map(|stamp| stamp.value).sum()
    }
}

impl<'a> IntoIterator for &'a StampBatch {
    type Item = &'a UnspentOutput;
    type IntoIter = std::slice::Iter<'a, UnspentOutput>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Chooses outputs of the post office's own address from the ledger.
///
/// Every call works on a fresh snapshot of the address's outputs; nothing is
/// reserved between calls.
#[derive(Debug, Clone)]
pub struct StampInventory<L> {
    ledger: L,
    weight: u64,
}

impl<L: Ledger> StampInventory<L> {
    /// Creates an inventory over `ledger` for stamps paying `weight` bytes.
    pub const fn new(ledger: L, weight: u64) -> Self {
        Self { ledger, weight }
    }

    /// Returns the ledger client.
    #[inline]
    pub const fn ledger(&self) -> &L {
        &self.ledger
    }

    /// Selects `needed` bare outputs of `address` to attach as stamps.
    ///
    /// Outputs of valid token transactions are never selected, and neither
    /// are outputs the token oracle gives no verdict on. The first `needed`
    /// remaining outputs, in ledger order, are returned.
    ///
    /// # Errors
    ///
    /// - [`PostageError::UnavailableStamps`] if fewer than `needed` bare outputs exist
    /// - [`PostageError::Ledger`] if the ledger client fails
    pub fn select_stamps(
        &self,
        needed: usize,
        address: &CashAddress,
    ) -> Result<StampBatch, PostageError> {
        if needed == 0 {
            return Ok(StampBatch::default());
        }

        let utxos = self.ledger.fetch_utxos(address).map_err(PostageError::ledger)?;
        let candidates = utxos.len();
        let stamps: Vec<UnspentOutput> =
            self.without_token_outputs(utxos)?.into_iter().take(needed).collect();

        debug!(%address, needed, candidates, selected = stamps.len(), "selected stamps");

        if stamps.len() < needed {
            return Err(PostageError::UnavailableStamps {
                needed,
                available: stamps.len(),
            });
        }
        Ok(StampBatch::new(stamps))
    }

    /// Selects the outputs of `address` worth splitting into stamps: bare
    /// outputs worth more than twice the stamp weight.
    ///
    /// Token outputs are skipped whatever their value, since spending them
    /// into a plain split would burn the tokens they carry.
    ///
    /// # Errors
    ///
    /// - [`PostageError::InsufficientBalance`] if no output qualifies
    /// - [`PostageError::Ledger`] if the ledger client fails
    pub fn select_funding_inputs(
        &self,
        address: &CashAddress,
    ) -> Result<Vec<UnspentOutput>, PostageError> {
        let minimum = self.weight.saturating_mul(2);
        let large: Vec<UnspentOutput> = self
            .ledger
            .fetch_utxos(address)
            .map_err(PostageError::ledger)?
            .into_iter()
            .filter(|utxo| utxo.value > minimum)
            .collect();
        let candidates = large.len();
        let funding = self.without_token_outputs(large)?;

        debug!(%address, minimum, candidates, selected = funding.len(), "selected funding inputs");

        if funding.is_empty() {
            return Err(PostageError::InsufficientBalance { minimum });
        }
        Ok(funding)
    }

    /// Keeps the outputs the token oracle reports as not belonging to a valid
    /// token transaction, in their original order. Outputs without a verdict
    /// are dropped.
    fn without_token_outputs(
        &self,
        utxos: Vec<UnspentOutput>,
    ) -> Result<Vec<UnspentOutput>, PostageError> {
        if utxos.is_empty() {
            return Ok(utxos);
        }

        let mut seen = HashSet::new();
        let txids: Vec<Txid> =
            utxos.iter().map(|utxo| utxo.txid).filter(|txid| seen.insert(*txid)).collect();

        let bare: HashSet<Txid> = self
            .ledger
            .check_token_validity(&txids)
            .map_err(PostageError::ledger)?
            .into_iter()
            .filter(|verdict| !verdict.valid)
            .map(|verdict| verdict.txid)
            .collect();

        Ok(utxos.into_iter().filter(|utxo| bare.contains(&utxo.txid)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryLedger;
    use crate::test_utils::server_cash_address;
    use proptest::prelude::*;

    const WEIGHT: u64 = 365;

    fn utxo(tag: u8, vout: u32, value: u64) -> UnspentOutput {
        UnspentOutput::new(Txid::new([tag; 32]), vout, value, 629_922)
    }

    #[test]
    fn test_select_skips_token_outputs() {
        let ledger = MemoryLedger::new();
        let address = server_cash_address();
        ledger.add_utxo(&address, utxo(1, 0, 546));
        ledger.add_utxo(&address, utxo(2, 0, 546));
        ledger.add_utxo(&address, utxo(3, 0, 546));
        ledger.add_utxo(&address, utxo(3, 1, 546));
        ledger.mark_token_transaction(Txid::new([2; 32]));

        let inventory = StampInventory::new(&ledger, WEIGHT);
        let batch = inventory.select_stamps(3, &address).unwrap();
        assert_eq!(batch.as_slice(), &[utxo(1, 0, 546), utxo(3, 0, 546), utxo(3, 1, 546)]);
        assert_eq!(batch.total_value(), 3 * 546);
    }

    #[test]
    fn test_select_keeps_ledger_order() {
        let ledger = MemoryLedger::new();
        let address = server_cash_address();
        for tag in [9, 4, 7] {
            ledger.add_utxo(&address, utxo(tag, 0, 546));
        }

        let inventory = StampInventory::new(&ledger, WEIGHT);
        let batch = inventory.select_stamps(2, &address).unwrap();
        assert_eq!(batch.as_slice(), &[utxo(9, 0, 546), utxo(4, 0, 546)]);
    }

    #[test]
    fn test_select_unavailable() {
        let ledger = MemoryLedger::new();
        let address = server_cash_address();
        ledger.add_utxo(&address, utxo(1, 0, 6000));

        let inventory = StampInventory::new(&ledger, WEIGHT);
        let result = inventory.select_stamps(2, &address);
        assert!(matches!(
            result,
            Err(PostageError::UnavailableStamps { needed: 2, available: 1 })
        ));
    }

    #[test]
    fn test_select_zero_stamps() {
        let ledger = MemoryLedger::new();
        let inventory = StampInventory::new(&ledger, WEIGHT);
        assert!(inventory.select_stamps(0, &server_cash_address()).unwrap().is_empty());
    }

    #[test]
    fn test_funding_inputs_filter_small_outputs() {
        let ledger = MemoryLedger::new();
        let address = server_cash_address();
        ledger.add_utxo(&address, utxo(1, 0, 2 * WEIGHT));
        ledger.add_utxo(&address, utxo(2, 0, 2 * WEIGHT + 1));
        ledger.add_utxo(&address, utxo(3, 0, 100_000));

        let inventory = StampInventory::new(&ledger, WEIGHT);
        let funding = inventory.select_funding_inputs(&address).unwrap();
        assert_eq!(funding, vec![utxo(2, 0, 2 * WEIGHT + 1), utxo(3, 0, 100_000)]);
    }

    #[test]
    fn test_funding_inputs_skip_token_outputs() {
        let ledger = MemoryLedger::new();
        let address = server_cash_address();
        ledger.add_utxo(&address, utxo(1, 0, 1_000_000));
        ledger.add_utxo(&address, utxo(2, 1, 50_000));
        ledger.mark_token_transaction(Txid::new([1; 32]));

        let inventory = StampInventory::new(&ledger, WEIGHT);
        let funding = inventory.select_funding_inputs(&address).unwrap();
        assert_eq!(funding, vec![utxo(2, 1, 50_000)]);
    }

    #[test]
    fn test_funding_inputs_only_token_outputs() {
        let ledger = MemoryLedger::new();
        let address = server_cash_address();
        ledger.add_utxo(&address, utxo(1, 0, 1_000_000));
        ledger.mark_token_transaction(Txid::new([1; 32]));

        let inventory = StampInventory::new(&ledger, WEIGHT);
        assert!(matches!(
            inventory.select_funding_inputs(&address),
            Err(PostageError::InsufficientBalance { minimum: 730 })
        ));
    }

    #[test]
    fn test_funding_inputs_insufficient_balance() {
        let ledger = MemoryLedger::new();
        let address = server_cash_address();
        ledger.add_utxo(&address, utxo(1, 0, 546));

        let inventory = StampInventory::new(&ledger, WEIGHT);
        assert!(matches!(
            inventory.select_funding_inputs(&address),
            Err(PostageError::InsufficientBalance { minimum: 730 })
        ));
    }

    proptest! {
        #[test]
        fn test_never_selects_token_outputs(
            tokens in proptest::collection::vec(any::<bool>(), 0..24),
            needed in 0usize..24,
        ) {
            let ledger = MemoryLedger::new();
            let address = server_cash_address();
            for (i, is_token) in tokens.iter().enumerate() {
                let utxo = utxo(i as u8, 0, 546);
                ledger.add_utxo(&address, utxo);
                if *is_token {
                    ledger.mark_token_transaction(utxo.txid);
                }
            }
            let bare = tokens.iter().filter(|is_token| !**is_token).count();

            let inventory = StampInventory::new(&ledger, WEIGHT);
            match inventory.select_stamps(needed, &address) {
                Ok(batch) => {
                    prop_assert_eq!(batch.len(), needed);
                    for stamp in &batch {
                        prop_assert!(!tokens[stamp.txid.as_b256()[0] as usize]);
                    }
                }
                Err(PostageError::UnavailableStamps { available, .. }) => {
                    prop_assert!(bare < needed);
                    prop_assert_eq!(available, bare);
                }
                Err(other) => prop_assert!(false, "unexpected error {other}"),
            }
        }

        #[test]
        fn test_funding_never_spends_token_outputs(
            outputs in proptest::collection::vec((any::<bool>(), 1u64..10_000), 0..24),
        ) {
            let ledger = MemoryLedger::new();
            let address = server_cash_address();
            for (i, (is_token, value)) in outputs.iter().enumerate() {
                let utxo = utxo(i as u8, 0, *value);
                ledger.add_utxo(&address, utxo);
                if *is_token {
                    ledger.mark_token_transaction(utxo.txid);
                }
            }
            let eligible = outputs
                .iter()
                .filter(|(is_token, value)| !is_token && *value > 2 * WEIGHT)
                .count();

            let inventory = StampInventory::new(&ledger, WEIGHT);
            match inventory.select_funding_inputs(&address) {
                Ok(funding) => {
                    prop_assert_eq!(funding.len(), eligible);
                    for input in &funding {
                        let (is_token, value) = outputs[input.txid.as_b256()[0] as usize];
                        prop_assert!(!is_token);
                        prop_assert!(value > 2 * WEIGHT);
                    }
                }
                Err(PostageError::InsufficientBalance { minimum }) => {
                    prop_assert_eq!(eligible, 0);
                    prop_assert_eq!(minimum, 2 * WEIGHT);
                }
                Err(other) => prop_assert!(false, "unexpected error {other}"),
            }
        }
    }
}
