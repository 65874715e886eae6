//! In-memory ledger for tests and local development.

use std::collections::{HashMap, HashSet};

use parking_lot::RwLock;
use post_office_primitives::{CashAddress, OutPoint, PrimitivesError, Script, Transaction, Txid};
use thiserror::Error;
use tracing::debug;

use crate::{Ledger, SlpMetadata, TokenValidity, UnspentOutput};

/// Errors returned by [`MemoryLedger`].
#[derive(Debug, Error)]
pub enum MemoryLedgerError {
    /// The broadcast bytes are not a transaction.
    #[error("undecodable transaction: {0}")]
    Decode(#[from] PrimitivesError),

    /// An input spends an output already spent by an earlier broadcast.
    #[error("double spend of {0}")]
    DoubleSpend(OutPoint),
}

#[derive(Debug, Default)]
struct State {
    utxos: HashMap<Script, Vec<UnspentOutput>>,
    token_txids: HashSet<Txid>,
    spent: HashSet<OutPoint>,
    broadcasts: Vec<Transaction>,
}

/// A ledger held in memory.
///
/// Broadcasting a transaction spends its inputs, credits its outputs to their
/// addresses as unconfirmed outputs and, if it carries an SLP message, marks
/// it as a token transaction. Spending an output twice is rejected.
#[derive(Debug, Default)]
pub struct MemoryLedger {
    state: RwLock<State>,
}

impl MemoryLedger {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Credits an unspent output to `address`.
    pub fn add_utxo(&self, address: &CashAddress, utxo: UnspentOutput) {
        self.state
            .write()
            .utxos
            .entry(address.to_script())
            .or_default()
            .push(utxo);
    }

    /// Marks `txid` as a valid token transaction.
    pub fn mark_token_transaction(&self, txid: Txid) {
        self.state.write().token_txids.insert(txid);
    }

    /// Returns the number of unspent outputs paying `address`.
    pub fn utxo_count(&self, address: &CashAddress) -> usize {
        self.state
            .read()
            .utxos
            .get(&address.to_script())
            .map_or(0, Vec::len)
    }

    /// Returns every transaction broadcast so far, oldest first.
    pub fn broadcasts(&self) -> Vec<Transaction> {
        self.state.read().broadcasts.clone()
    }
}

impl Ledger for MemoryLedger {
    type Error = MemoryLedgerError;

    fn fetch_utxos(&self, address: &CashAddress) -> Result<Vec<UnspentOutput>, Self::Error> {
        Ok(self
            .state
            .read()
            .utxos
            .get(&address.to_script())
            .cloned()
            .unwrap_or_default())
    }

    fn check_token_validity(&self, txids: &[Txid]) -> Result<Vec<TokenValidity>, Self::Error> {
        let state = self.state.read();
        Ok(txids
            .iter()
            .map(|txid| TokenValidity {
                txid: *txid,
                valid: state.token_txids.contains(txid),
            })
            .collect())
    }

    fn broadcast(&self, transaction: &[u8]) -> Result<Txid, Self::Error> {
        let tx = Transaction::decode(transaction)?;
        let txid = tx.txid();

        let mut state = self.state.write();
        if let Some(input) = tx
            .inputs
            .iter()
            .find(|input| state.spent.contains(&input.previous_output))
        {
            return Err(MemoryLedgerError::DoubleSpend(input.previous_output));
        }

        for input in &tx.inputs {
            state.spent.insert(input.previous_output);
            for utxos in state.utxos.values_mut() {
                utxos.retain(|utxo| utxo.outpoint() != input.previous_output);
            }
        }

        for (vout, output) in tx.outputs.iter().enumerate() {
            let script = &output.script_pubkey;
            if script.p2pkh_hash().is_none() && script.p2sh_hash().is_none() {
                continue;
            }
            state
                .utxos
                .entry(output.script_pubkey.clone())
                .or_default()
                .push(UnspentOutput::new(txid, vout as u32, output.value, 0));
        }

        if SlpMetadata::parse(&tx.outputs).is_ok() {
            state.token_txids.insert(txid);
        }

        debug!(%txid, inputs = tx.inputs.len(), outputs = tx.outputs.len(), "memory ledger accepted transaction");
        state.broadcasts.push(tx);
        Ok(txid)
    }
}
