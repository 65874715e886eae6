//! The replenishment workflow: splitting large outputs into new stamps.

use std::sync::Arc;
use std::time::Duration;

use post_office_postage::{
    InputSigner, Ledger, PostageError, PostageRate, StampGenerator, StampInventory,
};
use post_office_primitives::{Transaction, Txid};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

/// Keeps the post office supplied with stamps.
///
/// A cycle gathers every bare output of the post office address worth more
/// than twice the stamp weight and spends them into stamp-sized outputs plus
/// change. Outputs of token transactions are left alone, so token postage
/// received at the address is never burned by a split. Cycles run one at a time; a slow cycle delays the next tick rather
/// than overlapping it.
#[derive(Debug)]
pub struct Replenisher<L, S> {
    inventory: StampInventory<L>,
    generator: StampGenerator,
    signer: S,
    broadcast: bool,
}

impl<L: Ledger, S: InputSigner> Replenisher<L, S> {
    /// Creates a replenisher minting stamps for `rate`.
    ///
    /// With `broadcast` off, cycles build and sign the split but never submit it.
    pub fn new(rate: &PostageRate, ledger: L, signer: S, broadcast: bool) -> Self {
        Self {
            inventory: StampInventory::new(ledger, rate.weight),
            generator: StampGenerator::new(rate.stamp_value()),
            signer,
            broadcast,
        }
    }

    /// Runs one replenishment cycle, returning the split transaction.
    ///
    /// # Errors
    ///
    /// - [`PostageError::InsufficientBalance`] if no bare output is worth splitting
    /// - [`PostageError::Ledger`] if the ledger fails or rejects the broadcast
    /// - [`PostageError::Signing`] if an input cannot be signed
    pub fn run_cycle(&self) -> Result<Transaction, PostageError> {
        let address = self.signer.address();
        let funding = self.inventory.select_funding_inputs(&address)?;
        let transaction = self.generator.split_into_stamps(&funding, &self.signer)?;

        if self.broadcast {
            let txid: Txid = self
                .inventory
                .ledger()
                .broadcast(&transaction.encode())
                .map_err(PostageError::ledger)?;
            info!(%txid, %address, outputs = transaction.outputs.len(), "broadcast stamp split");
        } else {
            debug!(txid = %transaction.txid(), "stamp split built, broadcast disabled");
        }
        Ok(transaction)
    }
}

impl<L, S> Replenisher<L, S>
where
    L: Ledger + Send + Sync + 'static,
    S: InputSigner + Send + Sync + 'static,
{
    /// Runs a cycle now and then every `period` on the current tokio runtime.
    ///
    /// Cycles run on the blocking pool since the ledger and signer are
    /// blocking clients. Failed cycles are logged and the timer keeps going;
    /// abort the returned handle to stop.
    pub fn spawn(self: Arc<Self>, period: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                interval.tick().await;

                let replenisher = Arc::clone(&self);
                match tokio::task::spawn_blocking(move || replenisher.run_cycle()).await {
                    Ok(Ok(_)) => {}
                    Ok(Err(err @ PostageError::InsufficientBalance { .. })) => {
                        warn!(%err, "nothing to split into stamps");
                    }
                    Ok(Err(err)) => warn!(%err, "stamp replenishment failed"),
                    Err(err) => error!(%err, "stamp replenishment task panicked"),
                }
            }
        })
    }
}
