//! The post office service.
//!
//! Wallets holding only SLP tokens hand the post office a signed token
//! transfer that pays it in tokens; the post office appends and signs inputs
//! spending its own small outputs, called stamps, so that the transfer can
//! pay its network fee. A timer keeps the stamp supply topped up by splitting
//! larger outputs.
//!
//! # Running
//!
//! ```ignore
//! use std::sync::Arc;
//! use post_office::{PostOffice, PostOfficeConfig, Replenisher};
//!
//! let config = PostOfficeConfig::load()?;
//! let signer = Arc::new(config.signer()?);
//! let ledger = Arc::new(my_ledger_client);
//!
//! let replenisher = Replenisher::new(
//!     &config.postage_rate,
//!     Arc::clone(&ledger),
//!     Arc::clone(&signer),
//!     config.broadcast,
//! );
//! Arc::new(replenisher).spawn(config.replenish_period());
//!
//! let office = PostOffice::new(Arc::new(config.postage_rate.clone()), ledger, signer)?;
//! let txid = office.stamp_and_broadcast(&raw_transaction)?;
//! ```

#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

mod error;
mod office;
mod replenish;
mod settings;

#[cfg(test)]
mod test_utils;

pub use error::ConfigError;
pub use office::PostOffice;
pub use replenish::Replenisher;
pub use settings::{CONFIG_FILE, ENV_PREFIX, PostOfficeConfig, environment};

pub use post_office_postage as postage;
pub use post_office_signer as signer;
