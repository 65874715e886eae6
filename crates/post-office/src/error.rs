//! Error types for loading the service configuration.

use post_office_postage::PostageError;
use post_office_signer::SignerError;
use thiserror::Error;

/// Errors that can occur while loading or applying the configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A configuration source could not be read or deserialized.
    #[error(transparent)]
    Source(#[from] config::ConfigError),

    /// The postage rate is unusable.
    #[error("invalid postage rate: {0}")]
    PostageRate(#[source] PostageError),

    /// The mnemonic does not yield a signing key.
    #[error("invalid signing key: {0}")]
    Signer(#[from] SignerError),
}
