//! Service settings.
//!
//! Settings are read from an optional `post-office.{toml,json}` file and then
//! from `POST_OFFICE_*` environment variables, nested keys separated by `__`:
//!
//! ```text
//! POST_OFFICE_NETWORK=mainnet
//! POST_OFFICE_MNEMONIC="..."
//! POST_OFFICE_POSTAGE_RATE__WEIGHT=365
//! ```

use std::fmt;
use std::time::Duration;

use config::builder::DefaultState;
use config::{ConfigBuilder, Environment, File};
use post_office_networks::NamedNetwork;
use post_office_postage::PostageRate;
use post_office_signer::LocalSigner;
use serde::Deserialize;

use crate::ConfigError;

/// Default file name, without extension.
pub const CONFIG_FILE: &str = "post-office";

/// Prefix of environment overrides.
pub const ENV_PREFIX: &str = "POST_OFFICE";

/// Everything the post office needs to run. Immutable once loaded.
#[derive(Clone, Deserialize)]
pub struct PostOfficeConfig {
    /// Network the post office spends on.
    pub network: NamedNetwork,

    /// BIP-39 phrase of the post office key.
    pub mnemonic: String,

    /// The price list published to wallets.
    pub postage_rate: PostageRate,

    /// Seconds between stamp replenishment cycles.
    #[serde(default = "defaults::replenish_interval")]
    pub replenish_interval: u64,

    /// Whether stamp transactions are broadcast, or only built.
    #[serde(default = "defaults::broadcast")]
    pub broadcast: bool,
}

impl PostOfficeConfig {
    /// Loads the configuration from `post-office.*` and the environment.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::Source`] if a source is malformed or a required key is missing
    /// - [`ConfigError::PostageRate`] if the postage rate does not validate
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(CONFIG_FILE)
    }

    /// Loads the configuration from the file `name` (any supported extension,
    /// optional) and the environment.
    ///
    /// # Errors
    ///
    /// See [`PostOfficeConfig::load`].
    pub fn load_from(name: &str) -> Result<Self, ConfigError> {
        Self::from_builder(
            config::Config::builder()
                .add_source(File::with_name(name).required(false))
                .add_source(environment()),
        )
    }

    /// Builds the configuration from an assembled set of sources.
    ///
    /// # Errors
    ///
    /// See [`PostOfficeConfig::load`].
    pub fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self, ConfigError> {
        let config: Self = builder.build()?.try_deserialize()?;
        config.postage_rate.validate().map_err(ConfigError::PostageRate)?;
        Ok(config)
    }

    /// Returns the time between replenishment cycles.
    #[inline]
    pub const fn replenish_period(&self) -> Duration {
        Duration::from_secs(self.replenish_interval)
    }

    /// Derives the post office signer from the mnemonic.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Signer`] if the mnemonic is invalid.
    pub fn signer(&self) -> Result<LocalSigner, ConfigError> {
        Ok(LocalSigner::from_mnemonic(&self.mnemonic, self.network)?)
    }
}

impl fmt::Debug for PostOfficeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PostOfficeConfig")
            .field("network", &self.network)
            .field("mnemonic", &"<redacted>")
            .field("postage_rate", &self.postage_rate)
            .field("replenish_interval", &self.replenish_interval)
            .field("broadcast", &self.broadcast)
            .finish()
    }
}

/// The environment source: `POST_OFFICE_` prefix, `__` between nested keys.
pub fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}

mod defaults {
    pub(super) const fn replenish_interval() -> u64 {
        30 * 60
    }

    pub(super) const fn broadcast() -> bool {
        true
    }
}
