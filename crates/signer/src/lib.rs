//! Key signing for the post office.
//!
//! The post office spends outputs of a single key: the master key of a BIP-39
//! mnemonic. [`LocalSigner`] derives that key and implements
//! [`InputSigner`](post_office_postage::InputSigner), producing P2PKH
//! unlocking scripts with `SIGHASH_ALL | SIGHASH_FORKID` signatures.
//!
//! # Example
//!
//! ```
//! use post_office_networks::NamedNetwork;
//! use post_office_signer::LocalSigner;
//! use post_office_postage::InputSigner;
//!
//! let phrase = "abandon abandon abandon abandon abandon abandon \
//!               abandon abandon abandon abandon abandon about";
//! let signer = LocalSigner::from_mnemonic(phrase, NamedNetwork::Mainnet)?;
//! assert_eq!(
//!     signer.address().to_string(),
//!     "bitcoincash:qpeutks2q0fdpqpmwv0sgfptksxw6tuthsuk36jgqx"
//! );
//! # Ok::<(), post_office_signer::SignerError>(())
//! ```

#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

mod error;
mod local;

pub use error::SignerError;
pub use local::LocalSigner;
