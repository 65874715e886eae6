//! Canonical type definitions for Bitcoin Cash networks.
//!
//! A post office serves exactly one network. The network decides which
//! CashAddr prefixes its addresses carry, both for plain Bitcoin Cash
//! addresses and for the SLP token form.
//!
//! # Features
//!
//! - `std` (default): Enable standard library support
//! - `serde`: Enable serde serialization/deserialization

#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![cfg_attr(not(feature = "std"), no_std)]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

mod named;

pub use named::NamedNetwork;
