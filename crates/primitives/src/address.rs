//! CashAddr address implementation
//!
//! This module provides the [`CashAddress`] type, the human-readable form of
//! a P2PKH or P2SH locking script. The same payload can be written with a
//! Bitcoin Cash prefix (`bitcoincash:`) or an SLP prefix (`simpleledger:`);
//! [`CashAddress::same_destination`] compares addresses by payload only.
//!
//! ## Example Usage
//!
//! ```
//! use post_office_primitives::{CashAddress, Script};
//!
//! let address: CashAddress = "bitcoincash:qpm2qsznhks23z7629mms6s4cwef74vcwvy22gdx6a"
//!     .parse()
//!     .unwrap();
//!
//! // The locking script paying this address
//! let script = address.to_script();
//! assert_eq!(CashAddress::from_script(&script, "bitcoincash").unwrap(), address);
//!
//! // The same destination in SLP form
//! let slp = address.with_prefix("simpleledger");
//! assert!(slp.same_destination(&address));
//! ```

use std::fmt;
use std::str::FromStr;

use crate::error::AddressError;
use crate::hash::Hash160;
use crate::script::Script;

const CHARSET: &[u8; 32] = b"qpzry9x8gf2tvdw0s3jn54khce6mua7l";

/// Number of 5-bit groups in the checksum.
const CHECKSUM_LEN: usize = 8;

/// The kind of script an address pays to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressKind {
    /// Pay to public key hash.
    P2pkh,
    /// Pay to script hash.
    P2sh,
}

impl AddressKind {
    #[inline]
    const fn version_byte(self) -> u8 {
        // size bits 0 = 160-bit hash
        match self {
            Self::P2pkh => 0x00,
            Self::P2sh => 0x08,
        }
    }
}

/// A CashAddr-encoded destination.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CashAddress {
    prefix: String,
    kind: AddressKind,
    hash: Hash160,
}

impl CashAddress {
    /// Creates an address from its parts. The prefix is stored lowercase.
    pub fn new(prefix: &str, kind: AddressKind, hash: Hash160) -> Self {
        Self {
            prefix: prefix.to_ascii_lowercase(),
            kind,
            hash,
        }
    }

    /// Creates a P2PKH address.
    #[inline]
    pub fn p2pkh(prefix: &str, hash: Hash160) -> Self {
        Self::new(prefix, AddressKind::P2pkh, hash)
    }

    /// Reads the destination of a locking script.
    ///
    /// # Errors
    ///
    /// Returns [`AddressError::NonStandardScript`] for anything but P2PKH and P2SH.
    pub fn from_script(script: &Script, prefix: &str) -> Result<Self, AddressError> {
        if let Some(hash) = script.p2pkh_hash() {
            Ok(Self::new(prefix, AddressKind::P2pkh, hash))
        } else if let Some(hash) = script.p2sh_hash() {
            Ok(Self::new(prefix, AddressKind::P2sh, hash))
        } else {
            Err(AddressError::NonStandardScript)
        }
    }

    /// Returns the locking script paying this address.
    pub fn to_script(&self) -> Script {
        match self.kind {
            AddressKind::P2pkh => Script::p2pkh(&self.hash),
            AddressKind::P2sh => Script::p2sh(&self.hash),
        }
    }

    /// Returns the same destination under another prefix.
    pub fn with_prefix(&self, prefix: &str) -> Self {
        Self::new(prefix, self.kind, self.hash)
    }

    /// Returns `true` if both addresses pay the same script, whatever their prefixes.
    #[inline]
    pub fn same_destination(&self, other: &Self) -> bool {
        self.kind == other.kind && self.hash == other.hash
    }

    /// Returns the prefix.
    #[inline]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Returns the address kind.
    #[inline]
    pub const fn kind(&self) -> AddressKind {
        self.kind
    }

    /// Returns the 20-byte hash.
    #[inline]
    pub const fn hash(&self) -> &Hash160 {
        &self.hash
    }
}

impl fmt::Display for CashAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut raw = Vec::with_capacity(21);
        raw.push(self.kind.version_byte());
        raw.extend_from_slice(&self.hash);
        let payload = convert_bits(&raw, 8, 5, true).ok_or(fmt::Error)?;

        let checksum = polymod_checksum(&self.prefix, &payload);

        f.write_str(&self.prefix)?;
        f.write_str(":")?;
        for group in payload.iter().chain(checksum.iter()) {
            write!(f, "{}", CHARSET[*group as usize] as char)?;
        }
        Ok(())
    }
}

impl FromStr for CashAddress {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let has_lower = s.chars().any(|c| c.is_ascii_lowercase());
        let has_upper = s.chars().any(|c| c.is_ascii_uppercase());
        if has_lower && has_upper {
            return Err(AddressError::MixedCase);
        }
        let s = s.to_ascii_lowercase();

        let (prefix, body) = s.split_once(':').ok_or(AddressError::MissingPrefix)?;
        if prefix.is_empty() {
            return Err(AddressError::MissingPrefix);
        }

        let groups = body
            .chars()
            .map(|c| {
                CHARSET
                    .iter()
                    .position(|&x| x as char == c)
                    .map(|p| p as u8)
                    .ok_or(AddressError::InvalidCharacter(c))
            })
            .collect::<Result<Vec<u8>, _>>()?;

        if groups.len() <= CHECKSUM_LEN {
            return Err(AddressError::InvalidLength(groups.len()));
        }

        if polymod(&checksum_input(prefix, &groups)) != 0 {
            return Err(AddressError::InvalidChecksum);
        }

        let payload = &groups[..groups.len() - CHECKSUM_LEN];
        let raw = convert_bits(payload, 5, 8, false)
            .ok_or(AddressError::InvalidLength(payload.len()))?;

        let (version, hash) = raw
            .split_first()
            .ok_or(AddressError::InvalidLength(0))?;
        let kind = match version {
            0x00 => AddressKind::P2pkh,
            0x08 => AddressKind::P2sh,
            other => return Err(AddressError::UnsupportedVersion(*other)),
        };
        let hash: Hash160 = hash
            .try_into()
            .map_err(|_| AddressError::InvalidLength(hash.len()))?;

        Ok(Self::new(prefix, kind, hash))
    }
}

/// The BCH-code checksum over the prefix and payload.
fn polymod(values: &[u8]) -> u64 {
    let mut c: u64 = 1;
    for &d in values {
        let c0 = (c >> 35) as u8;
        c = ((c & 0x07_ffff_ffff) << 5) ^ d as u64;
        if c0 & 0x01 != 0 {
            c ^= 0x98_f2bc_8e61;
        }
        if c0 & 0x02 != 0 {
            c ^= 0x79_b76d_99e2;
        }
        if c0 & 0x04 != 0 {
            c ^= 0xf3_3e5f_b3c4;
        }
        if c0 & 0x08 != 0 {
            c ^= 0xae_2eab_e2a8;
        }
        if c0 & 0x10 != 0 {
            c ^= 0x1e_4f43_e470;
        }
    }
    c ^ 1
}

/// Lower five bits of each prefix character, a zero separator, then `groups`.
fn checksum_input(prefix: &str, groups: &[u8]) -> Vec<u8> {
    prefix
        .bytes()
        .map(|b| b & 0x1f)
        .chain(std::iter::once(0))
        .chain(groups.iter().copied())
        .collect()
}

fn polymod_checksum(prefix: &str, payload: &[u8]) -> [u8; CHECKSUM_LEN] {
    let mut input = checksum_input(prefix, payload);
    input.extend_from_slice(&[0; CHECKSUM_LEN]);
    let value = polymod(&input);

    let mut checksum = [0u8; CHECKSUM_LEN];
    for (i, group) in checksum.iter_mut().enumerate() {
        *group = ((value >> (5 * (CHECKSUM_LEN - 1 - i))) & 0x1f) as u8;
    }
    checksum
}

/// Regroups bits. Without padding, leftover bits must be zero and fewer than `from`.
fn convert_bits(data: &[u8], from: u32, to: u32, pad: bool) -> Option<Vec<u8>> {
    let mut acc: u32 = 0;
    let mut bits: u32 = 0;
    let max = (1u32 << to) - 1;
    let mut out = Vec::with_capacity(data.len() * from as usize / to as usize + 1);

    for &value in data {
        if (value as u32) >> from != 0 {
            return None;
        }
        acc = (acc << from) | value as u32;
        bits += from;
        while bits >= to {
            bits -= to;
            out.push(((acc >> bits) & max) as u8);
        }
    }

    if pad {
        if bits > 0 {
            out.push(((acc << (to - bits)) & max) as u8);
        }
    } else if bits >= from || ((acc << (to - bits)) & max) != 0 {
        return None;
    }

    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::hex;
    use proptest::prelude::*;

    const HASH: [u8; 20] = hex!("76a04053bda0a88bda5177b86a15c3b29f559873");

    #[test]
    fn test_encode_p2pkh() {
        let address = CashAddress::p2pkh("bitcoincash", HASH);
        assert_eq!(
            address.to_string(),
            "bitcoincash:qpm2qsznhks23z7629mms6s4cwef74vcwvy22gdx6a"
        );
    }

    #[test]
    fn test_encode_p2sh() {
        let address = CashAddress::new("bitcoincash", AddressKind::P2sh, HASH);
        assert_eq!(
            address.to_string(),
            "bitcoincash:ppm2qsznhks23z7629mms6s4cwef74vcwvn0h829pq"
        );
    }

    #[test]
    fn test_decode_slp_address() {
        let address: CashAddress = "simpleledger:qz27uwddwgczpkvg0eqnyemlaqnlax75vuqte26mpx"
            .parse()
            .unwrap();
        assert_eq!(address.prefix(), "simpleledger");
        assert_eq!(address.kind(), AddressKind::P2pkh);
        assert_eq!(address.hash(), &hex!("95ee39ad723020d9887e4132677fe827fe9bd467"));
        assert_eq!(
            address.with_prefix("bitcoincash").to_string(),
            "bitcoincash:qz27uwddwgczpkvg0eqnyemlaqnlax75vuvsj30mlc"
        );
    }

    #[test]
    fn test_decode_uppercase() {
        let address: CashAddress = "BITCOINCASH:QPM2QSZNHKS23Z7629MMS6S4CWEF74VCWVY22GDX6A"
            .parse()
            .unwrap();
        assert_eq!(address, CashAddress::p2pkh("bitcoincash", HASH));
    }

    #[test]
    fn test_decode_errors() {
        assert_eq!(
            "qpm2qsznhks23z7629mms6s4cwef74vcwvy22gdx6a".parse::<CashAddress>(),
            Err(AddressError::MissingPrefix)
        );
        assert_eq!(
            "bitcoincash:Qpm2qsznhks23z7629mms6s4cwef74vcwvy22gdx6a".parse::<CashAddress>(),
            Err(AddressError::MixedCase)
        );
        assert_eq!(
            "bitcoincash:qpm2qsznhks23z7629mms6s4cwef74vcwvy22gdx6q".parse::<CashAddress>(),
            Err(AddressError::InvalidChecksum)
        );
        assert_eq!(
            "bitcoincash:qpm2qsznhks23z7629mms6s4cwef74vcwvy22gdx6o".parse::<CashAddress>(),
            Err(AddressError::InvalidCharacter('o'))
        );
        // right checksum, wrong prefix
        assert_eq!(
            "simpleledger:qpm2qsznhks23z7629mms6s4cwef74vcwvy22gdx6a".parse::<CashAddress>(),
            Err(AddressError::InvalidChecksum)
        );
    }

    #[test]
    fn test_from_script() {
        let script = Script::p2pkh(&HASH);
        let address = CashAddress::from_script(&script, "simpleledger").unwrap();
        assert!(address.same_destination(&CashAddress::p2pkh("bitcoincash", HASH)));
        assert_eq!(address.to_script(), script);

        let op_return = Script::new(vec![Script::OP_RETURN]);
        assert_eq!(
            CashAddress::from_script(&op_return, "bitcoincash"),
            Err(AddressError::NonStandardScript)
        );
    }

    #[test]
    fn test_same_destination_checks_kind() {
        let p2pkh = CashAddress::p2pkh("bitcoincash", HASH);
        let p2sh = CashAddress::new("bitcoincash", AddressKind::P2sh, HASH);
        assert!(!p2pkh.same_destination(&p2sh));
    }

    proptest! {
        #[test]
        fn test_address_string_roundtrip(hash in any::<[u8; 20]>(), p2sh in any::<bool>()) {
            let kind = if p2sh { AddressKind::P2sh } else { AddressKind::P2pkh };
            let address = CashAddress::new("bchtest", kind, hash);
            let parsed: CashAddress = address.to_string().parse().unwrap();
            prop_assert_eq!(parsed, address);
        }
    }
}
