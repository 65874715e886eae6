//! Replay-protected signature hashes.
//!
//! Bitcoin Cash signs a digest that commits to the value of the output being
//! spent (the BIP-143 layout) and requires the `SIGHASH_FORKID` flag on every
//! signature. The digest produced here is what gets handed to ECDSA.

use std::io::Write;

use alloy_primitives::B256;
use byteorder::{LittleEndian, WriteBytesExt};

use crate::encode::write_var_bytes;
use crate::error::{PrimitivesError, Result};
use crate::hash::sha256d;
use crate::script::Script;
use crate::transaction::{Transaction, write_outpoint, write_output};

/// A signature hash type byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SighashType(u32);

impl SighashType {
    /// Commit to all inputs and outputs.
    pub const ALL: u32 = 0x01;
    /// Commit to no outputs.
    pub const NONE: u32 = 0x02;
    /// Commit to the output with the same index as the input.
    pub const SINGLE: u32 = 0x03;
    /// Replay-protection flag, mandatory on Bitcoin Cash.
    pub const FORKID: u32 = 0x40;
    /// Commit to the signed input only.
    pub const ANYONECANPAY: u32 = 0x80;

    /// `SIGHASH_ALL | SIGHASH_FORKID`, the mode used for every post office signature.
    pub const ALL_FORKID: Self = Self(Self::ALL | Self::FORKID);

    /// Creates a hash type from its raw value.
    #[inline]
    pub const fn from_u32(raw: u32) -> Self {
        Self(raw)
    }

    /// Returns the raw value committed into the digest (fork id 0).
    #[inline]
    pub const fn to_u32(self) -> u32 {
        self.0
    }

    /// Returns the byte appended to a DER signature.
    #[inline]
    pub const fn to_byte(self) -> u8 {
        self.0 as u8
    }

    #[inline]
    const fn base(self) -> u32 {
        self.0 & 0x1f
    }

    #[inline]
    const fn anyone_can_pay(self) -> bool {
        self.0 & Self::ANYONECANPAY != 0
    }
}

impl Default for SighashType {
    fn default() -> Self {
        Self::ALL_FORKID
    }
}

impl Transaction {
    /// Computes the digest signed for input `index`.
    ///
    /// # Arguments
    ///
    /// * `index` - The input being signed
    /// * `script_code` - The locking script of the output being spent
    /// * `value` - The value of the output being spent
    /// * `sighash_type` - Which parts of the transaction the signature covers
    ///
    /// # Errors
    ///
    /// Returns [`PrimitivesError::InputIndex`] if `index` is not an input of this transaction.
    pub fn signature_hash(
        &self,
        index: usize,
        script_code: &Script,
        value: u64,
        sighash_type: SighashType,
    ) -> Result<B256> {
        let input = self.inputs.get(index).ok_or(PrimitivesError::InputIndex {
            index,
            inputs: self.inputs.len(),
        })?;

        let base = sighash_type.base();
        let anyone_can_pay = sighash_type.anyone_can_pay();

        let hash_prevouts = if anyone_can_pay {
            B256::ZERO
        } else {
            let mut buf = Vec::with_capacity(36 * self.inputs.len());
            for input in &self.inputs {
                write_outpoint(&mut buf, &input.previous_output)?;
            }
            sha256d(&buf)
        };

        let hash_sequence =
            if anyone_can_pay || base == SighashType::SINGLE || base == SighashType::NONE {
                B256::ZERO
            } else {
                let mut buf = Vec::with_capacity(4 * self.inputs.len());
                for input in &self.inputs {
                    buf.write_u32::<LittleEndian>(input.sequence)?;
                }
                sha256d(&buf)
            };

        let hash_outputs = if base != SighashType::SINGLE && base != SighashType::NONE {
            let mut buf = Vec::new();
            for output in &self.outputs {
                write_output(&mut buf, output)?;
            }
            sha256d(&buf)
        } else if base == SighashType::SINGLE && index < self.outputs.len() {
            let mut buf = Vec::new();
            write_output(&mut buf, &self.outputs[index])?;
            sha256d(&buf)
        } else {
            B256::ZERO
        };

        let mut preimage = Vec::with_capacity(160 + script_code.len());
        preimage.write_i32::<LittleEndian>(self.version)?;
        preimage.write_all(hash_prevouts.as_slice())?;
        preimage.write_all(hash_sequence.as_slice())?;
        write_outpoint(&mut preimage, &input.previous_output)?;
        write_var_bytes(&mut preimage, script_code.as_bytes())?;
        preimage.write_u64::<LittleEndian>(value)?;
        preimage.write_u32::<LittleEndian>(input.sequence)?;
        preimage.write_all(hash_outputs.as_slice())?;
        preimage.write_u32::<LittleEndian>(self.lock_time)?;
        preimage.write_u32::<LittleEndian>(sighash_type.to_u32())?;

        Ok(sha256d(&preimage))
    }
}
