//! Locking and unlocking scripts.
//!
//! A [`Script`] is kept as raw bytes. [`Script::tokens`] splits it into
//! [`ScriptToken`]s, which is what the SLP metadata reader works on: every
//! push, however it was encoded, becomes a single `Push` token and every other
//! opcode becomes an `Op` token.
//!
//! ```
//! use post_office_primitives::{Script, ScriptToken};
//!
//! let script = Script::builder()
//!     .op(Script::OP_RETURN)
//!     .push(b"SLP\0")
//!     .into_script();
//!
//! let tokens = script.tokens().unwrap();
//! assert_eq!(tokens[0], ScriptToken::Op(Script::OP_RETURN));
//! assert_eq!(tokens[1].data(), Some(&b"SLP\0"[..]));
//! ```

use std::fmt;

use alloy_primitives::hex;
use bytes::Bytes;

use crate::error::ScriptError;
use crate::hash::Hash160;

/// A single element of a decoded script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptToken {
    /// A non-push opcode.
    Op(u8),
    /// Pushed data. `OP_0` decodes to an empty push.
    Push(Bytes),
}

impl ScriptToken {
    /// Returns the pushed bytes, or `None` for an opcode.
    #[inline]
    pub fn data(&self) -> Option<&[u8]> {
        match self {
            Self::Push(data) => Some(data),
            Self::Op(_) => None,
        }
    }

    /// Returns `true` if this token is the given opcode.
    #[inline]
    pub const fn is_op(&self, op: u8) -> bool {
        matches!(self, Self::Op(o) if *o == op)
    }
}

/// A Bitcoin Cash script.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Script(Vec<u8>);

impl Script {
    /// `OP_0`, pushes an empty array.
    pub const OP_0: u8 = 0x00;
    /// `OP_PUSHDATA1`
    pub const OP_PUSHDATA1: u8 = 0x4c;
    /// `OP_PUSHDATA2`
    pub const OP_PUSHDATA2: u8 = 0x4d;
    /// `OP_PUSHDATA4`
    pub const OP_PUSHDATA4: u8 = 0x4e;
    /// `OP_1`
    pub const OP_1: u8 = 0x51;
    /// `OP_RETURN`, marks an output as provably unspendable.
    pub const OP_RETURN: u8 = 0x6a;
    /// `OP_DUP`
    pub const OP_DUP: u8 = 0x76;
    /// `OP_EQUAL`
    pub const OP_EQUAL: u8 = 0x87;
    /// `OP_EQUALVERIFY`
    pub const OP_EQUALVERIFY: u8 = 0x88;
    /// `OP_HASH160`
    pub const OP_HASH160: u8 = 0xa9;
    /// `OP_CHECKSIG`
    pub const OP_CHECKSIG: u8 = 0xac;

    /// Creates a script from raw bytes.
    #[inline]
    pub const fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// Creates an empty script.
    #[inline]
    pub const fn empty() -> Self {
        Self(Vec::new())
    }

    /// Starts building a script.
    #[inline]
    pub fn builder() -> ScriptBuilder {
        ScriptBuilder::default()
    }

    /// `OP_DUP OP_HASH160 <hash> OP_EQUALVERIFY OP_CHECKSIG`
    pub fn p2pkh(hash: &Hash160) -> Self {
        let mut bytes = Vec::with_capacity(25);
        bytes.extend_from_slice(&[Self::OP_DUP, Self::OP_HASH160, 20]);
        bytes.extend_from_slice(hash);
        bytes.extend_from_slice(&[Self::OP_EQUALVERIFY, Self::OP_CHECKSIG]);
        Self(bytes)
    }

    /// `OP_HASH160 <hash> OP_EQUAL`
    pub fn p2sh(hash: &Hash160) -> Self {
        let mut bytes = Vec::with_capacity(23);
        bytes.extend_from_slice(&[Self::OP_HASH160, 20]);
        bytes.extend_from_slice(hash);
        bytes.push(Self::OP_EQUAL);
        Self(bytes)
    }

    /// `OP_RETURN` followed by minimal pushes of each item.
    pub fn op_return<I, T>(pushes: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: AsRef<[u8]>,
    {
        pushes
            .into_iter()
            .fold(Self::builder().op(Self::OP_RETURN), |builder, data| {
                builder.push(data.as_ref())
            })
            .into_script()
    }

    /// Returns the pubkey hash if this is a P2PKH script.
    pub fn p2pkh_hash(&self) -> Option<Hash160> {
        match self.0.as_slice() {
            [Self::OP_DUP, Self::OP_HASH160, 20, hash @ .., Self::OP_EQUALVERIFY, Self::OP_CHECKSIG]
                if hash.len() == 20 =>
            {
                hash.try_into().ok()
            }
            _ => None,
        }
    }

    /// Returns the script hash if this is a P2SH script.
    pub fn p2sh_hash(&self) -> Option<Hash160> {
        match self.0.as_slice() {
            [Self::OP_HASH160, 20, hash @ .., Self::OP_EQUAL] if hash.len() == 20 => {
                hash.try_into().ok()
            }
            _ => None,
        }
    }

    /// Returns `true` if the script starts with `OP_RETURN`.
    #[inline]
    pub fn is_op_return(&self) -> bool {
        self.0.first() == Some(&Self::OP_RETURN)
    }

    /// Returns the raw script bytes.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Returns the script length in bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the script has no bytes.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Consumes the script, returning its bytes.
    #[inline]
    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    /// Splits the script into push and opcode tokens.
    ///
    /// # Errors
    ///
    /// Returns [`ScriptError::Truncated`] if a push runs past the end of the script.
    pub fn tokens(&self) -> Result<Vec<ScriptToken>, ScriptError> {
        let bytes = &self.0;
        let mut tokens = Vec::new();
        let mut pos = 0;

        while pos < bytes.len() {
            let offset = pos;
            let op = bytes[pos];
            pos += 1;

            let len = match op {
                Self::OP_0 => 0,
                0x01..=0x4b => op as usize,
                Self::OP_PUSHDATA1 => read_len(bytes, &mut pos, 1, offset)?,
                Self::OP_PUSHDATA2 => read_len(bytes, &mut pos, 2, offset)?,
                Self::OP_PUSHDATA4 => read_len(bytes, &mut pos, 4, offset)?,
                _ => {
                    tokens.push(ScriptToken::Op(op));
                    continue;
                }
            };

            let available = bytes.len() - pos;
            if len > available {
                return Err(ScriptError::Truncated {
                    offset,
                    needed: len,
                    available,
                });
            }
            tokens.push(ScriptToken::Push(Bytes::copy_from_slice(
                &bytes[pos..pos + len],
            )));
            pos += len;
        }

        Ok(tokens)
    }
}

/// Reads a little-endian push length of `width` bytes.
fn read_len(
    bytes: &[u8],
    pos: &mut usize,
    width: usize,
    offset: usize,
) -> Result<usize, ScriptError> {
    let available = bytes.len() - *pos;
    if width > available {
        return Err(ScriptError::Truncated {
            offset,
            needed: width,
            available,
        });
    }
    let len = bytes[*pos..*pos + width]
        .iter()
        .rev()
        .fold(0usize, |acc, b| (acc << 8) | *b as usize);
    *pos += width;
    Ok(len)
}

impl fmt::Debug for Script {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Script({})", hex::encode(&self.0))
    }
}

impl fmt::Display for Script {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(&self.0))
    }
}

impl From<Vec<u8>> for Script {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl From<&[u8]> for Script {
    fn from(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }
}

impl AsRef<[u8]> for Script {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Incremental script builder using minimal push encodings.
#[derive(Debug, Default, Clone)]
pub struct ScriptBuilder {
    bytes: Vec<u8>,
}

impl ScriptBuilder {
    /// Appends an opcode.
    pub fn op(mut self, op: u8) -> Self {
        self.bytes.push(op);
        self
    }

    /// Appends a data push with the smallest push opcode that fits.
    pub fn push(mut self, data: &[u8]) -> Self {
        match data.len() {
            0 => self.bytes.push(Script::OP_0),
            len @ 1..=0x4b => self.bytes.push(len as u8),
            len @ 0x4c..=0xff => {
                self.bytes.push(Script::OP_PUSHDATA1);
                self.bytes.push(len as u8);
            }
            len @ 0x100..=0xffff => {
                self.bytes.push(Script::OP_PUSHDATA2);
                self.bytes.extend_from_slice(&(len as u16).to_le_bytes());
            }
            len => {
                self.bytes.push(Script::OP_PUSHDATA4);
                self.bytes.extend_from_slice(&(len as u32).to_le_bytes());
            }
        }
        self.bytes.extend_from_slice(data);
        self
    }

    /// Finishes the script.
    pub fn into_script(self) -> Script {
        Script(self.bytes)
    }
}
