//! SLP metadata output parsing.
//!
//! An SLP `SEND` message lives in the first output of a token transaction:
//!
//! ```text
//! OP_RETURN <"SLP\0"> <token_type> <"SEND"> <token_id> <amount_1> ... <amount_n>
//! ```
//!
//! `amount_i` is the number of token base units sent to output `i`, as a
//! big-endian integer.

use std::fmt;
use std::str::FromStr;

use alloy_primitives::{B256, hex};
use post_office_primitives::{Script, ScriptToken, TxOut};

use crate::{LOKAD_ID, LOKAD_ID_INDEX, PostageError, SLP_OP_RETURN_VOUT, TOKEN_ID_INDEX};

const TRANSACTION_TYPE_INDEX: usize = 3;
const SEND: &[u8] = b"SEND";

/// An SLP token identifier (the genesis transaction id, display order).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct TokenId(B256);

impl TokenId {
    /// The all-zero id.
    pub const ZERO: Self = Self(B256::ZERO);

    /// Creates a token id from its bytes.
    #[inline]
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(B256::new(bytes))
    }

    /// Returns the id bytes.
    #[inline]
    pub const fn as_b256(&self) -> &B256 {
        &self.0
    }
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl fmt::Debug for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TokenId({self})")
    }
}

impl FromStr for TokenId {
    type Err = hex::FromHexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        hex::decode_to_array(s).map(Self::new)
    }
}

impl serde::Serialize for TokenId {
    fn serialize<S: serde::Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(self)
    }
}

impl<'de> serde::Deserialize<'de> for TokenId {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let s = <std::borrow::Cow<'de, str>>::deserialize(d)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// A decoded SLP `SEND` message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlpMetadata {
    token_type: Vec<u8>,
    token_id: TokenId,
    amounts: Vec<u64>,
}

impl SlpMetadata {
    /// Parses the metadata output of a transaction.
    ///
    /// # Errors
    ///
    /// Returns [`PostageError::InvalidMetadata`] if the first output is not an
    /// SLP `SEND` message.
    pub fn parse(outputs: &[TxOut]) -> Result<Self, PostageError> {
        let output = outputs
            .get(SLP_OP_RETURN_VOUT)
            .ok_or(PostageError::InvalidMetadata("transaction has no outputs"))?;
        Self::from_script(&output.script_pubkey)
    }

    /// Parses an SLP `SEND` script.
    ///
    /// # Errors
    ///
    /// Returns [`PostageError::InvalidMetadata`] if the script is malformed,
    /// is not `OP_RETURN`, does not carry the SLP lokad id, is not a `SEND`
    /// or has a bad token id or amount.
    pub fn from_script(script: &Script) -> Result<Self, PostageError> {
        let tokens = script
            .tokens()
            .map_err(|_| PostageError::InvalidMetadata("could not parse OP_RETURN output"))?;

        if !tokens.first().is_some_and(|token| token.is_op(Script::OP_RETURN)) {
            return Err(PostageError::InvalidMetadata("metadata output is not OP_RETURN"));
        }

        if tokens.get(LOKAD_ID_INDEX).and_then(ScriptToken::data) != Some(&LOKAD_ID[..]) {
            return Err(PostageError::InvalidMetadata("missing SLP lokad id"));
        }

        // OP_1 is a common encoding for token type 1
        let token_type = match tokens.get(LOKAD_ID_INDEX + 1) {
            Some(ScriptToken::Push(data)) => data.to_vec(),
            Some(ScriptToken::Op(op @ Script::OP_1..=0x60)) => vec![op - Script::OP_1 + 1],
            _ => return Err(PostageError::InvalidMetadata("missing token type")),
        };

        if tokens.get(TRANSACTION_TYPE_INDEX).and_then(ScriptToken::data) != Some(SEND) {
            return Err(PostageError::InvalidMetadata("not a SEND message"));
        }

        let token_id = tokens
            .get(TOKEN_ID_INDEX)
            .and_then(ScriptToken::data)
            .and_then(|data| <[u8; 32]>::try_from(data).ok())
            .map(TokenId::new)
            .ok_or(PostageError::InvalidMetadata("missing token id"))?;

        let amounts = tokens[TOKEN_ID_INDEX + 1..]
            .iter()
            .map(parse_amount)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { token_type, token_id, amounts })
    }

    /// Returns the token type bytes.
    #[inline]
    pub fn token_type(&self) -> &[u8] {
        &self.token_type
    }

    /// Returns the token being sent.
    #[inline]
    pub const fn token_id(&self) -> TokenId {
        self.token_id
    }

    /// Returns the amount sent to output `vout`, if the message has one.
    ///
    /// Output 0 is the metadata output itself and never carries an amount.
    #[inline]
    pub fn amount(&self, vout: usize) -> Option<u64> {
        vout.checked_sub(1).and_then(|i| self.amounts.get(i)).copied()
    }

    /// Returns the amounts for outputs `1..`.
    #[inline]
    pub fn amounts(&self) -> &[u64] {
        &self.amounts
    }
}

fn parse_amount(token: &ScriptToken) -> Result<u64, PostageError> {
    let data = token
        .data()
        .ok_or(PostageError::InvalidMetadata("amount is not a data push"))?;
    if data.len() > 8 {
        return Err(PostageError::InvalidMetadata("amount wider than 64 bits"));
    }
    Ok(data.iter().fold(0u64, |acc, byte| (acc << 8) | u64::from(*byte)))
}
