//! Transactions in the legacy Bitcoin Cash serialization.
//!
//! ## Example Usage
//!
//! ```
//! use post_office_primitives::{OutPoint, Script, Transaction, TxIn, TxOut, Txid};
//!
//! let mut tx = Transaction::new(2);
//! tx.inputs.push(TxIn::unsigned(OutPoint::new(Txid::ZERO, 0)));
//! tx.outputs.push(TxOut::new(546, Script::p2pkh(&[0u8; 20])));
//!
//! let decoded = Transaction::decode(&tx.encode()).unwrap();
//! assert_eq!(decoded, tx);
//! assert_eq!(decoded.txid(), tx.txid());
//! ```

use std::fmt;
use std::io::{Cursor, Read, Write};
use std::str::FromStr;

use alloy_primitives::{B256, hex};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::encode::{read_var_bytes, read_varint, write_var_bytes, write_varint};
use crate::error::{DecodeError, PrimitivesError, Result};
use crate::hash::sha256d;
use crate::script::Script;

/// Sequence number marking an input as final.
pub const SEQUENCE_FINAL: u32 = 0xffff_ffff;

/// A transaction id in display order (the order block explorers and
/// indexers print). On the wire the bytes are reversed.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Txid(B256);

impl Txid {
    /// The all-zero id.
    pub const ZERO: Self = Self(B256::ZERO);

    /// Creates an id from display-order bytes.
    #[inline]
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(B256::new(bytes))
    }

    /// Creates an id from a hash digest in wire order.
    #[inline]
    pub fn from_wire(mut bytes: [u8; 32]) -> Self {
        bytes.reverse();
        Self::new(bytes)
    }

    /// Returns the bytes in wire order.
    #[inline]
    pub fn to_wire(&self) -> [u8; 32] {
        let mut bytes = self.0.0;
        bytes.reverse();
        bytes
    }

    /// Returns the display-order bytes.
    #[inline]
    pub const fn as_b256(&self) -> &B256 {
        &self.0
    }
}

impl fmt::Display for Txid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl fmt::Debug for Txid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Txid({self})")
    }
}

impl FromStr for Txid {
    type Err = PrimitivesError;

    fn from_str(s: &str) -> Result<Self> {
        let bytes: [u8; 32] = hex::decode_to_array(s)?;
        Ok(Self::new(bytes))
    }
}

impl From<B256> for Txid {
    fn from(value: B256) -> Self {
        Self(value)
    }
}

/// A reference to a transaction output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OutPoint {
    /// The transaction holding the output.
    pub txid: Txid,
    /// The output position within that transaction.
    pub vout: u32,
}

impl OutPoint {
    /// Creates a new outpoint.
    #[inline]
    pub const fn new(txid: Txid, vout: u32) -> Self {
        Self { txid, vout }
    }
}

impl fmt::Display for OutPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.txid, self.vout)
    }
}

/// A transaction input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxIn {
    /// The output being spent.
    pub previous_output: OutPoint,
    /// The unlocking script.
    pub script_sig: Script,
    /// The sequence number.
    pub sequence: u32,
}

impl TxIn {
    /// Creates an input with an empty unlocking script and a final sequence.
    #[inline]
    pub const fn unsigned(previous_output: OutPoint) -> Self {
        Self {
            previous_output,
            script_sig: Script::empty(),
            sequence: SEQUENCE_FINAL,
        }
    }

    /// Returns `true` if the unlocking script has been filled in.
    #[inline]
    pub fn is_signed(&self) -> bool {
        !self.script_sig.is_empty()
    }
}

/// A transaction output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxOut {
    /// Value in satoshis.
    pub value: u64,
    /// The locking script.
    pub script_pubkey: Script,
}

impl TxOut {
    /// Creates a new output.
    #[inline]
    pub const fn new(value: u64, script_pubkey: Script) -> Self {
        Self {
            value,
            script_pubkey,
        }
    }
}

/// A Bitcoin Cash transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    /// Transaction version.
    pub version: i32,
    /// Inputs, in signing order.
    pub inputs: Vec<TxIn>,
    /// Outputs, in index order.
    pub outputs: Vec<TxOut>,
    /// Lock time.
    pub lock_time: u32,
}

impl Transaction {
    /// Creates an empty transaction with the given version and zero lock time.
    #[inline]
    pub const fn new(version: i32) -> Self {
        Self {
            version,
            inputs: Vec::new(),
            outputs: Vec::new(),
            lock_time: 0,
        }
    }

    /// Deserializes a transaction, requiring the buffer to hold exactly one.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let mut cursor = Cursor::new(bytes);
        let tx = Self::read_from(&mut cursor, bytes.len()).map_err(PrimitivesError::Decode)?;

        let trailing = bytes.len() - cursor.position() as usize;
        if trailing != 0 {
            return Err(DecodeError::TrailingBytes(trailing).into());
        }
        Ok(tx)
    }

    /// Deserializes a transaction from hex.
    pub fn from_hex(s: &str) -> Result<Self> {
        Self::decode(&hex::decode(s)?)
    }

    fn read_from<R: Read>(reader: &mut R, size: usize) -> std::result::Result<Self, DecodeError> {
        let version = reader.read_i32::<LittleEndian>()?;

        let input_count = read_count(reader, size)?;
        let mut inputs = Vec::with_capacity(input_count);
        for _ in 0..input_count {
            let mut txid = [0u8; 32];
            reader.read_exact(&mut txid)?;
            let vout = reader.read_u32::<LittleEndian>()?;
            let script_sig = read_var_bytes(reader, size)?;
            let sequence = reader.read_u32::<LittleEndian>()?;
            inputs.push(TxIn {
                previous_output: OutPoint::new(Txid::from_wire(txid), vout),
                script_sig: Script::new(script_sig),
                sequence,
            });
        }

        let output_count = read_count(reader, size)?;
        let mut outputs = Vec::with_capacity(output_count);
        for _ in 0..output_count {
            let value = reader.read_u64::<LittleEndian>()?;
            let script_pubkey = read_var_bytes(reader, size)?;
            outputs.push(TxOut::new(value, Script::new(script_pubkey)));
        }

        let lock_time = reader.read_u32::<LittleEndian>()?;

        Ok(Self {
            version,
            inputs,
            outputs,
            lock_time,
        })
    }

    /// Serializes the transaction.
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.size_hint());
        // Writing into a Vec cannot fail
        let _ = self.write_to(&mut buf);
        buf
    }

    fn write_to<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        writer.write_i32::<LittleEndian>(self.version)?;

        write_varint(writer, self.inputs.len() as u64)?;
        for input in &self.inputs {
            write_outpoint(writer, &input.previous_output)?;
            write_var_bytes(writer, input.script_sig.as_bytes())?;
            writer.write_u32::<LittleEndian>(input.sequence)?;
        }

        write_varint(writer, self.outputs.len() as u64)?;
        for output in &self.outputs {
            write_output(writer, output)?;
        }

        writer.write_u32::<LittleEndian>(self.lock_time)
    }

    /// Serializes the transaction as lowercase hex.
    pub fn to_hex(&self) -> String {
        hex::encode(self.encode())
    }

    /// Returns the transaction id.
    pub fn txid(&self) -> Txid {
        Txid::from_wire(sha256d(&self.encode()).0)
    }

    /// Returns the sum of all output values, saturating on overflow.
    pub fn output_value(&self) -> u64 {
        self.outputs
            .iter()
            .fold(0u64, |acc, out| acc.saturating_add(out.value))
    }

    fn size_hint(&self) -> usize {
        let inputs: usize = self.inputs.iter().map(|i| 41 + i.script_sig.len()).sum();
        let outputs: usize = self.outputs.iter().map(|o| 9 + o.script_pubkey.len()).sum();
        8 + 18 + inputs + outputs
    }
}

/// Reads an element count, bounding it by the bytes available so a hostile
/// count cannot trigger a huge allocation.
fn read_count<R: Read>(reader: &mut R, size: usize) -> std::result::Result<usize, DecodeError> {
    let count = read_varint(reader)?;
    if count > size as u64 {
        return Err(DecodeError::OversizedLength(count));
    }
    Ok(count as usize)
}

pub(crate) fn write_outpoint<W: Write>(writer: &mut W, outpoint: &OutPoint) -> std::io::Result<()> {
    writer.write_all(&outpoint.txid.to_wire())?;
    writer.write_u32::<LittleEndian>(outpoint.vout)
}

pub(crate) fn write_output<W: Write>(writer: &mut W, output: &TxOut) -> std::io::Result<()> {
    writer.write_u64::<LittleEndian>(output.value)?;
    write_var_bytes(writer, output.script_pubkey.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    // The block 170 pay-to-pubkey spend (one input, two outputs).
    const RAW_TX: &str = "0100000001c997a5e56e104102fa209c6a852dd90660a20b2d9c352423edce25857fcd3704000000004847304402204e45e16932b8af514961a1d3a1a25fdf3f4f7732e9d624c6c61548ab5fb8cd410220181522ec8eca07de4860a4acdd12909d831cc56cbbac4622082221a8768d1d0901ffffffff0200ca9a3b00000000434104ae1a62fe09c5f51b13905f07f06b99a2f7159b2225f374cd378d71302fa28414e7aab37397f554a7df5f142c21c1b7303b8a0626f1baded5c72a704f7e6cd84cac00286bee0000000043410411db93e1dcdb8a016b49840f8c53bc1eb68a382e97b1482ecad7b148a6909a5cb2e0eaddfb84ccf9744464f82e160bfa9b8b64f9d4c03f999b8643f656b412a3ac00000000";

    #[test]
    fn test_decode_known_transaction() {
        let tx = Transaction::from_hex(RAW_TX).unwrap();

        assert_eq!(tx.version, 1);
        assert_eq!(tx.inputs.len(), 1);
        assert_eq!(tx.outputs.len(), 2);
        assert_eq!(tx.outputs[0].value, 1_000_000_000);
        assert_eq!(tx.outputs[1].value, 4_000_000_000);
        assert_eq!(
            tx.inputs[0].previous_output.txid.to_string(),
            "0437cd7f8525ceed2324359c2d0ba26006d92d856a9c20fa0241106ee5a597c9"
        );
        assert_eq!(
            tx.txid().to_string(),
            "f4184fc596403b9d638783cf57adfe4c75c605f6356fbc91338530e9831e9e16"
        );
        assert_eq!(tx.to_hex(), RAW_TX);
    }

    #[test]
    fn test_decode_rejects_trailing_bytes() {
        let raw = format!("{RAW_TX}00");
        assert!(matches!(
            Transaction::from_hex(&raw),
            Err(PrimitivesError::Decode(DecodeError::TrailingBytes(1)))
        ));
    }

    #[test]
    fn test_decode_rejects_truncation() {
        let raw = &RAW_TX[..RAW_TX.len() - 8];
        assert!(matches!(
            Transaction::from_hex(raw),
            Err(PrimitivesError::Decode(DecodeError::UnexpectedEof(_)))
        ));
    }

    #[test]
    fn test_decode_rejects_huge_counts() {
        // version followed by an input count of 2^32
        let raw = "01000000ff0000000001000000";
        assert!(matches!(
            Transaction::from_hex(raw),
            Err(PrimitivesError::Decode(DecodeError::OversizedLength(0x1_0000_0000)))
        ));
    }

    #[test]
    fn test_txid_string_roundtrip() {
        let s = "d5228d2cdc77fbe5a9aa79f19b0933b6802f9f0067f42847fc4fe343664723e5";
        let txid: Txid = s.parse().unwrap();
        assert_eq!(txid.to_string(), s);
        assert_eq!(Txid::from_wire(txid.to_wire()), txid);
        assert_eq!(txid.to_wire()[0], 0xe5);
    }

    #[test]
    fn test_unsigned_input() {
        let input = TxIn::unsigned(OutPoint::new(Txid::ZERO, 3));
        assert!(!input.is_signed());
        assert_eq!(input.sequence, SEQUENCE_FINAL);
    }

    #[test]
    fn test_output_value() {
        let mut tx = Transaction::new(2);
        tx.outputs.push(TxOut::new(546, Script::empty()));
        tx.outputs.push(TxOut::new(1000, Script::empty()));
        assert_eq!(tx.output_value(), 1546);
    }
}
