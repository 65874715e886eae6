//! CompactSize integers and length-prefixed byte strings.

use std::io::{self, Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::error::DecodeError;

/// Returns the encoded size of a CompactSize integer.
#[inline]
pub const fn varint_len(n: u64) -> usize {
    match n {
        0..=0xfc => 1,
        0xfd..=0xffff => 3,
        0x1_0000..=0xffff_ffff => 5,
        _ => 9,
    }
}

pub(crate) fn write_varint<W: Write>(writer: &mut W, n: u64) -> io::Result<()> {
    match n {
        0..=0xfc => writer.write_u8(n as u8),
        0xfd..=0xffff => {
            writer.write_u8(0xfd)?;
            writer.write_u16::<LittleEndian>(n as u16)
        }
        0x1_0000..=0xffff_ffff => {
            writer.write_u8(0xfe)?;
            writer.write_u32::<LittleEndian>(n as u32)
        }
        _ => {
            writer.write_u8(0xff)?;
            writer.write_u64::<LittleEndian>(n)
        }
    }
}

pub(crate) fn read_varint<R: Read>(reader: &mut R) -> io::Result<u64> {
    match reader.read_u8()? {
        0xfd => Ok(reader.read_u16::<LittleEndian>()? as u64),
        0xfe => Ok(reader.read_u32::<LittleEndian>()? as u64),
        0xff => reader.read_u64::<LittleEndian>(),
        n => Ok(n as u64),
    }
}

pub(crate) fn write_var_bytes<W: Write>(writer: &mut W, bytes: &[u8]) -> io::Result<()> {
    write_varint(writer, bytes.len() as u64)?;
    writer.write_all(bytes)
}

/// Reads a length-prefixed byte string, refusing lengths beyond `remaining`.
pub(crate) fn read_var_bytes<R: Read>(
    reader: &mut R,
    remaining: usize,
) -> Result<Vec<u8>, DecodeError> {
    let len = read_varint(reader)?;
    if len > remaining as u64 {
        return Err(DecodeError::OversizedLength(len));
    }
    let mut bytes = vec![0u8; len as usize];
    reader.read_exact(&mut bytes)?;
    Ok(bytes)
}
