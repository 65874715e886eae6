//! Transaction size model for fee estimation.

use crate::encode::varint_len;

/// Serialized size of a signed P2PKH input (compressed key, DER signature upper bound).
pub const P2PKH_INPUT_SIZE: usize = 148;

/// Serialized size of a P2PKH output.
pub const P2PKH_OUTPUT_SIZE: usize = 34;

/// Version plus lock time.
const FIXED_SIZE: usize = 8;

/// Estimates the serialized size of a transaction spending `inputs` P2PKH
/// outputs into `outputs` P2PKH outputs.
///
/// # Example
///
/// ```
/// use post_office_primitives::byte_count;
///
/// // 148 + 2 * 34 + 8 + 1 + 1
/// assert_eq!(byte_count(1, 2), 226);
/// ```
#[inline]
pub const fn byte_count(inputs: usize, outputs: usize) -> usize {
    P2PKH_INPUT_SIZE * inputs
        + P2PKH_OUTPUT_SIZE * outputs
        + FIXED_SIZE
        + varint_len(inputs as u64)
        + varint_len(outputs as u64)
}
