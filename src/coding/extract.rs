//! Bit extraction through a mask, and its inverse insertion.
//!
//! Extraction projects the bits of a data vector at the mask's set
//! positions into a flat stream.  Two traversal orders are on the wire:
//! *reverse* walks positions from F-1 down to 0 (the payload field),
//! *forward* walks them from 0 up to F-1 (the mask-update field).  Insertion
//! is the exact dual: one stream bit is consumed per set mask position, in
//! the same order, and written at that position.

use crate::bits::{BitSink, BitSource, BitVector};
use crate::error::PocketError;

/// Append `data`'s bits at set positions of `mask`, highest position first.
pub fn extract_reverse(
    sink: &mut BitSink,
    data: &BitVector,
    mask: &BitVector,
) -> Result<(), PocketError> {
    if data.len() != mask.len() {
        return Err(PocketError::LengthMismatch {
            expected: mask.len(),
            actual: data.len(),
        });
    }
    let data_words = data.words();
    for (wi, &mw) in mask.words().iter().enumerate().rev() {
        let mut w = mw;
        // Lowest set bit of the word = highest remaining position.
        while w != 0 {
            let lsb = w & w.wrapping_neg();
            sink.push_bit((data_words[wi] & lsb) != 0)?;
            w ^= lsb;
        }
    }
    Ok(())
}

/// Append `data`'s bits at set positions of `mask`, lowest position first.
pub fn extract_forward(
    sink: &mut BitSink,
    data: &BitVector,
    mask: &BitVector,
) -> Result<(), PocketError> {
    if data.len() != mask.len() {
        return Err(PocketError::LengthMismatch {
            expected: mask.len(),
            actual: data.len(),
        });
    }
    let data_words = data.words();
    for (wi, &mw) in mask.words().iter().enumerate() {
        let mut w = mw;
        // Leading bit of the word = lowest remaining position.
        while w != 0 {
            let top = 1u32 << (31 - w.leading_zeros());
            sink.push_bit((data_words[wi] & top) != 0)?;
            w ^= top;
        }
    }
    Ok(())
}

/// Read one bit per set position of `mask`, highest position first, and
/// write each at its position in `data`.
pub fn insert_reverse(
    src: &mut BitSource<'_>,
    data: &mut BitVector,
    mask: &BitVector,
) -> Result<(), PocketError> {
    if data.len() != mask.len() {
        return Err(PocketError::LengthMismatch {
            expected: mask.len(),
            actual: data.len(),
        });
    }
    for (wi, &mw) in mask.words().iter().enumerate().rev() {
        let mut w = mw;
        while w != 0 {
            let tz = w.trailing_zeros() as usize;
            let pos = (wi << 5) | (31 - tz);
            data.set(pos, src.read_bit()?);
            w &= w - 1;
        }
    }
    Ok(())
}
