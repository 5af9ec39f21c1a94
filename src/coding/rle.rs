//! Run-length serialization of a bit vector as COUNT-coded gaps.
//!
//! Gaps are measured from the end of the vector toward the start: with
//! `old = F`, each set bit at position `p` (visited in decreasing order)
//! contributes `COUNT(old - p)` and updates `old`.  Leading zeros before the
//! first visited bit cost nothing, and the list ends with the reserved `10`
//! marker.  An all-zero vector therefore costs exactly two bits.

use crate::bits::{BitSink, BitSource, BitVector};
use crate::coding::count;
use crate::error::PocketError;

/// Append the run-length form of `v`.
pub fn encode(sink: &mut BitSink, v: &BitVector) -> Result<(), PocketError> {
    let mut old = v.len();
    let words = v.words();
    for wi in (0..words.len()).rev() {
        let mut w = words[wi];
        // The lowest set bit of a word is its highest bit position.
        while w != 0 {
            let pos = (wi << 5) | (31 - w.trailing_zeros() as usize);
            count::encode(sink, (old - pos) as u32)?;
            old = pos;
            w &= w - 1;
        }
    }
    count::encode_terminator(sink)
}

/// Decode a run-length list into `out`, which supplies the vector length.
pub fn decode(src: &mut BitSource<'_>, out: &mut BitVector) -> Result<(), PocketError> {
    out.zero();
    let mut pos = out.len();
    loop {
        let delta = count::decode(src)? as usize;
        if delta == count::TERMINATOR as usize {
            return Ok(());
        }
        if delta > pos {
            return Err(PocketError::RunOutOfRange {
                delta,
                remaining: pos,
            });
        }
        pos -= delta;
        out.set(pos, true);
    }
}
