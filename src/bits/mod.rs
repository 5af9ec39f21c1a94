//! Bit-level containers: fixed-length vectors, the output sink, and the
//! input source used by the packet codecs.

pub mod sink;
pub mod source;
pub mod vector;

pub use sink::BitSink;
pub use source::BitSource;
pub use vector::BitVector;
