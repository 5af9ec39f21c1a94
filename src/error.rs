//! Error type shared by the compression and decompression paths.
//!
//! Every fallible operation in the codec returns an explicit status; there
//! are no catch-and-continue paths.  The concrete variants carry enough
//! context for a caller-facing message, while [`PocketError::kind`] collapses
//! them onto the four-way taxonomy the codec contract is written against.

use std::fmt;

/// Coarse classification of a [`PocketError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// A parameter was outside its documented domain.
    InvalidArg,
    /// The encoder output would exceed the sink's byte capacity.
    Overflow,
    /// The decoder's bit source was exhausted mid-field.
    Underflow,
    /// The decoder observed a value that violates a wire invariant.
    InvalidData,
}

/// Errors produced by the codec core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PocketError {
    /// Packet length in bits outside `1..=65535`.
    InvalidPacketLength(usize),
    /// A vector length did not match the codec's packet length.
    LengthMismatch { expected: usize, actual: usize },
    /// COUNT encoder input outside `1..=65535`.
    InvalidCount(u32),
    /// Bit-group width outside the supported range for the operation.
    InvalidBitWidth(usize),
    /// Output sink byte capacity exceeded.
    SinkOverflow,
    /// Bit source exhausted before the current field was complete.
    SourceUnderflow,
    /// An RLE delta pointed before the start of the vector.
    RunOutOfRange { delta: usize, remaining: usize },
    /// A counter code declared a value field wider than 16 bits can need.
    CountFieldTooWide(usize),
    /// The length field of an uncompressed packet disagrees with the
    /// configured packet length.
    PacketLengthFieldMismatch { expected: usize, actual: usize },
}

impl PocketError {
    /// The taxonomy bucket this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidPacketLength(_)
            | Self::LengthMismatch { .. }
            | Self::InvalidCount(_)
            | Self::InvalidBitWidth(_) => ErrorKind::InvalidArg,
            Self::SinkOverflow => ErrorKind::Overflow,
            Self::SourceUnderflow => ErrorKind::Underflow,
            Self::RunOutOfRange { .. }
            | Self::CountFieldTooWide(_)
            | Self::PacketLengthFieldMismatch { .. } => ErrorKind::InvalidData,
        }
    }
}

impl fmt::Display for PocketError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidPacketLength(bits) => {
                write!(f, "invalid packet length: {bits} bits (must be 1-65535)")
            }
            Self::LengthMismatch { expected, actual } => {
                write!(f, "length mismatch: expected {expected} bits, got {actual}")
            }
            Self::InvalidCount(a) => {
                write!(f, "counter value {a} outside 1-65535")
            }
            Self::InvalidBitWidth(n) => {
                write!(f, "unsupported bit-group width: {n}")
            }
            Self::SinkOverflow => write!(f, "output sink capacity exceeded"),
            Self::SourceUnderflow => write!(f, "bit source exhausted mid-field"),
            Self::RunOutOfRange { delta, remaining } => {
                write!(
                    f,
                    "run-length delta {delta} overruns vector start ({remaining} bits left)"
                )
            }
            Self::CountFieldTooWide(zeros) => {
                write!(f, "counter prefix declares {zeros} zero bits, maximum is 10")
            }
            Self::PacketLengthFieldMismatch { expected, actual } => {
                write!(
                    f,
                    "uncompressed packet declares {actual} bits, codec expects {expected}"
                )
            }
        }
    }
}

impl std::error::Error for PocketError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_cover_taxonomy() {
        assert_eq!(
            PocketError::InvalidPacketLength(0).kind(),
            ErrorKind::InvalidArg
        );
        assert_eq!(PocketError::InvalidCount(0).kind(), ErrorKind::InvalidArg);
        assert_eq!(PocketError::SinkOverflow.kind(), ErrorKind::Overflow);
        assert_eq!(PocketError::SourceUnderflow.kind(), ErrorKind::Underflow);
        assert_eq!(
            PocketError::RunOutOfRange {
                delta: 9,
                remaining: 3
            }
            .kind(),
            ErrorKind::InvalidData
        );
        assert_eq!(
            PocketError::PacketLengthFieldMismatch {
                expected: 720,
                actual: 8
            }
            .kind(),
            ErrorKind::InvalidData
        );
    }

    #[test]
    fn display_mentions_offending_values() {
        let err = PocketError::LengthMismatch {
            expected: 720,
            actual: 64,
        };
        let msg = err.to_string();
        assert!(msg.contains("720"));
        assert!(msg.contains("64"));
    }
}
