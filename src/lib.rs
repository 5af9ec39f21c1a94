//! POCKET+ (CCSDS 124.0-B-1) lossless compression for fixed-length
//! spacecraft housekeeping telemetry.
//!
//! The codec exploits the fact that most bits of a housekeeping packet are
//! *predictable* — unchanged from the previous packet — and transmits only
//! the evolving set of unpredictable positions plus the bits at those
//! positions.  A caller-chosen robustness level bounds how many consecutive
//! lost packets a receiver can ride out without an uncompressed resync.
//!
//! # Quick start
//!
//! ```no_run
//! use pocketplus::{compress, decompress, CodecConfig};
//!
//! // 90-byte packets, robustness 2, automatic control-flag schedule.
//! let cfg = CodecConfig::with_periods(720, 2, 20, 50, 100);
//!
//! let telemetry = std::fs::read("housekeeping.bin").unwrap();
//! let packed = compress(&telemetry, &cfg).unwrap();
//! let restored = decompress(&packed, &cfg).unwrap();
//! assert_eq!(restored, telemetry);
//! ```
//!
//! Packet-at-a-time control lives on [`Encoder`] / [`Decoder`]; the
//! free functions drive whole byte buffers.

pub mod bits;
pub mod cli;
pub mod coding;
pub mod config;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod history;
pub mod mask;
pub mod schedule;
pub mod stream;

// ─────────────────────────────────────────────────────────────────────────────
// Top-level convenience re-exports for the most common API entry points.
// ─────────────────────────────────────────────────────────────────────────────

/// Whole-buffer compression over consecutive fixed-length packets.
pub use stream::compress;
/// Whole-buffer decompression; the dual of [`compress`].
pub use stream::decompress;

/// Packet-at-a-time compressor with explicit or scheduled control flags.
pub use encoder::{Encoder, PacketFlags};
/// Packet-at-a-time decompressor.
pub use decoder::Decoder;

/// Construction-time codec parameters shared by both sides.
pub use config::CodecConfig;
/// Error type for every fallible codec operation.
pub use error::{ErrorKind, PocketError};

/// Fixed-length bit vector used for packets and masks.
pub use bits::BitVector;
/// MSB-first output accumulator consumed by the encoder.
pub use bits::BitSink;
/// MSB-first input reader consumed by the decoder.
pub use bits::BitSource;

// ─────────────────────────────────────────────────────────────────────────────
// Version API
// ─────────────────────────────────────────────────────────────────────────────

pub const POCKETPLUS_VERSION_MAJOR: u32 = 1;
pub const POCKETPLUS_VERSION_MINOR: u32 = 0;
pub const POCKETPLUS_VERSION_RELEASE: u32 = 0;
pub const POCKETPLUS_VERSION_STRING: &str = "1.0.0";

/// Returns the library version string (e.g. `"1.0.0"`).
pub fn version_string() -> &'static str {
    POCKETPLUS_VERSION_STRING
}
