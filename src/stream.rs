//! Whole-buffer compression and decompression.
//!
//! The byte seam of the codec: an input buffer is split into consecutive
//! `ceil(F / 8)`-byte packets, each compressed segment is emitted
//! byte-aligned (the tail of its last byte zero-padded), and decompression
//! realigns between packets until the source is exhausted.

use crate::bits::{BitSink, BitSource, BitVector};
use crate::config::CodecConfig;
use crate::decoder::Decoder;
use crate::encoder::Encoder;
use crate::error::PocketError;

/// Compress a buffer of back-to-back fixed-length packets.
///
/// `data.len()` must be a whole multiple of the packet byte size.  An empty
/// buffer compresses to an empty buffer.
pub fn compress(data: &[u8], cfg: &CodecConfig) -> Result<Vec<u8>, PocketError> {
    let mut encoder = Encoder::new(cfg)?;
    if data.is_empty() {
        return Ok(Vec::new());
    }

    let packet_bytes = (cfg.packet_bits + 7) / 8;
    if data.len() % packet_bytes != 0 {
        return Err(PocketError::LengthMismatch {
            expected: (data.len() / packet_bytes + 1) * packet_bytes,
            actual: data.len(),
        });
    }

    let mut input = BitVector::new(cfg.packet_bits);
    let mut sink = BitSink::new();
    let mut out = Vec::new();
    for chunk in data.chunks_exact(packet_bytes) {
        input.load_bytes(chunk);
        encoder.compress_next(&input, &mut sink)?;
        sink.drain_into(&mut out);
    }
    Ok(out)
}

/// Decompress a buffer produced by [`compress`] with the same `F` and
/// robustness.
///
/// Packets are reconstructed until the source is exhausted; a stream that
/// ends mid-packet surfaces the underlying fault.
pub fn decompress(data: &[u8], cfg: &CodecConfig) -> Result<Vec<u8>, PocketError> {
    let mut decoder = Decoder::new(cfg)?;
    if data.is_empty() {
        return Ok(Vec::new());
    }

    let mut src = BitSource::new(data, data.len() * 8);
    let mut out = Vec::new();
    while src.remaining() > 0 {
        let packet = decoder.decompress_packet(&mut src)?;
        packet.extend_bytes(&mut out);
        src.align_byte();
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg(packet_bits: usize, robustness: u8) -> CodecConfig {
        CodecConfig::with_periods(packet_bits, robustness, 10, 20, 50)
    }

    #[test]
    fn empty_buffer_roundtrips_to_empty() {
        let c = cfg(720, 1);
        assert!(compress(&[], &c).unwrap().is_empty());
        assert!(decompress(&[], &c).unwrap().is_empty());
    }

    #[test]
    fn partial_trailing_packet_is_rejected() {
        let c = cfg(720, 1);
        let data = vec![0u8; 91];
        assert!(matches!(
            compress(&data, &c),
            Err(PocketError::LengthMismatch {
                expected: 180,
                actual: 91
            })
        ));
    }

    #[test]
    fn constant_stream_roundtrips_and_shrinks() {
        let c = cfg(720, 1);
        let data = vec![0u8; 90 * 100];
        let packed = compress(&data, &c).unwrap();
        assert!(packed.len() < data.len() / 4);
        assert_eq!(decompress(&packed, &c).unwrap(), data);
    }

    #[test]
    fn varying_stream_roundtrips() {
        let c = cfg(720, 2);
        let mut data = Vec::new();
        let mut state = 0x2545_F491_4F6C_DD1Du64;
        for p in 0..50 {
            for i in 0..90 {
                // Mostly-static packets with a few churning bytes.
                if i % 17 == p % 17 {
                    state ^= state << 13;
                    state ^= state >> 7;
                    state ^= state << 17;
                    data.push((state >> 32) as u8);
                } else {
                    data.push(i as u8);
                }
            }
        }
        let packed = compress(&data, &c).unwrap();
        assert_eq!(decompress(&packed, &c).unwrap(), data);
    }

    #[test]
    fn manual_mode_roundtrips() {
        // No periods means no sync packets: reconstruction leans on the
        // all-zero prediction base, so the stream starts from zero and every
        // later difference rides on the mask.
        let c = CodecConfig::new(64, 0);
        let mut data = vec![0u8; 8];
        let mut packet = [0u8; 8];
        for i in 0..11u32 {
            packet[(i as usize * 3) % 8] |= 1u8 << (i % 8);
            data.extend_from_slice(&packet);
        }
        let packed = compress(&data, &c).unwrap();
        assert_eq!(decompress(&packed, &c).unwrap(), data);
    }

    #[test]
    fn unaligned_packet_width_roundtrips() {
        // F = 13: two bytes per packet, three padding bits each.
        let c = cfg(13, 1);
        let mut data = Vec::new();
        for p in 0..20u8 {
            let hi = p.rotate_left(3) & 0xFF;
            data.push(hi);
            data.push(p << 5); // low 3 bits of the tail byte stay meaningless
        }
        // Zero out sub-packet padding the way the codec will emit it.
        for pair in data.chunks_exact_mut(2) {
            pair[1] &= 0xF8;
        }
        let packed = compress(&data, &c).unwrap();
        assert_eq!(decompress(&packed, &c).unwrap(), data);
    }

    #[test]
    fn truncated_stream_reports_underflow() {
        let c = cfg(720, 1);
        let data = vec![0x5Au8; 90 * 4];
        let packed = compress(&data, &c).unwrap();
        let cut = &packed[..packed.len() - 40];
        assert!(decompress(cut, &c).is_err());
    }
}
