//! Packet-stateful decompressor, the exact dual of the encoder.
//!
//! The decoder recomputes the mask independently from the transmitted
//! fields; after each packet its mask is bit-identical to the encoder's at
//! the same index.  The caller positions the bit source at a packet start
//! (byte-aligned) and realigns between packets.

use crate::bits::{BitSource, BitVector};
use crate::coding::{count, extract, rle};
use crate::config::CodecConfig;
use crate::error::PocketError;

/// POCKET+ decompressor state.
#[derive(Clone)]
pub struct Decoder {
    packet_bits: usize,
    robustness: u8,
    t: usize,

    mask: BitVector,
    initial_mask: BitVector,
    prev_output: BitVector,
    /// Window positions whose mask bit just turned predictable this packet.
    positives: BitVector,

    // Reusable per-packet scratch.
    window: BitVector,
    hxor: BitVector,
    extract_mask: BitVector,
    output: BitVector,
}

impl Decoder {
    /// Build a decoder from a validated configuration.
    ///
    /// The period limits are encoder-side only and are ignored here; the
    /// control flags arrive in the bit stream.
    pub fn new(cfg: &CodecConfig) -> Result<Self, PocketError> {
        cfg.validate()?;
        let f = cfg.packet_bits;
        let initial_mask = cfg
            .initial_mask
            .clone()
            .unwrap_or_else(|| BitVector::new(f));

        Ok(Self {
            packet_bits: f,
            robustness: cfg.clamped_robustness(),
            t: 0,
            mask: initial_mask.clone(),
            initial_mask,
            prev_output: BitVector::new(f),
            positives: BitVector::new(f),
            window: BitVector::new(f),
            hxor: BitVector::new(f),
            extract_mask: BitVector::new(f),
            output: BitVector::new(f),
        })
    }

    /// Packet length F in bits.
    pub fn packet_bits(&self) -> usize {
        self.packet_bits
    }

    /// Robustness after clamping.
    pub fn robustness(&self) -> u8 {
        self.robustness
    }

    /// Number of packets reconstructed since construction or the last reset.
    pub fn packets_processed(&self) -> usize {
        self.t
    }

    /// Current unpredictability mask (diagnostics and sync checks).
    pub fn mask(&self) -> &BitVector {
        &self.mask
    }

    /// Return to the stream-start state with the initial mask restored.
    pub fn reset(&mut self) {
        self.t = 0;
        self.mask.assign(&self.initial_mask);
        self.prev_output.zero();
        self.positives.zero();
    }

    /// Reconstruct one packet from `src`.
    ///
    /// The returned reference stays valid until the next call; callers that
    /// need to keep the packet copy it out.
    pub fn decompress_packet(
        &mut self,
        src: &mut BitSource<'_>,
    ) -> Result<&BitVector, PocketError> {
        let f = self.packet_bits;
        self.positives.zero();

        // ht: robustness window, effective robustness, mask updates.
        rle::decode(src, &mut self.window)?;
        let vt = src.read_bits(4)? as u8;
        let window_weight = self.window.count_ones();

        let mut ct = false;
        if vt > 0 && window_weight > 0 {
            let et = src.read_bit()?;
            if et {
                // One transmitted bit per window position, ascending order:
                // 1 clears the mask bit (position became predictable),
                // 0 sets it.
                for pos in 0..f {
                    if self.window.bit(pos) {
                        if src.read_bit()? {
                            self.mask.set(pos, false);
                            self.positives.set(pos, true);
                        } else {
                            self.mask.set(pos, true);
                        }
                    }
                }
                ct = src.read_bit()?;
            } else {
                // No positive updates: every window position goes
                // unpredictable.
                self.mask.or_assign(&self.window);
            }
        } else if vt == 0 && window_weight > 0 {
            // Without robustness the window is the plain change vector;
            // toggling reproduces the encoder's mask.
            self.mask.xor_assign(&self.window);
        }

        let dt = src.read_bit()?;

        // qt: optional full-mask replacement.
        let mut raw = false;
        if !dt {
            if src.read_bit()? {
                rle::decode(src, &mut self.hxor)?;
                // Undo the horizontal XOR from the last position upward.
                let mut cur = self.hxor.bit(f - 1);
                self.mask.set(f - 1, cur);
                for pos in (0..f - 1).rev() {
                    cur ^= self.hxor.bit(pos);
                    self.mask.set(pos, cur);
                }
            }
            raw = src.read_bit()?;
        }

        // ut: payload.
        if raw {
            let declared = count::decode(src)? as usize;
            if declared != f {
                return Err(PocketError::PacketLengthFieldMismatch {
                    expected: f,
                    actual: declared,
                });
            }
            for pos in 0..f {
                let bit = src.read_bit()?;
                self.output.set(pos, bit);
            }
        } else {
            self.output.assign(&self.prev_output);
            if ct && vt > 0 {
                self.extract_mask.assign(&self.mask);
                self.extract_mask.or_assign(&self.positives);
                extract::insert_reverse(src, &mut self.output, &self.extract_mask)?;
            } else {
                extract::insert_reverse(src, &mut self.output, &self.mask)?;
            }
        }

        self.prev_output.assign(&self.output);
        self.t += 1;
        Ok(&self.output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bits::BitSink;
    use crate::encoder::{Encoder, PacketFlags};

    #[test]
    fn decodes_quiet_first_packet() {
        // "10" + Vt=0 + dt=1: empty window, nothing transmitted, so the
        // output equals the (all-zero) prediction base.
        let bytes = [0b1000_0010];
        let mut src = BitSource::new(&bytes, 7);
        let mut dec = Decoder::new(&CodecConfig::new(8, 0)).unwrap();
        let out = dec.decompress_packet(&mut src).unwrap();
        assert_eq!(out.count_ones(), 0);
        assert_eq!(src.remaining(), 0);
    }

    #[test]
    fn decodes_raw_first_packet() {
        let bytes = [0x85, 0xB8, 0xD5, 0x60];
        let mut src = BitSource::new(&bytes, 27);
        let mut dec = Decoder::new(&CodecConfig::new(8, 1)).unwrap();
        let out = dec.decompress_packet(&mut src).unwrap();
        assert_eq!(out.to_bytes(), vec![0xAB]);
        assert_eq!(dec.packets_processed(), 1);
    }

    #[test]
    fn rejects_wrong_raw_length_field() {
        // Hand-built segment claiming 9 bits in an 8-bit codec.
        let mut sink = BitSink::new();
        count::encode_terminator(&mut sink).unwrap(); // empty window
        sink.push_bits(1, 4).unwrap(); // Vt = 1
        sink.push_bit(false).unwrap(); // dt = 0
        sink.push_bit(false).unwrap(); // ft = 0
        sink.push_bit(true).unwrap(); // rt = 1
        count::encode(&mut sink, 9).unwrap();
        sink.push_bits(0, 9).unwrap();
        let len = sink.len();
        let bytes = sink.to_bytes();

        let mut src = BitSource::new(&bytes, len);
        let mut dec = Decoder::new(&CodecConfig::new(8, 1)).unwrap();
        assert!(matches!(
            dec.decompress_packet(&mut src),
            Err(PocketError::PacketLengthFieldMismatch {
                expected: 8,
                actual: 9
            })
        ));
    }

    #[test]
    fn truncated_stream_underflows() {
        // The quiet-packet segment cut off after 4 bits.
        let bytes = [0b1000_0000];
        let mut src = BitSource::new(&bytes, 4);
        let mut dec = Decoder::new(&CodecConfig::new(8, 0)).unwrap();
        assert!(matches!(
            dec.decompress_packet(&mut src),
            Err(PocketError::SourceUnderflow)
        ));
    }

    #[test]
    fn mask_tracks_encoder_after_each_packet() {
        let cfg = CodecConfig::new(64, 2);
        let mut enc = Encoder::new(&cfg).unwrap();
        let mut dec = Decoder::new(&cfg).unwrap();
        let mut sink = BitSink::new();

        let inputs: Vec<[u8; 8]> = vec![
            [0x00; 8],
            [0x00, 0x00, 0x10, 0x00, 0x00, 0x00, 0x00, 0x01],
            [0x00, 0x00, 0x10, 0x00, 0x00, 0x00, 0x00, 0x01],
            [0x80, 0x00, 0x10, 0x00, 0x00, 0x00, 0x00, 0x00],
            [0x80, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00],
        ];

        for (i, bytes) in inputs.iter().enumerate() {
            let input = BitVector::from_bytes(bytes, 64);
            let flags = PacketFlags {
                new_mask: false,
                send_mask: i == 0,
                send_raw: i == 0,
            };
            sink.clear();
            enc.compress_packet(&input, flags, &mut sink).unwrap();
            let len = sink.len();
            let seg = sink.to_bytes();
            let mut src = BitSource::new(&seg, len);
            let out = dec.decompress_packet(&mut src).unwrap();
            assert_eq!(out, &input, "packet {i} payload");
            assert_eq!(dec.mask(), enc.mask(), "packet {i} mask sync");
        }
        assert_eq!(enc.packets_processed(), dec.packets_processed());
    }

    #[test]
    fn reset_is_idempotent() {
        let cfg = CodecConfig::new(32, 1);
        let mut dec = Decoder::new(&cfg).unwrap();
        let bytes = [0b1000_0010];
        let mut src = BitSource::new(&bytes, 7);
        // 32-bit quiet packet parses the same header.
        let _ = dec.decompress_packet(&mut src);
        dec.reset();
        let mask_once = dec.mask().clone();
        let t_once = dec.packets_processed();
        dec.reset();
        assert_eq!(dec.mask(), &mask_once);
        assert_eq!(dec.packets_processed(), t_once);
        assert_eq!(t_once, 0);
    }
}
