//! Packet-stateful compressor.
//!
//! One instance processes one packet stream strictly in order.  Each call to
//! [`Encoder::compress_packet`] appends a single bit segment of the form
//! `ht || qt || ut` to the caller's sink:
//!
//! - `ht` — run-length list of the robustness window, the 4-bit effective
//!   robustness, and (when the window is non-empty) the positive-update
//!   flag, the forward-order new-mask bits, and the repeated-request flag,
//!   closed by the field-suppression flag `dt`.
//! - `qt` — when `dt = 0`, the send-mask flag and, if set, the run-length
//!   list of the horizontally XOR-ed mask.
//! - `ut` — either the full packet (uncompressed request) or the packet's
//!   bits extracted through the current mask, highest position first.
//!
//! All working vectors are allocated once at construction and reused; the
//! per-packet path allocates nothing.

use crate::bits::{BitSink, BitVector};
use crate::coding::{count, extract, rle};
use crate::config::{CodecConfig, EFFECTIVE_ROBUSTNESS_MAX};
use crate::error::PocketError;
use crate::history::{ChangeHistory, FlagHistory};
use crate::mask;
use crate::schedule::PeriodScheduler;

/// Per-packet control requests (manual mode).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PacketFlags {
    /// Replace the mask with the accumulated build vector.
    pub new_mask: bool,
    /// Transmit the full mask this packet.
    pub send_mask: bool,
    /// Transmit the packet uncompressed this packet.
    pub send_raw: bool,
}

/// POCKET+ compressor state.
#[derive(Clone)]
pub struct Encoder {
    packet_bits: usize,
    robustness: u8,
    t: usize,

    mask: BitVector,
    prev_mask: BitVector,
    build: BitVector,
    prev_build: BitVector,
    prev_input: BitVector,
    initial_mask: BitVector,

    changes: ChangeHistory,
    requests: FlagHistory,
    scheduler: Option<PeriodScheduler>,

    // Reusable per-packet scratch.
    diff: BitVector,
    change: BitVector,
    window: BitVector,
    scratch: BitVector,
}

impl Encoder {
    /// Build an encoder from a validated configuration.
    ///
    /// Robustness values above 7 clamp to 7 without error.
    pub fn new(cfg: &CodecConfig) -> Result<Self, PocketError> {
        cfg.validate()?;
        let f = cfg.packet_bits;
        let initial_mask = cfg
            .initial_mask
            .clone()
            .unwrap_or_else(|| BitVector::new(f));

        let scheduler = if cfg.scheduling_enabled() {
            Some(PeriodScheduler::new(
                cfg.new_mask_period,
                cfg.send_mask_period,
                cfg.raw_period,
            ))
        } else {
            None
        };

        Ok(Self {
            packet_bits: f,
            robustness: cfg.clamped_robustness(),
            t: 0,
            mask: initial_mask.clone(),
            prev_mask: BitVector::new(f),
            build: BitVector::new(f),
            prev_build: BitVector::new(f),
            prev_input: BitVector::new(f),
            initial_mask,
            changes: ChangeHistory::new(f),
            requests: FlagHistory::new(),
            scheduler,
            diff: BitVector::new(f),
            change: BitVector::new(f),
            window: BitVector::new(f),
            scratch: BitVector::new(f),
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

    /// Number of packets processed since construction or the last reset.
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
        self.prev_mask.zero();
        self.build.zero();
        self.prev_build.zero();
        self.prev_input.zero();
        self.changes.clear();
        self.requests.clear();
        if let Some(sched) = &mut self.scheduler {
            sched.reset();
        }
    }

    /// Compress one packet with the automatic flag schedule (or all-manual
    /// zero flags when no schedule is configured).
    pub fn compress_next(
        &mut self,
        input: &BitVector,
        sink: &mut BitSink,
    ) -> Result<PacketFlags, PocketError> {
        let flags = match &mut self.scheduler {
            Some(sched) => sched.next(self.t, self.robustness),
            None => PacketFlags::default(),
        };
        self.compress_packet(input, flags, sink)?;
        Ok(flags)
    }

    /// Compress one packet under explicit control flags, appending its bit
    /// segment to `sink`.
    ///
    /// On success the encoder state has advanced by one packet.  The only
    /// runtime failure on a valid input is sink overflow; the sink may then
    /// hold a partial segment and the caller owns re-initialization.
    pub fn compress_packet(
        &mut self,
        input: &BitVector,
        flags: PacketFlags,
        sink: &mut BitSink,
    ) -> Result<(), PocketError> {
        if input.len() != self.packet_bits {
            return Err(PocketError::LengthMismatch {
                expected: self.packet_bits,
                actual: input.len(),
            });
        }

        // Mask evolution. The previous mask and build are snapshotted first;
        // packet 0 keeps the initial mask untouched.
        self.prev_mask.assign(&self.mask);
        self.prev_build.assign(&self.build);
        if self.t > 0 {
            self.diff.assign(input);
            self.diff.xor_assign(&self.prev_input);
            mask::update_build(&mut self.build, &self.diff, flags.new_mask, self.t);
            mask::update_mask(&mut self.mask, &self.diff, &self.prev_build, flags.new_mask);
        }
        mask::compute_change(&mut self.change, &self.mask, &self.prev_mask, self.t);

        // Robustness window: the current change OR-ed with up to Rt
        // predecessors, so a receiver that lost packets still learns every
        // recently-changed position.
        self.window.assign(&self.change);
        if self.robustness > 0 && self.t > 0 {
            for age in 1..=usize::from(self.robustness).min(self.t) {
                self.window.or_assign(self.changes.back(age));
            }
        }

        let vt = self.effective_robustness();
        let window_weight = self.window.count_ones();
        let ct = self.repeated_mask_request(vt, flags.new_mask);

        // ht: window, effective robustness, conditional update fields.
        rle::encode(sink, &self.window)?;
        sink.push_bits(u32::from(vt), 4)?;
        if vt > 0 && window_weight > 0 {
            let et = self
                .window
                .words()
                .iter()
                .zip(self.mask.words())
                .any(|(x, m)| (x & !m) != 0);
            sink.push_bit(et)?;
            if et {
                // New mask values at window positions, ascending, inverted.
                self.scratch.assign(&self.mask);
                self.scratch.invert();
                extract::extract_forward(sink, &self.scratch, &self.window)?;
                sink.push_bit(ct)?;
            }
        }
        let dt = !flags.send_mask && !flags.send_raw;
        sink.push_bit(dt)?;

        // qt: optional full-mask replacement, horizontally XOR-ed so mask
        // runs shrink to their boundary bits.
        if !dt {
            sink.push_bit(flags.send_mask)?;
            if flags.send_mask {
                self.scratch.assign(&self.mask);
                self.scratch.shift_left();
                self.scratch.xor_assign(&self.mask);
                rle::encode(sink, &self.scratch)?;
            }
        }

        // ut: payload.
        if flags.send_raw {
            sink.push_bit(true)?;
            count::encode(sink, self.packet_bits as u32)?;
            sink.push_vector(input, self.packet_bits)?;
        } else {
            if !dt {
                sink.push_bit(false)?;
            }
            if ct && vt > 0 {
                self.scratch.assign(&self.mask);
                self.scratch.or_assign(&self.window);
                extract::extract_reverse(sink, input, &self.scratch)?;
            } else {
                extract::extract_reverse(sink, input, &self.mask)?;
            }
        }

        // Advance.
        self.prev_input.assign(input);
        self.changes.push(&self.change);
        self.requests.push(flags.new_mask);
        self.t += 1;
        Ok(())
    }

    /// Effective robustness Vt: the configured level plus one for every
    /// consecutive change-free packet just outside the window, capped at 15.
    fn effective_robustness(&self) -> u8 {
        let r = usize::from(self.robustness);
        if self.t <= r {
            return self.robustness;
        }
        let mut v = r;
        let mut age = r + 1;
        while v < usize::from(EFFECTIVE_ROBUSTNESS_MAX) && age <= self.t {
            if self.changes.weight_back(age) != 0 {
                break;
            }
            v += 1;
            age += 1;
        }
        v as u8
    }

    /// Whether a new mask was requested at least twice within the current
    /// packet and the `vt` preceding ones.
    fn repeated_mask_request(&self, vt: u8, requested_now: bool) -> bool {
        if vt == 0 {
            return false;
        }
        let mut seen = usize::from(requested_now);
        for age in 1..=usize::from(vt).min(self.t) {
            if self.requests.back(age) {
                seen += 1;
                if seen >= 2 {
                    return true;
                }
            }
        }
        false
    }
}
