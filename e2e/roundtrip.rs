// e2e/roundtrip.rs — whole-stream round-trip identity and state synchrony.
//
// Drives the byte-buffer API and the packet-at-a-time API across packet
// widths, robustness levels, and flag schedules; every stream must come back
// bit-for-bit and both state machines must agree after every packet.

use pocketplus::{
    BitSink, BitSource, BitVector, CodecConfig, Decoder, Encoder, PacketFlags,
};

/// Small deterministic generator so streams are reproducible across runs.
struct XorShift(u64);

impl XorShift {
    fn new(seed: u64) -> Self {
        Self(seed.max(1))
    }

    fn next(&mut self) -> u64 {
        self.0 ^= self.0 << 13;
        self.0 ^= self.0 >> 7;
        self.0 ^= self.0 << 17;
        self.0
    }

    fn byte(&mut self) -> u8 {
        (self.next() >> 32) as u8
    }
}

fn assert_roundtrip(data: &[u8], cfg: &CodecConfig) {
    let packed = pocketplus::compress(data, cfg).expect("compression failed");
    let restored = pocketplus::decompress(&packed, cfg).expect("decompression failed");
    assert_eq!(
        restored, data,
        "round-trip mismatch: F={}, R={}",
        cfg.packet_bits, cfg.robustness
    );
}

// ── 1. Seed scenarios on 90-byte packets ─────────────────────────────────────

#[test]
fn constant_stream_simple() {
    // 100 identical all-zero packets; output must shrink well below input.
    let cfg = CodecConfig::with_periods(720, 1, 10, 20, 50);
    let data = vec![0u8; 90 * 100];
    let packed = pocketplus::compress(&data, &cfg).unwrap();
    assert!(
        packed.len() < 9000 / 4,
        "constant stream barely compressed: {} bytes",
        packed.len()
    );
    assert_eq!(pocketplus::decompress(&packed, &cfg).unwrap(), data);
}

#[test]
fn heavy_toggling_high_robustness_hiro() {
    // Aggressive bit churn under the maximum robustness level.
    let cfg = CodecConfig::with_periods(720, 7, 10, 20, 50);
    let mut rng = XorShift::new(0x6869_726F);
    let mut packet = vec![0u8; 90];
    let mut data = Vec::with_capacity(90 * 100);
    for _ in 0..100 {
        for _ in 0..8 {
            let at = (rng.next() as usize) % 90;
            packet[at] ^= rng.byte();
        }
        data.extend_from_slice(&packet);
    }
    assert_roundtrip(&data, &cfg);
}

#[test]
fn long_pseudo_housekeeping_stream() {
    // 10 000 packets: a handful of churning counters and analog words on an
    // otherwise static frame.
    let cfg = CodecConfig::with_periods(720, 2, 20, 50, 100);
    let mut rng = XorShift::new(0x484b_3130);
    let base: Vec<u8> = (0..90).map(|i| (i * 7) as u8).collect();
    let mut data = Vec::with_capacity(90 * 10_000);
    for t in 0..10_000u32 {
        let mut packet = base.clone();
        packet[0] = (t >> 8) as u8;
        packet[1] = t as u8;
        packet[17] = (t / 3) as u8;
        packet[42] = 0x40 | ((rng.byte()) & 0x07);
        packet[43] = rng.byte() & 0x1F;
        data.extend_from_slice(&packet);
    }
    let packed = pocketplus::compress(&data, &cfg).unwrap();
    assert!(packed.len() < data.len());
    assert_eq!(pocketplus::decompress(&packed, &cfg).unwrap(), data);
}

#[test]
#[ignore = "long soak: mission-length stream, run with --ignored"]
fn mission_length_stream_soak() {
    // Attitude-control-like telemetry at full mission length (151 200
    // packets of 90 bytes).
    let cfg = CodecConfig::with_periods(720, 2, 20, 50, 100);
    let mut rng = XorShift::new(0x5645_5844);
    let mut packet = vec![0u8; 90];
    let mut data = Vec::with_capacity(90 * 151_200);
    for t in 0..151_200u32 {
        packet[0] = (t >> 16) as u8;
        packet[1] = (t >> 8) as u8;
        packet[2] = t as u8;
        // Slow sinusoid-ish wander on a few wheel-speed words.
        let phase = (t / 64) as u8;
        packet[10] = phase.wrapping_mul(3);
        packet[11] = phase.rotate_left(2);
        if t % 97 == 0 {
            let at = 20 + (rng.next() as usize) % 60;
            packet[at] = rng.byte();
        }
        data.extend_from_slice(&packet);
    }
    assert_roundtrip(&data, &cfg);
}

// ── 2. Boundary packet widths ────────────────────────────────────────────────

#[test]
fn boundary_widths_with_single_toggling_bit() {
    for &f in &[1usize, 7, 8, 31, 32, 33, 63, 64, 719, 720, 721] {
        for &r in &[0u8, 1, 3, 7] {
            let cfg = CodecConfig::with_periods(f, r, 3, 4, 6);
            let mut data = Vec::new();
            let mut packet = BitVector::new(f);
            for t in 0..10usize {
                // Walk a toggle across the first, middle, and last position.
                let pos = match t % 3 {
                    0 => 0,
                    1 => f / 2,
                    _ => f - 1,
                };
                packet.set(pos, !packet.bit(pos));
                packet.extend_bytes(&mut data);
            }
            assert_roundtrip(&data, &cfg);
        }
    }
}

#[test]
fn widest_supported_packet_roundtrips() {
    let cfg = CodecConfig::with_periods(65535, 1, 5, 7, 11);
    let mut rng = XorShift::new(0xFFFF);
    let mut packet = BitVector::new(65535);
    let mut data = Vec::new();
    for _ in 0..6 {
        for _ in 0..4 {
            packet.set((rng.next() as usize) % 65535, true);
        }
        packet.extend_bytes(&mut data);
    }
    assert_roundtrip(&data, &cfg);
}

// ── 3. Robustness and schedule sweeps ────────────────────────────────────────

#[test]
fn robustness_sweep_on_noisy_stream() {
    let mut rng = XorShift::new(0xDADA);
    let base: Vec<u8> = (0..32).map(|_| rng.byte()).collect();
    for r in 0..=7u8 {
        let cfg = CodecConfig::with_periods(256, r, 5, 9, 13);
        let mut data = Vec::new();
        let mut packet = base.clone();
        for _ in 0..60 {
            packet[(rng.next() as usize) % 32] ^= 1u8 << (rng.next() % 8);
            data.extend_from_slice(&packet);
        }
        assert_roundtrip(&data, &cfg);
    }
}

#[test]
fn degenerate_periods_fire_every_packet() {
    // pt = ft = rt = 1: every packet requests everything at once.
    let cfg = CodecConfig::with_periods(64, 2, 1, 1, 1);
    let mut rng = XorShift::new(7);
    let data: Vec<u8> = (0..64 * 8).map(|_| rng.byte()).collect();
    assert_roundtrip(&data, &cfg);
}

#[test]
fn manual_flags_roundtrip_packet_by_packet() {
    // Exercise explicit flag combinations, including repeated new-mask
    // requests that trigger the extended extraction mask.
    let f = 96;
    let cfg = CodecConfig::new(f, 2);
    let mut enc = Encoder::new(&cfg).unwrap();
    let mut dec = Decoder::new(&cfg).unwrap();
    let mut sink = BitSink::new();
    let mut rng = XorShift::new(0xF1A6);

    let schedule = [
        PacketFlags { new_mask: false, send_mask: true, send_raw: true },
        PacketFlags { new_mask: false, send_mask: false, send_raw: false },
        PacketFlags { new_mask: true, send_mask: false, send_raw: false },
        PacketFlags { new_mask: true, send_mask: false, send_raw: false },
        PacketFlags { new_mask: false, send_mask: true, send_raw: false },
        PacketFlags { new_mask: true, send_mask: false, send_raw: false },
        PacketFlags { new_mask: false, send_mask: false, send_raw: true },
        PacketFlags { new_mask: false, send_mask: false, send_raw: false },
    ];

    let mut packet = BitVector::new(f);
    for (i, &flags) in schedule.iter().enumerate() {
        packet.set((rng.next() as usize) % f, (rng.next() & 1) != 0);
        sink.clear();
        enc.compress_packet(&packet, flags, &mut sink).unwrap();
        let nbits = sink.len();
        let bytes = sink.to_bytes();

        let mut src = BitSource::new(&bytes, nbits);
        let out = dec.decompress_packet(&mut src).unwrap();
        assert_eq!(out, &packet, "payload diverged at packet {i}");
        assert_eq!(src.remaining(), 0, "unconsumed bits at packet {i}");
        assert_eq!(dec.mask(), enc.mask(), "mask diverged at packet {i}");
        assert_eq!(dec.packets_processed(), enc.packets_processed());
    }
}

#[test]
fn state_synchrony_under_automatic_schedule() {
    let cfg = CodecConfig::with_periods(720, 3, 7, 11, 23);
    let mut enc = Encoder::new(&cfg).unwrap();
    let mut dec = Decoder::new(&cfg).unwrap();
    let mut sink = BitSink::new();
    let mut rng = XorShift::new(0x51ac);

    let mut bytes = vec![0u8; 90];
    for t in 0..200usize {
        if t % 5 == 0 {
            bytes[(rng.next() as usize) % 90] = rng.byte();
        }
        let input = BitVector::from_bytes(&bytes, 720);
        sink.clear();
        enc.compress_next(&input, &mut sink).unwrap();
        let nbits = sink.len();
        let seg = sink.to_bytes();
        let mut src = BitSource::new(&seg, nbits);
        let out = dec.decompress_packet(&mut src).unwrap();
        assert_eq!(out, &input, "payload diverged at packet {t}");
        assert_eq!(dec.mask(), enc.mask(), "mask diverged at packet {t}");
    }
}

// ── 4. Instance reuse ────────────────────────────────────────────────────────

#[test]
fn reset_allows_back_to_back_streams() {
    let cfg = CodecConfig::with_periods(64, 1, 3, 5, 8);
    let mut enc = Encoder::new(&cfg).unwrap();
    let mut rng = XorShift::new(42);

    let mut stream_bytes = Vec::new();
    let mut sink = BitSink::new();
    let inputs: Vec<BitVector> = (0..10)
        .map(|_| {
            let raw: Vec<u8> = (0..8).map(|_| rng.byte()).collect();
            BitVector::from_bytes(&raw, 64)
        })
        .collect();

    for input in &inputs {
        enc.compress_next(input, &mut sink).unwrap();
        sink.drain_into(&mut stream_bytes);
    }
    let first = stream_bytes.clone();

    // A reset instance must reproduce the stream bit-for-bit.
    enc.reset();
    stream_bytes.clear();
    for input in &inputs {
        enc.compress_next(input, &mut sink).unwrap();
        sink.drain_into(&mut stream_bytes);
    }
    assert_eq!(first, stream_bytes);
}

#[test]
fn caller_supplied_initial_mask_roundtrips() {
    let f = 128;
    let mut initial = BitVector::new(f);
    for p in (0..f).step_by(5) {
        initial.set(p, true);
    }
    let mut cfg = CodecConfig::with_periods(f, 1, 4, 6, 9);
    cfg.initial_mask = Some(initial);

    let mut rng = XorShift::new(0x1111);
    let mut data = Vec::new();
    let mut packet = vec![0u8; 16];
    for _ in 0..30 {
        packet[(rng.next() as usize) % 16] ^= rng.byte() & 0x11;
        data.extend_from_slice(&packet);
    }
    assert_roundtrip(&data, &cfg);
}
