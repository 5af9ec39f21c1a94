// e2e/wire_format.rs — bit-exact field encodings.
//
// The wire format is load-bearing: any re-ordering or width change breaks
// interoperability with conforming peers.  These tests pin the COUNT code
// widths, the run-length list shape, both extraction orders, and the layout
// of the uncompressed-packet path.

use pocketplus::coding::{count, extract, rle};
use pocketplus::{
    BitSink, BitSource, BitVector, CodecConfig, Encoder, PacketFlags,
};

fn encoded_count(a: u32) -> (Vec<u8>, usize) {
    let mut sink = BitSink::new();
    count::encode(&mut sink, a).unwrap();
    let len = sink.len();
    (sink.to_bytes(), len)
}

// ── COUNT widths and round trips ─────────────────────────────────────────────

#[test]
fn count_boundary_widths() {
    assert_eq!(encoded_count(1).1, 1);
    assert_eq!(encoded_count(33).1, 8);
    assert_eq!(encoded_count(34).1, 9);
    // 65535 needs a 26-bit value field after the three-bit prefix.
    assert_eq!(encoded_count(65535).1, 29);
}

#[test]
fn count_patterns_match_table() {
    // 1 -> '0'
    assert_eq!(encoded_count(1).0, vec![0x00]);
    // 2 -> '110' || 00000
    assert_eq!(encoded_count(2).0, vec![0xC0]);
    // 33 -> '110' || 11111
    assert_eq!(encoded_count(33).0, vec![0xDF]);
    // 34 -> '111' || 100000
    assert_eq!(encoded_count(34).0, vec![0b1111_0000, 0b0000_0000]);
}

#[test]
fn count_roundtrip_random_sample() {
    for a in (1..=65535u32).step_by(251) {
        let (bytes, len) = encoded_count(a);
        let mut src = BitSource::new(&bytes, len);
        assert_eq!(count::decode(&mut src).unwrap(), a);
        assert_eq!(src.remaining(), 0, "trailing bits for {a}");
    }
}

// ── Run-length list shape ────────────────────────────────────────────────────

#[test]
fn empty_vector_encodes_to_bare_terminator() {
    for f in [1usize, 9, 64, 720, 4096, 65535] {
        let v = BitVector::new(f);
        let mut sink = BitSink::new();
        rle::encode(&mut sink, &v).unwrap();
        assert_eq!(sink.len(), 2, "F = {f}");
        assert_eq!(sink.to_bytes(), vec![0x80]);
    }
}

#[test]
fn single_bit_vector_is_count_of_gap_plus_terminator() {
    let f = 720usize;
    for p in [0usize, 1, 100, 360, 718, 719] {
        let mut v = BitVector::new(f);
        v.set(p, true);
        let mut sink = BitSink::new();
        rle::encode(&mut sink, &v).unwrap();

        let mut expected = BitSink::new();
        count::encode(&mut expected, (f - p) as u32).unwrap();
        count::encode_terminator(&mut expected).unwrap();
        assert_eq!(sink.to_bytes(), expected.to_bytes(), "p = {p}");
    }
}

#[test]
fn rle_roundtrip_on_random_vectors() {
    let mut state = 0x9E37_79B9_7F4A_7C15u64;
    for f in [5usize, 32, 90, 721, 5000] {
        let mut v = BitVector::new(f);
        for _ in 0..f / 3 {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            v.set((state as usize) % f, true);
        }
        let mut sink = BitSink::new();
        rle::encode(&mut sink, &v).unwrap();
        let nbits = sink.len();
        let bytes = sink.to_bytes();
        let mut src = BitSource::new(&bytes, nbits);
        let mut out = BitVector::new(f);
        rle::decode(&mut src, &mut out).unwrap();
        assert_eq!(out, v, "F = {f}");
        assert_eq!(src.remaining(), 0);
    }
}

// ── Extraction orderings ─────────────────────────────────────────────────────

#[test]
fn reverse_and_forward_orders_differ_as_specified() {
    // Data 0b1100_0001, mask all ones: forward reads the bits as written,
    // reverse emits them highest-position-first.
    let data = BitVector::from_bytes(&[0b1100_0001], 8);
    let mask = BitVector::from_bytes(&[0xFF], 8);

    let mut fwd = BitSink::new();
    extract::extract_forward(&mut fwd, &data, &mask).unwrap();
    assert_eq!(fwd.to_bytes(), vec![0b1100_0001]);

    let mut rev = BitSink::new();
    extract::extract_reverse(&mut rev, &data, &mask).unwrap();
    assert_eq!(rev.to_bytes(), vec![0b1000_0011]);
}

#[test]
fn insertion_is_dual_of_reverse_extraction() {
    let mut state = 0xABCDu64;
    for f in [8usize, 33, 64, 400] {
        let mut data = BitVector::new(f);
        let mut mask = BitVector::new(f);
        for p in 0..f {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            data.set(p, (state & (1 << 17)) != 0);
            mask.set(p, (state & (1 << 29)) != 0);
        }

        let mut sink = BitSink::new();
        extract::extract_reverse(&mut sink, &data, &mask).unwrap();
        let nbits = sink.len();
        assert_eq!(nbits, mask.count_ones());
        let bytes = sink.to_bytes();

        let mut src = BitSource::new(&bytes, nbits);
        let mut rebuilt = BitVector::new(f);
        extract::insert_reverse(&mut src, &mut rebuilt, &mask).unwrap();

        let mut expected = data.clone();
        expected.and_assign(&mask);
        assert_eq!(rebuilt, expected, "F = {f}");
    }
}

// ── Uncompressed-packet layout ───────────────────────────────────────────────

#[test]
fn raw_path_carries_count_f_then_packet_bits() {
    // ft = 0, rt = 1, empty window: the segment tail after the header bits
    // is exactly COUNT(F) followed by the packet verbatim.
    let f = 720usize;
    let cfg = CodecConfig::new(f, 0);
    let mut enc = Encoder::new(&cfg).unwrap();
    let payload: Vec<u8> = (0..90).map(|i| (i * 11) as u8).collect();
    let input = BitVector::from_bytes(&payload, f);

    let mut sink = BitSink::new();
    enc.compress_packet(
        &input,
        PacketFlags {
            new_mask: false,
            send_mask: false,
            send_raw: true,
        },
        &mut sink,
    )
    .unwrap();
    let nbits = sink.len();
    let bytes = sink.to_bytes();
    let mut src = BitSource::new(&bytes, nbits);

    // Header: empty window, Vt = 0, dt = 0, ft = 0, rt = 1.
    assert_eq!(count::decode(&mut src).unwrap(), 0);
    assert_eq!(src.read_bits(4).unwrap(), 0);
    assert!(!src.read_bit().unwrap()); // dt
    assert!(!src.read_bit().unwrap()); // ft
    assert!(src.read_bit().unwrap()); // rt

    // Payload: COUNT(F) then the 720 input bits unmodified.
    assert_eq!(count::decode(&mut src).unwrap() as usize, f);
    let mut carried = Vec::with_capacity(90);
    for _ in 0..90 {
        carried.push(src.read_bits(8).unwrap() as u8);
    }
    assert_eq!(carried, payload);
    assert_eq!(src.remaining(), 0);
}

#[test]
fn segments_are_byte_aligned_in_streams() {
    // Period limits of 1 force every packet uncompressed; with constant
    // input each raw 24-bit segment is "10" + Vt(4) + dt(1) + ft(1) +
    // "10"(mask) + rt(1) + COUNT(24)(8) + 24 data bits = 43 bits, padded to
    // six whole bytes.
    let cfg = CodecConfig::with_periods(24, 0, 1, 1, 1);
    let data = vec![0x5Au8; 12]; // four identical 3-byte packets
    let packed = pocketplus::compress(&data, &cfg).unwrap();
    assert_eq!(packed.len(), 4 * 6);
    assert_eq!(pocketplus::decompress(&packed, &cfg).unwrap(), data);
}

// ── Byte-order invariants of the packet container ───────────────────────────

#[test]
fn bitvector_byte_identity_when_aligned() {
    let mut state = 1u64;
    for len_bytes in [1usize, 2, 7, 90] {
        let bytes: Vec<u8> = (0..len_bytes)
            .map(|_| {
                state = state.wrapping_mul(48271) % 0x7FFF_FFFF;
                state as u8
            })
            .collect();
        let v = BitVector::from_bytes(&bytes, len_bytes * 8);
        assert_eq!(v.to_bytes(), bytes);
    }
}

#[test]
fn bitvector_pads_unaligned_tail_with_zeros() {
    let v = BitVector::from_bytes(&[0xFF, 0xFF, 0xFF], 21);
    let out = v.to_bytes();
    assert_eq!(out.len(), 3);
    assert_eq!(out[2] & 0x07, 0, "low padding bits must be zero");
    assert_eq!(out[..2], [0xFF, 0xFF]);
}
