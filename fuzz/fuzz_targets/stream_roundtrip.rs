#![no_main]
use libfuzzer_sys::fuzz_target;
use pocketplus::CodecConfig;

fuzz_target!(|data: &[u8]| {
    if data.len() < 2 {
        return;
    }
    // First two bytes pick the codec parameters, the rest is the stream.
    let packet_bytes = 1 + (data[0] as usize % 16);
    let robustness = data[1] % 8;
    let body = &data[2..];
    let usable = body.len() - body.len() % packet_bytes;
    if usable == 0 {
        return;
    }

    let cfg = CodecConfig::with_periods(packet_bytes * 8, robustness, 3, 5, 8);
    let stream = &body[..usable];
    let packed = pocketplus::compress(stream, &cfg).expect("compression failed");
    let restored = pocketplus::decompress(&packed, &cfg).expect("decompression failed");
    assert_eq!(
        restored, stream,
        "round-trip mismatch for F={} R={}",
        packet_bytes * 8,
        robustness
    );
});
