#![no_main]
use libfuzzer_sys::fuzz_target;
use pocketplus::CodecConfig;

fuzz_target!(|data: &[u8]| {
    // Feed arbitrary bytes through the decompressor at a few packet widths.
    // Err results are expected and fine; what we verify is no panics.
    for &(bits, robustness) in &[(720usize, 2u8), (64, 0), (13, 7)] {
        let cfg = CodecConfig::new(bits, robustness);
        let _ = pocketplus::decompress(data, &cfg);
    }
});
