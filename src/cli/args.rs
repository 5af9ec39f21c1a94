//! Command-line argument definitions for the `pocketplus` binary.
//!
//! The parse result carries everything the dispatch phase needs: operation
//! mode, codec parameters, filenames, and verbosity.  Codec parameters are
//! validated here where a range is statically known (robustness, packet
//! size); everything stream-dependent is left to the library.

use std::path::PathBuf;

use clap::Parser;

use crate::config::{
    CodecConfig, DEFAULT_NEW_MASK_PERIOD, DEFAULT_PACKET_BYTES, DEFAULT_RAW_PERIOD,
    DEFAULT_ROBUSTNESS, DEFAULT_SEND_MASK_PERIOD,
};

/// Lossless CCSDS 124.0-B-1 compression for fixed-length telemetry packets.
#[derive(Parser, Debug)]
#[command(name = "pocketplus", version, about, long_about = None)]
pub struct Cli {
    /// Input file; its length must be a whole number of packets.
    pub input: PathBuf,

    /// Decompress instead of compress.
    #[arg(short = 'd', long)]
    pub decompress: bool,

    /// Verify a compress/decompress round trip in memory; writes no output.
    #[arg(short = 't', long, conflicts_with_all = ["decompress", "output", "to_stdout"])]
    pub test: bool,

    /// Output file (defaults to <input>.pkt, or <input>.depkt with -d).
    #[arg(short = 'o', long)]
    pub output: Option<PathBuf>,

    /// Write the result to stdout instead of a file.
    #[arg(short = 'c', long = "stdout", conflicts_with = "output")]
    pub to_stdout: bool,

    /// Overwrite the output file if it already exists.
    #[arg(short = 'f', long)]
    pub force: bool,

    /// Packet size in bytes.
    #[arg(short = 'F', long, default_value_t = DEFAULT_PACKET_BYTES as u64,
          value_parser = clap::value_parser!(u64).range(1..=8191))]
    pub packet_size: u64,

    /// Robustness level: consecutive packet losses survivable without resync.
    #[arg(short = 'R', long, default_value_t = DEFAULT_ROBUSTNESS,
          value_parser = clap::value_parser!(u8).range(0..=7))]
    pub robustness: u8,

    /// Packets between automatic new-mask requests (compression only).
    #[arg(long = "pt", default_value_t = DEFAULT_NEW_MASK_PERIOD)]
    pub new_mask_period: usize,

    /// Packets between automatic full-mask transmissions (compression only).
    #[arg(long = "ft", default_value_t = DEFAULT_SEND_MASK_PERIOD)]
    pub send_mask_period: usize,

    /// Packets between automatic uncompressed packets (compression only).
    #[arg(long = "rt", default_value_t = DEFAULT_RAW_PERIOD)]
    pub raw_period: usize,

    /// Increase verbosity (repeatable).
    #[arg(short = 'v', action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress warnings; repeat to silence everything.
    #[arg(short = 'q', action = clap::ArgAction::Count, conflicts_with = "verbose")]
    pub quiet: u8,
}

impl Cli {
    /// Codec parameters implied by the parsed flags.
    pub fn codec_config(&self) -> CodecConfig {
        CodecConfig::with_periods(
            self.packet_size as usize * 8,
            self.robustness,
            self.new_mask_period,
            self.send_mask_period,
            self.raw_period,
        )
    }

    /// Display level implied by -v / -q.
    pub fn display_level(&self) -> u32 {
        (2 + u32::from(self.verbose)).saturating_sub(u32::from(self.quiet) * 2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("pocketplus").chain(args.iter().copied()))
    }

    #[test]
    fn defaults_match_housekeeping_profile() {
        let cli = parse(&["telemetry.bin"]).unwrap();
        assert_eq!(cli.packet_size, 90);
        assert_eq!(cli.robustness, 2);
        assert_eq!(cli.new_mask_period, 20);
        assert_eq!(cli.send_mask_period, 50);
        assert_eq!(cli.raw_period, 100);
        assert!(!cli.decompress);
        assert_eq!(cli.display_level(), 2);
    }

    #[test]
    fn robustness_range_is_enforced() {
        assert!(parse(&["in.bin", "-R", "7"]).is_ok());
        assert!(parse(&["in.bin", "-R", "8"]).is_err());
    }

    #[test]
    fn test_mode_excludes_output_options() {
        assert!(parse(&["in.bin", "-t"]).is_ok());
        assert!(parse(&["in.bin", "-t", "-o", "x"]).is_err());
        assert!(parse(&["in.bin", "-t", "-c"]).is_err());
        assert!(parse(&["in.bin", "-t", "-d"]).is_err());
    }

    #[test]
    fn verbosity_flags_shift_level() {
        assert_eq!(parse(&["in.bin", "-v"]).unwrap().display_level(), 3);
        assert_eq!(parse(&["in.bin", "-vv"]).unwrap().display_level(), 4);
        assert_eq!(parse(&["in.bin", "-q"]).unwrap().display_level(), 0);
        assert!(parse(&["in.bin", "-q", "-v"]).is_err());
    }

    #[test]
    fn codec_config_converts_bytes_to_bits() {
        let cli = parse(&["in.bin", "-F", "8", "-R", "3"]).unwrap();
        let cfg = cli.codec_config();
        assert_eq!(cfg.packet_bits, 64);
        assert_eq!(cfg.robustness, 3);
        assert!(cfg.scheduling_enabled());
    }
}
