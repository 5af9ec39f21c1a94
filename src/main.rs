//! Binary entry point for the `pocketplus` command-line tool.
//!
//! Handles post-parse validation, automatic output filename resolution, and
//! operation dispatch (compress, decompress, round-trip test).  All file
//! handling lives here; the library core never touches the filesystem.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::Parser;
use xxhash_rust::xxh64::xxh64;

use pocketplus::cli::args::Cli;
use pocketplus::cli::constants::{
    display_level, set_display_level, DEPKT_EXTENSION, PKT_EXTENSION,
};
use pocketplus::displaylevel;

/// Resolve the output filename when `-o` was not given.
fn default_output_name(input: &Path, decompressing: bool) -> PathBuf {
    let name = input.to_string_lossy();
    if decompressing {
        match name.strip_suffix(PKT_EXTENSION) {
            Some(base) => PathBuf::from(format!("{base}{DEPKT_EXTENSION}")),
            None => PathBuf::from(format!("{name}{DEPKT_EXTENSION}")),
        }
    } else {
        PathBuf::from(format!("{name}{PKT_EXTENSION}"))
    }
}

/// Write `bytes` to `path`, refusing to clobber an existing file without -f.
fn write_output(path: &Path, bytes: &[u8], force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        bail!(
            "{} already exists; use -f to overwrite",
            path.display()
        );
    }
    fs::write(path, bytes)
        .with_context(|| format!("cannot write {}", path.display()))?;
    Ok(())
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let cfg = cli.codec_config();
    let packet_bytes = cli.packet_size as usize;

    let data = fs::read(&cli.input)
        .with_context(|| format!("cannot read {}", cli.input.display()))?;
    if data.is_empty() {
        bail!("{} is empty", cli.input.display());
    }

    // ── Round-trip test mode ────────────────────────────────────────────────
    if cli.test {
        if data.len() % packet_bytes != 0 {
            bail!(
                "input size {} is not a multiple of the packet size {}",
                data.len(),
                packet_bytes
            );
        }
        let packed = pocketplus::compress(&data, &cfg).context("compression failed")?;
        let restored = pocketplus::decompress(&packed, &cfg).context("decompression failed")?;
        if xxh64(&restored, 0) != xxh64(&data, 0) || restored != data {
            bail!("round-trip mismatch: decompressed output differs from input");
        }
        displaylevel!(
            2,
            "{}: OK ({} bytes -> {} bytes, {:.2}x)",
            cli.input.display(),
            data.len(),
            packed.len(),
            data.len() as f64 / packed.len() as f64
        );
        return Ok(());
    }

    // ── Compress / decompress dispatch ──────────────────────────────────────
    let result = if cli.decompress {
        pocketplus::decompress(&data, &cfg).context("decompression failed")?
    } else {
        if data.len() % packet_bytes != 0 {
            bail!(
                "input size {} is not a multiple of the packet size {}",
                data.len(),
                packet_bytes
            );
        }
        pocketplus::compress(&data, &cfg).context("compression failed")?
    };

    if cli.to_stdout {
        std::io::stdout()
            .write_all(&result)
            .context("cannot write to stdout")?;
    } else {
        let output = cli
            .output
            .clone()
            .unwrap_or_else(|| default_output_name(&cli.input, cli.decompress));
        write_output(&output, &result, cli.force)?;

        let packets = if cli.decompress {
            result.len() / packet_bytes
        } else {
            data.len() / packet_bytes
        };
        displaylevel!(
            2,
            "{} -> {} ({} bytes -> {} bytes, {} packets, R={}, pt={}, ft={}, rt={})",
            cli.input.display(),
            output.display(),
            data.len(),
            result.len(),
            packets,
            cli.robustness,
            cli.new_mask_period,
            cli.send_mask_period,
            cli.raw_period
        );
    }
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    set_display_level(cli.display_level());

    // With -c, stdout carries the data; summaries drop to errors-only.
    if cli.to_stdout && display_level() == 2 {
        set_display_level(1);
    }

    if let Err(err) = run(&cli) {
        displaylevel!(1, "pocketplus: {err:#}");
        std::process::exit(1);
    }
}
