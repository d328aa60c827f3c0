//! Main entry point for the transread CLI application.
//!
//! Copies the decompressed content of a local file or URL to stdout or to
//! an output file.

use anyhow::{Context, Result};
use clap::Parser;
use std::fs::File;
use std::io::{self, BufWriter, Read, SeekFrom, Write};

use transread::{Cli, TransRead};

fn main() -> Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(cli.log_level())
        .parse_default_env()
        .init();

    let mut reader = cli
        .open_options()
        .open(&cli.file)
        .with_context(|| format!("failed to open '{}'", cli.file))?;

    if cli.info {
        print_info(&reader);
        return Ok(());
    }

    if cli.skip > 0 {
        reader
            .seek(SeekFrom::Start(cli.skip))
            .with_context(|| format!("failed to skip {} bytes", cli.skip))?;
    }

    let copied = match &cli.output {
        Some(path) => {
            let file = File::create(path).with_context(|| format!("failed to create '{}'", path))?;
            let mut out = BufWriter::new(file);
            let copied = copy(&mut reader, &mut out, cli.count)?;
            out.flush()?;
            copied
        }
        None => copy(&mut reader, &mut io::stdout().lock(), cli.count)?,
    };

    log::info!("copied {} bytes from '{}'", copied, reader.name());
    if let Some(transferred) = reader.transferred_bytes() {
        log::info!("total bytes transferred: {}", format_size(transferred));
    }

    reader.close();
    Ok(())
}

/// Copy the rest of the reader, or at most `count` bytes of it.
fn copy<W: Write>(reader: &mut TransRead, out: &mut W, count: Option<u64>) -> Result<u64> {
    let name = reader.name().to_string();
    let copied = match count {
        Some(count) => io::copy(&mut reader.by_ref().take(count), out),
        None => io::copy(reader, out),
    };
    copied.with_context(|| format!("failed to read '{}'", name))
}

fn print_info(reader: &TransRead) {
    println!("name:       {}", reader.name());
    println!("format:     {}", reader.format());
    println!("location:   {}", if reader.is_remote() { "remote" } else { "local" });
    match reader.size() {
        Some(size) => println!("size:       {} ({})", size, format_size(size)),
        None => println!("size:       unknown"),
    }
}

/// Format a byte size into a human-readable string.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(format_size(500), "500 bytes");
/// assert_eq!(format_size(1536), "1.50 KB");
/// ```
fn format_size(size: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if size >= GB {
        format!("{:.2} GB", size as f64 / GB as f64)
    } else if size >= MB {
        format!("{:.2} MB", size as f64 / MB as f64)
    } else if size >= KB {
        format!("{:.2} KB", size as f64 / KB as f64)
    } else {
        format!("{} bytes", size)
    }
}
