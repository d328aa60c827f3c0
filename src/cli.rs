use clap::Parser;
use std::time::Duration;

use crate::reader::OpenOptions;

#[derive(Parser, Debug)]
#[command(name = "transread")]
#[command(version)]
#[command(about = "Read a local or remote file, decompressing it on the fly", long_about = None)]
#[command(after_help = "Examples:\n  \
  transread disk.img.bz2 -o disk.img          decompress to a file\n  \
  transread --info https://example.com/a.tgz  show what would be read\n  \
  transread --skip 512 --count 512 disk.gz    dump the second sector")]
pub struct Cli {
    /// File path or HTTP(S) URL
    #[arg(value_name = "FILE")]
    pub file: String,

    /// Write the data to PATH instead of stdout
    #[arg(short = 'o', long, value_name = "PATH")]
    pub output: Option<String>,

    /// Skip N bytes of decompressed data first
    #[arg(long, value_name = "N", default_value_t = 0)]
    pub skip: u64,

    /// Copy at most N bytes
    #[arg(long, value_name = "N")]
    pub count: Option<u64>,

    /// Print what was opened and exit
    #[arg(long)]
    pub info: bool,

    /// Use the proxy environment variables for URLs
    #[arg(long)]
    pub proxy: bool,

    /// HTTP timeout in seconds, 0 for none
    #[arg(long, value_name = "SECS", default_value_t = 30)]
    pub timeout: u64,

    /// Verbose logging (-vv => more verbose)
    #[arg(short = 'v', action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    pub fn open_options(&self) -> OpenOptions {
        let mut options = OpenOptions::new();
        options.use_proxy(self.proxy).timeout(match self.timeout {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        });
        options
    }

    pub fn log_level(&self) -> log::LevelFilter {
        match self.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_copy_options() {
        let cli = Cli::parse_from(["transread", "--skip", "512", "--count", "64", "-o", "out.img", "disk.gz"]);
        assert_eq!(cli.file, "disk.gz");
        assert_eq!(cli.skip, 512);
        assert_eq!(cli.count, Some(64));
        assert_eq!(cli.output.as_deref(), Some("out.img"));
        assert!(!cli.info);
    }

    #[test]
    fn zero_timeout_disables_it() {
        let cli = Cli::parse_from(["transread", "--timeout", "0", "--proxy", "disk.gz"]);
        let options = cli.open_options();
        assert_eq!(options.timeout, None);
        assert!(options.use_proxy);
    }

    #[test]
    fn verbosity_raises_log_level() {
        let cli = Cli::parse_from(["transread", "-vv", "disk.gz"]);
        assert_eq!(cli.log_level(), log::LevelFilter::Trace);
    }
}
