use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use winget_bootstrap_core::ManifestSource;

/// Installs the Windows Package Manager and its runtime dependencies
#[derive(Parser, Debug)]
#[command(name = "winget-bootstrap")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(
    about = "Installs winget and its runtime libraries, falling back to Chocolatey",
    long_about = None
)]
pub struct Args {
    /// Directory artifacts are downloaded into (defaults to <TEMP>/winget-bootstrap)
    #[arg(long = "staging-dir", value_name = "DIR")]
    pub staging_dir: Option<PathBuf>,

    /// Report failures and continue with the next step instead of stopping
    #[arg(short = 'k', long = "keep-going")]
    pub keep_going: bool,

    /// Where the runtime libraries come from
    #[arg(long = "source", value_enum, default_value_t = SourceArg::Direct)]
    pub source: SourceArg,

    /// Do not wait for Enter after failures and warnings
    #[arg(long = "no-pause")]
    pub no_pause: bool,

    /// Do not write an installation log file into the staging directory
    #[arg(long = "no-log-file")]
    pub no_log_file: bool,

    /// Show what is staged and installed without changing anything
    #[arg(long = "check")]
    pub check: bool,

    /// Write the run report as JSON to this file
    #[arg(long = "report", value_name = "FILE")]
    pub report: Option<PathBuf>,

    /// Verbose logging
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceArg {
    /// Download each runtime library from its own release
    Direct,
    /// Copy the runtime libraries out of the release's dependencies zip
    Archive,
}

impl From<SourceArg> for ManifestSource {
    fn from(source: SourceArg) -> Self {
        match source {
            SourceArg::Direct => ManifestSource::DirectDownloads,
            SourceArg::Archive => ManifestSource::DependencyArchive,
        }
    }
}

/// Parses command-line arguments
pub fn parse_args() -> Args {
    Args::parse()
}
