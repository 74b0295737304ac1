//! # bbdiag CLI
//!
//! Replays a baseband diagnostic capture through [`bbdiag_core`] and stores
//! the decoded radio messages as JSON lines.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                    bbdiag-cli                           │
//! │  ┌─────────────┐  ┌─────────────┐  ┌──────────────────┐ │
//! │  │ capture     │  │ config      │  │ lapdm            │ │
//! │  │ (hex lines) │  │ (JSON file) │  │ (Layer2Framer)   │ │
//! │  └──────┬──────┘  └──────┬──────┘  └────────┬─────────┘ │
//! │         │                │                  │           │
//! │         ▼                ▼                  ▼           │
//! │  ┌─────────────────────────────────────────────────────┐│
//! │  │              bbdiag_core::DiagInput                 ││
//! │  └──────────────────────────┬──────────────────────────┘│
//! │                             ▼                           │
//! │  ┌─────────────────────────────────────────────────────┐│
//! │  │              store::JsonLinesStore (RadioSink)      ││
//! │  └─────────────────────────────────────────────────────┘│
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Command-Line Interface
//!
//! See [`Cli`] for all available options. Key options:
//!
//! - `INPUT` - Capture file, one hex encoded record per line
//! - `-o, --output` - JSON-lines output file (default: stdout)
//! - `-c, --config` - Configuration file
//! - `-v` / `-q` - Increase / decrease verbosity

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::PathBuf;

use bbdiag_core::DiagInput;
use clap::Parser;
use log::{info, warn};
use miette::{miette, IntoDiagnostic, Result, WrapErr};

pub mod capture;
pub mod config;
pub mod lapdm;
pub mod store;

use capture::CaptureReader;
use config::Config;
use lapdm::LapdmFramer;
use store::JsonLinesStore;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser, Clone, Debug)]
#[command(version, about)]
pub struct Cli {
    #[clap(flatten)]
    pub verbose: clap_verbosity_flag::Verbosity<clap_verbosity_flag::InfoLevel>,

    /// Capture file with one hex encoded diagnostic record per line
    pub input: PathBuf,

    /// Write messages to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Configuration file (default: bbdiag.json in the config directory)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Session id, overrides the configuration
    #[arg(long)]
    pub session_id: Option<u32>,

    /// Id of the first stored message, overrides the configuration
    #[arg(long)]
    pub first_message_id: Option<u32>,
}

impl Cli {
    /// Configuration file with the command line overrides applied
    pub fn config(&self) -> Result<Config> {
        let mut config = Config::load(self.config.as_deref()).into_diagnostic()?;
        if let Some(session_id) = self.session_id {
            config.session.session_id = session_id;
        }
        if let Some(first_message_id) = self.first_message_id {
            config.session.first_message_id = first_message_id;
        }
        Ok(config)
    }
}

/// Counts of one run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub stats: bbdiag_core::DecodeStats,
    /// Capture lines that were not hex text
    pub invalid_lines: u64,
    pub stored: u64,
}

pub fn run(cli: &Cli) -> Result<RunSummary> {
    let config = cli.config()?;

    let file = File::open(&cli.input)
        .into_diagnostic()
        .wrap_err_with(|| format!("Cannot open capture {}", cli.input.display()))?;

    let writer: Box<dyn Write> = match &cli.output {
        Some(path) => Box::new(
            File::create(path)
                .into_diagnostic()
                .wrap_err_with(|| format!("Cannot create {}", path.display()))?,
        ),
        None => Box::new(io::stdout().lock()),
    };

    decode_capture(BufReader::new(file), BufWriter::new(writer), &config)
}

/// Decode every record of `capture` into `output`.
pub fn decode_capture<R, W>(capture: R, output: W, config: &Config) -> Result<RunSummary>
where
    R: io::BufRead,
    W: Write,
{
    let store = JsonLinesStore::new(output);
    let mut input = DiagInput::initialize(store, LapdmFramer, &config.session)
        .into_diagnostic()
        .wrap_err("Cannot start session")?;

    let mut invalid_lines = 0;
    for record in CaptureReader::new(capture) {
        match record {
            Ok(bytes) => input.process_record(&bytes),
            Err(e) if e.is_invalid_line() => {
                warn!("{}", e);
                invalid_lines += 1;
            }
            Err(e) => {
                let _ = input.shutdown();
                return Err(e).into_diagnostic();
            }
        }
    }

    let (store, stats) = input.shutdown();
    if config.report_stats {
        match serde_json::to_string(&stats) {
            Ok(json) => info!("Decode statistics: {}", json),
            Err(e) => warn!("Cannot format statistics: {}", e),
        }
        if invalid_lines > 0 {
            info!("{} capture lines were not hex text", invalid_lines);
        }
    }

    if store.write_failures() > 0 {
        return Err(miette!(
            "{} messages could not be stored",
            store.write_failures()
        ));
    }

    Ok(RunSummary {
        stats,
        invalid_lines,
        stored: store.written(),
    })
}
