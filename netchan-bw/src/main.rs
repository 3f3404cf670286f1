//! `nic-bw`: CBS parameters and `tc` commands for the transmit channels of a netchan manifest.

use std::{
    io::{self, Write},
    path::PathBuf,
    process::ExitCode,
};

use clap::{CommandFactory, Parser, ValueEnum};
use netchan_cbs::{
    compute, split_tx_streams,
    tc::{QdiscAction, DEFAULT_DEVICE},
    units::Kbps,
};
use netchan_manifest::{parse_file, ManifestError};
use thiserror::Error;
use tracing_subscriber::EnvFilter;

mod report;

use report::ReportOptions;

/// Calculate idleSlope, sendSlope, hiCredit and loCredit based on argumentlist and manifest.
#[derive(Debug, Parser)]
#[command(name = "nic-bw", version)]
struct Cli {
    /// netchan manifest header declaring the channels.
    #[arg(short, long)]
    manifest: Option<PathBuf>,

    /// Print the per channel breakdown and debug logs.
    #[arg(short, long)]
    verbose: bool,

    /// Comma separated names of the outgoing streams on this system.
    #[arg(short, long)]
    txstreams: Option<String>,

    /// Provide a (short) list of all streams declared in the manifest.
    #[arg(short, long)]
    list: bool,

    /// Speed of the link we're configuring in kbit/s.
    #[arg(short = 'L', long, default_value_t = 1_000_000, value_parser = clap::value_parser!(i64).range(1..))]
    link_speed: i64,

    /// NIC to generate the commands for.
    #[arg(short, long, default_value = DEFAULT_DEVICE)]
    device: String,

    /// Whether the cbs qdiscs are added or replace existing ones.
    #[arg(long, value_enum, default_value_t = Action::Replace)]
    action: Action,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Action {
    Add,
    Replace,
}

impl From<Action> for QdiscAction {
    fn from(action: Action) -> Self {
        match action {
            Action::Add => Self::Add,
            Action::Replace => Self::Replace,
        }
    }
}

#[derive(Debug, Error)]
enum Error {
    #[error(transparent)]
    Manifest(#[from] ManifestError),
    #[error("failed to write output: {0}")]
    Io(#[from] io::Error),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "error" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(io::stderr)
        .init();

    let Some(manifest) = cli.manifest.clone() else {
        eprintln!("Need manifest-file to parse");
        // Best effort, we are failing anyway.
        let _ = Cli::command().write_help(&mut io::stderr());
        return ExitCode::FAILURE;
    };

    match run(&cli, manifest) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli, manifest: PathBuf) -> Result<(), Error> {
    let manifest = parse_file(&manifest)?;
    tracing::debug!(
        channels = manifest.registry().len(),
        warnings = manifest.warnings().len(),
        "parsed manifest"
    );

    let mut out = io::stdout().lock();
    report::write_manifest_warnings(&mut out, manifest.warnings())?;

    if cli.list {
        report::write_channel_table(&mut out, manifest.registry())?;
    } else {
        let tx = cli.txstreams.as_deref().unwrap_or_default();
        let report =
            compute(manifest.registry(), split_tx_streams(tx), Kbps::new(cli.link_speed));

        let options = ReportOptions::default()
            .device(cli.device.as_str())
            .action(cli.action.into())
            .verbose(cli.verbose);
        report::write_report(&mut out, manifest.registry(), &report, &options)?;
    }

    out.flush()?;
    Ok(())
}
