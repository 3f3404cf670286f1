//! Human readable output of `nic-bw`.
//!
//! Everything is written to an [`io::Write`] so the output can be captured in tests. Warnings
//! that stop nothing go to the same stream as the report.

use std::io::{self, Write};

use netchan_cbs::{
    tc::{command_line, inspect_commands, CbsQdisc, MqprioQdisc, QdiscAction, DEFAULT_DEVICE},
    BandwidthReport, ChannelBandwidth, ClassParams, ShaperWarning,
};
use netchan_manifest::{ChannelRegistry, ManifestWarning, StreamClass};

const RULE_WIDTH: usize = 80;

const BANNER: [&str; 5] = [
    "",
    "Idleslope too small, rounding error, increasing to 1",
    "",
    "      Perhaps ETF is really what you want?",
    "",
];

/// Options for the report.
#[derive(Debug, Clone)]
pub(crate) struct ReportOptions {
    /// NIC the commands are generated for.
    pub(crate) device: String,
    /// Whether the `cbs` qdiscs are added or replaced.
    pub(crate) action: QdiscAction,
    /// Also print the bandwidth breakdown of every transmit channel.
    pub(crate) verbose: bool,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self { device: DEFAULT_DEVICE.to_string(), action: QdiscAction::default(), verbose: false }
    }
}

impl ReportOptions {
    /// Sets the NIC the commands are generated for.
    pub(crate) fn device(mut self, device: impl Into<String>) -> Self {
        self.device = device.into();
        self
    }

    /// Sets the `tc` verb for the `cbs` qdiscs.
    pub(crate) fn action(mut self, action: QdiscAction) -> Self {
        self.action = action;
        self
    }

    /// Enables the per channel breakdown.
    pub(crate) fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}

/// Writes the problems found in the manifest, one per line.
pub(crate) fn write_manifest_warnings<W: Write>(
    out: &mut W,
    warnings: &[ManifestWarning],
) -> io::Result<()> {
    for warning in warnings {
        writeln!(out, "{warning}")?;
    }

    Ok(())
}

/// Writes the short table of every channel declared in the manifest, class A first.
///
/// Nothing is written for an empty registry.
pub(crate) fn write_channel_table<W: Write>(
    out: &mut W,
    registry: &ChannelRegistry,
) -> io::Result<()> {
    if registry.is_empty() {
        return Ok(());
    }

    writeln!(out, " Class | StreamID |     Name     |  Hz  | sz")?;
    writeln!(out, "-------+----------+--------------+------+---------")?;
    for class in StreamClass::ALL {
        for ch in registry.by_class(class) {
            writeln!(
                out,
                " {:^5} | {:^8} | {:>12} | {:>4} | {}",
                class.letter(),
                ch.stream_id().unwrap_or("-"),
                ch.name(),
                ch.frequency_hz(),
                ch.size_bytes()
            )?;
        }
    }

    Ok(())
}

/// Writes the advisory problems of a bandwidth computation.
pub(crate) fn write_shaper_warnings<W: Write>(
    out: &mut W,
    warnings: &[ShaperWarning],
) -> io::Result<()> {
    for warning in warnings {
        match warning {
            ShaperWarning::DegenerateBandwidth { .. } => {
                for line in BANNER {
                    writeln!(out, "!!! {line:<52} !!!")?;
                }
                writeln!(out, "{warning}")?;
                writeln!(out)?;
            }
            _ => writeln!(out, "{warning}")?,
        }
    }

    Ok(())
}

/// Writes how the reservation of a single channel is derived.
pub(crate) fn write_channel_bandwidth<W: Write>(
    out: &mut W,
    bw: &ChannelBandwidth,
) -> io::Result<()> {
    writeln!(out, "{} ({}, {} Hz)", bw.name, bw.class, bw.frequency_hz)?;
    writeln!(out, "\t{:<18}: {}", "Header overhead", ChannelBandwidth::header_overhead())?;
    writeln!(out, "\t{:<18}: {}", "Payload data", bw.size_bytes)?;
    writeln!(out, "\t{:<18}: {}", "Full payload size", bw.payload_bytes)?;
    writeln!(out, "\t{:<18}: {}", "Frame-size", bw.frame_bytes)?;
    writeln!(out, "\t{:<18}: {:.3} %", "SnR", bw.efficiency_percent())?;
    writeln!(out, "\t{:<18}: {}", "dps", bw.data_rate)?;
    writeln!(out, "\t{:<18}: {} kbps", "idleSlope", bw.idle_slope)?;
    writeln!(out)
}

fn write_class<W: Write>(out: &mut W, params: &ClassParams) -> io::Result<()> {
    writeln!(out, "CBS {}:", params.class)?;
    writeln!(out, "\tbandwidth: {:8} kbps", params.bandwidth)?;
    writeln!(out, "\tidleslope: {:8}", params.idle_slope)?;
    writeln!(out, "\tsendSlope: {:8}", params.send_slope)?;
    writeln!(out, "\thiCredit:  {:8}", params.hi_credit)?;
    writeln!(out, "\tloCredit:  {:8}", params.lo_credit)?;
    writeln!(out, "\tmaxBurstSize:  {:8}", params.max_burst_size)?;
    writeln!(out, "\tmaxInterferenceTime: {:.3} ms", params.interference_time.as_millis_f64())?;
    writeln!(out, "\tBW reqs: {:.6}%", params.link_share_percent())?;
    writeln!(out)
}

/// Writes the computed parameters of both classes and the commands that configure them.
pub(crate) fn write_report<W: Write>(
    out: &mut W,
    registry: &ChannelRegistry,
    report: &BandwidthReport,
    options: &ReportOptions,
) -> io::Result<()> {
    if options.verbose {
        for bw in &report.channels {
            write_channel_bandwidth(out, bw)?;
        }
    }
    write_shaper_warnings(out, &report.warnings)?;

    let rule = "=".repeat(RULE_WIDTH);
    writeln!(out, "{rule}")?;
    writeln!(out, "Found {} channels in manifest", registry.len())?;
    writeln!(out, "Linkspeed: {:.2} Mbps", report.link_speed.as_mbps())?;
    for class in StreamClass::ALL {
        write_class(out, report.class(class))?;
    }

    writeln!(out, "{rule}")?;
    writeln!(out, "Commands to run on host (use correct nic and parent!)")?;
    writeln!(out, "\t{}", command_line(&MqprioQdisc::new(options.device.as_str()).build()))?;
    for class in StreamClass::ALL {
        let cbs = CbsQdisc::new(options.device.as_str(), report.class(class))
            .action(options.action)
            .build();
        writeln!(out, "\t{}", command_line(&cbs))?;
    }

    writeln!(out, "to inspect:")?;
    for cmd in inspect_commands(&options.device) {
        writeln!(out, "\t{}", command_line(&cmd))?;
    }

    Ok(())
}
