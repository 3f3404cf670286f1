//! `tc` commands that configure the shaper on a host.
//!
//! The commands are built, never run: they are printed for an operator to adapt (NIC and parent
//! handles differ between hosts) and execute.
//!
//! The layout is an `mqprio` root with one hardware queue per traffic class, and a `cbs` qdisc
//! on the queues carrying class A and class B:
//!
//! ```text
//! mqprio (8003:)  num_tc 4, queues 1@0 1@1 1@2 1@3
//!   ├── 8003:1  cbs  (class A, prio 3)
//!   ├── 8003:2  cbs  (class B, prio 2)
//!   ├── 8003:3  best effort
//!   └── 8003:4  best effort
//! ```

use std::process::Command;

use netchan_manifest::StreamClass;

use crate::shaper::ClassParams;

/// NIC used when none is given.
pub const DEFAULT_DEVICE: &str = "enp2s0";

/// Number of traffic classes configured on the `mqprio` root.
pub const NUM_TC: u8 = 4;

/// Priority to traffic class map. Priority 3 (class A) maps to TC 0, priority 2 (class B) to
/// TC 1, everything else is best effort.
pub const PRIORITY_MAP: [u8; 16] = [3, 3, 1, 0, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2];

/// Whether a qdisc is added or replaces an existing one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum QdiscAction {
    /// Fails if a qdisc is already attached.
    Add,
    /// Creates or replaces the qdisc.
    #[default]
    Replace,
}

impl QdiscAction {
    /// The `tc` verb.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Replace => "replace",
        }
    }
}

/// The `mqprio` parent handle of the queue shaping `class`.
pub fn class_parent(class: StreamClass) -> &'static str {
    match class {
        StreamClass::A => "8003:1",
        StreamClass::B => "8003:2",
    }
}

/// The multiqueue priority root the CBS qdiscs attach to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MqprioQdisc {
    device: String,
    hw_offload: bool,
}

impl MqprioQdisc {
    /// Creates the root for the given NIC.
    pub fn new(device: impl Into<String>) -> Self {
        Self { device: device.into(), hw_offload: false }
    }

    /// Request hardware offload of the queue mapping.
    pub fn hw_offload(mut self, hw_offload: bool) -> Self {
        self.hw_offload = hw_offload;
        self
    }

    /// Builds the command to create the root qdisc.
    pub fn build(&self) -> Command {
        let mut cmd = Command::new("sudo");
        cmd.args(["tc", "qdisc", "replace", "dev", self.device.as_str()])
            .args(["parent", "root", "mqprio"])
            .arg("num_tc")
            .arg(NUM_TC.to_string())
            .arg("map")
            .args(PRIORITY_MAP.iter().map(u8::to_string))
            .arg("queues")
            .args((0..NUM_TC).map(|q| format!("1@{q}")))
            .args(["hw", if self.hw_offload { "1" } else { "0" }]);

        cmd
    }
}

/// A credit-based shaper on one `mqprio` queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CbsQdisc {
    device: String,
    parent: String,
    action: QdiscAction,
    offload: bool,
    idle_slope: i64,
    send_slope: i64,
    hi_credit: i64,
    lo_credit: i64,
}

impl CbsQdisc {
    /// Creates the shaper for `params` on its default queue, with offload enabled.
    pub fn new(device: impl Into<String>, params: &ClassParams) -> Self {
        Self {
            device: device.into(),
            parent: class_parent(params.class).to_string(),
            action: QdiscAction::default(),
            offload: true,
            idle_slope: params.idle_slope.get(),
            send_slope: params.send_slope.get(),
            hi_credit: params.hi_credit.get(),
            lo_credit: params.lo_credit.get(),
        }
    }

    /// Attach to a different parent handle.
    pub fn parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = parent.into();
        self
    }

    /// Set whether to add or replace the qdisc.
    pub fn action(mut self, action: QdiscAction) -> Self {
        self.action = action;
        self
    }

    /// Set whether the NIC should run the shaper.
    pub fn offload(mut self, offload: bool) -> Self {
        self.offload = offload;
        self
    }

    /// Builds the command to create the shaper.
    ///
    /// The send slope and low credit are stored as positive numbers and passed negated.
    pub fn build(&self) -> Command {
        let mut cmd = Command::new("sudo");
        cmd.args(["tc", "qdisc", self.action.as_str(), "dev", self.device.as_str()])
            .args(["parent", self.parent.as_str(), "cbs"])
            .arg("idleslope")
            .arg(self.idle_slope.to_string())
            .arg("sendslope")
            .arg(self.send_slope.saturating_neg().to_string())
            .arg("hicredit")
            .arg(self.hi_credit.to_string())
            .arg("locredit")
            .arg(self.lo_credit.saturating_neg().to_string())
            .args(["offload", if self.offload { "1" } else { "0" }]);

        cmd
    }
}

/// Commands to inspect the resulting configuration.
pub fn inspect_commands(device: &str) -> [Command; 2] {
    let mut classes = Command::new("tc");
    classes.args(["-g", "class", "show", "dev", device]);

    let mut qdiscs = Command::new("tc");
    qdiscs.args(["-s", "-d", "qdisc", "show", "dev", device]);

    [classes, qdiscs]
}

/// Renders a command as a single shell line.
pub fn command_line(cmd: &Command) -> String {
    let mut line = cmd.get_program().to_string_lossy().into_owned();
    for arg in cmd.get_args() {
        line.push(' ');
        line.push_str(&arg.to_string_lossy());
    }

    line
}
