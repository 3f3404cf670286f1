use netchan_manifest::StreamClass;
use thiserror::Error;

use crate::units::Kbps;

/// Advisory problems found while computing the shaper parameters. None of them stop the
/// computation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShaperWarning {
    #[error("did not find {name} in channels")]
    UnknownTransmitChannel { name: String },
    #[error("idleSlope for {class} too small ({idle_slope} kbps), rounding error, increasing to 1")]
    DegenerateBandwidth { class: StreamClass, idle_slope: Kbps },
    #[error("{class} oversubscribes the link: idleSlope {idle_slope} kbps, link {link_speed} kbps")]
    Oversubscribed { class: StreamClass, idle_slope: Kbps, link_speed: Kbps },
}
