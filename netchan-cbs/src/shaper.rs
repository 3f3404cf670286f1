//! Per-class CBS parameters, following 802.1Q-2018 Annex L.
//!
//! Class A is expected to be correct. Class B follows L.3.1.1, but its maximum burst size is not
//! derived and always reported as zero.

use netchan_manifest::{ChannelRegistry, StreamClass};

use crate::{
    error::ShaperWarning,
    frame::ChannelBandwidth,
    units::{Credit, Kbps, Seconds, MAX_INTERFERENCE_FRAME},
};

/// CBS parameters of one stream class.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassParams {
    /// The class these parameters shape.
    pub class: StreamClass,
    /// Sum of the reservations of the class's own transmit channels.
    pub bandwidth: Kbps,
    /// Rate credit is gained at while frames are waiting.
    pub idle_slope: Kbps,
    /// Rate credit is lost at while transmitting, stored as a positive number.
    ///
    /// `tc` expects the negated value.
    pub send_slope: Kbps,
    /// Maximum credit that can be saved while blocked by other traffic.
    pub hi_credit: Credit,
    /// Minimum credit that can be reached while transmitting a frame, stored as a positive
    /// number. `tc` expects the negated value.
    pub lo_credit: Credit,
    /// Largest interference this queue causes. Always zero for class B.
    pub max_burst_size: Credit,
    /// Longest time a frame of this class can be blocked.
    pub interference_time: Seconds,
    /// Speed of the shaped link.
    pub link_speed: Kbps,
}

impl ClassParams {
    /// Share of the link reserved by this class, in percent.
    pub fn link_share_percent(&self) -> f64 {
        self.idle_slope.get() as f64 * 100.0 / self.link_speed.get() as f64
    }
}

/// The outcome of a bandwidth computation.
#[derive(Debug, Clone, PartialEq)]
pub struct BandwidthReport {
    /// Speed of the shaped link.
    pub link_speed: Kbps,
    /// Class A parameters.
    pub class_a: ClassParams,
    /// Class B parameters, stacked on top of class A.
    pub class_b: ClassParams,
    /// Bandwidth needs of every transmit channel that was found, in request order.
    pub channels: Vec<ChannelBandwidth>,
    /// Advisory problems, in the order they were found.
    pub warnings: Vec<ShaperWarning>,
}

impl BandwidthReport {
    /// Parameters of the given class.
    pub fn class(&self, class: StreamClass) -> &ClassParams {
        match class {
            StreamClass::A => &self.class_a,
            StreamClass::B => &self.class_b,
        }
    }
}

/// Splits a comma separated list of channel names, skipping blanks.
pub fn split_tx_streams(list: &str) -> impl Iterator<Item = &str> {
    list.split(',').map(str::trim).filter(|name| !name.is_empty())
}

/// Computes the CBS parameters for both classes from the channels this node transmits.
///
/// Names missing from `registry` are reported and contribute nothing. A name listed twice is
/// counted twice.
pub fn compute<I, S>(registry: &ChannelRegistry, tx_names: I, link_speed: Kbps) -> BandwidthReport
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut warnings = Vec::new();
    let mut channels = Vec::new();

    for name in tx_names {
        let name = name.as_ref();
        match registry.get(name) {
            Some(channel) => channels.push(ChannelBandwidth::of(channel)),
            None => push_warning(
                &mut warnings,
                ShaperWarning::UnknownTransmitChannel { name: name.to_string() },
            ),
        }
    }

    let bandwidth = |class: StreamClass| -> Kbps {
        channels.iter().filter(|bw| bw.class == class).map(|bw| bw.idle_slope).sum()
    };

    let class_a = class_a_params(bandwidth(StreamClass::A), link_speed, &mut warnings);
    let class_b = class_b_params(bandwidth(StreamClass::B), &class_a, &mut warnings);

    tracing::debug!(
        idle_slope_a = class_a.idle_slope.get(),
        idle_slope_b = class_b.idle_slope.get(),
        link_speed = link_speed.get(),
        "computed cbs parameters"
    );

    BandwidthReport { link_speed, class_a, class_b, channels, warnings }
}

fn class_a_params(
    bandwidth: Kbps,
    link_speed: Kbps,
    warnings: &mut Vec<ShaperWarning>,
) -> ClassParams {
    // A single slow stream can round down to nothing, and a zero idle slope breaks the credit
    // bounds below.
    let mut idle_slope = bandwidth;
    if idle_slope <= Kbps::ZERO {
        let warning = ShaperWarning::DegenerateBandwidth { class: StreamClass::A, idle_slope };
        push_warning(warnings, warning);
        idle_slope = Kbps::new(1);
    }
    check_subscription(StreamClass::A, idle_slope, link_speed, warnings);

    // Credit keeps being replenished while transmitting.
    let send_slope = link_speed - idle_slope;

    let interference_time = Seconds::max_frame_at(link_speed);
    let hi_credit = idle_slope.credit_over(interference_time);
    let lo_credit = send_slope.credit_over(interference_time);

    let max_burst_size = if send_slope == Kbps::ZERO {
        Credit::ZERO
    } else {
        let span = i128::from(link_speed.get()) * i128::from(hi_credit.get() - lo_credit.get());
        Credit::new((span as f64 / (-send_slope).get() as f64) as i64)
    };

    ClassParams {
        class: StreamClass::A,
        bandwidth,
        idle_slope,
        send_slope,
        hi_credit,
        lo_credit,
        max_burst_size,
        interference_time,
        link_speed,
    }
}

fn class_b_params(
    bandwidth: Kbps,
    class_a: &ClassParams,
    warnings: &mut Vec<ShaperWarning>,
) -> ClassParams {
    let link_speed = class_a.link_speed;

    let idle_slope = bandwidth + class_a.idle_slope;
    check_subscription(StreamClass::B, idle_slope, link_speed, warnings);

    let send_slope = link_speed - idle_slope;

    // A class B frame can be blocked by a full frame on what class A leaves over, and then by
    // class A itself. With nothing left over the blocking time is unbounded, and class B gets
    // no credit at all.
    let remaining = link_speed - class_a.idle_slope;
    if remaining <= Kbps::ZERO {
        return ClassParams {
            class: StreamClass::B,
            bandwidth,
            idle_slope,
            send_slope,
            hi_credit: Credit::ZERO,
            lo_credit: Credit::ZERO,
            max_burst_size: Credit::ZERO,
            interference_time: Seconds(0.0),
            link_speed,
        };
    }

    let interference_time = Seconds(f64::from(MAX_INTERFERENCE_FRAME) / remaining.get() as f64)
        + class_a.interference_time;

    ClassParams {
        class: StreamClass::B,
        bandwidth,
        idle_slope,
        send_slope,
        hi_credit: idle_slope.credit_over(interference_time),
        lo_credit: send_slope.credit_over(interference_time),
        max_burst_size: Credit::ZERO,
        interference_time,
        link_speed,
    }
}

fn check_subscription(
    class: StreamClass,
    idle_slope: Kbps,
    link_speed: Kbps,
    warnings: &mut Vec<ShaperWarning>,
) {
    if idle_slope >= link_speed {
        push_warning(warnings, ShaperWarning::Oversubscribed { class, idle_slope, link_speed });
    }
}

fn push_warning(warnings: &mut Vec<ShaperWarning>, warning: ShaperWarning) {
    tracing::warn!("{warning}");
    warnings.push(warning);
}
