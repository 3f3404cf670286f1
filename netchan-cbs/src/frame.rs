//! Bandwidth needs of a single channel.
//!
//! AVB reserves for the worst-case sample set per interval (e.g. 7 sample sets per frame for
//! 48kHz at 125us); we ignore that here and reserve one frame per period.

use netchan_manifest::{Channel, StreamClass};

use crate::units::{
    BitsPerSecond, Kbps, COMMON_TRANSPORT_HEADER, ETHERNET_OVERHEAD, L1_OVERHEAD, MIN_PAYLOAD,
};

/// The on-wire cost of one channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelBandwidth {
    /// Channel name.
    pub name: String,
    /// Class the bandwidth is reserved in.
    pub class: StreamClass,
    /// Frames per second.
    pub frequency_hz: u32,
    /// Payload data as declared in the manifest.
    pub size_bytes: u32,
    /// Payload including the transport header, padded to the Ethernet minimum.
    pub payload_bytes: u64,
    /// Everything that occupies the wire for a single frame.
    pub frame_bytes: u64,
    /// Raw data rate.
    pub data_rate: BitsPerSecond,
    /// The reservation this channel adds to its class.
    pub idle_slope: Kbps,
}

impl ChannelBandwidth {
    /// Computes the bandwidth requirement of `channel`.
    pub fn of(channel: &Channel) -> Self {
        let size_bytes = channel.size_bytes();
        let payload_bytes = (u64::from(size_bytes) + u64::from(COMMON_TRANSPORT_HEADER))
            .max(u64::from(MIN_PAYLOAD));
        let frame_bytes = payload_bytes + u64::from(Self::header_overhead());
        let data_rate = BitsPerSecond(
            frame_bytes.saturating_mul(u64::from(channel.frequency_hz())).saturating_mul(8),
        );
        let idle_slope = data_rate.to_kbps_ceil();

        let bw = Self {
            name: channel.name().to_string(),
            class: channel.stream_class(),
            frequency_hz: channel.frequency_hz(),
            size_bytes,
            payload_bytes,
            frame_bytes,
            data_rate,
            idle_slope,
        };

        tracing::debug!(
            name = %bw.name,
            payload = bw.payload_bytes,
            frame = bw.frame_bytes,
            dps = bw.data_rate.0,
            idle_slope = bw.idle_slope.get(),
            "channel bandwidth"
        );

        bw
    }

    /// Bytes added to every payload on the wire (Ethernet and L1).
    pub const fn header_overhead() -> u32 {
        ETHERNET_OVERHEAD + L1_OVERHEAD
    }

    /// Share of the frame that is actual payload data, in percent.
    pub fn efficiency_percent(&self) -> f64 {
        100.0 * f64::from(self.size_bytes) / self.frame_bytes as f64
    }
}
