//! # netchan-cbs
//!
//! Credit-Based Shaper (IEEE 802.1Q, Annex L) parameters for the AVB stream classes.
//!
//! The per-class reservations are summed from the bandwidth needs of the transmitted channels.
//! Class A is shaped first; class B reserves on top of class A and sees class A as interference.
//!
//! ```
//! use netchan_cbs::{compute, units::Kbps};
//! use netchan_manifest::{Channel, ChannelRegistry, StreamClass};
//!
//! let registry: ChannelRegistry =
//!     [Channel::new("A", StreamClass::A, 8000, 100)].into_iter().collect();
//!
//! let report = compute(&registry, ["A"], Kbps::new(1_000_000));
//! assert_eq!(report.class_a.idle_slope, Kbps::new(10_624));
//! assert_eq!(report.class_b.max_burst_size.get(), 0);
//! ```

pub mod frame;
pub mod shaper;
pub mod tc;
pub mod units;

mod error;

pub use error::ShaperWarning;
pub use frame::ChannelBandwidth;
pub use shaper::{compute, split_tx_streams, BandwidthReport, ClassParams};
