//! Quantities used by the shaper, with their unit in the type.
//!
//! Rates are kilobits per second, as expected by `tc cbs`. Credits are the product of a rate and
//! an interference time, truncated toward zero the same way the rates are.

use std::{
    fmt,
    iter::Sum,
    ops::{Add, AddAssign, Neg, Sub},
};

/// Ethernet header, CRC and VLAN tag, in bytes.
pub const ETHERNET_OVERHEAD: u32 = 18 + 4;

/// Preamble, start of frame delimiter and inter-packet gap, in bytes.
pub const L1_OVERHEAD: u32 = 7 + 1 + 12;

/// netchan's Common Stream Transport header that precedes every payload, in bytes.
pub const COMMON_TRANSPORT_HEADER: u32 = 24;

/// Smallest payload an Ethernet frame may carry, in bytes.
pub const MIN_PAYLOAD: u32 = ETHERNET_OVERHEAD + COMMON_TRANSPORT_HEADER;

/// Largest frame that can block a shaped queue, in bytes.
pub const MAX_INTERFERENCE_FRAME: u32 = 1_500;

/// Link speed assumed when none is given: 1 Gbit/s.
pub const DEFAULT_LINK_SPEED: Kbps = Kbps(1_000_000);

/// A rate in kilobits per second.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Kbps(i64);

impl Kbps {
    /// Zero rate.
    pub const ZERO: Self = Self(0);

    /// Creates a rate from kbit/s.
    pub const fn new(kbps: i64) -> Self {
        Self(kbps)
    }

    /// The rate in kbit/s.
    pub const fn get(self) -> i64 {
        self.0
    }

    /// The rate in Mbit/s.
    pub fn as_mbps(self) -> f64 {
        self.0 as f64 / 1000.0
    }

    /// Credit gathered at this rate during `time`, truncated toward zero.
    pub fn credit_over(self, time: Seconds) -> Credit {
        Credit((self.0 as f64 * time.0) as i64)
    }
}

impl fmt::Display for Kbps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl Add for Kbps {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for Kbps {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sub for Kbps {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self(self.0 - rhs.0)
    }
}

impl Neg for Kbps {
    type Output = Self;

    fn neg(self) -> Self {
        Self(self.0.saturating_neg())
    }
}

impl Sum for Kbps {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

/// A raw data rate in bits per second.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BitsPerSecond(pub u64);

impl BitsPerSecond {
    /// Rounds up to whole kbit/s, so a reservation never falls short of the data rate.
    pub fn to_kbps_ceil(self) -> Kbps {
        Kbps(self.0.div_ceil(1000) as i64)
    }
}

impl fmt::Display for BitsPerSecond {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// A duration in (fractional) seconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd)]
pub struct Seconds(pub f64);

impl Seconds {
    /// Time the largest interfering frame occupies a link of the given speed.
    ///
    /// Both the frame and the rate are taken as is, without byte-to-bit scaling, matching the
    /// credit formulas the results are fed into.
    pub fn max_frame_at(rate: Kbps) -> Self {
        Self(f64::from(MAX_INTERFERENCE_FRAME) / rate.0 as f64)
    }

    /// The duration in milliseconds.
    pub fn as_millis_f64(self) -> f64 {
        self.0 * 1000.0
    }
}

impl Add for Seconds {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

/// Shaper credit, as reported for `hicredit`, `locredit` and the maximum burst size.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Credit(i64);

impl Credit {
    /// No credit.
    pub const ZERO: Self = Self(0);

    /// Creates a credit value.
    pub const fn new(credit: i64) -> Self {
        Self(credit)
    }

    /// The raw value.
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for Credit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl Neg for Credit {
    type Output = Self;

    fn neg(self) -> Self {
        Self(self.0.saturating_neg())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_constants() {
        assert_eq!(ETHERNET_OVERHEAD, 22);
        assert_eq!(L1_OVERHEAD, 20);
        assert_eq!(MIN_PAYLOAD, 46);
    }

    #[test]
    fn kbps_rounds_up() {
        assert_eq!(BitsPerSecond(10_624_000).to_kbps_ceil(), Kbps::new(10_624));
        assert_eq!(BitsPerSecond(10_624_001).to_kbps_ceil(), Kbps::new(10_625));
        assert_eq!(BitsPerSecond(1).to_kbps_ceil(), Kbps::new(1));
        assert_eq!(BitsPerSecond(0).to_kbps_ceil(), Kbps::ZERO);
    }

    #[test]
    fn credit_truncates_toward_zero() {
        let time = Seconds(0.0015);
        assert_eq!(Kbps::new(10_624).credit_over(time), Credit::new(15));
        assert_eq!(Kbps::new(-10_624).credit_over(time), Credit::new(-15));
    }

    #[test]
    fn max_frame_time() {
        let time = Seconds::max_frame_at(DEFAULT_LINK_SPEED);
        assert!((time.as_millis_f64() - 1.5).abs() < 1e-12);
    }

    #[test]
    fn kbps_display_honours_width() {
        assert_eq!(format!("{:8}", Kbps::new(42)), "      42");
        assert_eq!(format!("{}", -Kbps::new(42)), "-42");
        assert_eq!(Kbps::new(1_000_000).as_mbps(), 1000.0);
    }

    #[test]
    fn negation_saturates() {
        assert_eq!(-Credit::new(i64::MIN), Credit::new(i64::MAX));
        assert_eq!(-Kbps::new(i64::MIN), Kbps::new(i64::MAX));
    }

    #[test]
    fn kbps_sum() {
        let total: Kbps = [Kbps::new(1), Kbps::new(2), Kbps::new(3)].into_iter().sum();
        assert_eq!(total, Kbps::new(6));
    }
}
