//! Requested frame-rate ranges and refresh-rate modes.

use crate::errors::SyncError;

/// Highest refresh rate a range may ask for.
pub const MAX_REFRESH_RATE: i32 = 144;

/// A requested callback frequency in frames per second.
///
/// The default range is all zeros, which means "no preference".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FrameRateRange {
    pub min: i32,
    pub max: i32,
    pub preferred: i32,
}

impl FrameRateRange {
    /// Create a range without validating it.
    pub const fn new(min: i32, max: i32, preferred: i32) -> Self {
        Self { min, max, preferred }
    }

    /// Create a range, rejecting anything [`is_valid`](Self::is_valid) refuses.
    pub fn try_new(min: i32, max: i32, preferred: i32) -> Result<Self, SyncError> {
        let range = Self::new(min, max, preferred);
        if range.is_valid() {
            Ok(range)
        } else {
            Err(SyncError::InvalidFrameRateRange { min, max, preferred })
        }
    }

    /// A range with `min == max == preferred == rate`.
    pub const fn fixed(rate: i32) -> Self {
        Self::new(rate, rate, rate)
    }

    pub fn is_zero(&self) -> bool {
        self.preferred == 0
    }

    /// `0 <= min <= preferred <= max <= 144` with a non-zero preference.
    pub fn is_valid(&self) -> bool {
        !self.is_zero()
            && self.min <= self.preferred
            && self.preferred <= self.max
            && self.min >= 0
            && self.max <= MAX_REFRESH_RATE
    }

    pub fn is_dynamic(&self) -> bool {
        self.is_valid() && self.min != self.max
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn set(&mut self, min: i32, max: i32, preferred: i32) {
        self.min = min;
        self.max = max;
        self.preferred = preferred;
    }

    /// Adopt `other` when it prefers a higher rate.
    pub fn merge(&mut self, other: &FrameRateRange) {
        if self.preferred < other.preferred {
            *self = *other;
        }
    }
}

/// Refresh-rate mode reported by the host.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(i32)]
pub enum RefreshRateMode {
    /// Rate is chosen dynamically; display sync is enabled
    Auto = -1,
    #[default]
    Null = 0,
    Low = 1,
    Medium = 2,
    High = 3,
}

impl From<RefreshRateMode> for i32 {
    fn from(mode: RefreshRateMode) -> Self {
        mode as i32
    }
}

impl TryFrom<i32> for RefreshRateMode {
    type Error = SyncError;

    fn try_from(mode: i32) -> Result<Self, Self::Error> {
        match mode {
            -1 => Ok(Self::Auto),
            0 => Ok(Self::Null),
            1 => Ok(Self::Low),
            2 => Ok(Self::Medium),
            3 => Ok(Self::High),
            _ => Err(SyncError::UnknownRefreshRateMode { mode }),
        }
    }
}
