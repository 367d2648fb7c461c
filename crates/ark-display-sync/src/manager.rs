//! Pipeline-side registry of display syncs.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use indexmap::IndexMap;
use tracing::debug;

use crate::display_sync::UIDisplaySync;
use crate::frame_rate::{FrameRateRange, RefreshRateMode};

/// Refresh rates a measured VSync rate snaps to.
pub const REFRESH_RATE_LIST: [i32; 6] = [30, 60, 72, 90, 120, 144];
/// Largest distance in fps between a measured rate and the rate it snaps to.
pub const ERROR_DELTA: i32 = 3;

const SECOND_IN_NANO: f64 = 1_000_000_000.0;

/// Settings for VSync rate snapping.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DisplaySyncConfig {
    /// Supported refresh rates, checked in order
    pub refresh_rates: Vec<i32>,
    /// Snapping tolerance in fps
    pub error_delta: i32,
}

impl Default for DisplaySyncConfig {
    fn default() -> Self {
        Self {
            refresh_rates: REFRESH_RATE_LIST.to_vec(),
            error_delta: ERROR_DELTA,
        }
    }
}

impl DisplaySyncConfig {
    pub fn with_refresh_rates(mut self, refresh_rates: impl Into<Vec<i32>>) -> Self {
        self.refresh_rates = refresh_rates.into();
        self
    }

    pub fn with_error_delta(mut self, error_delta: i32) -> Self {
        self.error_delta = error_delta;
        self
    }

    /// First supported rate within the tolerance of `rate`.
    pub fn snap(&self, rate: i32) -> Option<i32> {
        self.refresh_rates
            .iter()
            .copied()
            .find(|refresh_rate| (rate - refresh_rate).abs() <= self.error_delta)
    }
}

/// Drives every registered display sync once per VSync tick.
///
/// The registry holds weak references in insertion order. Entries whose
/// display sync has been dropped are erased during [`dispatch`](Self::dispatch).
#[derive(Debug, Default)]
pub struct UIDisplaySyncManager {
    config: DisplaySyncConfig,
    display_syncs: RefCell<IndexMap<u64, Weak<UIDisplaySync>>>,
    display_sync_range: Cell<FrameRateRange>,
    source_vsync_rate: Cell<i32>,
    vsync_period: Cell<i64>,
    refresh_rate_mode: Cell<i32>,
}

impl UIDisplaySyncManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: DisplaySyncConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &DisplaySyncConfig {
        &self.config
    }

    /// Run one tick on every live display sync.
    pub fn dispatch(&self, nano_timestamp: u64) {
        if self.display_syncs.borrow().is_empty() {
            return;
        }

        // Callbacks may add or remove syncs while we iterate.
        let snapshot: Vec<(u64, Weak<UIDisplaySync>)> = self
            .display_syncs
            .borrow()
            .iter()
            .map(|(id, sync)| (*id, sync.clone()))
            .collect();

        let mut merged = FrameRateRange::default();
        self.display_sync_range.set(merged);
        let vsync_period = self.vsync_period.get();

        for (id, weak) in snapshot {
            let Some(sync) = weak.upgrade() else {
                self.display_syncs.borrow_mut().shift_remove(&id);
                continue;
            };

            let range = sync.expected_frame_rate_range();
            if range.is_valid() {
                merged.merge(&range);
                self.display_sync_range.set(merged);
            }

            sync.check_rate(self.source_vsync_rate.get(), self.refresh_rate_mode.get());
            sync.update_data(nano_timestamp, vsync_period);
            sync.judge_whether_skip();
            sync.on_frame();
        }
    }

    /// Returns `false` when the sync is already registered.
    pub fn add_display_sync(&self, display_sync: &Rc<UIDisplaySync>) -> bool {
        let mut display_syncs = self.display_syncs.borrow_mut();
        if display_syncs.contains_key(&display_sync.id()) {
            return false;
        }
        display_syncs.insert(display_sync.id(), Rc::downgrade(display_sync));
        true
    }

    /// Returns `false` when the sync was not registered.
    pub fn remove_display_sync(&self, display_sync: &UIDisplaySync) -> bool {
        self.display_syncs
            .borrow_mut()
            .shift_remove(&display_sync.id())
            .is_some()
    }

    pub fn has_display_sync(&self, display_sync: &UIDisplaySync) -> bool {
        self.display_syncs.borrow().contains_key(&display_sync.id())
    }

    /// Registered ids in insertion order, including expired entries not yet erased.
    pub fn display_sync_ids(&self) -> Vec<u64> {
        self.display_syncs.borrow().keys().copied().collect()
    }

    pub fn display_sync_count(&self) -> usize {
        self.display_syncs.borrow().len()
    }

    /// Returns `false` when the rate is unchanged.
    pub fn set_vsync_rate(&self, vsync_rate: i32) -> bool {
        if self.source_vsync_rate.get() == vsync_rate {
            return false;
        }
        self.source_vsync_rate.set(vsync_rate);
        true
    }

    pub fn vsync_rate(&self) -> i32 {
        self.source_vsync_rate.get()
    }

    /// Store the VSync period and snap the VSync rate derived from it.
    ///
    /// Returns `false` when the period is unchanged. A derived rate outside
    /// every tolerance window leaves the VSync rate as it was.
    pub fn set_vsync_period(&self, vsync_period: i64) -> bool {
        if self.vsync_period.get() == vsync_period {
            return false;
        }
        self.vsync_period.set(vsync_period);
        if vsync_period <= 0 {
            return true;
        }

        let rate = (SECOND_IN_NANO / vsync_period as f64).ceil() as i32;
        if let Some(refresh_rate) = self.config.snap(rate) {
            if self.set_vsync_rate(refresh_rate) {
                debug!(vsync_period, rate = refresh_rate, "vsync rate snapped");
            }
        }
        true
    }

    pub fn vsync_period(&self) -> i64 {
        self.vsync_period.get()
    }

    pub fn set_refresh_rate_mode(&self, refresh_rate_mode: i32) {
        self.refresh_rate_mode.set(refresh_rate_mode);
    }

    pub fn refresh_rate_mode(&self) -> i32 {
        self.refresh_rate_mode.get()
    }

    pub fn is_auto_mode(&self) -> bool {
        self.refresh_rate_mode.get() == i32::from(RefreshRateMode::Auto)
    }

    /// Preferred rate of the highest valid range seen in the last dispatch.
    pub fn display_sync_rate(&self) -> i32 {
        self.display_sync_range.get().preferred
    }

    pub fn display_sync_range(&self) -> FrameRateRange {
        self.display_sync_range.get()
    }
}
