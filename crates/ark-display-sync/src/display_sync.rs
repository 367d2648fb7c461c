//! Rate-governed per-frame callbacks.
//!
//! A [`UIDisplaySync`] fires its callbacks on every `rate`-th VSync tick,
//! where `rate` is the integer ratio between the source VSync rate and the
//! preferred rate of its [`FrameRateRange`]. The pipeline drives it once per
//! tick with [`check_rate`], [`update_data`], [`judge_whether_skip`] and
//! [`on_frame`], in that order.
//!
//! [`check_rate`]: UIDisplaySync::check_rate
//! [`update_data`]: UIDisplaySync::update_data
//! [`judge_whether_skip`]: UIDisplaySync::judge_whether_skip
//! [`on_frame`]: UIDisplaySync::on_frame

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{debug, trace};

use crate::data::{DisplaySyncData, FrameCallbacks};
use crate::frame_rate::{FrameRateRange, RefreshRateMode};
use crate::pipeline::Pipeline;

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Frame-rate governor for one animation or frame callback.
#[derive(Debug)]
pub struct UIDisplaySync {
    id: u64,
    data: Cell<DisplaySyncData>,
    callbacks: RefCell<FrameCallbacks>,
    /// Bumped by `unregister_on_frame` so a callback can unregister itself.
    unregister_epoch: Cell<u64>,
    source_vsync_rate: Cell<i32>,
    rate_changed: Cell<bool>,
    refresh_rate_mode: Cell<i32>,
    pipeline: RefCell<Option<Weak<dyn Pipeline>>>,
}

impl Default for UIDisplaySync {
    fn default() -> Self {
        Self::new()
    }
}

impl UIDisplaySync {
    pub fn new() -> Self {
        Self {
            id: NEXT_ID.fetch_add(1, Ordering::Relaxed),
            data: Cell::new(DisplaySyncData::default()),
            callbacks: RefCell::new(FrameCallbacks::default()),
            unregister_epoch: Cell::new(0),
            source_vsync_rate: Cell::new(0),
            rate_changed: Cell::new(true),
            refresh_rate_mode: Cell::new(RefreshRateMode::Null.into()),
            pipeline: RefCell::new(None),
        }
    }

    /// Unique id, used as the registry key.
    pub fn id(&self) -> u64 {
        self.id
    }

    // Pipeline membership

    /// Register with the pipeline's manager. No-op when the pipeline is gone.
    pub fn add_to_pipeline(self: &Rc<Self>, pipeline: &Weak<dyn Pipeline>) {
        let Some(context) = pipeline.upgrade() else {
            return;
        };
        *self.pipeline.borrow_mut() = Some(pipeline.clone());
        context.display_sync_manager().add_display_sync(self);
    }

    /// Unregister from the pipeline's manager and stop requesting frames from it.
    pub fn del_from_pipeline(&self, pipeline: &Weak<dyn Pipeline>) {
        let Some(context) = pipeline.upgrade() else {
            return;
        };
        if context.display_sync_manager().remove_display_sync(self) {
            self.pipeline.borrow_mut().take();
        }
    }

    pub fn is_add_to_pipeline(&self, pipeline: &Weak<dyn Pipeline>) -> bool {
        pipeline
            .upgrade()
            .is_some_and(|context| context.display_sync_manager().has_display_sync(self))
    }

    /// Ask the attached pipeline for another tick.
    pub fn request_frame(&self) {
        let context = self.pipeline.borrow().as_ref().and_then(Weak::upgrade);
        if let Some(context) = context {
            context.request_frame();
        }
    }

    // Callbacks

    pub fn register_on_frame(&self, callback: impl FnMut() + 'static) {
        self.callbacks.borrow_mut().on_frame = Some(Box::new(callback));
    }

    pub fn register_on_frame_with_data(&self, callback: impl FnMut(&DisplaySyncData) + 'static) {
        self.callbacks.borrow_mut().on_frame_with_data = Some(Box::new(callback));
    }

    pub fn register_on_frame_with_timestamp(&self, callback: impl FnMut(u64) + 'static) {
        self.callbacks.borrow_mut().on_frame_with_timestamp = Some(Box::new(callback));
    }

    /// Drop all three callbacks.
    pub fn unregister_on_frame(&self) {
        self.callbacks.borrow_mut().clear();
        self.unregister_epoch.set(self.unregister_epoch.get() + 1);
    }

    pub fn has_callbacks(&self) -> bool {
        !self.callbacks.borrow().is_empty()
    }

    // Per-tick protocol

    /// Record the source rate and mode, and recompute the skip rate when the
    /// preferred rate divides the source rate.
    pub fn check_rate(&self, vsync_rate: i32, refresh_rate_mode: i32) {
        self.set_vsync_rate(vsync_rate);
        self.set_refresh_rate_mode(refresh_rate_mode);

        let mut data = self.data.get();
        let preferred = data.rate_range.preferred;
        if !Self::is_common_divisor(preferred, vsync_rate) {
            return;
        }
        if let Some(rate) = vsync_rate.checked_div(preferred) {
            if data.rate != rate {
                data.rate = rate;
                self.data.set(data);
                self.rate_changed.set(true);
                debug!(id = self.id, rate, "rate changed");
            }
        }
    }

    /// Stamp the tick and project the timestamp of the next fired frame.
    pub fn update_data(&self, nano_timestamp: u64, vsync_period: i64) {
        let mut data = self.data.get();
        data.timestamp = nano_timestamp;
        data.target_timestamp =
            nano_timestamp.saturating_add_signed(vsync_period.saturating_mul(i64::from(data.rate)));
        self.data.set(data);
    }

    /// Advance the tick counter and decide whether this tick fires.
    pub fn judge_whether_skip(&self) {
        let mut data = self.data.get();
        if self.rate_changed.get() {
            data.count = 0;
            self.rate_changed.set(false);
        }

        data.count += 1;
        if data.count.checked_rem(data.rate) == Some(0) {
            data.no_skip = true;
            data.count = 0;
        } else {
            data.no_skip = false;
        }
        self.data.set(data);
    }

    /// Fire the registered callbacks if this tick is not skipped, then
    /// request the next frame.
    pub fn on_frame(&self) {
        let data = self.data.get();
        trace!(
            id = self.id,
            timestamp = data.timestamp,
            target_timestamp = data.target_timestamp,
            preferred = data.rate_range.preferred,
            vsync_rate = self.source_vsync_rate.get(),
            rate = data.rate,
            no_skip = data.no_skip,
            "display sync frame"
        );
        if data.no_skip {
            self.fire(&data);
        }
        self.request_frame();
    }

    fn fire(&self, data: &DisplaySyncData) {
        let epoch = self.unregister_epoch.get();
        let mut taken = std::mem::take(&mut *self.callbacks.borrow_mut());

        if let Some(callback) = taken.on_frame.as_mut() {
            callback();
        }
        if let Some(callback) = taken.on_frame_with_data.as_mut() {
            callback(data);
        }
        if let Some(callback) = taken.on_frame_with_timestamp.as_mut() {
            callback(data.timestamp);
        }

        if self.unregister_epoch.get() == epoch {
            self.callbacks.borrow_mut().restore(taken);
        }
    }

    // Rates

    pub fn set_expected_frame_rate_range(&self, range: FrameRateRange) {
        let mut data = self.data.get();
        data.rate_range.set(range.min, range.max, range.preferred);
        self.data.set(data);
    }

    pub fn expected_frame_rate_range(&self) -> FrameRateRange {
        self.data.get().rate_range
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

    /// Whether `vsync_rate` is a multiple of the truncated ratio
    /// `vsync_rate / expected_rate`.
    ///
    /// The ratio is truncated before the check, so a rate that does not
    /// divide the source evenly can still pass (120 / 50 gives 2).
    pub fn is_common_divisor(expected_rate: i32, vsync_rate: i32) -> bool {
        match vsync_rate.checked_div(expected_rate) {
            Some(0) | None => false,
            Some(n) => vsync_rate.checked_rem(n) == Some(0),
        }
    }

    // Data accessors

    pub fn display_sync_data(&self) -> DisplaySyncData {
        self.data.get()
    }

    pub fn set_timestamp_data(&self, timestamp: u64) {
        let mut data = self.data.get();
        data.timestamp = timestamp;
        self.data.set(data);
    }

    pub fn timestamp_data(&self) -> u64 {
        self.data.get().timestamp
    }

    pub fn set_target_timestamp_data(&self, target_timestamp: u64) {
        let mut data = self.data.get();
        data.target_timestamp = target_timestamp;
        self.data.set(data);
    }

    pub fn target_timestamp_data(&self) -> u64 {
        self.data.get().target_timestamp
    }

    // Refresh-rate mode

    pub fn set_refresh_rate_mode(&self, refresh_rate_mode: i32) {
        self.refresh_rate_mode.set(refresh_rate_mode);
    }

    pub fn refresh_rate_mode(&self) -> i32 {
        self.refresh_rate_mode.get()
    }

    /// Enabled only in [`RefreshRateMode::Auto`].
    pub fn is_enabled(&self) -> bool {
        self.refresh_rate_mode.get() == i32::from(RefreshRateMode::Auto)
    }

    pub fn is_disabled(&self) -> bool {
        !self.is_enabled()
    }
}
