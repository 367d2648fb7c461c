//! Per-sync tick state and the callbacks it feeds.

use crate::frame_rate::FrameRateRange;

/// Callback fired on a non-skipped frame.
pub type OnFrame = Box<dyn FnMut()>;
/// Callback receiving a snapshot of the tick state.
pub type OnFrameWithData = Box<dyn FnMut(&DisplaySyncData)>;
/// Callback receiving the tick timestamp in nanoseconds.
pub type OnFrameWithTimestamp = Box<dyn FnMut(u64)>;

/// Tick state of one display sync, updated on every VSync.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DisplaySyncData {
    /// Timestamp of the current tick in nanoseconds
    pub timestamp: u64,
    /// Expected timestamp of the next fired frame
    pub target_timestamp: u64,
    /// Number of VSync ticks per fired frame
    pub rate: i32,
    /// Whether the current tick fires the callbacks
    pub no_skip: bool,
    /// Ticks seen since the last fired frame
    pub count: i32,
    pub rate_range: FrameRateRange,
}

impl Default for DisplaySyncData {
    fn default() -> Self {
        Self {
            timestamp: 0,
            target_timestamp: 0,
            rate: 1,
            no_skip: true,
            count: 0,
            rate_range: FrameRateRange::default(),
        }
    }
}

/// The three callback slots of a display sync.
#[derive(Default)]
pub(crate) struct FrameCallbacks {
    pub on_frame: Option<OnFrame>,
    pub on_frame_with_data: Option<OnFrameWithData>,
    pub on_frame_with_timestamp: Option<OnFrameWithTimestamp>,
}

impl FrameCallbacks {
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn is_empty(&self) -> bool {
        self.on_frame.is_none() && self.on_frame_with_data.is_none() && self.on_frame_with_timestamp.is_none()
    }

    /// Put back the slots of `taken` that were not re-registered meanwhile.
    pub fn restore(&mut self, taken: FrameCallbacks) {
        if self.on_frame.is_none() {
            self.on_frame = taken.on_frame;
        }
        if self.on_frame_with_data.is_none() {
            self.on_frame_with_data = taken.on_frame_with_data;
        }
        if self.on_frame_with_timestamp.is_none() {
            self.on_frame_with_timestamp = taken.on_frame_with_timestamp;
        }
    }
}

impl std::fmt::Debug for FrameCallbacks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameCallbacks")
            .field("on_frame", &self.on_frame.is_some())
            .field("on_frame_with_data", &self.on_frame_with_data.is_some())
            .field("on_frame_with_timestamp", &self.on_frame_with_timestamp.is_some())
            .finish()
    }
}
