//! VSync-driven frame-rate governor.
//!
//! A [`UIDisplaySync`] asks for callbacks at a [`FrameRateRange`] below the
//! display refresh rate. The [`UIDisplaySyncManager`] owned by a
//! [`Pipeline`] drives every registered sync on each VSync tick and fires
//! their callbacks on every `rate`-th tick.
//!
//! # Example
//!
//! ```
//! use std::rc::{Rc, Weak};
//!
//! use ark_display_sync::{FrameRateRange, Pipeline, PipelineContext, UIDisplaySync};
//!
//! let context = Rc::new(PipelineContext::new());
//! context.display_sync_manager().set_vsync_period(8_333_333);
//!
//! let sync = Rc::new(UIDisplaySync::new());
//! sync.set_expected_frame_rate_range(FrameRateRange::new(0, 120, 30));
//! let pipeline: Weak<dyn Pipeline> = Rc::<PipelineContext>::downgrade(&context);
//! sync.add_to_pipeline(&pipeline);
//!
//! for tick in 0..4 {
//!     context.on_vsync(tick * 8_333_333);
//! }
//! assert!(sync.display_sync_data().no_skip);
//! ```

mod data;
mod display_sync;
mod errors;
mod frame_rate;
mod manager;
mod pipeline;

pub use data::{DisplaySyncData, OnFrame, OnFrameWithData, OnFrameWithTimestamp};
pub use display_sync::UIDisplaySync;
pub use errors::SyncError;
pub use frame_rate::{FrameRateRange, RefreshRateMode, MAX_REFRESH_RATE};
pub use manager::{DisplaySyncConfig, UIDisplaySyncManager, ERROR_DELTA, REFRESH_RATE_LIST};
pub use pipeline::{Pipeline, PipelineContext};
