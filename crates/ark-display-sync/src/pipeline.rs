//! The host side a display sync registers with.

use std::cell::Cell;

use crate::manager::{DisplaySyncConfig, UIDisplaySyncManager};

/// A rendering pipeline driving display syncs from its VSync callback.
pub trait Pipeline {
    /// Registry of the display syncs attached to this pipeline.
    fn display_sync_manager(&self) -> &UIDisplaySyncManager;

    /// Ask for another VSync tick.
    fn request_frame(&self);
}

/// A minimal pipeline that owns a manager and counts frame requests.
#[derive(Debug, Default)]
pub struct PipelineContext {
    manager: UIDisplaySyncManager,
    frame_requests: Cell<u64>,
}

impl PipelineContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: DisplaySyncConfig) -> Self {
        Self {
            manager: UIDisplaySyncManager::with_config(config),
            frame_requests: Cell::new(0),
        }
    }

    /// Handle one VSync tick.
    pub fn on_vsync(&self, nano_timestamp: u64) {
        self.manager.dispatch(nano_timestamp);
    }

    /// Number of frames requested so far.
    pub fn frame_request_count(&self) -> u64 {
        self.frame_requests.get()
    }
}

impl Pipeline for PipelineContext {
    fn display_sync_manager(&self) -> &UIDisplaySyncManager {
        &self.manager
    }

    fn request_frame(&self) {
        self.frame_requests.set(self.frame_requests.get() + 1);
    }
}
