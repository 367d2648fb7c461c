//! Explicit environment for a measure/layout pass.

/// API level that introduced direction-aware wrap padding and
/// flex-direction driven reversal.
pub const API_VERSION_TEN: u32 = 10;
/// API level where explicit sizes win over alignment-derived sizes,
/// bias applies and relative containers can size to content.
pub const API_VERSION_ELEVEN: u32 = 11;

/// Settings threaded through every measure and layout call.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LayoutContext {
    /// Target API level of the application
    pub api_version: u32,
    /// Pixels per virtual pixel
    pub density: f32,
}

impl Default for LayoutContext {
    fn default() -> Self {
        Self {
            api_version: API_VERSION_ELEVEN,
            density: 1.0,
        }
    }
}

impl LayoutContext {
    pub fn with_api_version(mut self, api_version: u32) -> Self {
        self.api_version = api_version;
        self
    }

    pub fn with_density(mut self, density: f32) -> Self {
        self.density = density;
        self
    }

    pub fn at_least(&self, api_version: u32) -> bool {
        self.api_version >= api_version
    }
}
