//! Lengths with units, as written by the declarative layer.

/// A length value with unit.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Dimension {
    pub value: f32,
    pub unit: DimensionUnit,
}

impl Dimension {
    pub const fn px(value: f32) -> Self {
        Self { value, unit: DimensionUnit::Px }
    }

    pub const fn vp(value: f32) -> Self {
        Self { value, unit: DimensionUnit::Vp }
    }

    pub const fn percent(value: f32) -> Self {
        Self { value, unit: DimensionUnit::Percent }
    }

    /// Size determined by content.
    pub const fn auto() -> Self {
        Self { value: 0.0, unit: DimensionUnit::Auto }
    }

    pub fn is_auto(&self) -> bool {
        self.unit == DimensionUnit::Auto
    }

    /// Convert to pixels.
    ///
    /// `density` converts virtual pixels; `percent_reference` is the parent
    /// length percentages resolve against. `Auto` never converts.
    pub fn to_px(&self, density: f32, percent_reference: Option<f32>) -> Option<f32> {
        match self.unit {
            DimensionUnit::Px => Some(self.value),
            DimensionUnit::Vp => Some(self.value * density),
            DimensionUnit::Percent => percent_reference.map(|p| p * self.value / 100.0),
            DimensionUnit::Auto => None,
        }
    }
}

impl Default for Dimension {
    fn default() -> Self {
        Self::px(0.0)
    }
}

/// Length units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DimensionUnit {
    /// Physical pixels
    Px,
    /// Virtual pixels, scaled by screen density
    Vp,
    /// Percentage of the parent's reference length
    Percent,
    /// Content-determined
    Auto,
}
