//! Store configuration

use serde::{Deserialize, Serialize};

/// Tunables for a [`FeatureStore`](crate::FeatureStore).
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StoreConfig {
    /// Bus colours, handed out by creation order and cycling
    pub bus_palette: Vec<String>,
    /// Colour of features that belong to no bus
    pub unassigned_color: String,
    /// Tolerance used when callers do not supply one
    pub default_tolerance: f64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            bus_palette: [
                "#E6194B", "#3CB44B", "#FFE119", "#4363D8", "#F58231", "#911EB4", "#46F0F0",
                "#F032E6",
            ]
            .iter()
            .map(|c| c.to_string())
            .collect(),
            unassigned_color: "#808080".to_string(),
            default_tolerance: 3.0,
        }
    }
}

impl StoreConfig {
    /// Palette colour for the `index`-th bus, wrapping around
    pub fn palette_color(&self, index: usize) -> &str {
        if self.bus_palette.is_empty() {
            return &self.unassigned_color;
        }
        &self.bus_palette[index % self.bus_palette.len()]
    }
}
