//! Buses: named, coloured groupings of feature IDs
//!
//! A bus is an organizational overlay only; it never affects net membership.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Bus {
    pub id: String,
    pub name: String,
    pub color: String,
    /// Member feature IDs in assignment order
    #[serde(default)]
    pub features: Vec<String>,
}

impl Bus {
    pub fn new(id: impl Into<String>, name: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            color: color.into(),
            features: Vec::new(),
        }
    }

    pub fn contains(&self, feature_id: &str) -> bool {
        self.features.iter().any(|f| f == feature_id)
    }

    /// Append a member unless already present
    pub(crate) fn attach(&mut self, feature_id: &str) {
        if !self.contains(feature_id) {
            self.features.push(feature_id.to_string());
        }
    }

    /// Remove a member, returning whether it was present
    pub(crate) fn detach(&mut self, feature_id: &str) -> bool {
        let before = self.features.len();
        self.features.retain(|f| f != feature_id);
        self.features.len() != before
    }
}
