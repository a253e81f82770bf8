//! Non-feature board objects: confirmed vias and edge connectors

use serde::{Deserialize, Serialize};

use super::feature::Side;
use crate::geometry::{Point, Rect};

/// Default connector hit area when the pipeline does not supply one
const DEFAULT_CONNECTOR_SIZE: f64 = 4.0;

fn default_connector_size() -> f64 {
    DEFAULT_CONNECTOR_SIZE
}

/// A via matched on both sides of the board; one electrical node
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConfirmedVia {
    pub id: String,
    pub center: Point,
}

impl ConfirmedVia {
    pub fn new(id: impl Into<String>, center: Point) -> Self {
        Self {
            id: id.into(),
            center,
        }
    }
}

/// A board-edge contact
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Connector {
    pub id: String,
    pub side: Side,
    pub pin_number: u32,
    #[serde(default)]
    pub signal_name: String,
    pub center: Point,
    #[serde(default = "default_connector_size")]
    pub width: f64,
    #[serde(default = "default_connector_size")]
    pub height: f64,
}

impl Connector {
    pub fn new(id: impl Into<String>, side: Side, pin_number: u32, center: Point) -> Self {
        Self {
            id: id.into(),
            side,
            pin_number,
            signal_name: String::new(),
            center,
            width: DEFAULT_CONNECTOR_SIZE,
            height: DEFAULT_CONNECTOR_SIZE,
        }
    }

    pub fn with_signal(mut self, signal_name: impl Into<String>) -> Self {
        self.signal_name = signal_name.into();
        self
    }

    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn bounds(&self) -> Rect {
        Rect::centered(self.center, self.width, self.height)
    }

    /// True when `p` falls inside the contact area
    pub fn hit_test(&self, p: &Point) -> bool {
        self.bounds().contains(p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connector_hit_area() {
        let conn = Connector::new("conn-1", Side::Front, 1, Point::new(50.0, 5.0))
            .with_size(4.0, 10.0)
            .with_signal("VCC");

        assert!(conn.hit_test(&Point::new(52.0, 10.0)));
        assert!(!conn.hit_test(&Point::new(52.5, 5.0)));
        assert_eq!(conn.signal_name, "VCC");
    }
}
