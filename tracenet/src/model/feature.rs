//! Board features: single-side vias and copper traces
//!
//! Both shapes share one ID namespace in the store and are handled through the
//! closed [`Feature`] sum type.

use serde::{Deserialize, Serialize};

use crate::geometry::{Point, Rect};

/// Which face of the board a feature was detected on
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Front,
    Back,
}

impl Side {
    pub fn opposite(self) -> Self {
        match self {
            Side::Front => Side::Back,
            Side::Back => Side::Front,
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Front => write!(f, "front"),
            Side::Back => write!(f, "back"),
        }
    }
}

/// How a trace came to exist
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    #[default]
    Detected,
    Manual,
    Inferred,
}

/// A plated hole seen on one side of the board
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Via {
    pub id: String,
    pub center: Point,
    pub radius: f64,
    pub side: Side,
}

impl Via {
    pub fn new(id: impl Into<String>, center: Point, radius: f64, side: Side) -> Self {
        Self {
            id: id.into(),
            center,
            radius,
            side,
        }
    }

    pub fn hit_test(&self, p: &Point) -> bool {
        self.center.distance_to(p) <= self.radius
    }

    pub fn bounds(&self) -> Rect {
        Rect::around(self.center, self.radius)
    }
}

/// A vectorized copper path
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExtendedTrace {
    pub id: String,
    pub side: Side,
    pub points: Vec<Point>,
    pub width: f64,
    #[serde(default)]
    pub provenance: Provenance,
}

impl ExtendedTrace {
    pub fn new(id: impl Into<String>, side: Side, points: Vec<Point>, width: f64) -> Self {
        Self {
            id: id.into(),
            side,
            points,
            width,
            provenance: Provenance::Detected,
        }
    }

    pub fn with_provenance(mut self, provenance: Provenance) -> Self {
        self.provenance = provenance;
        self
    }

    /// First and last recorded point
    pub fn endpoints(&self) -> Option<(Point, Point)> {
        let first = self.points.first()?;
        let last = self.points.last()?;
        Some((*first, *last))
    }

    /// Total polyline length
    pub fn length(&self) -> f64 {
        self.points
            .windows(2)
            .map(|w| w[0].distance_to(&w[1]))
            .sum()
    }

    pub fn hit_test(&self, p: &Point) -> bool {
        let reach = self.width / 2.0;
        match self.points.as_slice() {
            [] => false,
            [only] => only.distance_to(p) <= reach,
            points => points
                .windows(2)
                .any(|w| p.distance_to_segment(&w[0], &w[1]) <= reach),
        }
    }

    pub fn bounds(&self) -> Rect {
        Rect::bounding(&self.points)
            .map(|r| r.inflate(self.width / 2.0))
            .unwrap_or_default()
    }
}

/// Discriminant of a [`Feature`]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum FeatureKind {
    Via,
    Trace,
}

/// A hit-testable board feature
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Feature {
    Via(Via),
    Trace(ExtendedTrace),
}

impl Feature {
    pub fn id(&self) -> &str {
        match self {
            Feature::Via(v) => &v.id,
            Feature::Trace(t) => &t.id,
        }
    }

    pub fn side(&self) -> Side {
        match self {
            Feature::Via(v) => v.side,
            Feature::Trace(t) => t.side,
        }
    }

    pub fn kind(&self) -> FeatureKind {
        match self {
            Feature::Via(_) => FeatureKind::Via,
            Feature::Trace(_) => FeatureKind::Trace,
        }
    }

    pub fn hit_test(&self, p: &Point) -> bool {
        match self {
            Feature::Via(v) => v.hit_test(p),
            Feature::Trace(t) => t.hit_test(p),
        }
    }

    pub fn bounds(&self) -> Rect {
        match self {
            Feature::Via(v) => v.bounds(),
            Feature::Trace(t) => t.bounds(),
        }
    }

    pub fn as_via(&self) -> Option<&Via> {
        match self {
            Feature::Via(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_trace(&self) -> Option<&ExtendedTrace> {
        match self {
            Feature::Trace(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_trace_mut(&mut self) -> Option<&mut ExtendedTrace> {
        match self {
            Feature::Trace(t) => Some(t),
            _ => None,
        }
    }
}

/// A feature joined with its overlay state (bus, colour, selection)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FeatureRef {
    pub feature: Feature,
    /// Owning bus, `None` when unassigned
    pub bus_id: Option<String>,
    /// Effective display colour
    pub color: String,
    pub selected: bool,
}

impl FeatureRef {
    pub fn new(feature: Feature, color: impl Into<String>) -> Self {
        Self {
            feature,
            bus_id: None,
            color: color.into(),
            selected: false,
        }
    }

    pub fn id(&self) -> &str {
        self.feature.id()
    }
}
