//! TraceNet - feature repository and net reconciliation for reverse-engineered PCBs
//!
//! This library stores the geometric evidence an image pipeline finds on a
//! board (vias, traces, confirmed vias, edge connectors), layers buses and
//! selection on top of it, and derives electrical nets from that geometry
//! while keeping net identity stable across repeated runs.
//!
//! # Quick Start
//!
//! ```
//! use tracenet::prelude::*;
//!
//! let store = FeatureStore::new();
//! store.add_confirmed_via(ConfirmedVia::new("cvia-1", Point::new(0.0, 0.0)));
//! store.add_confirmed_via(ConfirmedVia::new("cvia-2", Point::new(20.0, 0.0)));
//! store.add_trace(ExtendedTrace::new(
//!     "trace-1",
//!     Side::Front,
//!     vec![Point::new(0.0, 0.0), Point::new(20.0, 0.0)],
//!     0.5,
//! ));
//!
//! let report = store.reconcile_nets(1.0);
//! assert_eq!(report.nets_after, 1);
//! assert_eq!(store.net_for_element("cvia-2").unwrap().name, "net-001");
//! ```
//!
//! # Features
//!
//! - **Feature store**: one lock, O(1) ID lookup, ordered iteration, hit-testing
//! - **Buses**: coloured, user-defined groupings kept consistent in both directions
//! - **Net reconciliation**: union-find over tolerance-matched geometry with
//!   merge/split identity rules and name priority
//! - **Diagnostics**: per-net connectivity check through the net's own traces
//! - **Snapshots**: serde round trip of the whole store

pub mod config;
pub mod error;
pub mod geometry;
pub mod model;
pub mod netlist;
pub mod snapshot;
pub mod store;

// Re-export main types
pub use config::StoreConfig;
pub use error::TraceNetError;
pub use geometry::{Point, Rect};
pub use model::{
    better_net_name, Bus, ConfirmedVia, Connector, ElectricalNet, ElementKind, ExtendedTrace,
    Feature, FeatureKind, FeatureRef, NetElement, Provenance, Side, Via,
};
pub use netlist::{ConnectivityReport, NetMerge, NetSplit, ReconcileReport};
pub use snapshot::BoardSnapshot;
pub use store::{FeatureStore, StoreStats};

/// Restore a store from snapshot JSON (convenience wrapper).
pub fn load_snapshot_json(json: &str, config: StoreConfig) -> Result<FeatureStore, TraceNetError> {
    let snapshot = BoardSnapshot::from_json(json)?;
    FeatureStore::from_snapshot(snapshot, config)
}

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{
        BoardSnapshot, ConfirmedVia, Connector, ElectricalNet, ElementKind, ExtendedTrace,
        FeatureStore, Point, Rect, ReconcileReport, Side, StoreConfig, TraceNetError, Via,
    };
}
