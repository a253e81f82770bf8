//! Board snapshots
//!
//! A serde image of a whole store. Restoring goes through the same `add_*`
//! paths a loader would use, so sequence counters land past every numeric ID
//! in the snapshot. Feature colours are not stored: they follow from bus
//! membership and the store configuration.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::config::StoreConfig;
use crate::error::TraceNetError;
use crate::model::{Bus, ConfirmedVia, Connector, ElectricalNet, ExtendedTrace, Via};
use crate::store::{parse_prefixed_number, FeatureStore, BUS_PREFIX};

pub const SNAPSHOT_VERSION: u32 = 1;

fn current_version() -> u32 {
    SNAPSHOT_VERSION
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BoardSnapshot {
    #[serde(default = "current_version")]
    pub version: u32,
    #[serde(default)]
    pub vias: Vec<Via>,
    #[serde(default)]
    pub traces: Vec<ExtendedTrace>,
    #[serde(default)]
    pub confirmed_vias: Vec<ConfirmedVia>,
    #[serde(default)]
    pub connectors: Vec<Connector>,
    #[serde(default)]
    pub buses: Vec<Bus>,
    #[serde(default)]
    pub nets: Vec<ElectricalNet>,
    /// Selected feature IDs
    #[serde(default)]
    pub selected: Vec<String>,
}

impl Default for BoardSnapshot {
    fn default() -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            vias: Vec::new(),
            traces: Vec::new(),
            confirmed_vias: Vec::new(),
            connectors: Vec::new(),
            buses: Vec::new(),
            nets: Vec::new(),
            selected: Vec::new(),
        }
    }
}

impl BoardSnapshot {
    pub fn from_json(json: &str) -> Result<Self, TraceNetError> {
        let snapshot: BoardSnapshot = serde_json::from_str(json)?;
        snapshot.validate()?;
        Ok(snapshot)
    }

    pub fn to_json(&self) -> Result<String, TraceNetError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject snapshots that would break store invariants on restore
    pub fn validate(&self) -> Result<(), TraceNetError> {
        if self.version > SNAPSHOT_VERSION {
            return Err(TraceNetError::InvalidSnapshot(format!(
                "unsupported version {} (newest known is {})",
                self.version, SNAPSHOT_VERSION
            )));
        }

        let mut feature_ids = HashSet::new();
        let ids = self
            .vias
            .iter()
            .map(|v| &v.id)
            .chain(self.traces.iter().map(|t| &t.id));
        for id in ids {
            if !feature_ids.insert(id.as_str()) {
                return Err(TraceNetError::InvalidSnapshot(format!(
                    "duplicate feature id {}",
                    id
                )));
            }
        }

        let mut bus_ids = HashSet::new();
        let mut owner: HashMap<&str, &str> = HashMap::new();
        for bus in &self.buses {
            if !bus_ids.insert(bus.id.as_str()) {
                return Err(TraceNetError::InvalidSnapshot(format!(
                    "duplicate bus id {}",
                    bus.id
                )));
            }
            for member in &bus.features {
                if !feature_ids.contains(member.as_str()) {
                    return Err(TraceNetError::InvalidSnapshot(format!(
                        "bus {} lists unknown feature {}",
                        bus.id, member
                    )));
                }
                if let Some(other) = owner.insert(member.as_str(), bus.id.as_str()) {
                    return Err(TraceNetError::InvalidSnapshot(format!(
                        "feature {} belongs to both {} and {}",
                        member, other, bus.id
                    )));
                }
            }
        }
        Ok(())
    }
}

impl FeatureStore {
    /// Restore a store from a snapshot
    pub fn from_snapshot(
        snapshot: BoardSnapshot,
        config: StoreConfig,
    ) -> Result<Self, TraceNetError> {
        snapshot.validate()?;
        let store = FeatureStore::with_config(config);

        for via in snapshot.vias {
            store.add_via(via);
        }
        for trace in snapshot.traces {
            store.add_trace(trace);
        }
        for cvia in snapshot.confirmed_vias {
            store.add_confirmed_via(cvia);
        }
        for conn in snapshot.connectors {
            store.add_connector(conn);
        }
        for net in snapshot.nets {
            store.add_net(net);
        }

        {
            let mut inner = store.inner.write();
            for bus in snapshot.buses {
                if let Some(n) = parse_prefixed_number(&bus.id, BUS_PREFIX) {
                    inner.seq.bus = inner.seq.bus.max(n);
                }
                let members = bus.features.clone();
                inner.buses.push(Bus {
                    features: Vec::new(),
                    ..bus
                });
                let idx = inner.buses.len() - 1;
                for id in &members {
                    inner.attach_to_bus(id, idx);
                }
            }
        }

        for id in &snapshot.selected {
            store.select(id);
        }
        Ok(store)
    }

    /// Export every entity in insertion order
    pub fn to_snapshot(&self) -> BoardSnapshot {
        let inner = self.inner.read();
        let mut selected: Vec<String> = inner.selection.iter().cloned().collect();
        selected.sort();

        BoardSnapshot {
            version: SNAPSHOT_VERSION,
            vias: inner.ordered_vias().cloned().collect(),
            traces: inner.ordered_traces().cloned().collect(),
            confirmed_vias: inner.ordered_confirmed_vias().cloned().collect(),
            connectors: inner.ordered_connectors().cloned().collect(),
            buses: inner.buses.clone(),
            nets: inner.ordered_nets().cloned().collect(),
            selected,
        }
    }
}
