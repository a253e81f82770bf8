//! Bus lifecycle and assignment
//!
//! Buses and features point at each other by ID only. Every mutator here
//! keeps both directions in step: a feature's `bus_id` names a bus exactly
//! when that bus lists the feature once.

use super::{FeatureStore, StoreInner, BUS_PREFIX};
use crate::model::Bus;

impl StoreInner {
    fn bus_index(&self, bus_id: &str) -> Option<usize> {
        self.buses.iter().position(|b| b.id == bus_id)
    }

    /// Detach a feature from whichever bus holds it and reset its colour
    pub(crate) fn detach_from_bus(&mut self, feature_id: &str) -> bool {
        let unassigned = self.config.unassigned_color.clone();
        let Some(fref) = self.features.get_mut(feature_id) else {
            return false;
        };
        let Some(bus_id) = fref.bus_id.take() else {
            return false;
        };
        fref.color = unassigned;

        if let Some(idx) = self.bus_index(&bus_id) {
            self.buses[idx].detach(feature_id);
        }
        true
    }

    /// Attach a feature to the bus at `idx`, detaching it from any prior bus
    pub(crate) fn attach_to_bus(&mut self, feature_id: &str, idx: usize) -> bool {
        if !self.features.contains_key(feature_id) {
            return false;
        }
        self.detach_from_bus(feature_id);

        let bus = &mut self.buses[idx];
        bus.attach(feature_id);
        let (bus_id, color) = (bus.id.clone(), bus.color.clone());

        if let Some(fref) = self.features.get_mut(feature_id) {
            fref.bus_id = Some(bus_id);
            fref.color = color;
        }
        true
    }

    pub(crate) fn issue_bus_id(&mut self) -> String {
        self.seq.bus += 1;
        format!("{}{}", BUS_PREFIX, self.seq.bus)
    }
}

impl FeatureStore {
    /// Create a bus with a fresh ID and the next palette colour
    pub fn create_bus(&self, name: &str) -> Bus {
        let mut inner = self.inner.write();
        let id = inner.issue_bus_id();
        let color = inner.config.palette_color(inner.buses.len()).to_string();
        let bus = Bus::new(id, name, color);
        inner.buses.push(bus.clone());
        tracing::debug!(bus = %bus.id, name, "created bus");
        bus
    }

    /// Delete a bus after releasing all of its members
    pub fn delete_bus(&self, bus_id: &str) -> bool {
        let mut inner = self.inner.write();
        let Some(idx) = inner.bus_index(bus_id) else {
            tracing::debug!(bus = bus_id, "delete ignored for unknown bus");
            return false;
        };
        let members = std::mem::take(&mut inner.buses[idx].features);
        let unassigned = inner.config.unassigned_color.clone();
        for id in &members {
            if let Some(fref) = inner.features.get_mut(id) {
                fref.bus_id = None;
                fref.color = unassigned.clone();
            }
        }
        inner.buses.remove(idx);
        true
    }

    /// Move every selected feature into `bus_id`. Returns how many moved.
    pub fn assign_to_bus(&self, bus_id: &str) -> usize {
        let mut inner = self.inner.write();
        let Some(idx) = inner.bus_index(bus_id) else {
            tracing::debug!(bus = bus_id, "assignment ignored for unknown bus");
            return 0;
        };
        let mut selected: Vec<String> = inner.selection.iter().cloned().collect();
        selected.sort();

        selected
            .iter()
            .filter(|id| inner.attach_to_bus(id, idx))
            .count()
    }

    /// Detach specific features from their buses, selected or not
    pub fn unassign_from_bus<S: AsRef<str>>(&self, feature_ids: &[S]) -> usize {
        let mut inner = self.inner.write();
        feature_ids
            .iter()
            .filter(|id| inner.detach_from_bus(id.as_ref()))
            .count()
    }

    /// Recolour a bus and every current member
    pub fn set_bus_color(&self, bus_id: &str, color: &str) -> bool {
        let mut inner = self.inner.write();
        let Some(idx) = inner.bus_index(bus_id) else {
            return false;
        };
        inner.buses[idx].color = color.to_string();
        let members = inner.buses[idx].features.clone();
        for id in &members {
            if let Some(fref) = inner.features.get_mut(id) {
                fref.color = color.to_string();
            }
        }
        true
    }

    pub fn rename_bus(&self, bus_id: &str, name: &str) -> bool {
        let mut inner = self.inner.write();
        match inner.buses.iter_mut().find(|b| b.id == bus_id) {
            Some(bus) => {
                bus.name = name.to_string();
                true
            }
            None => false,
        }
    }

    pub fn bus(&self, bus_id: &str) -> Option<Bus> {
        self.inner
            .read()
            .buses
            .iter()
            .find(|b| b.id == bus_id)
            .cloned()
    }

    /// All buses in creation order
    pub fn buses(&self) -> Vec<Bus> {
        self.inner.read().buses.clone()
    }

    pub fn bus_for_feature(&self, feature_id: &str) -> Option<Bus> {
        let inner = self.inner.read();
        let bus_id = inner.features.get(feature_id)?.bus_id.as_deref()?;
        inner.buses.iter().find(|b| b.id == bus_id).cloned()
    }
}
