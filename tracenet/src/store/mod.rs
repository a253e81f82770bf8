//! Feature Store
//!
//! The single repository for every feature, confirmed via, connector, bus and
//! net on a board. All state sits behind one reader/writer lock; each public
//! method takes the lock once, so every operation is atomic with respect to
//! every other. Readers receive clones, never references into the store.
//!
//! Vias and traces share one ID namespace and live in one map of
//! [`FeatureRef`]s, with a separate insertion-ordered ID list per type for
//! ordered iteration and hit-test priority.

mod bus;
mod nets;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::config::StoreConfig;
use crate::geometry::{Point, Rect};
use crate::model::{
    Bus, ConfirmedVia, Connector, ElectricalNet, ExtendedTrace, Feature, FeatureKind, FeatureRef,
    Via,
};

pub(crate) const VIA_PREFIX: &str = "via-";
pub(crate) const CONFIRMED_VIA_PREFIX: &str = "cvia-";
pub(crate) const TRACE_PREFIX: &str = "trace-";
pub(crate) const BUS_PREFIX: &str = "bus-";

/// Largest ID number that can seed a sequence counter. Anything above is
/// treated as non-matching so counters always have room to grow.
pub(crate) const MAX_SEQUENCE: u64 = u64::MAX / 2;

fn parse_sequence_digits(digits: &str) -> Option<u64> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok().filter(|n| *n <= MAX_SEQUENCE)
}

/// Parse `<prefix><digits>` exactly; anything else is non-matching
pub(crate) fn parse_prefixed_number(id: &str, prefix: &str) -> Option<u64> {
    parse_sequence_digits(id.strip_prefix(prefix)?)
}

/// Numeric suffix after the last `-`, e.g. `trace-17` -> 17
pub(crate) fn parse_numeric_suffix(id: &str) -> Option<u64> {
    let (_, digits) = id.rsplit_once('-')?;
    parse_sequence_digits(digits)
}

/// Store-owned sequence state. Every field only ever grows.
#[derive(Debug, Clone, Default)]
pub(crate) struct Sequences {
    /// Highest `via-N` ever inserted
    pub(crate) via_high: u64,
    /// Highest `cvia-N` ever inserted
    pub(crate) confirmed_via_high: u64,
    /// Last reserved trace number
    pub(crate) trace: u64,
    /// Last reserved net number
    pub(crate) net: u64,
    /// Last issued bus number
    pub(crate) bus: u64,
}

/// Counts of every entity in a store
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoreStats {
    pub via_count: usize,
    pub trace_count: usize,
    pub confirmed_via_count: usize,
    pub connector_count: usize,
    pub bus_count: usize,
    pub net_count: usize,
    pub selected_count: usize,
}

#[derive(Debug, Default)]
pub(crate) struct StoreInner {
    pub(crate) config: StoreConfig,
    pub(crate) features: HashMap<String, FeatureRef>,
    pub(crate) via_order: Vec<String>,
    pub(crate) trace_order: Vec<String>,
    pub(crate) confirmed_vias: HashMap<String, ConfirmedVia>,
    pub(crate) confirmed_order: Vec<String>,
    pub(crate) connectors: HashMap<String, Connector>,
    pub(crate) connector_order: Vec<String>,
    pub(crate) buses: Vec<Bus>,
    pub(crate) nets: HashMap<String, ElectricalNet>,
    pub(crate) net_order: Vec<String>,
    /// Element ID -> net ID. A cache over `nets`, rebuilt freely.
    pub(crate) element_to_net: HashMap<String, String>,
    pub(crate) selection: HashSet<String>,
    pub(crate) seq: Sequences,
}

impl StoreInner {
    fn new(config: StoreConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    /// Insert or replace a feature. A replacement keeps the existing bus,
    /// colour and selection state.
    fn insert_feature(&mut self, feature: Feature) {
        let id = feature.id().to_string();
        let kind = feature.kind();

        if let Some(existing) = self.features.get_mut(&id) {
            let old_kind = existing.feature.kind();
            existing.feature = feature;
            if old_kind == kind {
                return;
            }
            self.order_mut(old_kind).retain(|f| f != &id);
            self.order_mut(kind).push(id);
            return;
        }

        let color = self.config.unassigned_color.clone();
        self.features
            .insert(id.clone(), FeatureRef::new(feature, color));
        self.order_mut(kind).push(id);
    }

    fn remove_feature(&mut self, id: &str, kind: FeatureKind) -> bool {
        match self.features.get(id) {
            Some(fref) if fref.feature.kind() == kind => {}
            _ => return false,
        }
        self.detach_from_bus(id);
        self.features.remove(id);
        self.order_mut(kind).retain(|f| f != id);
        self.selection.remove(id);
        true
    }

    fn order_mut(&mut self, kind: FeatureKind) -> &mut Vec<String> {
        match kind {
            FeatureKind::Via => &mut self.via_order,
            FeatureKind::Trace => &mut self.trace_order,
        }
    }

    /// Features in hit-test order: every via before any trace
    pub(crate) fn ordered_features(&self) -> impl Iterator<Item = &FeatureRef> {
        self.via_order
            .iter()
            .chain(self.trace_order.iter())
            .filter_map(|id| self.features.get(id))
    }

    pub(crate) fn ordered_traces(&self) -> impl Iterator<Item = &ExtendedTrace> {
        self.trace_order
            .iter()
            .filter_map(|id| self.features.get(id))
            .filter_map(|f| f.feature.as_trace())
    }

    pub(crate) fn ordered_vias(&self) -> impl Iterator<Item = &Via> {
        self.via_order
            .iter()
            .filter_map(|id| self.features.get(id))
            .filter_map(|f| f.feature.as_via())
    }

    pub(crate) fn ordered_confirmed_vias(&self) -> impl Iterator<Item = &ConfirmedVia> {
        self.confirmed_order
            .iter()
            .filter_map(|id| self.confirmed_vias.get(id))
    }

    pub(crate) fn ordered_connectors(&self) -> impl Iterator<Item = &Connector> {
        self.connector_order
            .iter()
            .filter_map(|id| self.connectors.get(id))
    }

    fn set_selected(&mut self, id: &str, selected: bool) -> bool {
        let Some(fref) = self.features.get_mut(id) else {
            tracing::debug!(feature = id, "selection change ignored for unknown feature");
            return false;
        };
        fref.selected = selected;
        if selected {
            self.selection.insert(id.to_string());
        } else {
            self.selection.remove(id);
        }
        true
    }

    fn next_via_number(&self) -> u64 {
        let scanned = self
            .features
            .keys()
            .filter_map(|id| parse_prefixed_number(id, VIA_PREFIX))
            .max()
            .unwrap_or(0);
        scanned.max(self.seq.via_high) + 1
    }

    fn next_confirmed_via_number(&self) -> u64 {
        let scanned = self
            .confirmed_vias
            .keys()
            .filter_map(|id| parse_prefixed_number(id, CONFIRMED_VIA_PREFIX))
            .max()
            .unwrap_or(0);
        scanned.max(self.seq.confirmed_via_high) + 1
    }

    /// True when `id` names a live feature, confirmed via or connector
    pub(crate) fn is_live_element(&self, id: &str) -> bool {
        self.features.contains_key(id)
            || self.confirmed_vias.contains_key(id)
            || self.connectors.contains_key(id)
    }
}

/// Concurrent, indexed repository of board features.
#[derive(Debug)]
pub struct FeatureStore {
    pub(crate) inner: RwLock<StoreInner>,
}

impl Default for FeatureStore {
    fn default() -> Self {
        Self::new()
    }
}

impl FeatureStore {
    /// Create an empty store with the default configuration
    pub fn new() -> Self {
        Self::with_config(StoreConfig::default())
    }

    /// Create an empty store with a custom configuration
    pub fn with_config(config: StoreConfig) -> Self {
        Self {
            inner: RwLock::new(StoreInner::new(config)),
        }
    }

    pub fn config(&self) -> StoreConfig {
        self.inner.read().config.clone()
    }

    // ---------------------------------------------------------------------
    // Vias and traces
    // ---------------------------------------------------------------------

    /// Insert a single-side via
    pub fn add_via(&self, via: Via) {
        let mut inner = self.inner.write();
        if let Some(n) = parse_prefixed_number(&via.id, VIA_PREFIX) {
            inner.seq.via_high = inner.seq.via_high.max(n);
        }
        inner.insert_feature(Feature::Via(via));
    }

    /// Insert a trace, advancing the trace counter past any numeric suffix
    pub fn add_trace(&self, trace: ExtendedTrace) {
        let mut inner = self.inner.write();
        if let Some(n) = parse_numeric_suffix(&trace.id) {
            if n >= inner.seq.trace {
                inner.seq.trace = n;
            }
        }
        inner.insert_feature(Feature::Trace(trace));
    }

    pub fn remove_via(&self, id: &str) -> bool {
        self.inner.write().remove_feature(id, FeatureKind::Via)
    }

    pub fn remove_trace(&self, id: &str) -> bool {
        self.inner.write().remove_feature(id, FeatureKind::Trace)
    }

    /// Replace a trace's point list
    pub fn update_trace_points(&self, id: &str, points: Vec<Point>) -> bool {
        let mut inner = self.inner.write();
        match inner
            .features
            .get_mut(id)
            .and_then(|f| f.feature.as_trace_mut())
        {
            Some(trace) => {
                trace.points = points;
                true
            }
            None => false,
        }
    }

    /// Move one vertex of a trace (vertex drag)
    pub fn move_trace_vertex(&self, id: &str, index: usize, to: Point) -> bool {
        let mut inner = self.inner.write();
        let Some(trace) = inner
            .features
            .get_mut(id)
            .and_then(|f| f.feature.as_trace_mut())
        else {
            return false;
        };
        match trace.points.get_mut(index) {
            Some(p) => {
                *p = to;
                true
            }
            None => false,
        }
    }

    pub fn feature(&self, id: &str) -> Option<FeatureRef> {
        self.inner.read().features.get(id).cloned()
    }

    pub fn via(&self, id: &str) -> Option<Via> {
        self.inner
            .read()
            .features
            .get(id)
            .and_then(|f| f.feature.as_via())
            .cloned()
    }

    pub fn trace(&self, id: &str) -> Option<ExtendedTrace> {
        self.inner
            .read()
            .features
            .get(id)
            .and_then(|f| f.feature.as_trace())
            .cloned()
    }

    /// All vias in insertion order
    pub fn vias(&self) -> Vec<Via> {
        self.inner.read().ordered_vias().cloned().collect()
    }

    /// All traces in insertion order
    pub fn traces(&self) -> Vec<ExtendedTrace> {
        self.inner.read().ordered_traces().cloned().collect()
    }

    /// All features, vias first, each type in insertion order
    pub fn features(&self) -> Vec<FeatureRef> {
        self.inner.read().ordered_features().cloned().collect()
    }

    /// Next free via number. Not reserved: insert the via before releasing
    /// control to another caller that might number one too.
    pub fn next_via_number(&self) -> u64 {
        self.inner.read().next_via_number()
    }

    /// Reserve the next trace number. Safe for concurrent callers.
    pub fn next_trace_seq(&self) -> u64 {
        let mut inner = self.inner.write();
        inner.seq.trace += 1;
        inner.seq.trace
    }

    /// Reserve a fresh trace ID such as `trace-12`
    pub fn next_trace_id(&self) -> String {
        format!("{}{}", TRACE_PREFIX, self.next_trace_seq())
    }

    // ---------------------------------------------------------------------
    // Confirmed vias and connectors
    // ---------------------------------------------------------------------

    pub fn add_confirmed_via(&self, via: ConfirmedVia) {
        let mut inner = self.inner.write();
        if let Some(n) = parse_prefixed_number(&via.id, CONFIRMED_VIA_PREFIX) {
            inner.seq.confirmed_via_high = inner.seq.confirmed_via_high.max(n);
        }
        if !inner.confirmed_vias.contains_key(&via.id) {
            inner.confirmed_order.push(via.id.clone());
        }
        inner.confirmed_vias.insert(via.id.clone(), via);
    }

    pub fn remove_confirmed_via(&self, id: &str) -> bool {
        let mut inner = self.inner.write();
        if inner.confirmed_vias.remove(id).is_none() {
            return false;
        }
        inner.confirmed_order.retain(|c| c != id);
        inner.selection.remove(id);
        true
    }

    pub fn confirmed_via(&self, id: &str) -> Option<ConfirmedVia> {
        self.inner.read().confirmed_vias.get(id).cloned()
    }

    pub fn confirmed_vias(&self) -> Vec<ConfirmedVia> {
        self.inner.read().ordered_confirmed_vias().cloned().collect()
    }

    /// Next free confirmed-via number; same caveat as [`Self::next_via_number`]
    pub fn next_confirmed_via_number(&self) -> u64 {
        self.inner.read().next_confirmed_via_number()
    }

    pub fn add_connector(&self, connector: Connector) {
        let mut inner = self.inner.write();
        if !inner.connectors.contains_key(&connector.id) {
            inner.connector_order.push(connector.id.clone());
        }
        inner.connectors.insert(connector.id.clone(), connector);
    }

    pub fn remove_connector(&self, id: &str) -> bool {
        let mut inner = self.inner.write();
        if inner.connectors.remove(id).is_none() {
            return false;
        }
        inner.connector_order.retain(|c| c != id);
        inner.selection.remove(id);
        true
    }

    pub fn connector(&self, id: &str) -> Option<Connector> {
        self.inner.read().connectors.get(id).cloned()
    }

    pub fn connectors(&self) -> Vec<Connector> {
        self.inner.read().ordered_connectors().cloned().collect()
    }

    // ---------------------------------------------------------------------
    // Spatial queries
    // ---------------------------------------------------------------------

    /// First feature under the point. Vias are tested before traces.
    pub fn hit_test(&self, x: f64, y: f64) -> Option<FeatureRef> {
        let p = Point::new(x, y);
        self.inner
            .read()
            .ordered_features()
            .find(|f| f.feature.hit_test(&p))
            .cloned()
    }

    /// Every feature under the point, in no particular order
    pub fn hit_test_all(&self, x: f64, y: f64) -> Vec<FeatureRef> {
        let p = Point::new(x, y);
        self.inner
            .read()
            .features
            .values()
            .filter(|f| f.feature.hit_test(&p))
            .cloned()
            .collect()
    }

    /// Features whose bounds overlap `region`
    pub fn features_in_region(&self, region: &Rect) -> Vec<FeatureRef> {
        self.inner
            .read()
            .ordered_features()
            .filter(|f| f.feature.bounds().intersects(region))
            .cloned()
            .collect()
    }

    // ---------------------------------------------------------------------
    // Selection
    // ---------------------------------------------------------------------

    pub fn select(&self, id: &str) {
        self.inner.write().set_selected(id, true);
    }

    pub fn deselect(&self, id: &str) {
        self.inner.write().set_selected(id, false);
    }

    /// Flip selection; returns the new state (false for unknown IDs)
    pub fn toggle_select(&self, id: &str) -> bool {
        let mut inner = self.inner.write();
        let Some(selected) = inner.features.get(id).map(|f| !f.selected) else {
            return false;
        };
        inner.set_selected(id, selected);
        selected
    }

    pub fn clear_selection(&self) {
        let mut inner = self.inner.write();
        let ids: Vec<String> = inner.selection.drain().collect();
        for id in ids {
            if let Some(fref) = inner.features.get_mut(&id) {
                fref.selected = false;
            }
        }
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.inner.read().selection.contains(id)
    }

    /// Selected IDs, sorted
    pub fn selected_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.inner.read().selection.iter().cloned().collect();
        ids.sort();
        ids
    }

    // ---------------------------------------------------------------------
    // Statistics
    // ---------------------------------------------------------------------

    pub fn stats(&self) -> StoreStats {
        let inner = self.inner.read();
        StoreStats {
            via_count: inner.via_order.len(),
            trace_count: inner.trace_order.len(),
            confirmed_via_count: inner.confirmed_order.len(),
            connector_count: inner.connector_order.len(),
            bus_count: inner.buses.len(),
            net_count: inner.nets.len(),
            selected_count: inner.selection.len(),
        }
    }
}
