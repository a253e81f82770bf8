//! Net table accessors
//!
//! `nets` is authoritative; `element_to_net` is a cache that may be stale or
//! empty, so every lookup through it is verified and falls back to a scan.

use super::{parse_numeric_suffix, FeatureStore, StoreInner};
use crate::model::net::format_net_id;
use crate::model::ElectricalNet;

impl StoreInner {
    pub(crate) fn insert_net(&mut self, net: ElectricalNet) {
        if let Some(n) = parse_numeric_suffix(&net.id) {
            if n >= self.seq.net {
                self.seq.net = n;
            }
        }
        for id in net.element_ids() {
            self.element_to_net.insert(id.to_string(), net.id.clone());
        }
        if !self.nets.contains_key(&net.id) {
            self.net_order.push(net.id.clone());
        }
        self.nets.insert(net.id.clone(), net);
    }

    /// Reserve a fresh `net-NNN` ID that no live net uses
    pub(crate) fn issue_net_id(&mut self) -> String {
        loop {
            self.seq.net += 1;
            let id = format_net_id(self.seq.net);
            if !self.nets.contains_key(&id) {
                return id;
            }
        }
    }

    pub(crate) fn rebuild_net_index(&mut self) {
        self.element_to_net = self
            .net_order
            .iter()
            .filter_map(|id| self.nets.get(id))
            .flat_map(|net| {
                net.element_ids()
                    .map(move |e| (e.to_string(), net.id.clone()))
            })
            .collect();
    }

    pub(crate) fn net_id_for_element(&self, element_id: &str) -> Option<&str> {
        if let Some(net_id) = self.element_to_net.get(element_id) {
            if let Some(net) = self.nets.get(net_id) {
                if net.contains(element_id) {
                    return Some(net.id.as_str());
                }
            }
        }
        self.ordered_nets()
            .find(|net| net.contains(element_id))
            .map(|net| net.id.as_str())
    }

    pub(crate) fn ordered_nets(&self) -> impl Iterator<Item = &ElectricalNet> {
        self.net_order.iter().filter_map(|id| self.nets.get(id))
    }
}

impl FeatureStore {
    /// Insert a net, advancing the net counter and indexing its elements
    pub fn add_net(&self, net: ElectricalNet) {
        self.inner.write().insert_net(net);
    }

    pub fn remove_net(&self, id: &str) -> bool {
        let mut inner = self.inner.write();
        if inner.nets.remove(id).is_none() {
            return false;
        }
        inner.net_order.retain(|n| n != id);
        inner.element_to_net.retain(|_, net_id| net_id.as_str() != id);
        true
    }

    pub fn net(&self, id: &str) -> Option<ElectricalNet> {
        self.inner.read().nets.get(id).cloned()
    }

    /// First net carrying `name`
    pub fn net_by_name(&self, name: &str) -> Option<ElectricalNet> {
        self.inner
            .read()
            .ordered_nets()
            .find(|n| n.name == name)
            .cloned()
    }

    /// The net containing an element
    pub fn net_for_element(&self, element_id: &str) -> Option<ElectricalNet> {
        let inner = self.inner.read();
        let net_id = inner.net_id_for_element(element_id)?;
        inner.nets.get(net_id).cloned()
    }

    /// All nets in insertion order
    pub fn nets(&self) -> Vec<ElectricalNet> {
        self.inner.read().ordered_nets().cloned().collect()
    }

    /// Reserve a fresh `net-NNN` ID. Safe for concurrent callers.
    pub fn next_net_id(&self) -> String {
        self.inner.write().issue_net_id()
    }

    /// Set a user-chosen name; the net then outranks derived names
    pub fn rename_net(&self, id: &str, name: &str) -> bool {
        let mut inner = self.inner.write();
        match inner.nets.get_mut(id) {
            Some(net) => {
                net.name = name.to_string();
                net.manual_name = true;
                true
            }
            None => false,
        }
    }

    pub fn set_net_description(&self, id: &str, description: &str) -> bool {
        let mut inner = self.inner.write();
        match inner.nets.get_mut(id) {
            Some(net) => {
                net.description = description.to_string();
                true
            }
            None => false,
        }
    }

    /// Rebuild the element -> net index from the net table
    pub fn rebuild_net_index(&self) {
        self.inner.write().rebuild_net_index();
    }
}
