//! Electrical nets and naming priority
//!
//! Nets are derived data: the reconciliation engine rebuilds them wholesale,
//! carrying identity (ID, name, manual flag, root connector, description)
//! forward from their predecessors.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Prefix of auto-generated net IDs and names
pub const AUTO_NET_PREFIX: &str = "net-";

/// Type of a net member
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ElementKind {
    ConfirmedVia,
    Via,
    Connector,
    Trace,
    Pad,
}

/// One typed member of a net
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct NetElement {
    pub kind: ElementKind,
    pub id: String,
}

impl NetElement {
    pub fn new(kind: ElementKind, id: impl Into<String>) -> Self {
        Self { kind, id: id.into() }
    }
}

/// A derived electrical net
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ElectricalNet {
    pub id: String,
    pub name: String,
    /// Name was set by a user and outranks derived names
    #[serde(default)]
    pub manual_name: bool,
    #[serde(default)]
    pub root_connector: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub elements: Vec<NetElement>,
}

impl ElectricalNet {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            manual_name: false,
            root_connector: None,
            description: String::new(),
            elements: Vec::new(),
        }
    }

    pub fn with_manual_name(mut self, manual: bool) -> Self {
        self.manual_name = manual;
        self
    }

    pub fn with_element(mut self, kind: ElementKind, id: impl Into<String>) -> Self {
        self.add_element(kind, id);
        self
    }

    /// Add a member; IDs are unique within a net so duplicates are ignored
    pub fn add_element(&mut self, kind: ElementKind, id: impl Into<String>) -> bool {
        let id = id.into();
        if self.contains(&id) {
            return false;
        }
        self.elements.push(NetElement::new(kind, id));
        true
    }

    pub fn remove_element(&mut self, id: &str) -> bool {
        let before = self.elements.len();
        self.elements.retain(|e| e.id != id);
        self.elements.len() != before
    }

    pub fn contains(&self, id: &str) -> bool {
        self.elements.iter().any(|e| e.id == id)
    }

    pub fn kind_of(&self, id: &str) -> Option<ElementKind> {
        self.elements.iter().find(|e| e.id == id).map(|e| e.kind)
    }

    pub fn element_ids(&self) -> impl Iterator<Item = &str> {
        self.elements.iter().map(|e| e.id.as_str())
    }

    pub fn elements_of(&self, kind: ElementKind) -> impl Iterator<Item = &NetElement> {
        self.elements.iter().filter(move |e| e.kind == kind)
    }

    /// Members that are not traces (vias, connectors, pads)
    pub fn nodes(&self) -> impl Iterator<Item = &NetElement> {
        self.elements.iter().filter(|e| e.kind != ElementKind::Trace)
    }
}

/// Format a sequential net ID, e.g. `net-007`
pub fn format_net_id(seq: u64) -> String {
    format!("{}{:03}", AUTO_NET_PREFIX, seq)
}

/// True for names matching `net-\d+`
pub fn is_auto_name(name: &str) -> bool {
    name.strip_prefix(AUTO_NET_PREFIX)
        .map(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
        .unwrap_or(false)
}

/// Rank a net name: 2 for signal/user names, 1 for component-pin names
/// (`U1.3`), 0 for auto-generated names. Empty names rank below everything.
pub fn name_priority(name: &str) -> i8 {
    if name.is_empty() {
        -1
    } else if is_auto_name(name) {
        0
    } else if name.contains('.') {
        1
    } else {
        2
    }
}

/// Order two names by priority, then prefer the shorter string.
/// `Ordering::Greater` means `a` is the better name.
pub fn compare_names(a: &str, b: &str) -> Ordering {
    name_priority(a)
        .cmp(&name_priority(b))
        .then_with(|| b.len().cmp(&a.len()))
}

/// Pick the better of two net names; `a` wins exact ties
pub fn better_net_name<'a>(a: &'a str, b: &'a str) -> &'a str {
    match compare_names(a, b) {
        Ordering::Less => b,
        _ => a,
    }
}
