//! Net Reconciliation
//!
//! Re-derives the whole net partition from current geometry while carrying
//! net identity forward. The pass runs under the store's write lock:
//!
//! 1. Seed a union-find with every prior net member (still live, or a pad),
//!    every trace, every confirmed via and every connector.
//! 2. Union each trace with confirmed vias near its endpoints and with
//!    same-side connectors whose contact area covers an endpoint.
//! 3. Union trace pairs where an endpoint of one lies near any vertex of the
//!    other (end-to-end joins, T-junctions and mid-trace taps).
//! 4. Group by root, then resolve each component's identity against the
//!    nets its members belonged to before the pass.
//! 5. Swap in the new table and rebuild the element index.
//!
//! Trace pairing is quadratic in the trace count. Boards with tens of
//! thousands of traces should be reconciled region by region upstream.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use super::union_find::UnionFind;
use crate::geometry::{Point, Rect};
use crate::model::net::compare_names;
use crate::model::{ElectricalNet, ElementKind, ExtendedTrace};
use crate::store::{FeatureStore, StoreInner};

/// Several prior nets collapsed into one
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NetMerge {
    pub surviving: String,
    pub absorbed: Vec<String>,
}

/// One prior net now spans more than one component
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NetSplit {
    pub original: String,
    pub minted: String,
}

/// Outcome of one reconciliation pass
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ReconcileReport {
    pub tolerance: f64,
    pub nets_before: usize,
    pub nets_after: usize,
    /// Connected components found, including dropped ones
    pub components: usize,
    /// Untraced components with no prior net, discarded as noise
    pub dropped: usize,
    pub merges: Vec<NetMerge>,
    pub splits: Vec<NetSplit>,
}

impl ReconcileReport {
    pub fn has_topology_changes(&self) -> bool {
        !self.merges.is_empty() || !self.splits.is_empty()
    }
}

impl FeatureStore {
    /// Rebuild every net from geometry. Holds the write lock for the whole
    /// pass, so readers see either the old table or the new one.
    pub fn reconcile_nets(&self, tolerance: f64) -> ReconcileReport {
        let mut inner = self.inner.write();
        reconcile(&mut inner, tolerance)
    }
}

/// Identity metadata carried from a prior net
struct Identity {
    id: String,
    name: String,
    manual_name: bool,
    root_connector: Option<String>,
    description: String,
}

impl Identity {
    fn fresh(id: String) -> Self {
        Self {
            name: id.clone(),
            id,
            manual_name: false,
            root_connector: None,
            description: String::new(),
        }
    }

    fn inherit(net: &ElectricalNet) -> Self {
        Self {
            id: net.id.clone(),
            name: net.name.clone(),
            manual_name: net.manual_name,
            root_connector: net.root_connector.clone(),
            description: net.description.clone(),
        }
    }
}

/// Manual names first, then name priority and length, then the smaller ID
fn rank_nets(a: &ElectricalNet, b: &ElectricalNet) -> Ordering {
    a.manual_name
        .cmp(&b.manual_name)
        .then_with(|| compare_names(&a.name, &b.name))
        .then_with(|| b.id.cmp(&a.id))
}

fn kind_order(kind: ElementKind) -> u8 {
    match kind {
        ElementKind::Connector => 0,
        ElementKind::ConfirmedVia => 1,
        ElementKind::Via => 2,
        ElementKind::Pad => 3,
        ElementKind::Trace => 4,
    }
}

/// Closed bounding-box overlap, used to skip trace pairs that cannot touch
fn boxes_touch(a: &Rect, b: &Rect) -> bool {
    a.min_x <= b.max_x && a.max_x >= b.min_x && a.min_y <= b.max_y && a.max_y >= b.min_y
}

/// True when an endpoint of `a` lies within `tolerance` of any vertex of `b`
fn endpoint_touches(a: &ExtendedTrace, b: &ExtendedTrace, tolerance: f64) -> bool {
    let Some((first, last)) = a.endpoints() else {
        return false;
    };
    b.points
        .iter()
        .any(|v| first.is_near(v, tolerance) || last.is_near(v, tolerance))
}

fn traces_join(a: &ExtendedTrace, b: &ExtendedTrace, tolerance: f64) -> bool {
    endpoint_touches(a, b, tolerance) || endpoint_touches(b, a, tolerance)
}

fn near_any(endpoints: &(Point, Point), center: &Point, tolerance: f64) -> bool {
    endpoints.0.is_near(center, tolerance) || endpoints.1.is_near(center, tolerance)
}

/// How a component obtains its net identity
enum Claim {
    /// Keeps the winning predecessor's ID and metadata
    Inherit(Identity),
    /// No predecessor: a new sequential net
    Fresh,
    /// The winning predecessor was taken by an earlier component
    Split { original: String },
}

/// A component with its identity decision, built before any ID is minted
struct Plan {
    claim: Claim,
    members: Vec<(ElementKind, String)>,
    /// Predecessors other than the winner, when several nets collapsed
    absorbed: Vec<String>,
}

pub(crate) fn reconcile(inner: &mut StoreInner, tolerance: f64) -> ReconcileReport {
    let nets_before = inner.nets.len();
    let (plans, components, dropped) = plan_components(inner, tolerance);

    let mut report = ReconcileReport {
        tolerance,
        nets_before,
        components,
        dropped,
        ..Default::default()
    };

    let mut new_nets: Vec<ElectricalNet> = Vec::with_capacity(plans.len());
    for plan in plans {
        let identity = match plan.claim {
            Claim::Inherit(identity) => identity,
            Claim::Fresh => Identity::fresh(inner.issue_net_id()),
            Claim::Split { original } => {
                let identity = Identity::fresh(inner.issue_net_id());
                tracing::info!(
                    original = %original,
                    minted = %identity.id,
                    "net split across disconnected components"
                );
                report.splits.push(NetSplit {
                    original,
                    minted: identity.id.clone(),
                });
                identity
            }
        };

        if !plan.absorbed.is_empty() {
            tracing::info!(
                surviving = %identity.id,
                absorbed = ?plan.absorbed,
                "merged {} nets into one",
                plan.absorbed.len() + 1
            );
            report.merges.push(NetMerge {
                surviving: identity.id.clone(),
                absorbed: plan.absorbed,
            });
        }

        new_nets.push(build_net(identity, plan.members));
    }

    report.nets_after = new_nets.len();

    // Swap the table wholesale; nothing of the old one survives
    inner.nets = HashMap::with_capacity(new_nets.len());
    inner.net_order = Vec::with_capacity(new_nets.len());
    for net in new_nets {
        inner.net_order.push(net.id.clone());
        inner.nets.insert(net.id.clone(), net);
    }
    inner.rebuild_net_index();

    tracing::debug!(
        tolerance,
        components = report.components,
        dropped = report.dropped,
        nets_before = report.nets_before,
        nets_after = report.nets_after,
        "reconciled nets"
    );
    report
}

/// Steps 1-4 plus identity decisions. Only reads the store.
fn plan_components(inner: &StoreInner, tolerance: f64) -> (Vec<Plan>, usize, usize) {
    // Prior membership, read from the authoritative table rather than the cache
    let mut prior_net: HashMap<&str, &ElectricalNet> = HashMap::new();
    let mut prior_kind: HashMap<&str, ElementKind> = HashMap::new();
    for net in inner.ordered_nets() {
        for element in &net.elements {
            prior_net.entry(element.id.as_str()).or_insert(net);
            prior_kind.entry(element.id.as_str()).or_insert(element.kind);
        }
    }

    let traces: Vec<&ExtendedTrace> = inner.ordered_traces().collect();
    let trace_ids: HashSet<&str> = traces.iter().map(|t| t.id.as_str()).collect();

    // Step 1: seeds. Deleted store objects are not carried forward.
    let mut seeds: Vec<String> = Vec::new();
    for net in inner.ordered_nets() {
        for element in &net.elements {
            if element.kind == ElementKind::Pad || inner.is_live_element(&element.id) {
                seeds.push(element.id.clone());
            }
        }
    }
    seeds.extend(traces.iter().map(|t| t.id.clone()));
    seeds.extend(inner.confirmed_order.iter().cloned());
    seeds.extend(inner.connector_order.iter().cloned());
    let mut uf = UnionFind::new(seeds);

    // Step 2: traces to confirmed vias and same-side connectors
    for trace in &traces {
        let Some(ends) = trace.endpoints() else {
            continue;
        };
        for cvia in inner.ordered_confirmed_vias() {
            if near_any(&ends, &cvia.center, tolerance) {
                uf.union(trace.id.as_str(), cvia.id.as_str());
            }
        }
        for conn in inner.ordered_connectors() {
            if conn.side == trace.side && (conn.hit_test(&ends.0) || conn.hit_test(&ends.1)) {
                uf.union(trace.id.as_str(), conn.id.as_str());
            }
        }
    }

    // Step 3: trace junctions, any endpoint against any vertex
    let reach: Vec<Rect> = traces
        .iter()
        .map(|t| Rect::bounding(&t.points).unwrap_or_default().inflate(tolerance))
        .collect();
    for i in 0..traces.len() {
        for j in (i + 1)..traces.len() {
            if boxes_touch(&reach[i], &reach[j]) && traces_join(traces[i], traces[j], tolerance) {
                uf.union(traces[i].id.as_str(), traces[j].id.as_str());
            }
        }
    }

    // Step 4: components, ordered by smallest member ID
    let mut components = uf.groups();
    for members in &mut components {
        members.sort();
    }
    components.sort_by(|a, b| a.first().cmp(&b.first()));
    let component_count = components.len();

    let kind_of = |id: &str| -> ElementKind {
        if trace_ids.contains(id) {
            ElementKind::Trace
        } else if inner.confirmed_vias.contains_key(id) {
            ElementKind::ConfirmedVia
        } else if inner.connectors.contains_key(id) {
            ElementKind::Connector
        } else {
            prior_kind.get(id).copied().unwrap_or(ElementKind::Via)
        }
    };

    // Step 5: identity decisions
    let mut claimed: HashSet<&str> = HashSet::new();
    let mut plans: Vec<Plan> = Vec::new();
    let mut dropped = 0;

    for members in components {
        let mut predecessors: Vec<&ElectricalNet> = Vec::new();
        for member in &members {
            if let Some(&net) = prior_net.get(member.as_str()) {
                if !predecessors.iter().any(|p| p.id == net.id) {
                    predecessors.push(net);
                }
            }
        }

        let has_trace = members.iter().any(|m| trace_ids.contains(m.as_str()));
        let typed: Vec<(ElementKind, String)> =
            members.into_iter().map(|m| (kind_of(m.as_str()), m)).collect();

        let Some(winner) = predecessors.iter().copied().max_by(|a, b| rank_nets(a, b)) else {
            if has_trace {
                plans.push(Plan {
                    claim: Claim::Fresh,
                    members: typed,
                    absorbed: Vec::new(),
                });
            } else {
                dropped += 1;
            }
            continue;
        };

        let claim = if claimed.contains(winner.id.as_str()) {
            Claim::Split {
                original: winner.id.clone(),
            }
        } else {
            Claim::Inherit(Identity::inherit(winner))
        };
        let absorbed = if predecessors.len() > 1 {
            predecessors
                .iter()
                .filter(|p| p.id != winner.id)
                .map(|p| p.id.clone())
                .collect()
        } else {
            Vec::new()
        };
        claimed.extend(predecessors.iter().map(|p| p.id.as_str()));

        plans.push(Plan {
            claim,
            members: typed,
            absorbed,
        });
    }

    (plans, component_count, dropped)
}

/// Step 6: a fresh net carrying `identity`, members sorted by kind then ID
fn build_net(identity: Identity, mut members: Vec<(ElementKind, String)>) -> ElectricalNet {
    members.sort_by(|a, b| {
        kind_order(a.0)
            .cmp(&kind_order(b.0))
            .then_with(|| a.1.cmp(&b.1))
    });

    let mut net = ElectricalNet::new(identity.id, identity.name);
    net.manual_name = identity.manual_name;
    net.description = identity.description;
    for (kind, id) in members {
        net.add_element(kind, id);
    }

    net.root_connector = identity
        .root_connector
        .filter(|c| net.contains(c))
        .or_else(|| {
            net.elements_of(ElementKind::Connector)
                .next()
                .map(|e| e.id.clone())
        });
    net
}
