//! Net reconciliation: merges, splits, naming and partition guarantees

use std::collections::HashMap;

use tracenet::prelude::*;
use tracenet::netlist::UnionFind;
use tracenet::{better_net_name, NetMerge, NetSplit};

const TOL: f64 = 1.0;

fn cvia(store: &FeatureStore, id: &str, x: f64, y: f64) {
    store.add_confirmed_via(ConfirmedVia::new(id, Point::new(x, y)));
}

fn trace_on(store: &FeatureStore, id: &str, side: Side, points: &[(f64, f64)]) {
    store.add_trace(ExtendedTrace::new(
        id,
        side,
        points.iter().map(|&(x, y)| Point::new(x, y)).collect(),
        0.5,
    ));
}

fn trace(store: &FeatureStore, id: &str, points: &[(f64, f64)]) {
    trace_on(store, id, Side::Front, points);
}

/// Every element ID appears in at most one net
fn assert_partition(store: &FeatureStore) {
    let mut owner: HashMap<String, String> = HashMap::new();
    for net in store.nets() {
        for id in net.element_ids() {
            if let Some(other) = owner.insert(id.to_string(), net.id.clone()) {
                panic!("{} is in both {} and {}", id, other, net.id);
            }
        }
    }
}

#[test]
fn test_manual_name_survives_merge() {
    let store = FeatureStore::new();
    cvia(&store, "cvia-1", 0.0, 0.0);
    cvia(&store, "cvia-2", 30.0, 0.0);
    store.add_net(
        ElectricalNet::new("net-001", "VCC")
            .with_manual_name(true)
            .with_element(ElementKind::ConfirmedVia, "cvia-1"),
    );
    store.add_net(
        ElectricalNet::new("net-003", "net-003").with_element(ElementKind::ConfirmedVia, "cvia-2"),
    );

    trace(&store, "trace-1", &[(0.0, 0.5), (30.0, 0.5)]);
    let report = store.reconcile_nets(TOL);

    let nets = store.nets();
    assert_eq!(nets.len(), 1);
    let net = &nets[0];
    assert_eq!(net.name, "VCC");
    assert!(net.manual_name);
    assert!(net.contains("cvia-1") && net.contains("cvia-2") && net.contains("trace-1"));
    assert_eq!(
        report.merges,
        vec![NetMerge {
            surviving: "net-001".to_string(),
            absorbed: vec!["net-003".to_string()],
        }]
    );
    assert_partition(&store);
}

#[test]
fn test_signal_name_beats_pin_name_on_merge() {
    let store = FeatureStore::new();
    cvia(&store, "cvia-1", 0.0, 0.0);
    cvia(&store, "cvia-2", 30.0, 0.0);
    store.add_net(ElectricalNet::new("net-001", "U1.3").with_element(ElementKind::ConfirmedVia, "cvia-1"));
    store.add_net(ElectricalNet::new("net-002", "SIG1").with_element(ElementKind::ConfirmedVia, "cvia-2"));
    trace(&store, "trace-1", &[(0.0, 0.0), (30.0, 0.0)]);

    store.reconcile_nets(TOL);

    let net = store.net_for_element("cvia-1").unwrap();
    assert_eq!(net.id, "net-002");
    assert_eq!(net.name, "SIG1");
    assert!(store.net("net-001").is_none());
}

#[test]
fn test_split_mints_fresh_id() {
    let store = FeatureStore::new();
    trace(&store, "trace-1", &[(0.0, 0.0), (10.0, 0.0)]);
    trace(&store, "trace-2", &[(50.0, 50.0), (60.0, 50.0)]);
    store.add_net(
        ElectricalNet::new("GND", "GND")
            .with_element(ElementKind::Trace, "trace-1")
            .with_element(ElementKind::Trace, "trace-2"),
    );

    let report = store.reconcile_nets(TOL);

    let nets = store.nets();
    assert_eq!(nets.len(), 2);
    let gnd = store.net("GND").expect("original net keeps its ID");
    assert_eq!(gnd.name, "GND");
    assert!(gnd.contains("trace-1"));

    let other = store.net_for_element("trace-2").unwrap();
    assert_ne!(other.id, "GND");
    assert!(tracenet::model::is_auto_name(&other.id));
    assert!(!other.manual_name);
    assert_eq!(
        report.splits,
        vec![NetSplit {
            original: "GND".to_string(),
            minted: other.id.clone(),
        }]
    );

    // The minted number is spent
    assert_ne!(store.next_net_id(), other.id);
    assert_partition(&store);
}

#[test]
fn test_deleting_a_trace_splits_a_named_net() {
    let store = FeatureStore::new();
    cvia(&store, "cvia-1", 0.0, 0.0);
    cvia(&store, "cvia-2", 20.0, 0.0);
    cvia(&store, "cvia-3", 40.0, 0.0);
    trace(&store, "trace-1", &[(0.0, 0.0), (20.0, 0.0)]);
    trace(&store, "trace-2", &[(20.0, 0.0), (40.0, 0.0)]);

    store.reconcile_nets(TOL);
    let net = store.net_for_element("cvia-3").unwrap();
    assert!(store.rename_net(&net.id, "SDA"));

    assert!(store.remove_trace("trace-2"));
    let report = store.reconcile_nets(TOL);

    let sda = store.net_by_name("SDA").unwrap();
    assert!(sda.manual_name);
    assert!(sda.contains("cvia-1") && sda.contains("cvia-2"));
    assert!(!sda.contains("trace-2"), "deleted traces are not carried forward");

    let orphan = store.net_for_element("cvia-3").expect("previously netted via stays netted");
    assert_ne!(orphan.id, sda.id);
    assert_eq!(report.splits.len(), 1);
    assert_partition(&store);
}

#[test]
fn test_t_junction_joins_traces() {
    let store = FeatureStore::new();
    trace(&store, "trace-1", &[(0.0, 0.0), (10.0, 0.0), (20.0, 0.0)]);
    trace(&store, "trace-2", &[(10.0, 0.8), (10.0, 10.0)]);
    trace(&store, "trace-3", &[(10.0, 3.0), (10.0, -10.0)]);

    store.reconcile_nets(TOL);

    let a = store.net_for_element("trace-1").unwrap();
    let b = store.net_for_element("trace-2").unwrap();
    let c = store.net_for_element("trace-3").unwrap();
    assert_eq!(a.id, b.id);
    assert_ne!(a.id, c.id, "passing near a segment midpoint is not a junction");
}

#[test]
fn test_connectors_match_same_side_only() {
    let store = FeatureStore::new();
    store.add_connector(
        Connector::new("conn-1", Side::Front, 1, Point::new(100.0, 0.0)).with_signal("VCC"),
    );
    trace_on(&store, "trace-1", Side::Back, &[(100.0, 0.0), (120.0, 0.0)]);

    let report = store.reconcile_nets(TOL);
    assert!(store.net_for_element("conn-1").is_none());
    assert_eq!(report.dropped, 1, "lone connector is dropped");
    assert!(store.net_for_element("trace-1").unwrap().root_connector.is_none());

    let store = FeatureStore::new();
    store.add_connector(Connector::new("conn-1", Side::Front, 1, Point::new(100.0, 0.0)));
    trace_on(&store, "trace-1", Side::Front, &[(101.5, 1.5), (120.0, 0.0)]);

    store.reconcile_nets(TOL);
    let net = store.net_for_element("conn-1").unwrap();
    assert!(net.contains("trace-1"));
    assert_eq!(net.root_connector.as_deref(), Some("conn-1"));
    assert_eq!(net.kind_of("conn-1"), Some(ElementKind::Connector));
}

#[test]
fn test_isolated_elements() {
    let store = FeatureStore::new();
    cvia(&store, "cvia-5", 0.0, 0.0);
    cvia(&store, "cvia-9", 100.0, 100.0);
    store.add_net(
        ElectricalNet::new("net-005", "TP1")
            .with_manual_name(true)
            .with_element(ElementKind::ConfirmedVia, "cvia-5"),
    );

    let report = store.reconcile_nets(TOL);

    assert_eq!(store.net("net-005").unwrap().elements.len(), 1);
    assert!(store.net_for_element("cvia-9").is_none());
    assert_eq!(report.dropped, 1);
    assert_eq!(report.nets_after, 1);
}

#[test]
fn test_reconcile_is_stable() {
    let store = FeatureStore::new();
    for (i, x) in [0.0, 20.0, 40.0, 60.0].iter().enumerate() {
        cvia(&store, &format!("cvia-{}", i + 1), *x, 0.0);
    }
    trace(&store, "trace-1", &[(0.0, 0.0), (20.0, 0.0)]);
    trace(&store, "trace-2", &[(40.0, 0.0), (60.0, 0.0)]);

    store.reconcile_nets(TOL);
    let first: Vec<ElectricalNet> = store.nets();
    let report = store.reconcile_nets(TOL);

    assert!(!report.has_topology_changes());
    assert_eq!(store.nets(), first);
    assert_eq!(first.len(), 2);
}

#[test]
fn test_description_and_root_connector_carry_forward() {
    let store = FeatureStore::new();
    store.add_connector(Connector::new("conn-1", Side::Front, 1, Point::new(0.0, 0.0)));
    store.add_connector(Connector::new("conn-2", Side::Front, 2, Point::new(40.0, 0.0)));
    trace(&store, "trace-1", &[(0.0, 0.0), (40.0, 0.0)]);

    let mut net = ElectricalNet::new("net-007", "RESET")
        .with_element(ElementKind::Connector, "conn-2")
        .with_element(ElementKind::Trace, "trace-1");
    net.root_connector = Some("conn-2".to_string());
    net.description = "reset line".to_string();
    store.add_net(net);

    store.reconcile_nets(TOL);

    let net = store.net("net-007").unwrap();
    assert_eq!(net.root_connector.as_deref(), Some("conn-2"));
    assert_eq!(net.description, "reset line");
    assert!(net.contains("conn-1"));
}

#[test]
fn test_partition_holds_with_overlapping_prior_nets() {
    let store = FeatureStore::new();
    for i in 0..6 {
        cvia(&store, &format!("cvia-{}", i), i as f64 * 10.0, 0.0);
    }
    trace(&store, "trace-1", &[(0.0, 0.0), (10.0, 0.0)]);
    trace(&store, "trace-2", &[(10.0, 0.0), (20.0, 0.0)]);
    trace(&store, "trace-3", &[(40.0, 0.0), (50.0, 0.0)]);

    // Corrupt prior state: cvia-1 listed by two nets
    store.add_net(
        ElectricalNet::new("net-001", "A")
            .with_element(ElementKind::ConfirmedVia, "cvia-1")
            .with_element(ElementKind::ConfirmedVia, "cvia-4"),
    );
    store.add_net(ElectricalNet::new("net-002", "B").with_element(ElementKind::ConfirmedVia, "cvia-1"));

    let report = store.reconcile_nets(TOL);
    assert_partition(&store);
    assert_eq!(report.components, 3);
    // cvia-3 is untraced and was never netted
    assert!(store.net_for_element("cvia-3").is_none());
}

#[test]
fn test_better_net_name_examples() {
    assert_eq!(better_net_name("A13.2", "SIG1"), "SIG1");
    assert_eq!(better_net_name("net-005", "A13.2"), "A13.2");
    assert_eq!(better_net_name("GND", "GND#2"), "GND");
}

#[test]
fn test_store_connectivity_follows_trace_edits() {
    let store = FeatureStore::new();
    cvia(&store, "cvia-1", 0.0, 0.0);
    cvia(&store, "cvia-2", 20.0, 0.0);
    trace(&store, "trace-1", &[(5.0, 5.0), (15.0, 5.0)]);
    store.add_net(
        ElectricalNet::new("net-001", "SIG")
            .with_element(ElementKind::ConfirmedVia, "cvia-1")
            .with_element(ElementKind::ConfirmedVia, "cvia-2")
            .with_element(ElementKind::Trace, "trace-1"),
    );

    let report = store.check_net_connectivity("net-001", TOL).unwrap();
    assert_eq!(report.groups.len(), 2);
    assert!(!report.is_connected());

    assert!(store.move_trace_vertex("trace-1", 0, Point::new(0.5, 0.0)));
    assert!(store.move_trace_vertex("trace-1", 1, Point::new(20.0, 0.8)));

    let report = store.check_net_connectivity("net-001", TOL).unwrap();
    assert_eq!(report.groups, vec![vec!["cvia-1".to_string(), "cvia-2".to_string()]]);
    assert!(report.is_connected());

    assert!(store.check_net_connectivity("net-404", TOL).is_none());
}

#[test]
fn test_union_find_by_element_id() {
    let mut uf = UnionFind::new(["cvia-1", "trace-1", "trace-2", "conn-1"].map(String::from));
    assert!(uf.contains("trace-2"));
    assert!(!uf.contains("trace-3"));

    uf.union("cvia-1", "trace-1");
    uf.union("trace-2", "conn-1");
    assert!(uf.connected("trace-1", "cvia-1"));
    assert!(!uf.connected("trace-1", "conn-1"));

    uf.union("trace-1", "trace-2");
    let root = uf.find("conn-1").cloned();
    assert_eq!(uf.find("cvia-1").cloned(), root);
    assert_eq!(uf.groups().len(), 1);
}
