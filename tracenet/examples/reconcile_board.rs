//! Reconcile a board snapshot and print the resulting nets.

use std::fs;
use tracenet::prelude::*;
use tracenet::load_snapshot_json;

fn main() -> Result<(), TraceNetError> {
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "tests/fixtures/sample_board.json".to_string());
    let tolerance = std::env::args()
        .nth(2)
        .and_then(|t| t.parse::<f64>().ok())
        .unwrap_or(2.0);

    let json = match fs::read_to_string(&path) {
        Ok(json) => json,
        Err(e) => {
            eprintln!("Cannot read {}: {}", path, e);
            eprintln!("Usage: cargo run --example reconcile_board [snapshot.json] [tolerance]");
            std::process::exit(1);
        }
    };
    let store = load_snapshot_json(&json, StoreConfig::default())?;

    let report = store.reconcile_nets(tolerance);
    println!(
        "{} nets before, {} after ({} components, {} dropped)",
        report.nets_before, report.nets_after, report.components, report.dropped
    );
    for merge in &report.merges {
        println!("  merged {:?} into {}", merge.absorbed, merge.surviving);
    }
    for split in &report.splits {
        println!("  {} split off {}", split.original, split.minted);
    }
    println!();

    for net in store.nets() {
        println!("{} {}", net.id, net.name);
        for element in &net.elements {
            println!("    {:?} {}", element.kind, element.id);
        }
        if let Some(check) = store.check_net_connectivity(&net.id, tolerance) {
            if !check.is_connected() {
                println!("    disconnected: {} groups", check.groups.len());
            }
        }
    }
    Ok(())
}
