//! TraceNet CLI - reconcile and check PCB net snapshots from the command line.

use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::path::{Path, PathBuf};
use std::process;
use tracenet::{
    load_snapshot_json, ConnectivityReport, FeatureStore, ReconcileReport, StoreConfig,
    TraceNetError,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tracenet")]
#[command(about = "PCB reverse-engineering net reconciliation tool", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rebuild nets from board geometry and write the updated snapshot
    Reconcile {
        /// Path to a board snapshot (.json)
        #[arg(value_name = "SNAPSHOT")]
        snapshot: PathBuf,

        /// Matching tolerance in board units (defaults to the config value)
        #[arg(short, long)]
        tolerance: Option<f64>,

        /// Store configuration file (.json)
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Report format
        #[arg(short, long, value_enum, default_value = "human")]
        format: OutputFormat,

        /// Write the reconciled snapshot here
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Check that every net is joined by its own traces
    Check {
        /// Path to a board snapshot (.json)
        #[arg(value_name = "SNAPSHOT")]
        snapshot: PathBuf,

        /// Matching tolerance in board units (defaults to the config value)
        #[arg(short, long)]
        tolerance: Option<f64>,

        /// Store configuration file (.json)
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Reconcile before checking
        #[arg(long)]
        reconcile: bool,

        /// Report format
        #[arg(short, long, value_enum, default_value = "human")]
        format: OutputFormat,

        /// Exit with error code if any net is disconnected
        #[arg(long)]
        fail_on_disconnected: bool,
    },

    /// Print entity counts for a snapshot
    Stats {
        /// Path to a board snapshot (.json)
        #[arg(value_name = "SNAPSHOT")]
        snapshot: PathBuf,

        /// Report format
        #[arg(short, long, value_enum, default_value = "human")]
        format: OutputFormat,
    },
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output for scripting
    Json,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let exit_code = match cli.command {
        Commands::Reconcile {
            snapshot,
            tolerance,
            config,
            format,
            output,
        } => handle_reconcile(&snapshot, tolerance, config.as_deref(), format, output.as_deref()),
        Commands::Check {
            snapshot,
            tolerance,
            config,
            reconcile,
            format,
            fail_on_disconnected,
        } => handle_check(
            &snapshot,
            tolerance,
            config.as_deref(),
            reconcile,
            format,
            fail_on_disconnected,
        ),
        Commands::Stats { snapshot, format } => handle_stats(&snapshot, format),
    };

    process::exit(exit_code);
}

fn load_config(path: Option<&Path>) -> Result<StoreConfig, TraceNetError> {
    match path {
        Some(path) => {
            let json = fs::read_to_string(path)?;
            serde_json::from_str(&json)
                .map_err(|e| TraceNetError::Parse(format!("{}: {}", path.display(), e)))
        }
        None => Ok(StoreConfig::default()),
    }
}

fn load_store(snapshot: &Path, config: StoreConfig) -> Result<FeatureStore, TraceNetError> {
    let json = fs::read_to_string(snapshot)?;
    let store = load_snapshot_json(&json, config)?;
    tracing::debug!(path = %snapshot.display(), "loaded snapshot");
    Ok(store)
}

fn handle_reconcile(
    snapshot: &Path,
    tolerance: Option<f64>,
    config: Option<&Path>,
    format: OutputFormat,
    output: Option<&Path>,
) -> i32 {
    let result = load_config(config).and_then(|config| {
        let tolerance = tolerance.unwrap_or(config.default_tolerance);
        let store = load_store(snapshot, config)?;
        let report = store.reconcile_nets(tolerance);
        if let Some(path) = output {
            fs::write(path, store.to_snapshot().to_json()?)?;
            tracing::info!(path = %path.display(), "wrote reconciled snapshot");
        }
        Ok((store, report))
    });

    match result {
        Ok((store, report)) => {
            match format {
                OutputFormat::Human => output_reconcile_human(&store, &report),
                OutputFormat::Json => print_json(&serde_json::json!({
                    "report": report,
                    "nets": store.nets(),
                })),
            }
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn handle_check(
    snapshot: &Path,
    tolerance: Option<f64>,
    config: Option<&Path>,
    reconcile: bool,
    format: OutputFormat,
    fail_on_disconnected: bool,
) -> i32 {
    let result = load_config(config).and_then(|config| {
        let tolerance = tolerance.unwrap_or(config.default_tolerance);
        let store = load_store(snapshot, config)?;
        if reconcile {
            store.reconcile_nets(tolerance);
        }
        Ok(store.check_all_nets(tolerance))
    });

    match result {
        Ok(reports) => {
            match format {
                OutputFormat::Human => output_check_human(&reports),
                OutputFormat::Json => print_json(&serde_json::json!({
                    "nets": reports,
                    "disconnected": reports.iter().filter(|r| !r.is_connected()).count(),
                })),
            }
            if fail_on_disconnected && reports.iter().any(|r| !r.is_connected()) {
                return 1;
            }
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn handle_stats(snapshot: &Path, format: OutputFormat) -> i32 {
    match load_store(snapshot, StoreConfig::default()) {
        Ok(store) => {
            let stats = store.stats();
            match format {
                OutputFormat::Human => {
                    println!("Vias:           {}", stats.via_count);
                    println!("Traces:         {}", stats.trace_count);
                    println!("Confirmed vias: {}", stats.confirmed_via_count);
                    println!("Connectors:     {}", stats.connector_count);
                    println!("Buses:          {}", stats.bus_count);
                    println!("Nets:           {}", stats.net_count);
                    println!("Selected:       {}", stats.selected_count);
                }
                OutputFormat::Json => print_json(&stats),
            }
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Error: {}", e),
    }
}

fn output_reconcile_human(store: &FeatureStore, report: &ReconcileReport) {
    println!("\nReconciled at tolerance {}", report.tolerance);
    println!("{}", "─".repeat(60));

    for net in store.nets() {
        let marker = if net.manual_name { " (manual)" } else { "" };
        println!("\n  {} {}{}", net.id, net.name, marker);
        if !net.description.is_empty() {
            println!("    {}", net.description);
        }
        let members: Vec<&str> = net.element_ids().collect();
        println!("    {}", members.join(", "));
    }

    if !report.merges.is_empty() {
        println!("\n  MERGES:");
        for merge in &report.merges {
            println!("    - {} absorbed {}", merge.surviving, merge.absorbed.join(", "));
        }
    }
    if !report.splits.is_empty() {
        println!("\n  SPLITS:");
        for split in &report.splits {
            println!("    - {} split off {}", split.original, split.minted);
        }
    }

    println!("\n  Summary:");
    println!("    Nets before: {}", report.nets_before);
    println!("    Nets after:  {}", report.nets_after);
    println!("    Components:  {}", report.components);
    println!("    Dropped:     {}", report.dropped);
}

fn output_check_human(reports: &[ConnectivityReport]) {
    let mut disconnected = 0;
    for report in reports {
        if report.is_connected() {
            println!("  ok    {} {}", report.net_id, report.net_name);
            continue;
        }
        disconnected += 1;
        println!("  SPLIT {} {}", report.net_id, report.net_name);
        for (i, group) in report.groups.iter().enumerate() {
            println!("      group {}: {}", i + 1, group.join(", "));
        }
        if !report.unlocated.is_empty() {
            println!("      unlocated: {}", report.unlocated.join(", "));
        }
    }
    println!("\n  {} nets, {} disconnected", reports.len(), disconnected);
}
