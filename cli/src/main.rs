//! Command-line driver for the emergency dispatch simulator.
//!
//! Loads a scenario (or the built-in demo), runs it to completion and prints
//! either a human-readable report or the final engine snapshot as JSON.
//!
//! ```text
//! dispatch-sim                       # demo city, demo script
//! dispatch-sim --scenario run.json   # scripted run from a file
//! dispatch-sim --ticks 6 --json      # demo plus six more ticks, JSON out
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use emergency_dispatch_core_rs::scenario::ScenarioReport;
use emergency_dispatch_core_rs::{
    DispatchEngine, Incident, Scenario, ServiceCategory, TraversalOrder,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "dispatch-sim",
    about = "Discrete-time emergency dispatch simulator",
    version
)]
struct Cli {
    /// Scenario JSON file (defaults to the built-in demo)
    #[arg(long, value_name = "FILE")]
    scenario: Option<PathBuf>,

    /// Extra ticks to run after the scenario's own steps
    #[arg(long, default_value_t = 0)]
    ticks: u32,

    /// Print the final snapshot as JSON instead of a text report
    #[arg(long)]
    json: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_writer(std::io::stderr)
        .init();

    let scenario = match &cli.scenario {
        Some(path) => load_scenario(path)?,
        None => Scenario::demo(),
    }
    .with_extra_ticks(cli.ticks);
    info!(steps = scenario.steps.len(), "Scenario loaded");

    let (engine, report) = scenario.run().context("failed to start dispatch engine")?;

    if cli.json {
        let snapshot = engine.snapshot();
        let json = serde_json::to_string_pretty(&snapshot).context("failed to encode snapshot")?;
        println!("{json}");
    } else {
        print_report(&engine, &report);
    }
    Ok(())
}

fn load_scenario(path: &Path) -> Result<Scenario> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read scenario {}", path.display()))?;
    Scenario::from_json(&text).with_context(|| format!("invalid scenario {}", path.display()))
}

fn print_report(engine: &DispatchEngine, report: &ScenarioReport) {
    println!("=== Run summary (tick {}) ===", engine.current_tick());
    println!(
        "accepted {}  rejected {}  dispatched {}  released {}",
        report.accepted.len(),
        report.rejected,
        report.dispatches.len(),
        report.released.len()
    );

    println!("\n=== Units ===");
    for unit in engine.units().iter() {
        let status = if unit.is_available() { "available" } else { "busy" };
        println!("{:>4}  {:<8} {:<7} {}", unit.id(), unit.label(), unit.category(), status);
    }

    println!("\n=== Queues ===");
    for category in ServiceCategory::ALL {
        let waiting: Vec<String> = engine
            .queue(category)
            .peek_all()
            .map(|i| i.id().to_string())
            .collect();
        println!("{:<7} [{}]", category, waiting.join(", "));
    }

    println!("\n=== Dispatch history (most recent first) ===");
    for category in ServiceCategory::ALL {
        println!("{category}:");
        for record in engine.history().peek_all(category) {
            println!(
                "  incident {:>3}  neighborhood {}  severity {}  ticks {}..{}  {}",
                record.incident_id,
                record.neighborhood_id,
                record.severity,
                record.start_tick,
                record.end_tick,
                record.notes
            );
        }
    }

    println!("\n=== Service map ===");
    for (neighborhood_id, services) in engine.service_map().iter() {
        let name = engine.neighborhoods().get(neighborhood_id).unwrap_or("?");
        let counts: Vec<String> = services
            .iter()
            .map(|(category, count)| format!("{category}={count}"))
            .collect();
        println!("{:>3} {:<20} {}", neighborhood_id, name, counts.join(" "));
    }

    println!("\n=== Incidents by priority ===");
    for incident in engine.priority_order() {
        print_incident(incident);
    }

    println!("\n=== Incidents by id ===");
    for incident in engine.identifier_traversal(TraversalOrder::InOrder) {
        print_incident(incident);
    }
}

fn print_incident(incident: &Incident) {
    println!(
        "  #{:<4} severity {}  {:<7} neighborhood {}  arrived tick {}",
        incident.id(),
        incident.severity(),
        incident.category(),
        incident.neighborhood_id(),
        incident.arrival_tick()
    );
}
