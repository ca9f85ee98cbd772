use anyhow::Context;
use colored::*;
use dashlink_core::network::StatsSnapshot;
use dashlink_core::{MulticastTransport, TransportState};
use dashlink_widgets::DashboardDefinition;
use std::sync::Arc;
use std::time::Duration;

/// What a finished run did
#[derive(Debug, Clone, Copy)]
pub struct RunSummary {
    pub ticks: u64,
    pub network: bool,
    pub stats: StatsSnapshot,
}

/// Register the widgets, write the layout, start the transport and tick until
/// Ctrl+C (or for `duration`).
pub fn execute_run(
    definition: &DashboardDefinition,
    duration: Option<Duration>,
) -> anyhow::Result<RunSummary> {
    let config = &definition.config;
    let scheduler = definition.build_scheduler()?.with_name("dashlink");
    let datastore = scheduler.datastore();

    if config.layout.enabled {
        datastore
            .write_layout_to_file(&config.layout.path)
            .with_context(|| format!("writing layout to {}", config.layout.path.display()))?;
        println!(
            "{} Memory layout written to {}",
            "✓".green(),
            config.layout.path.display().to_string().cyan()
        );
    }

    let transport = Arc::new(MulticastTransport::new(config.transport.clone(), datastore));
    let network = match transport.try_start() {
        Ok(state) => state == TransportState::Receiving,
        Err(e) => {
            tracing::warn!("{}", e);
            false
        }
    };
    if network {
        println!(
            "{} Listening on {}:{}, sending to {}:{}",
            "→".cyan(),
            config.transport.group,
            config.transport.local_port,
            config.transport.group,
            config.transport.dest_port
        );
    } else {
        println!(
            "{} Multicast setup failed, running without network",
            "⚠".yellow()
        );
    }

    let mut scheduler = scheduler.with_sink(Arc::clone(&transport));
    let result = match duration {
        Some(duration) => scheduler.run_for(duration),
        None => {
            println!("{} Press Ctrl+C to stop", "→".cyan());
            scheduler.run()
        }
    };
    transport.stop();
    result?;

    let summary = RunSummary {
        ticks: scheduler.tick_count(),
        network,
        stats: transport.stats(),
    };
    println!(
        "{} Stopped after {} ticks ({})",
        "✓".green(),
        summary.ticks,
        summary.stats
    );
    Ok(summary)
}
