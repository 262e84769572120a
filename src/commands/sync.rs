// ABOUTME: The sync command - reconciles one offline dataset against the hosted service
// ABOUTME: Wires the concrete adapters together and renders the run report

use anyhow::{Context, Result};
use std::path::Path;

use crate::dedupe::ToleranceGeometry;
use crate::engine::{ApplyMode, SyncEngine, SyncOptions};
use crate::report::SyncReport;
use crate::stores::{HttpRemoteStore, SqliteStagingConverter};

pub struct SyncParams {
    pub service_url: String,
    pub api_key: Option<String>,
    pub options: SyncOptions,
    pub geometry_tolerance: f64,
}

/// Run one reconciliation pass and print the per-layer report.
pub async fn sync(offline_path: &Path, params: SyncParams) -> Result<()> {
    let remote = HttpRemoteStore::new(params.service_url.clone(), params.api_key)
        .context("Failed to create hosted service client")?;
    let geometry = ToleranceGeometry::new(params.geometry_tolerance);
    let converter = SqliteStagingConverter;

    let inspecting = matches!(params.options.mode, ApplyMode::Inspect { .. });
    let engine = SyncEngine::new(&remote, &geometry, params.options);

    let report = engine
        .run(&converter, offline_path)
        .await
        .context("Sync run failed")?;

    print_summary(&report, inspecting);

    if !report.is_success() {
        tracing::warn!(
            "{} layer(s) failed; see the report above",
            report.failed_layers()
        );
    }
    Ok(())
}

fn print_summary(report: &SyncReport, inspecting: bool) {
    println!();
    println!("========================================");
    if inspecting {
        println!("Inspection pass complete (nothing mutated)");
    } else {
        println!("Sync pass complete");
    }
    println!("========================================");
    print!("{}", report.render());
    if report.failed_layers() > 0 {
        println!();
        println!("{} layer(s) failed", report.failed_layers());
    }
}
