use crate::cli::config::resolve_mode;
use crate::dispatch::backend::HttpBackend;
use crate::surface::bridge::BridgeSurface;
use crate::trace::logger::PipelineTracer;
use crate::{FillOptions, run_fill, scan_only};

// ============================================================================
// fill subcommand
// ============================================================================

pub fn cmd_fill(
    url: &str,
    mode_name: &str,
    max_events: Option<usize>,
    trace_path: Option<&str>,
    verbose: u8,
    endpoint: &str,
    timeout_ms: u64,
    max_retries: u32,
    grace_period_ms: u64,
    bridge_script: &str,
) -> Result<bool, Box<dyn std::error::Error>> {
    let tracer = match trace_path {
        Some(path) => PipelineTracer::to_file(path),
        None => PipelineTracer::disabled(),
    };
    let backend = HttpBackend::new(endpoint, timeout_ms, max_retries);
    let options = FillOptions {
        mode: resolve_mode(mode_name),
        grace_period_ms,
        max_events,
        verbose,
    };

    if verbose > 0 {
        eprintln!("Opening {} (backend: {})...", url, endpoint);
    }

    let mut surface = BridgeSurface::launch(bridge_script, url)?;
    let summary = run_fill(&mut surface, &backend, &options, &tracer)?;
    surface.quit()?;

    println!(
        "Processed {} regions: {} inputs scanned, {} fields detected, {} filled ({} elements written)",
        summary.regions_processed,
        summary.inputs_seen,
        summary.fields_detected,
        summary.ids_filled,
        summary.elements_written
    );

    if summary.halted {
        eprintln!("One or more batches failed; remaining fields were left unfilled.");
    }

    Ok(!summary.halted)
}

// ============================================================================
// scan subcommand
// ============================================================================

pub fn cmd_scan(
    url: &str,
    mode_name: &str,
    max_events: Option<usize>,
    verbose: u8,
    grace_period_ms: u64,
    bridge_script: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let options = FillOptions {
        mode: resolve_mode(mode_name),
        grace_period_ms,
        max_events,
        verbose,
    };

    if verbose > 0 {
        eprintln!("Opening {} for detection only...", url);
    }

    let mut surface = BridgeSurface::launch(bridge_script, url)?;
    let descriptors = scan_only(&mut surface, &options)?;
    surface.quit()?;

    if descriptors.is_empty() {
        println!("No fillable form fields detected.");
        return Ok(());
    }

    println!("Detected {} form fields:", descriptors.len());
    for descriptor in &descriptors {
        let kind = if descriptor.field_type.is_empty() {
            "-"
        } else {
            &descriptor.field_type
        };
        println!("  [{}] {} ({})", descriptor.id, descriptor.label, kind);
    }

    Ok(())
}
