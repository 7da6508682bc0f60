use std::collections::HashSet;

use crate::dispatch::backend::AutofillBackend;
use crate::dispatch::dispatcher::{DrainOutcome, drain};
use crate::field::extractor::extract_fields;
use crate::session::error::AutofillError;
use crate::session::session_state::SessionState;
use crate::surface::surface::DocumentSurface;
use crate::surface::surface_model::{RegionId, ScanScope, SurfaceEvent};
use crate::trace::logger::PipelineTracer;
use crate::trace::trace::PipelineEvent;

/// Grace period between a sub-layer appearing and reading its inputs.
/// Narrows (does not eliminate) the race against the renderer still
/// populating attributes.
pub const DEFAULT_GRACE_PERIOD_MS: u64 = 100;

/// How the controller attaches to the surface. `Auto` probes for the
/// paged-viewer root and falls back to a static whole-document scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Auto,
    Static,
    Viewer,
}

#[derive(Debug, Clone)]
pub struct ObserveConfig {
    pub grace_period_ms: u64,
    pub verbose: u8,
}

impl Default for ObserveConfig {
    fn default() -> Self {
        Self {
            grace_period_ms: DEFAULT_GRACE_PERIOD_MS,
            verbose: 0,
        }
    }
}

/// What one scan (static pass or one surface event) accomplished.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ScanOutcome {
    pub inputs_seen: usize,
    pub fields_detected: usize,
    pub chunks_sent: usize,
    pub ids_filled: usize,
    pub elements_written: usize,
    pub halted: bool,
}

impl ScanOutcome {
    fn absorb(&mut self, drain_outcome: &DrainOutcome) {
        self.chunks_sent += drain_outcome.chunks_sent;
        self.ids_filled += drain_outcome.ids_filled;
        self.elements_written += drain_outcome.elements_written;
        self.halted = self.halted || drain_outcome.halted;
    }
}

/// Bridges staged rendering to extraction, without polling.
///
/// In viewer mode, consumes structural events: a new region is scanned as
/// soon as its annotation sub-layer is present; a region whose sub-layer
/// has not rendered yet gets a one-shot watch that fires on the matching
/// `SublayerAdded` and unsubscribes itself. Regions already processed are
/// skipped unconditionally — that dedup, not mutual exclusion, is what
/// keeps re-entrant triggers from double-extracting.
pub struct ObservationController {
    config: ObserveConfig,
    pending_sublayers: HashSet<RegionId>,
}

impl ObservationController {
    pub fn new(config: ObserveConfig) -> Self {
        Self {
            config,
            pending_sublayers: HashSet::new(),
        }
    }

    /// One whole-document scan for an already-rendered page.
    ///
    /// Zero inputs is a normal terminal state, not an error.
    pub fn run_static(
        &mut self,
        state: &mut SessionState,
        surface: &mut dyn DocumentSurface,
        backend: &dyn AutofillBackend,
        tracer: &PipelineTracer,
    ) -> Result<ScanOutcome, AutofillError> {
        let inputs = surface.query_inputs(&ScanScope::Document)?;
        tracer.record(&PipelineEvent::stage("extract").with_count(inputs.len()));

        let mut outcome = ScanOutcome {
            inputs_seen: inputs.len(),
            ..ScanOutcome::default()
        };

        if inputs.is_empty() {
            if self.config.verbose > 0 {
                eprintln!("No form inputs found in the document.");
            }
            return Ok(outcome);
        }

        let descriptors = extract_fields(&inputs, state);
        outcome.fields_detected = descriptors.len();
        if self.config.verbose > 0 {
            eprintln!(
                "Detected {} form fields ({} inputs scanned).",
                descriptors.len(),
                inputs.len()
            );
        }

        state.queue.append(descriptors);
        let drain_outcome = drain(state, surface, backend, tracer)?;
        outcome.absorb(&drain_outcome);
        Ok(outcome)
    }

    /// React to one structural event from the viewer surface.
    pub fn handle_event(
        &mut self,
        event: &SurfaceEvent,
        state: &mut SessionState,
        surface: &mut dyn DocumentSurface,
        backend: &dyn AutofillBackend,
        tracer: &PipelineTracer,
    ) -> Result<ScanOutcome, AutofillError> {
        match event {
            SurfaceEvent::RegionAdded(region) => {
                tracer.record(&PipelineEvent::stage("region_observed").with_region(region));
                self.process_region(region, state, surface, backend, tracer)
            }
            SurfaceEvent::SublayerAdded(region) => {
                // Single-fire subscription: only a region that registered a
                // watch reacts, and the watch is consumed here.
                if self.pending_sublayers.remove(region) {
                    self.process_region(region, state, surface, backend, tracer)
                } else {
                    Ok(ScanOutcome::default())
                }
            }
        }
    }

    /// Regions with a registered one-shot sub-layer watch.
    pub fn pending_watches(&self) -> usize {
        self.pending_sublayers.len()
    }

    fn process_region(
        &mut self,
        region: &RegionId,
        state: &mut SessionState,
        surface: &mut dyn DocumentSurface,
        backend: &dyn AutofillBackend,
        tracer: &PipelineTracer,
    ) -> Result<ScanOutcome, AutofillError> {
        if state.is_processed(region) {
            if self.config.verbose > 1 {
                eprintln!("Region {} already processed, skipping.", region);
            }
            return Ok(ScanOutcome::default());
        }

        if !surface.sublayer_present(region)? {
            if self.config.verbose > 0 {
                eprintln!("Sub-layer not yet rendered for region {}, watching.", region);
            }
            self.pending_sublayers.insert(region.clone());
            tracer.record(&PipelineEvent::stage("sublayer_watch").with_region(region));
            return Ok(ScanOutcome::default());
        }

        surface.settle(self.config.grace_period_ms)?;

        let inputs = surface.query_inputs(&ScanScope::Region(region.clone()))?;
        tracer.record(
            &PipelineEvent::stage("extract")
                .with_region(region)
                .with_count(inputs.len()),
        );

        let mut outcome = ScanOutcome {
            inputs_seen: inputs.len(),
            ..ScanOutcome::default()
        };

        if inputs.is_empty() {
            // Region not populated yet — leave it unmarked so a later
            // structural event can scan it again.
            return Ok(outcome);
        }

        state.mark_processed(region.clone());

        let descriptors = extract_fields(&inputs, state);
        outcome.fields_detected = descriptors.len();
        if self.config.verbose > 0 {
            eprintln!(
                "Region {}: detected {} form fields ({} inputs scanned).",
                region,
                descriptors.len(),
                inputs.len()
            );
        }

        state.queue.append(descriptors);
        let drain_outcome = drain(state, surface, backend, tracer)?;
        outcome.absorb(&drain_outcome);
        Ok(outcome)
    }
}
