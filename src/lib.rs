use crate::dispatch::backend::{AutofillBackend, StaticBackend};
use crate::field::field_model::FieldDescriptor;
use crate::observe::controller::{
    DEFAULT_GRACE_PERIOD_MS, Mode, ObservationController, ObserveConfig, ScanOutcome,
};
use crate::session::error::AutofillError;
use crate::session::session_state::SessionState;
use crate::surface::surface::DocumentSurface;
use crate::trace::logger::PipelineTracer;

pub mod cli;
pub mod dispatch;
pub mod field;
pub mod fill;
pub mod observe;
pub mod session;
pub mod surface;
pub mod trace;

#[derive(Debug, Clone)]
pub struct FillOptions {
    pub mode: Mode,
    pub grace_period_ms: u64,
    /// Stop the viewer event loop after this many events. `None` runs
    /// until the surface's event stream ends.
    pub max_events: Option<usize>,
    pub verbose: u8,
}

impl Default for FillOptions {
    fn default() -> Self {
        Self {
            mode: Mode::Auto,
            grace_period_ms: DEFAULT_GRACE_PERIOD_MS,
            max_events: None,
            verbose: 0,
        }
    }
}

/// Totals for one pipeline run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FillSummary {
    pub regions_processed: usize,
    pub inputs_seen: usize,
    pub fields_detected: usize,
    pub ids_filled: usize,
    pub elements_written: usize,
    /// At least one batch failed and was left undrained.
    pub halted: bool,
}

impl FillSummary {
    fn absorb(&mut self, outcome: &ScanOutcome) {
        self.inputs_seen += outcome.inputs_seen;
        self.fields_detected += outcome.fields_detected;
        self.ids_filled += outcome.ids_filled;
        self.elements_written += outcome.elements_written;
        self.halted = self.halted || outcome.halted;
    }
}

/// Run the full detect-dispatch-fill pipeline over a fresh session.
pub fn run_fill(
    surface: &mut dyn DocumentSurface,
    backend: &dyn AutofillBackend,
    options: &FillOptions,
    tracer: &PipelineTracer,
) -> Result<FillSummary, AutofillError> {
    let mut state = SessionState::new();
    run_session(&mut state, surface, backend, options, tracer)
}

/// Run detection only; nothing is dispatched or written back.
///
/// Returns the descriptors the pipeline would have sent, in detection
/// order.
pub fn scan_only(
    surface: &mut dyn DocumentSurface,
    options: &FillOptions,
) -> Result<Vec<FieldDescriptor>, AutofillError> {
    // An empty canned backend answers every chunk with no values, so the
    // queue drains without any element being written.
    let backend = StaticBackend::default();
    let tracer = PipelineTracer::disabled();
    let mut state = SessionState::new();
    run_session(&mut state, surface, &backend, options, &tracer)?;
    Ok(state.queue.items().to_vec())
}

/// Drive one session to completion in the resolved operating mode.
pub fn run_session(
    state: &mut SessionState,
    surface: &mut dyn DocumentSurface,
    backend: &dyn AutofillBackend,
    options: &FillOptions,
    tracer: &PipelineTracer,
) -> Result<FillSummary, AutofillError> {
    let mode = effective_mode(options.mode, surface)?;
    let mut controller = ObservationController::new(ObserveConfig {
        grace_period_ms: options.grace_period_ms,
        verbose: options.verbose,
    });

    let mut summary = FillSummary::default();

    if mode == Mode::Viewer {
        let mut handled = 0usize;
        while let Some(event) = surface.next_event()? {
            let outcome = controller.handle_event(&event, state, surface, backend, tracer)?;
            summary.absorb(&outcome);

            handled += 1;
            if options.max_events.is_some_and(|max| handled >= max) {
                break;
            }
        }
    } else {
        let outcome = controller.run_static(state, surface, backend, tracer)?;
        summary.absorb(&outcome);
    }

    summary.regions_processed = state.processed_regions.len();
    Ok(summary)
}

/// Resolve `Auto` by probing the surface for a paged-viewer root.
/// Never returns `Mode::Auto`.
fn effective_mode(requested: Mode, surface: &mut dyn DocumentSurface) -> Result<Mode, AutofillError> {
    match requested {
        Mode::Auto => {
            if surface.has_viewer_root()? {
                Ok(Mode::Viewer)
            } else {
                Ok(Mode::Static)
            }
        }
        mode => Ok(mode),
    }
}
