use crate::dispatch::backend::AutofillBackend;
use crate::dispatch::queue::BATCH_SIZE;
use crate::fill::filler::apply_fill;
use crate::session::error::AutofillError;
use crate::session::session_state::SessionState;
use crate::surface::surface::DocumentSurface;
use crate::trace::logger::PipelineTracer;
use crate::trace::trace::PipelineEvent;

/// What one drain invocation accomplished.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DrainOutcome {
    pub chunks_sent: usize,
    pub ids_filled: usize,
    pub elements_written: usize,
    /// A chunk failed; the cursor was left on it and draining stopped.
    pub halted: bool,
}

/// Drain the session queue to the backend in fixed-size chunks.
///
/// Strictly one chunk in flight: the loop only takes chunk N+1 after chunk
/// N's response has been applied, which bounds backend load no matter how
/// many fields a scan produced. A failed chunk is logged and halts the
/// drain with the cursor unmoved — the next extraction pass re-invokes
/// this function and the chunk is re-sent. Backend failures are contained
/// here; only surface-level errors propagate.
pub fn drain(
    state: &mut SessionState,
    surface: &mut dyn DocumentSurface,
    backend: &dyn AutofillBackend,
    tracer: &PipelineTracer,
) -> Result<DrainOutcome, AutofillError> {
    let mut outcome = DrainOutcome::default();

    loop {
        let chunk = match state.queue.next_chunk() {
            Some(chunk) => chunk.to_vec(),
            None => break,
        };
        let batch_index = state.queue.cursor() / BATCH_SIZE;

        tracer.record(
            &PipelineEvent::stage("batch_sent")
                .with_batch_index(batch_index)
                .with_count(chunk.len()),
        );

        match backend.request_values(&chunk) {
            Ok(values) => {
                let report = apply_fill(&values, surface, state, tracer)?;
                state.queue.advance(chunk.len());
                outcome.chunks_sent += 1;
                outcome.ids_filled += report.ids_filled;
                outcome.elements_written += report.elements_written;
            }
            Err(error) => {
                eprintln!("Autofill batch {} failed: {}", batch_index, error);
                tracer.record(
                    &PipelineEvent::stage("batch_failed")
                        .with_batch_index(batch_index)
                        .with_detail(error.to_string()),
                );
                outcome.halted = true;
                break;
            }
        }
    }

    Ok(outcome)
}
