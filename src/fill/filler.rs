use crate::dispatch::backend::AutofillResponse;
use crate::session::error::AutofillError;
use crate::session::session_state::SessionState;
use crate::surface::surface::DocumentSurface;
use crate::trace::logger::PipelineTracer;
use crate::trace::trace::PipelineEvent;

/// What one response application wrote.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FillReport {
    /// Response ids that matched live elements and were marked filled.
    pub ids_filled: usize,
    /// Individual elements written (a radio group counts per element).
    pub elements_written: usize,
}

/// Write backend-supplied values into the live document.
///
/// Ids already filled this session are skipped entirely. For each fresh id,
/// every element whose id or name matches is written: choice inputs are
/// checked iff their own value equals the supplied value, everything else
/// gets the value assigned directly. Each written element receives
/// synthetic "input" and "change" notifications. The id is marked filled
/// only after all its matched elements were written, so a radio group is
/// resolved in one pass. Response keys matching no live element are silent
/// no-ops — no coercion, no validation.
pub fn apply_fill(
    values: &AutofillResponse,
    surface: &mut dyn DocumentSurface,
    state: &mut SessionState,
    tracer: &PipelineTracer,
) -> Result<FillReport, AutofillError> {
    let mut report = FillReport::default();

    for (field_id, value) in values {
        if state.is_filled(field_id) {
            continue;
        }

        let matches = surface.find_by_key(field_id)?;
        if matches.is_empty() {
            continue;
        }

        for element in &matches {
            if is_choice_kind(element.input_type.as_deref()) {
                let own_value = element.value.as_deref().unwrap_or("");
                surface.set_checked(element.node, own_value == value)?;
            } else {
                surface.set_value(element.node, value)?;
            }
            surface.notify_changed(element.node)?;
            report.elements_written += 1;
        }

        state.mark_filled(field_id);
        report.ids_filled += 1;
    }

    if report.ids_filled > 0 {
        tracer.record(&PipelineEvent::stage("fill_applied").with_count(report.ids_filled));
    }

    Ok(report)
}

fn is_choice_kind(input_type: Option<&str>) -> bool {
    matches!(input_type, Some("radio") | Some("checkbox"))
}
