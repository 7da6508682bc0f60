use std::cell::RefCell;
use std::collections::{BTreeMap, VecDeque};

use form_autofill::dispatch::backend::{AutofillBackend, AutofillResponse, StaticBackend};
use form_autofill::dispatch::dispatcher::drain;
use form_autofill::dispatch::queue::{BATCH_SIZE, FieldQueue};
use form_autofill::field::field_model::FieldDescriptor;
use form_autofill::session::error::AutofillError;
use form_autofill::session::session_state::SessionState;
use form_autofill::surface::scripted::ScriptedSurface;
use form_autofill::surface::surface_model::DomField;
use form_autofill::trace::logger::PipelineTracer;

/// Backend that records each chunk's ids and can fail scripted calls.
struct ScriptedBackend {
    values: AutofillResponse,
    calls: RefCell<Vec<Vec<String>>>,
    fail_calls: RefCell<VecDeque<bool>>,
}

impl ScriptedBackend {
    fn answering(values: AutofillResponse) -> Self {
        Self {
            values,
            calls: RefCell::new(Vec::new()),
            fail_calls: RefCell::new(VecDeque::new()),
        }
    }

    fn fail_next(self, flags: &[bool]) -> Self {
        *self.fail_calls.borrow_mut() = flags.iter().copied().collect();
        self
    }

    fn recorded_calls(&self) -> Vec<Vec<String>> {
        self.calls.borrow().clone()
    }
}

impl AutofillBackend for ScriptedBackend {
    fn request_values(&self, fields: &[FieldDescriptor]) -> Result<AutofillResponse, AutofillError> {
        self.calls
            .borrow_mut()
            .push(fields.iter().map(|f| f.id.clone()).collect());

        if self.fail_calls.borrow_mut().pop_front().unwrap_or(false) {
            return Err(AutofillError::BackendStatus { status: 500 });
        }

        Ok(fields
            .iter()
            .filter_map(|f| self.values.get(&f.id).map(|v| (f.id.clone(), v.clone())))
            .collect())
    }
}

fn descriptor(id: &str) -> FieldDescriptor {
    FieldDescriptor::new(id, id, "text")
}

fn text_input(node: u64, id: &str) -> DomField {
    DomField {
        node,
        tag: "input".into(),
        input_type: Some("text".into()),
        id: Some(id.into()),
        name: None,
        placeholder: None,
        label: Some(id.into()),
        value: None,
    }
}

fn values_for(ids: &[&str]) -> AutofillResponse {
    ids.iter()
        .map(|id| (id.to_string(), format!("value-{}", id)))
        .collect()
}

// =========================================================================
// Queue invariants
// =========================================================================

#[test]
fn queue_chunks_are_bounded_and_ordered() {
    let mut queue = FieldQueue::new();
    queue.append((0..9).map(|i| descriptor(&format!("f{}", i))).collect());

    let chunk = queue.next_chunk().expect("First chunk available");
    assert_eq!(chunk.len(), BATCH_SIZE, "Full chunk is exactly BATCH_SIZE");
    assert_eq!(chunk[0].id, "f0", "Chunks come out in FIFO order");

    queue.advance(BATCH_SIZE);
    assert_eq!(queue.cursor(), 4);
    queue.advance(BATCH_SIZE);
    assert_eq!(queue.cursor(), 8);

    let tail = queue.next_chunk().expect("Partial tail chunk");
    assert_eq!(tail.len(), 1, "Last chunk holds the remainder");
    assert_eq!(tail[0].id, "f8");

    queue.advance(BATCH_SIZE);
    assert_eq!(queue.cursor(), 9, "Cursor is clamped to the queue length");
    assert!(queue.next_chunk().is_none(), "Drained queue yields no chunk");
}

#[test]
fn queue_append_while_draining_extends_pending() {
    let mut queue = FieldQueue::new();
    queue.append(vec![descriptor("a"), descriptor("b")]);
    queue.advance(2);
    assert_eq!(queue.pending(), 0);

    queue.append(vec![descriptor("c")]);
    assert_eq!(queue.pending(), 1, "Later appends re-open the queue");
    assert_eq!(queue.cursor(), 2, "Cursor never moves backwards");
    assert_eq!(queue.next_chunk().unwrap()[0].id, "c");
}

// =========================================================================
// Drain loop
// =========================================================================

#[test]
fn drain_sends_fixed_size_chunks_in_fifo_order() {
    let mut state = SessionState::new();
    let ids: Vec<String> = (0..10).map(|i| format!("f{}", i)).collect();
    state
        .queue
        .append(ids.iter().map(|id| descriptor(id)).collect());

    let mut surface = ScriptedSurface::new();
    for (i, id) in ids.iter().enumerate() {
        surface.add_element(None, text_input(i as u64 + 1, id));
    }

    let backend = ScriptedBackend::answering(values_for(
        &ids.iter().map(|s| s.as_str()).collect::<Vec<_>>(),
    ));
    let tracer = PipelineTracer::disabled();

    let outcome = drain(&mut state, &mut surface, &backend, &tracer).expect("Drain succeeds");

    let calls = backend.recorded_calls();
    assert_eq!(calls.len(), 3, "10 fields → chunks of 4, 4, 2");
    assert_eq!(calls[0], vec!["f0", "f1", "f2", "f3"]);
    assert_eq!(calls[1], vec!["f4", "f5", "f6", "f7"]);
    assert_eq!(calls[2], vec!["f8", "f9"]);

    assert_eq!(outcome.chunks_sent, 3);
    assert_eq!(outcome.ids_filled, 10);
    assert!(!outcome.halted);
    assert_eq!(state.queue.pending(), 0, "Queue fully drained");
}

#[test]
fn drain_halts_on_failure_with_cursor_unmoved() {
    let mut state = SessionState::new();
    state.queue.append(vec![
        descriptor("a"),
        descriptor("b"),
        descriptor("c"),
        descriptor("d"),
        descriptor("e"),
    ]);

    let mut surface = ScriptedSurface::new();
    let backend = ScriptedBackend::answering(values_for(&["a", "b", "c", "d", "e"]))
        .fail_next(&[false, true]);
    let tracer = PipelineTracer::disabled();

    let outcome = drain(&mut state, &mut surface, &backend, &tracer).expect("Failure is contained");

    assert!(outcome.halted, "Second chunk failed");
    assert_eq!(outcome.chunks_sent, 1, "Only the first chunk completed");
    assert_eq!(
        state.queue.cursor(),
        4,
        "Cursor stays on the failed chunk so a re-trigger re-sends it"
    );
    assert_eq!(state.queue.pending(), 1);
    assert_eq!(
        backend.recorded_calls().len(),
        2,
        "No chunk is issued after a failure"
    );
}

#[test]
fn drain_resumes_from_failed_chunk_when_reinvoked() {
    let mut state = SessionState::new();
    state.queue.append(vec![descriptor("a"), descriptor("b")]);

    let mut surface = ScriptedSurface::new();
    surface.add_element(None, text_input(1, "a"));
    surface.add_element(None, text_input(2, "b"));

    let backend = ScriptedBackend::answering(values_for(&["a", "b"])).fail_next(&[true]);
    let tracer = PipelineTracer::disabled();

    let first = drain(&mut state, &mut surface, &backend, &tracer).unwrap();
    assert!(first.halted);
    assert!(state.filled_fields.is_empty(), "Failed chunk fills nothing");

    // A later extraction pass re-invokes the drain; the scripted failure
    // is spent, so the same chunk now goes through.
    let second = drain(&mut state, &mut surface, &backend, &tracer).unwrap();
    assert!(!second.halted);
    assert_eq!(second.ids_filled, 2);

    let calls = backend.recorded_calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0], calls[1], "Re-trigger re-sends the failed chunk");
}

#[test]
fn drain_on_empty_queue_is_a_no_op() {
    let mut state = SessionState::new();
    let mut surface = ScriptedSurface::new();
    let backend = ScriptedBackend::answering(BTreeMap::new());
    let tracer = PipelineTracer::disabled();

    let outcome = drain(&mut state, &mut surface, &backend, &tracer).unwrap();
    assert_eq!(outcome.chunks_sent, 0);
    assert!(backend.recorded_calls().is_empty(), "No request without fields");
}

// =========================================================================
// Static backend
// =========================================================================

#[test]
fn static_backend_answers_only_requested_ids() {
    let backend = StaticBackend::new(values_for(&["a", "b", "c"]));
    let response = backend
        .request_values(&[descriptor("a"), descriptor("x")])
        .unwrap();

    assert_eq!(response.len(), 1, "Unknown ids are absent, not errors");
    assert_eq!(response.get("a").map(String::as_str), Some("value-a"));
}
