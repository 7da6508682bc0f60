use crate::field::field_model::FieldDescriptor;

/// Fields sent to the backend per request.
pub const BATCH_SIZE: usize = 4;

/// Descriptors awaiting dispatch, plus the drain cursor.
///
/// Append-only while draining. The cursor is monotone non-decreasing and
/// never exceeds the queue length; it is only advanced after a chunk's
/// fill completed, so a failed chunk is re-sent when draining resumes.
#[derive(Debug, Default)]
pub struct FieldQueue {
    items: Vec<FieldDescriptor>,
    next_index: usize,
}

impl FieldQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, descriptors: Vec<FieldDescriptor>) {
        self.items.extend(descriptors);
    }

    /// The next undispatched chunk, at most [`BATCH_SIZE`] descriptors.
    /// `None` once the cursor has reached the queue length.
    pub fn next_chunk(&self) -> Option<&[FieldDescriptor]> {
        if self.next_index >= self.items.len() {
            return None;
        }
        let end = (self.next_index + BATCH_SIZE).min(self.items.len());
        Some(&self.items[self.next_index..end])
    }

    /// Move the cursor past a dispatched chunk. Clamped to the queue length.
    pub fn advance(&mut self, count: usize) {
        self.next_index = (self.next_index + count).min(self.items.len());
    }

    pub fn cursor(&self) -> usize {
        self.next_index
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Descriptors not yet dispatched.
    pub fn pending(&self) -> usize {
        self.items.len() - self.next_index
    }

    pub fn items(&self) -> &[FieldDescriptor] {
        &self.items
    }
}
