use std::{fs::OpenOptions, io::Write, sync::Mutex};

use crate::trace::trace::PipelineEvent;

/// Appends pipeline events to a JSONL file.
///
/// Tracing is best-effort: open, serialize, and write failures degrade to
/// stderr warnings and never reach the pipeline.
pub struct PipelineTracer {
    file: Option<Mutex<std::fs::File>>,
}

impl PipelineTracer {
    /// Tracer that appends to `path`, creating the file if needed.
    pub fn to_file(path: &str) -> Self {
        match OpenOptions::new().create(true).append(true).open(path) {
            Ok(file) => Self {
                file: Some(Mutex::new(file)),
            },
            Err(e) => {
                eprintln!("Warning: could not open trace file '{}': {}", path, e);
                Self { file: None }
            }
        }
    }

    /// Tracer that drops every event.
    pub fn disabled() -> Self {
        Self { file: None }
    }

    pub fn record(&self, event: &PipelineEvent) {
        let Some(file_mutex) = &self.file else {
            return;
        };

        let json = match serde_json::to_string(event) {
            Ok(json) => json,
            Err(e) => {
                eprintln!("Warning: failed to serialize pipeline event: {}", e);
                return;
            }
        };

        let mut file = match file_mutex.lock() {
            Ok(file) => file,
            Err(e) => {
                eprintln!("Warning: pipeline tracer lock poisoned: {}", e);
                return;
            }
        };

        if let Err(e) = writeln!(file, "{}", json) {
            eprintln!("Warning: failed to write pipeline event: {}", e);
        }
    }
}
