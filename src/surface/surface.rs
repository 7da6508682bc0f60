use crate::session::error::AutofillError;
use crate::surface::surface_model::{DomField, RegionId, ScanScope, SurfaceEvent};

/// The rendering-surface seam.
///
/// Everything the pipeline needs from a live document: a structural event
/// stream, input queries, and the write-back primitives. Production runs
/// use [`BridgeSurface`](crate::surface::bridge::BridgeSurface); tests use
/// [`ScriptedSurface`](crate::surface::scripted::ScriptedSurface).
pub trait DocumentSurface {
    /// Next structural event, or `None` once the surface has shut down.
    /// Blocks until one is available.
    fn next_event(&mut self) -> Result<Option<SurfaceEvent>, AutofillError>;

    /// Snapshot every input/select/textarea element under the scope, in
    /// traversal order.
    fn query_inputs(&mut self, scope: &ScanScope) -> Result<Vec<DomField>, AutofillError>;

    /// Every live element whose id or name equals `key`. Multiple elements
    /// (a radio group) may share a name.
    fn find_by_key(&mut self, key: &str) -> Result<Vec<DomField>, AutofillError>;

    /// Assign an element's content value directly.
    fn set_value(&mut self, node: u64, value: &str) -> Result<(), AutofillError>;

    /// Set a checkbox/radio checked state.
    fn set_checked(&mut self, node: u64, checked: bool) -> Result<(), AutofillError>;

    /// Synthesize bubbling "input" and "change" notifications on the
    /// element so host-page reactive logic observes the write.
    fn notify_changed(&mut self, node: u64) -> Result<(), AutofillError>;

    /// Whether the paged-viewer root is present (mode auto-selection).
    fn has_viewer_root(&mut self) -> Result<bool, AutofillError>;

    /// Whether a region's annotation sub-layer has rendered yet.
    fn sublayer_present(&mut self, region: &RegionId) -> Result<bool, AutofillError>;

    /// Let the renderer finish populating attributes before reading them.
    fn settle(&mut self, duration_ms: u64) -> Result<(), AutofillError>;
}
