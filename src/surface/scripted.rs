use std::collections::{HashSet, VecDeque};

use crate::session::error::AutofillError;
use crate::surface::surface::DocumentSurface;
use crate::surface::surface_model::{DomField, RegionId, ScanScope, SurfaceEvent};

/// One element held by the scripted surface, with its mutable fill state.
#[derive(Debug, Clone)]
pub struct ScriptedElement {
    pub snapshot: DomField,
    pub region: Option<RegionId>,
    /// Current content value (starts from the snapshot's value attribute).
    pub value: String,
    pub checked: bool,
    /// Input+change notification pairs dispatched on this element.
    pub notifications: u32,
}

/// In-memory document surface with a scripted event feed.
///
/// Tests and offline runs stage elements and structural events up front,
/// then assert on the writes and synthetic notifications the pipeline
/// produced.
#[derive(Debug, Default)]
pub struct ScriptedSurface {
    events: VecDeque<SurfaceEvent>,
    elements: Vec<ScriptedElement>,
    sublayers: HashSet<RegionId>,
    viewer_root: bool,
    /// Grace-period waits requested by the controller, in order.
    pub settle_calls: Vec<u64>,
}

impl ScriptedSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_viewer_root() -> Self {
        Self {
            viewer_root: true,
            ..Self::default()
        }
    }

    pub fn push_event(&mut self, event: SurfaceEvent) {
        self.events.push_back(event);
    }

    /// Mark a region's annotation sub-layer as rendered.
    pub fn add_sublayer(&mut self, region: RegionId) {
        self.sublayers.insert(region);
    }

    pub fn add_element(&mut self, region: Option<RegionId>, snapshot: DomField) {
        let value = snapshot.value.clone().unwrap_or_default();
        self.elements.push(ScriptedElement {
            snapshot,
            region,
            value,
            checked: false,
            notifications: 0,
        });
    }

    pub fn element_by_node(&self, node: u64) -> Option<&ScriptedElement> {
        self.elements.iter().find(|e| e.snapshot.node == node)
    }

    /// First element whose id or name equals `key`.
    pub fn first_by_key(&self, key: &str) -> Option<&ScriptedElement> {
        self.elements.iter().find(|e| key_matches(&e.snapshot, key))
    }

    fn element_mut(&mut self, node: u64) -> Result<&mut ScriptedElement, AutofillError> {
        self.elements
            .iter_mut()
            .find(|e| e.snapshot.node == node)
            .ok_or(AutofillError::ElementNotFound { node })
    }
}

fn key_matches(field: &DomField, key: &str) -> bool {
    field.id.as_deref() == Some(key) || field.name.as_deref() == Some(key)
}

impl DocumentSurface for ScriptedSurface {
    fn next_event(&mut self) -> Result<Option<SurfaceEvent>, AutofillError> {
        Ok(self.events.pop_front())
    }

    fn query_inputs(&mut self, scope: &ScanScope) -> Result<Vec<DomField>, AutofillError> {
        let fields = self
            .elements
            .iter()
            .filter(|e| match scope {
                ScanScope::Document => true,
                ScanScope::Region(region) => e.region.as_ref() == Some(region),
            })
            .map(|e| e.snapshot.clone())
            .collect();
        Ok(fields)
    }

    fn find_by_key(&mut self, key: &str) -> Result<Vec<DomField>, AutofillError> {
        let fields = self
            .elements
            .iter()
            .filter(|e| key_matches(&e.snapshot, key))
            .map(|e| e.snapshot.clone())
            .collect();
        Ok(fields)
    }

    fn set_value(&mut self, node: u64, value: &str) -> Result<(), AutofillError> {
        self.element_mut(node)?.value = value.to_string();
        Ok(())
    }

    fn set_checked(&mut self, node: u64, checked: bool) -> Result<(), AutofillError> {
        self.element_mut(node)?.checked = checked;
        Ok(())
    }

    fn notify_changed(&mut self, node: u64) -> Result<(), AutofillError> {
        self.element_mut(node)?.notifications += 1;
        Ok(())
    }

    fn has_viewer_root(&mut self) -> Result<bool, AutofillError> {
        Ok(self.viewer_root)
    }

    fn sublayer_present(&mut self, region: &RegionId) -> Result<bool, AutofillError> {
        Ok(self.sublayers.contains(region))
    }

    fn settle(&mut self, duration_ms: u64) -> Result<(), AutofillError> {
        // No real waiting — just record that the grace period was honored
        self.settle_calls.push(duration_ms);
        Ok(())
    }
}
