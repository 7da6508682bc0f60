use std::collections::HashSet;

use crate::dispatch::queue::FieldQueue;
use crate::surface::surface_model::RegionId;

/// Mutable context for one page/document session.
///
/// Owns the two dedup sets and the batch queue; threaded `&mut` through a
/// single call chain, so no interior mutability is needed. Discarded when
/// the session ends — nothing persists.
#[derive(Debug, Default)]
pub struct SessionState {
    /// Regions whose inputs have been scanned. Monotone: a region, once
    /// marked, is never re-scanned even if it mutates again.
    pub processed_regions: HashSet<RegionId>,

    /// Field ids that have received a value. Monotone: an id, once marked,
    /// is never refilled within the session.
    pub filled_fields: HashSet<String>,

    /// Descriptors awaiting dispatch, with the drain cursor.
    pub queue: FieldQueue,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_processed(&self, region: &RegionId) -> bool {
        self.processed_regions.contains(region)
    }

    pub fn mark_processed(&mut self, region: RegionId) -> bool {
        self.processed_regions.insert(region)
    }

    pub fn is_filled(&self, field_id: &str) -> bool {
        self.filled_fields.contains(field_id)
    }

    pub fn mark_filled(&mut self, field_id: &str) -> bool {
        self.filled_fields.insert(field_id.to_string())
    }
}
