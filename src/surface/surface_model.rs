use std::fmt;

use serde::Deserialize;

/// Opaque identifier for one separately-rendered content region (a page).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RegionId(pub String);

impl fmt::Display for RegionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Structural change reported by the rendering surface.
///
/// `SublayerAdded` fires when a region's annotation/input layer appears
/// after the region itself was already attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceEvent {
    RegionAdded(RegionId),
    SublayerAdded(RegionId),
}

/// What an input query covers: the whole document, or one region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanScope {
    Document,
    Region(RegionId),
}

/// Raw snapshot of one form element as delivered by the surface.
///
/// `label` is the text of the element's associated label (via "for"
/// reference or ancestry), unprocessed. `value` is the element's own value
/// attribute — choice inputs are checked by comparing it against the
/// backend-supplied value.
#[derive(Debug, Clone, Deserialize)]
pub struct DomField {
    pub node: u64,
    pub tag: String,
    #[serde(rename = "type")]
    pub input_type: Option<String>,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub placeholder: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub value: Option<String>,
}
