//! Slice data model — the CMS content block and the render units built from it.
//!
//! Slices arrive in Prismic's wire shape (`slice_type` + `primary`). The
//! grouping engine only ever looks at the type tag and the `position` field;
//! everything else is carried through untouched for the renderer.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

pub const EVENT_INFO: &str = "eventinfo";
pub const GRAPHIC: &str = "graphic";
pub const BACKGROUND_IMAGE: &str = "background_image";

/// Substring that marks a slice as overlaying its neighbours rather than
/// sitting in the page flow.
const ABSOLUTE_MARKER: &str = "absolute";

// ────────────────────────────────────────────────────────────────────────────
// Slice
// ────────────────────────────────────────────────────────────────────────────

/// One content block on a page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slice {
    #[serde(rename = "slice_type", alias = "type")]
    pub slice_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variation: Option<String>,
    /// Non-repeatable fields. Prismic calls this zone `primary`.
    #[serde(
        rename = "primary",
        alias = "fields",
        default,
        deserialize_with = "null_as_empty_map"
    )]
    pub fields: Map<String, Value>,
    /// Repeatable zone, passed through to the renderer.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<Value>,
}

impl Slice {
    pub fn new(slice_type: impl Into<String>) -> Self {
        Self {
            slice_type: slice_type.into(),
            id: None,
            variation: None,
            fields: Map::new(),
            items: Vec::new(),
        }
    }

    /// Builder-style field setter for fixtures.
    #[cfg(test)]
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    pub fn kind(&self) -> SliceKind {
        SliceKind::of(&self.slice_type)
    }

    /// The `position` field, if it is a string. Any other JSON value counts
    /// as absent.
    pub fn position(&self) -> Option<&str> {
        self.fields.get("position").and_then(Value::as_str)
    }

    /// True when the slice is positioned on top of other content
    /// (`absolute`, `absolute-top-left`, ...).
    pub fn is_absolute(&self) -> bool {
        self.position()
            .is_some_and(|position| position.contains(ABSOLUTE_MARKER))
    }
}

fn null_as_empty_map<'de, D>(deserializer: D) -> Result<Map<String, Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Map<String, Value>>::deserialize(deserializer)?.unwrap_or_default())
}

/// The slice types the grouping engine treats specially.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SliceKind {
    EventInfo,
    Graphic,
    BackgroundImage,
    Other,
}

impl SliceKind {
    pub fn of(slice_type: &str) -> Self {
        match slice_type {
            EVENT_INFO => SliceKind::EventInfo,
            GRAPHIC => SliceKind::Graphic,
            BACKGROUND_IMAGE => SliceKind::BackgroundImage,
            _ => SliceKind::Other,
        }
    }

    /// Image kinds that may be coalesced into a horizontal gallery.
    pub fn is_gallery_image(self) -> bool {
        matches!(self, SliceKind::Graphic | SliceKind::BackgroundImage)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Render units
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GroupKind {
    /// Event-info block with an absolutely positioned graphic stacked on it.
    #[serde(rename = "overlay-pair")]
    OverlayPair,
    /// Run of same-type, in-flow image slices shown side by side.
    #[serde(rename = "gallery")]
    Gallery,
}

/// Two or more contiguous slices rendered as one composite unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SliceGroup {
    pub kind: GroupKind,
    pub slices: Vec<Slice>,
}

/// Output granularity of the grouping engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "unit", rename_all = "snake_case")]
pub enum RenderUnit {
    Single(Slice),
    Group(SliceGroup),
}

impl RenderUnit {
    pub fn group(kind: GroupKind, slices: Vec<Slice>) -> Self {
        RenderUnit::Group(SliceGroup { kind, slices })
    }

    /// The underlying slices, in page order.
    pub fn slices(&self) -> &[Slice] {
        match self {
            RenderUnit::Single(slice) => std::slice::from_ref(slice),
            RenderUnit::Group(group) => &group.slices,
        }
    }

    pub fn group_kind(&self) -> Option<GroupKind> {
        match self {
            RenderUnit::Single(_) => None,
            RenderUnit::Group(group) => Some(group.kind),
        }
    }
}

/// Concatenates the slices of every unit, in order.
#[cfg(test)]
pub fn flatten(units: &[RenderUnit]) -> Vec<Slice> {
    units
        .iter()
        .flat_map(|unit| unit.slices().iter().cloned())
        .collect()
}
