//! Render plans — what the front end receives for a page.
//!
//! A plan is the grouped slice zone plus a stable key per unit. Gallery units
//! also carry their resolved images so the renderer does not have to dig
//! through slice fields.

use serde::{Deserialize, Serialize};

use crate::cms::{CmsError, Document};
use crate::slices::{gallery_images, group_slices, GalleryImage, GroupKind, RenderUnit};

use super::metadata::{PageMetadata, SiteDefaults};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedUnit {
    pub key: String,
    #[serde(flatten)]
    pub unit: RenderUnit,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<GalleryImage>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PagePlan {
    pub uid: Option<String>,
    pub page_type: String,
    pub metadata: PageMetadata,
    pub units: Vec<PlannedUnit>,
}

impl PagePlan {
    /// Groups the document's slice zone into a plan.
    pub fn build(doc: &Document, site: &SiteDefaults) -> Result<Self, CmsError> {
        let units = group_slices(doc.slices()?);
        Ok(Self {
            uid: doc.uid.clone(),
            page_type: doc.doc_type.clone(),
            metadata: PageMetadata::from_document(doc, site),
            units: plan_units(units),
        })
    }
}

/// Attaches keys (and gallery images) to grouped units.
pub fn plan_units(units: Vec<RenderUnit>) -> Vec<PlannedUnit> {
    units
        .into_iter()
        .enumerate()
        .map(|(index, unit)| {
            let (key, images) = match unit.group_kind() {
                None => (format!("slice-wrapper-{index}"), None),
                Some(GroupKind::OverlayPair) => (format!("group-{index}"), None),
                Some(GroupKind::Gallery) => (
                    format!("gallery-{index}"),
                    Some(gallery_images(unit.slices())),
                ),
            };
            PlannedUnit { key, unit, images }
        })
        .collect()
}
