// Slice grouping engine and its data model.
// Pure functions only: no I/O, no shared state.

pub mod gallery;
pub mod grouping;
pub mod model;

pub use gallery::{gallery_images, GalleryImage};
pub use grouping::group_slices;
pub use model::{GroupKind, RenderUnit, Slice};
