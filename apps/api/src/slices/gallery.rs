//! Image extraction for gallery groups.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::model::Slice;

/// Image fields checked, in order. Graphic slices use `graphic_image`,
/// background images use `image`.
const IMAGE_FIELDS: [&str; 2] = ["graphic_image", "image"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GalleryImage {
    pub url: String,
    pub alt: String,
}

/// Collects the displayable images of a gallery. Slices without an image URL
/// are skipped, so the result may be shorter than `slices` (or empty).
pub fn gallery_images(slices: &[Slice]) -> Vec<GalleryImage> {
    slices
        .iter()
        .filter_map(slice_image)
        .enumerate()
        .map(|(index, (url, alt))| GalleryImage {
            url: url.to_string(),
            alt: alt
                .map(str::to_string)
                .unwrap_or_else(|| format!("Gallery image {}", index + 1)),
        })
        .collect()
}

fn slice_image(slice: &Slice) -> Option<(&str, Option<&str>)> {
    let image = IMAGE_FIELDS
        .iter()
        .find_map(|field| slice.fields.get(*field).filter(|v| v.is_object()))?;
    let url = non_empty_str(image.get("url"))?;
    Some((url, non_empty_str(image.get("alt"))))
}

fn non_empty_str(value: Option<&Value>) -> Option<&str> {
    value.and_then(Value::as_str).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slices::model::{BACKGROUND_IMAGE, GRAPHIC};
    use serde_json::json;

    fn make_graphic(image: Value) -> Slice {
        Slice::new(GRAPHIC)
            .with_field("position", "center")
            .with_field("graphic_image", image)
    }

    #[test]
    fn test_reads_graphic_and_background_fields() {
        let slices = vec![
            make_graphic(json!({ "url": "https://img/a.png", "alt": "Robot arm" })),
            Slice::new(BACKGROUND_IMAGE).with_field("image", json!({ "url": "https://img/b.png" })),
        ];

        let images = gallery_images(&slices);
        assert_eq!(
            images,
            vec![
                GalleryImage {
                    url: "https://img/a.png".into(),
                    alt: "Robot arm".into()
                },
                GalleryImage {
                    url: "https://img/b.png".into(),
                    alt: "Gallery image 2".into()
                },
            ]
        );
    }

    #[test]
    fn test_skips_slices_without_url() {
        let slices = vec![
            make_graphic(json!({})),
            make_graphic(json!({ "url": "" })),
            make_graphic(json!({ "url": "https://img/c.png", "alt": "" })),
        ];

        let images = gallery_images(&slices);
        assert_eq!(images.len(), 1);
        // Numbering counts kept images only.
        assert_eq!(images[0].alt, "Gallery image 1");
    }

    #[test]
    fn test_empty_image_object_falls_back_to_next_field() {
        let slice = Slice::new(GRAPHIC)
            .with_field("graphic_image", Value::Null)
            .with_field("image", json!({ "url": "https://img/d.png" }));

        assert_eq!(gallery_images(&[slice])[0].url, "https://img/d.png");
    }

    #[test]
    fn test_no_images() {
        assert!(gallery_images(&[Slice::new(GRAPHIC), Slice::new(GRAPHIC)]).is_empty());
    }
}
