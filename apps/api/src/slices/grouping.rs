//! Slice grouping — turns a flat, CMS-ordered slice list into render units.
//!
//! # Rules (evaluated in this order for each starting slice)
//! 1. Overlay pair: an `eventinfo` slice followed by an absolutely positioned
//!    `graphic` becomes one stacked unit.
//! 2. Gallery: a run of two or more same-type, in-flow image slices
//!    (`graphic` or `background_image`) becomes one horizontal strip. An
//!    absolutely positioned image ends the run and is never folded in.
//! 3. Anything else renders on its own.
//!
//! Grouping only merges contiguous runs; it never drops or reorders slices.

use std::iter::Peekable;

use super::model::{GroupKind, RenderUnit, Slice, SliceKind};

/// Groups `slices` into render units in a single forward pass.
pub fn group_slices(slices: Vec<Slice>) -> Vec<RenderUnit> {
    let mut units = Vec::with_capacity(slices.len());
    let mut rest = slices.into_iter().peekable();

    while let Some(current) = rest.next() {
        let kind = current.kind();

        if kind == SliceKind::EventInfo {
            if let Some(graphic) = rest.next_if(is_overlay_partner) {
                units.push(RenderUnit::group(
                    GroupKind::OverlayPair,
                    vec![current, graphic],
                ));
                continue;
            }
        }

        if kind.is_gallery_image() && !current.is_absolute() {
            let run = take_gallery_run(current, kind, &mut rest);
            if run.len() >= 2 {
                units.push(RenderUnit::group(GroupKind::Gallery, run));
            } else {
                units.extend(run.into_iter().map(RenderUnit::Single));
            }
            continue;
        }

        units.push(RenderUnit::Single(current));
    }

    units
}

fn is_overlay_partner(next: &Slice) -> bool {
    next.kind() == SliceKind::Graphic && next.is_absolute()
}

/// Consumes in-flow slices of `kind` following `first`. Stops (without
/// consuming) at the first slice of another type or an absolute one.
fn take_gallery_run<I>(first: Slice, kind: SliceKind, rest: &mut Peekable<I>) -> Vec<Slice>
where
    I: Iterator<Item = Slice>,
{
    let mut run = vec![first];
    while let Some(next) = rest.next_if(|next| next.kind() == kind && !next.is_absolute()) {
        run.push(next);
    }
    run
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slices::model::{flatten, BACKGROUND_IMAGE, EVENT_INFO, GRAPHIC};

    fn event_info(title: &str) -> Slice {
        Slice::new(EVENT_INFO).with_field("title", title)
    }

    fn graphic(position: &str) -> Slice {
        Slice::new(GRAPHIC).with_field("position", position)
    }

    fn background(position: &str) -> Slice {
        Slice::new(BACKGROUND_IMAGE).with_field("position", position)
    }

    fn other(slice_type: &str) -> Slice {
        Slice::new(slice_type)
    }

    /// Compact shape of a grouping result: `"S"` for singles, the group
    /// kind's wire name plus its length otherwise.
    fn shape(units: &[RenderUnit]) -> Vec<String> {
        units
            .iter()
            .map(|unit| match unit {
                RenderUnit::Single(_) => "S".to_string(),
                RenderUnit::Group(group) => {
                    let kind = match group.kind {
                        GroupKind::OverlayPair => "overlay-pair",
                        GroupKind::Gallery => "gallery",
                    };
                    format!("{kind}:{}", group.slices.len())
                }
            })
            .collect()
    }

    // ── examples ────────────────────────────────────────────────────────────

    #[test]
    fn test_empty_input() {
        assert!(group_slices(vec![]).is_empty());
    }

    #[test]
    fn test_overlay_pairing() {
        let input = vec![event_info("Dates"), graphic("absolute-top-left")];
        let units = group_slices(input.clone());

        assert_eq!(units, vec![RenderUnit::group(GroupKind::OverlayPair, input)]);
    }

    #[test]
    fn test_overlay_non_trigger() {
        let input = vec![event_info("Dates"), graphic("center")];
        let units = group_slices(input.clone());

        assert_eq!(
            units,
            vec![
                RenderUnit::Single(input[0].clone()),
                RenderUnit::Single(input[1].clone()),
            ]
        );
    }

    #[test]
    fn test_overlay_requires_graphic_type() {
        let units = group_slices(vec![event_info("Dates"), background("absolute-left")]);
        assert_eq!(shape(&units), vec!["S", "S"]);
    }

    #[test]
    fn test_overlay_with_missing_position() {
        let units = group_slices(vec![event_info("Dates"), Slice::new(GRAPHIC)]);
        assert_eq!(shape(&units), vec!["S", "S"]);
    }

    #[test]
    fn test_overlay_accepts_any_absolute_variant() {
        for position in ["absolute", "absolute-right", "absolute-bottom-right"] {
            let units = group_slices(vec![event_info("Dates"), graphic(position)]);
            assert_eq!(shape(&units), vec!["overlay-pair:2"], "position {position}");
        }
    }

    #[test]
    fn test_gallery_grouping() {
        let input = vec![graphic("center"), graphic("center"), graphic("center")];
        let units = group_slices(input.clone());

        assert_eq!(units, vec![RenderUnit::group(GroupKind::Gallery, input)]);
    }

    #[test]
    fn test_gallery_excludes_absolute() {
        let input = vec![
            graphic("center"),
            graphic("absolute-top-right"),
            graphic("center"),
        ];
        let units = group_slices(input.clone());

        assert_eq!(
            units,
            input.into_iter().map(RenderUnit::Single).collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_adjacent_absolute_graphics_never_group() {
        let units = group_slices(vec![graphic("absolute-left"), graphic("absolute-right")]);
        assert_eq!(shape(&units), vec!["S", "S"]);
    }

    #[test]
    fn test_single_fallback() {
        let input = vec![graphic("center")];
        assert_eq!(
            group_slices(input.clone()),
            vec![RenderUnit::Single(input[0].clone())]
        );
    }

    #[test]
    fn test_mixed_image_types_never_merge() {
        let units = group_slices(vec![graphic("center"), background("center")]);
        assert_eq!(shape(&units), vec!["S", "S"]);
    }

    #[test]
    fn test_background_image_gallery() {
        let units = group_slices(vec![
            background("center"),
            Slice::new(BACKGROUND_IMAGE),
            background("float-left"),
        ]);
        assert_eq!(shape(&units), vec!["gallery:3"]);
    }

    #[test]
    fn test_gallery_run_stops_at_other_type() {
        let units = group_slices(vec![
            graphic("center"),
            graphic("center"),
            other("banner"),
            graphic("center"),
            graphic("center"),
        ]);
        assert_eq!(shape(&units), vec!["gallery:2", "S", "gallery:2"]);
    }

    #[test]
    fn test_absolute_then_run_groups_remainder() {
        let units = group_slices(vec![
            graphic("absolute-left"),
            graphic("center"),
            graphic("center"),
        ]);
        assert_eq!(shape(&units), vec!["S", "gallery:2"]);
    }

    #[test]
    fn test_overlay_consumes_graphic_before_gallery() {
        // The absolute graphic belongs to the event info; the in-flow run
        // after it forms its own gallery.
        let units = group_slices(vec![
            event_info("Venue"),
            graphic("absolute-top-left"),
            graphic("center"),
            graphic("center"),
        ]);
        assert_eq!(shape(&units), vec!["overlay-pair:2", "gallery:2"]);
    }

    #[test]
    fn test_consecutive_event_infos() {
        let units = group_slices(vec![
            event_info("One"),
            event_info("Two"),
            graphic("absolute-right"),
        ]);
        assert_eq!(shape(&units), vec!["S", "overlay-pair:2"]);
    }

    // ── properties ──────────────────────────────────────────────────────────

    fn sample_pages() -> Vec<Vec<Slice>> {
        vec![
            vec![],
            vec![other("herotext")],
            vec![
                other("herotext"),
                event_info("Dates"),
                graphic("absolute-top-left"),
                graphic("center"),
                graphic("center"),
                background("center"),
                background("absolute"),
                background("center"),
                background("center"),
                other("logo_row"),
            ],
            vec![
                graphic("absolute"),
                event_info("A"),
                event_info("B"),
                graphic("center"),
                graphic("absolute-left"),
                Slice::new(GRAPHIC),
                Slice::new(GRAPHIC).with_field("position", 7),
                other("cta_banner"),
            ],
        ]
    }

    #[test]
    fn test_flatten_reproduces_input() {
        for page in sample_pages() {
            let units = group_slices(page.clone());
            assert_eq!(flatten(&units), page);
        }
    }

    #[test]
    fn test_groups_have_at_least_two_slices() {
        for page in sample_pages() {
            for unit in group_slices(page) {
                if let RenderUnit::Group(group) = unit {
                    assert!(group.slices.len() >= 2);
                }
            }
        }
    }

    #[test]
    fn test_galleries_are_same_type_and_in_flow() {
        for page in sample_pages() {
            for unit in group_slices(page) {
                if let RenderUnit::Group(group) = unit {
                    if group.kind == GroupKind::Gallery {
                        let first = &group.slices[0].slice_type;
                        assert!(group
                            .slices
                            .iter()
                            .all(|s| &s.slice_type == first && !s.is_absolute()));
                    }
                }
            }
        }
    }

    #[test]
    fn test_grouping_after_reserialization_is_equal() {
        for page in sample_pages() {
            let json = serde_json::to_string(&page).unwrap();
            let reparsed: Vec<Slice> = serde_json::from_str(&json).unwrap();
            assert_eq!(group_slices(reparsed), group_slices(page));
        }
    }
}
