//! Property-based invariant tests for the fishbone layout engine.
//!
//! 1. Canvas never shrinks below the minimum floor.
//! 2. Every row ends up in exactly one factor layout.
//! 3. Category anchors move strictly leftward from the head.
//! 4. Factor offsets are strictly increasing within a cause.
//! 5. Bones are at least the minimum length and on the side their index picks.
//! 6. Cause roots lie on their bone, inside its length.

use fishbone::diagram::{
    FactorRecord, FishboneLayout, LayoutOptions, MIN_CANVAS_HEIGHT, MIN_CANVAS_WIDTH, Status,
    layout_fishbone,
};
use fishbone::fonts::FixedWidthMeasure;
use proptest::prelude::*;

fn status_strategy() -> impl Strategy<Value = Status> {
    prop::sample::select(Status::ALL.to_vec())
}

fn rows_strategy() -> impl Strategy<Value = Vec<FactorRecord>> {
    prop::collection::vec(
        (0usize..4, 0usize..3, "[a-z ]{0,12}", status_strategy(), any::<bool>()),
        0..24,
    )
    .prop_map(|specs| {
        specs
            .into_iter()
            .enumerate()
            .map(|(id, (cat, cause, factor, status, priority))| {
                let category = format!("cat{cat}");
                let cause = format!("cause{cause}");
                FactorRecord::new(id as i64, &category, &cause, &factor)
                    .with_status(status)
                    .priority(priority)
            })
            .collect()
    })
}

fn lay_out(rows: &[FactorRecord], size: f32) -> FishboneLayout {
    layout_fishbone(rows, "P", size, &LayoutOptions::default(), &FixedWidthMeasure::default())
}

fn font_size_strategy() -> impl Strategy<Value = f32> {
    (12u8..=60).prop_map(f32::from)
}

proptest! {
    #[test]
    fn canvas_respects_minimum_floor(
        rows in rows_strategy(),
        size in font_size_strategy(),
        band in any::<bool>(),
    ) {
        let options = LayoutOptions { report_band: band, ..LayoutOptions::default() };
        let layout = layout_fishbone(&rows, "P", size, &options, &FixedWidthMeasure::default());
        prop_assert!(layout.canvas.width >= MIN_CANVAS_WIDTH);
        prop_assert!(layout.canvas.height >= MIN_CANVAS_HEIGHT);
    }
}

proptest! {
    #[test]
    fn every_row_is_laid_out_once(rows in rows_strategy(), size in font_size_strategy()) {
        let layout = lay_out(&rows, size);
        let mut ids: Vec<i64> = layout
            .categories
            .iter()
            .flat_map(|c| &c.causes)
            .flat_map(|c| &c.factors)
            .map(|f| f.record.id)
            .collect();
        ids.sort_unstable();
        let expected: Vec<i64> = (0..rows.len() as i64).collect();
        prop_assert_eq!(ids, expected);
    }
}

proptest! {
    #[test]
    fn anchors_walk_left_from_the_head(rows in rows_strategy(), size in font_size_strategy()) {
        let layout = lay_out(&rows, size);
        let mut previous = layout.head_x;
        for category in &layout.categories {
            prop_assert!(category.anchor.x < previous);
            previous = category.anchor.x;
        }
        prop_assert!(layout.spine_start_x < previous);
    }
}

proptest! {
    #[test]
    fn factor_offsets_strictly_increase(rows in rows_strategy(), size in font_size_strategy()) {
        let layout = lay_out(&rows, size);
        for cause in layout.categories.iter().flat_map(|c| &c.causes) {
            for pair in cause.factors.windows(2) {
                prop_assert!(pair[1].x_offset - pair[0].x_offset >= pair[0].width * 0.7);
            }
            if let Some(last) = cause.factors.last() {
                prop_assert!(cause.total_len > last.x_offset);
            }
        }
    }
}

proptest! {
    #[test]
    fn bones_meet_minimum_and_alternate(rows in rows_strategy(), size in font_size_strategy()) {
        let layout = lay_out(&rows, size);
        for (index, category) in layout.categories.iter().enumerate() {
            prop_assert!(category.bone_length >= layout.config.min_bone_length);
            prop_assert_eq!(category.is_top, index % 2 == 0);
            prop_assert_eq!(category.bone_end.y < layout.spine_y, category.is_top);
        }
    }
}

proptest! {
    #[test]
    fn cause_roots_stay_on_their_bone(rows in rows_strategy(), size in font_size_strategy()) {
        let layout = lay_out(&rows, size);
        for category in &layout.categories {
            let bone = category.anchor.distance(category.bone_end);
            for cause in &category.causes {
                let along = category.anchor.distance(cause.root);
                let rest = cause.root.distance(category.bone_end);
                prop_assert!(along < bone);
                prop_assert!((along + rest - bone).abs() < 0.1);
            }
        }
    }
}
