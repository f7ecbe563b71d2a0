//! Property-based invariant tests for panels and the render pipeline.
//!
//! 1. Panel construction validates its dimensions.
//! 2. In-bounds assignment lands at the offset slot; out-of-bounds
//!    assignment fails without mutation.
//! 3. A second identical render writes nothing.
//! 4. A render writes only inside the rendered panel's rectangle and
//!    clears what it leaves unclaimed there.

use std::sync::Arc;

use proptest::prelude::*;
use slotgrid_core::{Container, GRID_COLUMNS, GridError, SlotContent};
use slotgrid_harness::{HeadlessHost, HeadlessViewer, Stack};
use slotgrid_render::Panel;
use slotgrid_runtime::{Menu, MenuConfig};

type P = Panel<HeadlessHost>;

fn blank(width: u16, height: u16) -> P {
    Panel::new(width, height, |_, _| Ok(())).unwrap()
}

// ═════════════════════════════════════════════════════════════════════════
// 1. Construction
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn panel_construction_matches_bounds(w in 0u16..12, h in 0u16..9) {
        let result = P::new(w, h, |_, _| Ok(()));
        let valid = (1..=9).contains(&w) && (1..=6).contains(&h);
        prop_assert_eq!(result.is_ok(), valid);
        if !valid {
            prop_assert_eq!(
                result.unwrap_err(),
                GridError::InvalidDimensions { width: w, height: h }
            );
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 2. Slot assignment
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn assignment_lands_at_offset_slot(
        w in 1u16..=4,
        h in 1u16..=3,
        ox in 0u16..5,
        oy in 0u16..3,
        seed in any::<u16>(),
    ) {
        let root = blank(9, 6);
        let child = blank(w, h);
        root.set_panel(ox, oy, &child).unwrap();
        let (x, y) = (seed % w, (seed / w) % h);
        child.set_icon(x, y, Stack::new("probe")).unwrap();

        let frame = root.flatten();
        let slot = (oy + y) as usize * GRID_COLUMNS as usize + (ox + x) as usize;
        prop_assert_eq!(frame.get(slot), Some(&Stack::new("probe")));
        prop_assert_eq!(frame.len(), 1);
    }
}

proptest! {
    #[test]
    fn out_of_bounds_assignment_does_not_mutate(
        w in 1u16..=9,
        h in 1u16..=6,
        x in 0u16..16,
        y in 0u16..16,
    ) {
        prop_assume!(x >= w || y >= h);
        let panel = blank(w, h);
        let result = panel.set_icon(x, y, Stack::new("stray"));
        prop_assert_eq!(result, Err(GridError::OutOfBounds { x, y, width: w, height: h }));
        prop_assert!(panel.flatten().is_empty());
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 3. Idempotence
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn second_render_writes_nothing(
        rows in 1u16..=6,
        cells in prop::collection::vec((0u16..9, 0u16..6, 1u8..4), 0..20),
    ) {
        let host = Arc::new(HeadlessHost::new());
        let cells = Arc::new(cells);
        let menu = Menu::new(Arc::clone(&host), MenuConfig::chest(rows), move |slots, _| {
            for &(x, y, amount) in cells.iter() {
                if y < slots.height() {
                    slots.set_icon(x, y, Stack::new("ore").with_amount(amount))?;
                }
            }
            Ok(())
        })
        .unwrap();
        let viewer = HeadlessViewer::new(1);

        let first = menu.update(&viewer);
        prop_assert!(first.is_applied());
        let second = menu.update(&viewer);
        prop_assert_eq!(second.writes(), 0);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 4. Write locality
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn child_render_stays_inside_its_rectangle(
        w in 1u16..=4,
        h in 1u16..=3,
        ox in 0u16..6,
        oy in 0u16..4,
    ) {
        let host = Arc::new(HeadlessHost::new());
        let menu = Menu::new(Arc::clone(&host), MenuConfig::chest(6), |slots, _| {
            for y in 0..slots.height() {
                for x in 0..slots.width() {
                    slots.set_icon(x, y, Stack::new("floor"))?;
                }
            }
            Ok(())
        })
        .unwrap();
        let child = Panel::<HeadlessHost>::new(w, h, |slots, _| {
            slots.set_border(Stack::new("wall"));
            Ok(())
        })
        .unwrap();
        menu.root().set_panel(ox, oy, &child).unwrap();
        let viewer = HeadlessViewer::new(1);
        menu.update(&viewer);

        let before = menu.container().snapshot();
        let container = menu.container();
        for slot in 0..container.size() {
            container.set(slot, Stack::new("dust"));
        }
        child.update(&viewer);

        let scope = slotgrid_core::SlotRect::new(ox, oy, w, h);
        for slot in 0..container.size() {
            let (x, y) = slotgrid_core::geometry::slot_position(slot);
            if scope.contains(x, y) {
                // The child repaints its border; cells it leaves unclaimed are cleared.
                let expected = if before[slot].material() == "wall" {
                    before[slot].clone()
                } else {
                    Stack::empty()
                };
                prop_assert_eq!(container.get(slot), expected);
            } else {
                prop_assert_eq!(container.get(slot), Stack::new("dust"));
            }
        }
    }
}
