#![forbid(unsafe_code)]

//! The render pipeline: populate, flatten, diff, apply, post-populate.
//!
//! Rendering a panel renders its whole subtree, never its ancestors. Slots
//! the subtree does not claim inside its own rectangle are cleared.
//!
//! Population runs top-down and is aborted by the first [`Rejection`]. The
//! owning menu is then told to close, and nothing is written.

use std::sync::Arc;

use slotgrid_core::geometry::slot_index;
use slotgrid_core::{GRID_COLUMNS, GRID_ROWS, Host, Rejection};

use crate::diff::SlotDiff;
use crate::frame::FlatFrame;
use crate::item::PlacedItem;
use crate::link::Binding;
use crate::panel::{Panel, PanelNode, Slots};

/// Result of a render pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderOutcome {
    /// The container now matches the tree; `writes` slots were changed.
    Applied { writes: usize },
    /// A populate hook rejected; the menu was asked to close.
    Rejected(Rejection),
    /// The panel is not bound to a container yet.
    Detached,
}

impl RenderOutcome {
    /// Slot writes performed, zero unless applied.
    #[inline]
    pub fn writes(&self) -> usize {
        match self {
            Self::Applied { writes } => *writes,
            _ => 0,
        }
    }

    /// Whether the pass was applied.
    #[inline]
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied { .. })
    }

    /// Whether a populate hook rejected.
    #[inline]
    pub fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected(_))
    }

    /// The rejection, if any.
    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            Self::Rejected(rejection) => Some(rejection),
            _ => None,
        }
    }
}

/// How the locked part of a pass ended.
enum Pass<H: Host> {
    Detached,
    Rejected(Binding<H>, Rejection),
    Applied(usize),
}

impl<H: Host> Panel<H> {
    /// Render this panel's subtree for `viewer`.
    ///
    /// Passes over the same panel run one after another, and slot edits
    /// through this handle wait for a running pass. Post-population and the
    /// rejection hand-off run after the pass lock is released.
    pub fn update(&self, viewer: &H::Viewer) -> RenderOutcome {
        let _span = slotgrid_core::debug_span!("panel_render", panel = self.id().get());
        let _guard = _span.enter();

        let pass = {
            let _pass = self.node().lock_render();
            self.run_pass(viewer)
        };

        match pass {
            Pass::Detached => {
                slotgrid_core::debug!("update skipped: panel is not bound to a container");
                RenderOutcome::Detached
            }
            Pass::Rejected(binding, rejection) => {
                slotgrid_core::warn!(reason = rejection.reason(), "population rejected");
                if let Some(menu) = binding.menu() {
                    menu.reject(viewer, rejection.clone());
                }
                RenderOutcome::Rejected(rejection)
            }
            Pass::Applied(writes) => {
                slotgrid_core::debug!(writes, "render pass applied");
                post_populate_tree(self, viewer);
                RenderOutcome::Applied { writes }
            }
        }
    }

    /// Populate, flatten, and apply. Called with the pass lock held.
    fn run_pass(&self, viewer: &H::Viewer) -> Pass<H> {
        let Some(binding) = self.binding() else {
            return Pass::Detached;
        };
        if let Err(rejection) = populate_tree(self.node(), viewer) {
            return Pass::Rejected(binding, rejection);
        }

        let (x, y) = self.absolute_origin();
        let mut frame = FlatFrame::new();
        flatten_into(self.node(), (x, y), &mut frame);

        let region = self.dimensions().at(x, y);
        let diff = SlotDiff::compute(&*binding.container, &frame, region);
        diff.apply(&*binding.container);
        Pass::Applied(diff.len())
    }

    /// Flatten the subtree as it currently stands, without populating.
    ///
    /// Also refreshes click routing for the subtree.
    pub fn flatten(&self) -> FlatFrame<H::Content> {
        let _pass = self.node().lock_render();
        let mut frame = FlatFrame::new();
        flatten_into(self.node(), self.absolute_origin(), &mut frame);
        frame
    }
}

fn populate_tree<H: Host>(node: &Arc<PanelNode<H>>, viewer: &H::Viewer) -> Result<(), Rejection> {
    let children: Vec<Panel<H>> = {
        let mut state = node.lock_state();
        state.items.clear();
        let mut slots = Slots::new(node, &mut *state);
        node.behavior.populate(&mut slots, viewer)?;
        state.children.values().cloned().collect()
    };
    for child in &children {
        populate_tree(child.node(), viewer)?;
    }
    Ok(())
}

/// Paint the subtree rooted at `node` into `frame`, children over parents.
///
/// Cells past the grid edge are dropped individually.
fn flatten_into<H: Host>(
    node: &Arc<PanelNode<H>>,
    origin: (u16, u16),
    frame: &mut FlatFrame<H::Content>,
) {
    let (placed, children) = {
        let mut state = node.lock_state();
        let mut placed: Vec<(usize, PlacedItem<H>)> = Vec::with_capacity(state.items.len());
        for (&(row, col), item) in &state.items {
            let ax = origin.0.saturating_add(col);
            let ay = origin.1.saturating_add(row);
            if ax >= GRID_COLUMNS || ay >= GRID_ROWS {
                continue;
            }
            placed.push((slot_index(ax, ay), item.clone()));
        }
        state.click_handlers.clear();
        for (slot, item) in &placed {
            state.click_handlers.insert(*slot, item.clone());
        }
        let children: Vec<Panel<H>> = state.children.values().cloned().collect();
        (placed, children)
    };

    for (slot, item) in placed {
        frame.set(slot, item.content());
    }
    for child in children {
        let (cx, cy) = child.origin();
        let child_origin = (origin.0.saturating_add(cx), origin.1.saturating_add(cy));
        flatten_into(child.node(), child_origin, frame);
    }
}

fn post_populate_tree<H: Host>(panel: &Panel<H>, viewer: &H::Viewer) {
    panel.node().behavior.post_populate(panel, viewer);
    for child in panel.children() {
        post_populate_tree(&child, viewer);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc::{self, Receiver, Sender};
    use std::sync::{Mutex, Weak};
    use std::thread;
    use std::time::Duration;

    use slotgrid_core::{Container, ContainerKind, SlotContent};
    use slotgrid_harness::{HeadlessContainer, HeadlessHost, HeadlessViewer, Stack};

    use crate::item::Item;
    use crate::link::MenuLink;
    use crate::panel::PanelBehavior;

    type H = HeadlessHost;

    #[derive(Default)]
    struct RecordingMenu {
        rejections: Mutex<Vec<String>>,
    }

    impl MenuLink<H> for RecordingMenu {
        fn reject(&self, _viewer: &HeadlessViewer, rejection: Rejection) {
            self.rejections
                .lock()
                .unwrap()
                .push(rejection.reason().to_owned());
        }

        fn update_menu(&self, _viewer: &HeadlessViewer) -> RenderOutcome {
            RenderOutcome::Detached
        }

        fn set_title(&self, _title: &str) {}

        fn close(&self, _viewer: &HeadlessViewer, _message: Option<&str>) {}
    }

    fn container(rows: u16) -> Arc<HeadlessContainer> {
        Arc::new(HeadlessContainer::new(ContainerKind::Chest { rows }, "test"))
    }

    fn bind(panel: &Panel<H>, container: &Arc<HeadlessContainer>) {
        let menu: Weak<dyn MenuLink<H>> = Weak::<RecordingMenu>::new();
        panel.bind(Binding::new(Arc::clone(container), menu));
    }

    #[test]
    fn update_without_binding_is_detached() {
        let panel = Panel::<H>::new(9, 1, |_, _| Ok(())).unwrap();
        let viewer = HeadlessViewer::new(1);
        assert_eq!(panel.update(&viewer), RenderOutcome::Detached);
    }

    #[test]
    fn update_writes_tagged_content() {
        let panel = Panel::<H>::new(9, 1, |slots, _| {
            slots.set_icon(2, 0, Stack::new("diamond"))?;
            Ok(())
        })
        .unwrap();
        let chest = container(1);
        bind(&panel, &chest);

        let outcome = panel.update(&HeadlessViewer::new(1));
        assert_eq!(outcome.writes(), 1);
        assert_eq!(chest.get(2).material(), "diamond");
        assert!(chest.get(2).is_owned());
    }

    #[test]
    fn second_update_writes_nothing() {
        let panel = Panel::<H>::new(9, 2, |slots, _| {
            slots.set_border(Stack::new("pane"));
            Ok(())
        })
        .unwrap();
        let chest = container(2);
        bind(&panel, &chest);
        let viewer = HeadlessViewer::new(1);

        assert_eq!(panel.update(&viewer).writes(), 18);
        assert_eq!(panel.update(&viewer), RenderOutcome::Applied { writes: 0 });
    }

    #[test]
    fn rejection_reaches_menu_and_writes_nothing() {
        let panel = Panel::<H>::new(9, 1, |slots, _| {
            slots.set_icon(0, 0, Stack::new("paper"))?;
            Err(Rejection::new("no items"))
        })
        .unwrap();
        let chest = container(1);
        let menu = Arc::new(RecordingMenu::default());
        let weak: Weak<dyn MenuLink<H>> = Arc::downgrade(&menu) as Weak<dyn MenuLink<H>>;
        panel.bind(Binding::new(Arc::clone(&chest), weak));

        let outcome = panel.update(&HeadlessViewer::new(1));
        assert_eq!(outcome.rejection().map(Rejection::reason), Some("no items"));
        assert!(chest.get(0).is_empty());
        assert_eq!(*menu.rejections.lock().unwrap(), vec!["no items".to_owned()]);
    }

    #[test]
    fn child_rejection_aborts_whole_pass() {
        let root = Panel::<H>::new(9, 1, |slots, _| {
            slots.set_icon(0, 0, Stack::new("root"))?;
            Ok(())
        })
        .unwrap();
        let child = Panel::<H>::new(1, 1, |_, _| Err(Rejection::new("empty shop"))).unwrap();
        root.set_panel(4, 0, &child).unwrap();
        let chest = container(1);
        bind(&root, &chest);

        assert!(root.update(&HeadlessViewer::new(1)).is_rejected());
        assert!(chest.get(0).is_empty());
    }

    #[test]
    fn child_overrides_parent_at_shared_slot() {
        let root = Panel::<H>::new(9, 1, |slots, _| {
            for x in 0..9 {
                slots.set_icon(x, 0, Stack::new("glass"))?;
            }
            Ok(())
        })
        .unwrap();
        let child = Panel::<H>::new(1, 1, |slots, _| {
            slots.set_icon(0, 0, Stack::new("star"))?;
            Ok(())
        })
        .unwrap();
        root.set_panel(4, 0, &child).unwrap();
        let chest = container(1);
        bind(&root, &chest);

        root.update(&HeadlessViewer::new(1));
        assert_eq!(chest.get(4).material(), "star");
        assert_eq!(chest.get(3).material(), "glass");
    }

    #[test]
    fn child_update_leaves_outside_slots_alone() {
        let root = Panel::<H>::new(9, 1, |slots, _| {
            slots.set_icon(0, 0, Stack::new("root"))?;
            Ok(())
        })
        .unwrap();
        let child = Panel::<H>::new(2, 1, |_, _| Ok(())).unwrap();
        root.set_panel(5, 0, &child).unwrap();
        let chest = container(1);
        bind(&root, &chest);
        let viewer = HeadlessViewer::new(1);

        root.update(&viewer);
        chest.set(5, Stack::new("stray"));
        assert_eq!(child.update(&viewer).writes(), 1);
        assert_eq!(chest.get(0).material(), "root");
        assert!(chest.get(5).is_empty());
    }

    #[test]
    fn nested_content_lands_at_accumulated_origin() {
        let root = Panel::<H>::new(9, 1, |_, _| Ok(())).unwrap();
        let middle = Panel::<H>::new(5, 3, |_, _| Ok(())).unwrap();
        let leaf = Panel::<H>::new(1, 1, |_, _| Ok(())).unwrap();
        root.set_panel(3, 0, &middle).unwrap();
        middle.set_panel(2, 1, &leaf).unwrap();
        leaf.set_icon(0, 0, Stack::new("gem")).unwrap();

        let frame = root.flatten();
        assert_eq!(frame.get(14), Some(&Stack::new("gem")));
        assert_eq!(frame.len(), 1);
    }

    #[test]
    fn cells_past_grid_edge_are_dropped() {
        let root = Panel::<H>::new(9, 6, |_, _| Ok(())).unwrap();
        let wide = Panel::<H>::new(4, 1, |_, _| Ok(())).unwrap();
        root.set_panel(7, 5, &wide).unwrap();
        for x in 0..4 {
            wide.set_icon(x, 0, Stack::new("edge")).unwrap();
        }

        let frame = root.flatten();
        let slots: Vec<usize> = frame.iter().map(|(slot, _)| slot).collect();
        assert_eq!(slots, vec![52, 53]);
    }

    #[test]
    fn post_populate_runs_after_apply() {
        struct Witness {
            seen: Arc<Mutex<Option<bool>>>,
        }

        impl PanelBehavior<H> for Witness {
            fn populate(
                &self,
                slots: &mut Slots<'_, H>,
                _viewer: &HeadlessViewer,
            ) -> Result<(), Rejection> {
                slots.set_icon(0, 0, Stack::new("clock"))?;
                Ok(())
            }

            fn post_populate(&self, panel: &Panel<H>, _viewer: &HeadlessViewer) {
                let written = panel
                    .container()
                    .is_some_and(|container| container.get(0).material() == "clock");
                *self.seen.lock().unwrap() = Some(written);
            }
        }

        let seen = Arc::new(Mutex::new(None));
        let panel = Panel::<H>::with_behavior(
            1,
            1,
            Witness {
                seen: Arc::clone(&seen),
            },
        )
        .unwrap();
        let chest = container(1);
        bind(&panel, &chest);

        panel.update(&HeadlessViewer::new(1));
        assert_eq!(*seen.lock().unwrap(), Some(true));
    }

    /// Blocks in `content` until released, reporting when it got there.
    struct Gated {
        label: &'static str,
        entered: Mutex<Option<Sender<()>>>,
        release: Mutex<Receiver<()>>,
    }

    impl Item<H> for Gated {
        fn content(&self) -> Stack {
            if let Some(entered) = self.entered.lock().unwrap().take() {
                entered.send(()).unwrap();
            }
            let _ = self.release.lock().unwrap().recv();
            Stack::new(self.label)
        }
    }

    /// A one-slot panel whose first pass blocks on `Gated` and later passes
    /// show "new".
    fn gated_panel() -> (Panel<H>, Receiver<()>, Sender<()>) {
        let (entered_tx, entered_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel();
        let gate = Mutex::new(Some(Gated {
            label: "old",
            entered: Mutex::new(Some(entered_tx)),
            release: Mutex::new(release_rx),
        }));
        let panel = Panel::<H>::new(1, 1, move |slots, _| {
            match gate.lock().unwrap().take() {
                Some(gated) => slots.set_item(0, 0, gated)?,
                None => slots.set_icon(0, 0, Stack::new("new"))?,
            }
            Ok(())
        })
        .unwrap();
        (panel, entered_rx, release_tx)
    }

    #[test]
    fn overlapping_passes_apply_in_order() {
        let (panel, entered, release) = gated_panel();
        let chest = container(1);
        bind(&panel, &chest);

        let first = {
            let panel = panel.clone();
            thread::spawn(move || panel.update(&HeadlessViewer::new(1)))
        };
        entered.recv().unwrap();
        let second = {
            let panel = panel.clone();
            thread::spawn(move || panel.update(&HeadlessViewer::new(1)))
        };
        thread::sleep(Duration::from_millis(50));
        assert!(!second.is_finished(), "second pass ran during the first");

        release.send(()).unwrap();
        assert_eq!(first.join().unwrap().writes(), 1);
        assert_eq!(second.join().unwrap().writes(), 1);
        assert_eq!(chest.get(0).material(), "new");
    }

    #[test]
    fn slot_edits_wait_for_a_running_pass() {
        let (panel, entered, release) = gated_panel();
        let chest = container(1);
        bind(&panel, &chest);

        let pass = {
            let panel = panel.clone();
            thread::spawn(move || panel.update(&HeadlessViewer::new(1)))
        };
        entered.recv().unwrap();
        let edit = {
            let panel = panel.clone();
            thread::spawn(move || panel.set_icon(0, 0, Stack::new("late")))
        };
        thread::sleep(Duration::from_millis(50));
        assert!(!edit.is_finished(), "slot edit ran during a pass");

        release.send(()).unwrap();
        pass.join().unwrap();
        edit.join().unwrap().unwrap();
        assert_eq!(chest.get(0).material(), "old");
        assert_eq!(
            panel.content_at(0, 0).map(|c| c.material().to_owned()),
            Some("late".to_owned())
        );
    }

    #[test]
    fn post_populate_may_edit_its_panel() {
        struct Followup;

        impl PanelBehavior<H> for Followup {
            fn populate(
                &self,
                slots: &mut Slots<'_, H>,
                _viewer: &HeadlessViewer,
            ) -> Result<(), Rejection> {
                slots.set_icon(0, 0, Stack::new("first"))?;
                Ok(())
            }

            fn post_populate(&self, panel: &Panel<H>, _viewer: &HeadlessViewer) {
                panel.set_icon(1, 0, Stack::new("extra")).unwrap();
            }
        }

        let panel = Panel::<H>::with_behavior(2, 1, Followup).unwrap();
        let chest = container(1);
        bind(&panel, &chest);

        panel.update(&HeadlessViewer::new(1));
        assert_eq!(
            panel.content_at(1, 0).map(|c| c.material().to_owned()),
            Some("extra".to_owned())
        );
    }
}
