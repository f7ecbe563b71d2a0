#![forbid(unsafe_code)]

//! Panels: rectangular, nestable regions of a slot grid.
//!
//! A [`Panel`] owns a sparse grid of [`Item`]s and a sparse grid of nested
//! panels, both keyed by local `(row, col)`. Items are cleared at the start of
//! every render and repopulated by the panel's [`PanelBehavior`]; nested
//! panels are structural and persist.
//!
//! # Locking
//!
//! Each node carries two mutexes:
//!
//! - `link`: origin, parent back-link, and container binding. A leaf lock:
//!   nothing else is ever acquired while it is held.
//! - `state`: items, children, and click handlers. A render pass holds at
//!   most one `state` lock at a time. Attachment may hold a parent's `state`
//!   while locking its children's, always top-down.
//!
//! # Invariants
//!
//! 1. A node has at most one live parent.
//! 2. A node is never its own ancestor.
//! 3. Every node of one tree shares the same [`Binding`].

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use slotgrid_core::{Dimensions, GridError, Host, Rejection};

use crate::item::{Button, Click, Icon, Item, PlacedItem};
use crate::link::Binding;

static NEXT_PANEL_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique panel identifier. Never 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PanelId(u64);

impl PanelId {
    fn next() -> Self {
        Self(NEXT_PANEL_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw numeric value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// Population hooks of a panel.
pub trait PanelBehavior<H: Host>: Send + Sync + 'static {
    /// Fill the panel for `viewer`. Items were cleared just before the call.
    ///
    /// Returning a [`Rejection`] aborts the whole render and closes the menu
    /// with the rejection's reason.
    ///
    /// Runs under this panel's lock. Re-rendering, retitling, or touching
    /// this panel through its [`Panel`] handle belongs in
    /// [`post_populate`](Self::post_populate).
    fn populate(&self, slots: &mut Slots<'_, H>, viewer: &H::Viewer) -> Result<(), Rejection>;

    /// Called after the render was applied to the container. No lock is held.
    fn post_populate(&self, _panel: &Panel<H>, _viewer: &H::Viewer) {}
}

struct FnBehavior<F>(F);

/// Wrap a populate closure as a [`PanelBehavior`] with no post-populate step.
pub fn from_fn<H, F>(populate: F) -> impl PanelBehavior<H>
where
    H: Host,
    F: Fn(&mut Slots<'_, H>, &H::Viewer) -> Result<(), Rejection> + Send + Sync + 'static,
{
    FnBehavior(populate)
}

impl<H, F> PanelBehavior<H> for FnBehavior<F>
where
    H: Host,
    F: Fn(&mut Slots<'_, H>, &H::Viewer) -> Result<(), Rejection> + Send + Sync + 'static,
{
    fn populate(&self, slots: &mut Slots<'_, H>, viewer: &H::Viewer) -> Result<(), Rejection> {
        (self.0)(slots, viewer)
    }
}

struct Link<H: Host> {
    origin: (u16, u16),
    parent: Weak<PanelNode<H>>,
    root: bool,
    binding: Option<Binding<H>>,
}

pub(crate) struct State<H: Host> {
    pub(crate) items: BTreeMap<(u16, u16), PlacedItem<H>>,
    pub(crate) children: BTreeMap<(u16, u16), Panel<H>>,
    pub(crate) click_handlers: HashMap<usize, PlacedItem<H>>,
}

pub(crate) struct PanelNode<H: Host> {
    id: PanelId,
    pub(crate) dims: Dimensions,
    pub(crate) behavior: Box<dyn PanelBehavior<H>>,
    link: Mutex<Link<H>>,
    state: Mutex<State<H>>,
    /// Held across a whole render pass and every slot edit of this panel.
    render: Mutex<()>,
}

impl<H: Host> PanelNode<H> {
    #[inline]
    fn lock_link(&self) -> MutexGuard<'_, Link<H>> {
        self.link.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[inline]
    pub(crate) fn lock_state(&self) -> MutexGuard<'_, State<H>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Taken before any other lock of this node, never while holding one.
    #[inline]
    pub(crate) fn lock_render(&self) -> MutexGuard<'_, ()> {
        self.render.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn parent(&self) -> Option<Arc<PanelNode<H>>> {
        self.lock_link().parent.upgrade()
    }

    /// Whether `candidate` is `self` or one of its ancestors.
    fn is_self_or_ancestor(self: &Arc<Self>, candidate: &Arc<PanelNode<H>>) -> bool {
        let mut current = Some(Arc::clone(self));
        while let Some(node) = current {
            if Arc::ptr_eq(&node, candidate) {
                return true;
            }
            current = node.parent();
        }
        false
    }
}

/// Shared handle to a panel node.
///
/// Cloning is cheap and yields a handle to the same panel.
pub struct Panel<H: Host> {
    node: Arc<PanelNode<H>>,
}

impl<H: Host> Clone for Panel<H> {
    fn clone(&self) -> Self {
        Self {
            node: Arc::clone(&self.node),
        }
    }
}

impl<H: Host> fmt::Debug for Panel<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Panel")
            .field("id", &self.node.id)
            .field("width", &self.node.dims.width())
            .field("height", &self.node.dims.height())
            .finish_non_exhaustive()
    }
}

impl<H: Host> Panel<H> {
    /// Create a panel populated by a closure.
    ///
    /// # Errors
    ///
    /// `InvalidDimensions` unless `width` is in `1..=9` and `height` in `1..=6`.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let panel = Panel::new(3, 1, |slots, _viewer| {
    ///     slots.set_icon(1, 0, Stack::new("arrow"))?;
    ///     Ok(())
    /// })?;
    /// ```
    pub fn new<F>(width: u16, height: u16, populate: F) -> Result<Self, GridError>
    where
        F: Fn(&mut Slots<'_, H>, &H::Viewer) -> Result<(), Rejection> + Send + Sync + 'static,
    {
        Self::with_behavior(width, height, FnBehavior(populate))
    }

    /// Create a panel with custom population hooks.
    pub fn with_behavior(
        width: u16,
        height: u16,
        behavior: impl PanelBehavior<H>,
    ) -> Result<Self, GridError> {
        Ok(Self::build(
            Dimensions::new(width, height)?,
            Box::new(behavior),
            false,
        ))
    }

    /// Create the root panel of a menu. Roots can never be nested.
    pub fn root(dims: Dimensions, behavior: Box<dyn PanelBehavior<H>>) -> Self {
        Self::build(dims, behavior, true)
    }

    fn build(dims: Dimensions, behavior: Box<dyn PanelBehavior<H>>, root: bool) -> Self {
        let node = PanelNode {
            id: PanelId::next(),
            dims,
            behavior,
            link: Mutex::new(Link {
                origin: (0, 0),
                parent: Weak::new(),
                root,
                binding: None,
            }),
            state: Mutex::new(State {
                items: BTreeMap::new(),
                children: BTreeMap::new(),
                click_handlers: HashMap::new(),
            }),
            render: Mutex::new(()),
        };
        Self {
            node: Arc::new(node),
        }
    }

    pub(crate) fn from_node(node: Arc<PanelNode<H>>) -> Self {
        Self { node }
    }

    #[inline]
    pub(crate) fn node(&self) -> &Arc<PanelNode<H>> {
        &self.node
    }

    /// Identifier of this panel.
    #[inline]
    pub fn id(&self) -> PanelId {
        self.node.id
    }

    /// Validated dimensions.
    #[inline]
    pub fn dimensions(&self) -> Dimensions {
        self.node.dims
    }

    /// Width in slots.
    #[inline]
    pub fn width(&self) -> u16 {
        self.node.dims.width()
    }

    /// Height in slots.
    #[inline]
    pub fn height(&self) -> u16 {
        self.node.dims.height()
    }

    /// Number of local cells.
    #[inline]
    pub fn size(&self) -> usize {
        self.node.dims.area()
    }

    /// Whether both handles point at the same panel.
    #[inline]
    pub fn ptr_eq(&self, other: &Panel<H>) -> bool {
        Arc::ptr_eq(&self.node, &other.node)
    }

    /// Offset within the parent, `(0, 0)` for roots and detached panels.
    pub fn origin(&self) -> (u16, u16) {
        self.node.lock_link().origin
    }

    /// Offset within the absolute grid, accumulated over all ancestors.
    pub fn absolute_origin(&self) -> (u16, u16) {
        let (mut x, mut y, mut parent) = {
            let link = self.node.lock_link();
            (link.origin.0, link.origin.1, link.parent.upgrade())
        };
        while let Some(node) = parent {
            let link = node.lock_link();
            x = x.saturating_add(link.origin.0);
            y = y.saturating_add(link.origin.1);
            parent = link.parent.upgrade();
        }
        (x, y)
    }

    /// The panel this one is nested in.
    pub fn parent(&self) -> Option<Panel<H>> {
        self.node.parent().map(Panel::from_node)
    }

    /// Whether this panel is the root of a menu.
    pub fn is_root(&self) -> bool {
        self.node.lock_link().root
    }

    /// Current container binding, `None` until attached to a menu tree.
    pub fn binding(&self) -> Option<Binding<H>> {
        self.node.lock_link().binding.clone()
    }

    /// The container this panel renders into.
    pub fn container(&self) -> Option<Arc<H::Container>> {
        self.binding().map(|binding| binding.container)
    }

    /// Bind this panel and its whole subtree to a container and menu.
    ///
    /// Menus call this on their root at construction and after every
    /// container recreation; nesting a panel propagates automatically.
    pub fn bind(&self, binding: Binding<H>) {
        self.node.lock_link().binding = Some(binding.clone());
        for child in self.children() {
            child.bind(binding.clone());
        }
    }

    /// Nested panels in `(row, col)` order.
    pub fn children(&self) -> Vec<Panel<H>> {
        self.node.lock_state().children.values().cloned().collect()
    }

    /// Run `f` with exclusive access to this panel's slots.
    ///
    /// Waits for a render pass over this panel to finish first. Must not be
    /// called from inside this panel's own `populate` hook or an item's
    /// `content`; use the [`Slots`] handed to the hook instead.
    pub fn with_slots<R>(&self, f: impl FnOnce(&mut Slots<'_, H>) -> R) -> R {
        let _pass = self.node.lock_render();
        let mut state = self.node.lock_state();
        let mut slots = Slots::new(&self.node, &mut state);
        f(&mut slots)
    }

    /// Place an item at local `(x, y)`.
    pub fn set_item(&self, x: u16, y: u16, item: impl Item<H>) -> Result<(), GridError> {
        self.with_slots(|slots| slots.set_item(x, y, item))
    }

    /// Place a static icon at local `(x, y)`.
    pub fn set_icon(&self, x: u16, y: u16, content: H::Content) -> Result<(), GridError> {
        self.with_slots(|slots| slots.set_icon(x, y, content))
    }

    /// Place a clickable icon at local `(x, y)`.
    pub fn set_button<F>(&self, x: u16, y: u16, content: H::Content, on_click: F) -> Result<(), GridError>
    where
        F: Fn(&mut Click<'_, H>) + Send + Sync + 'static,
    {
        self.with_slots(|slots| slots.set_button(x, y, content, on_click))
    }

    /// Nest `panel` with its top-left corner at local `(x, y)`.
    pub fn set_panel(&self, x: u16, y: u16, panel: &Panel<H>) -> Result<(), GridError> {
        self.with_slots(|slots| slots.set_panel(x, y, panel))
    }

    /// Place an item at a linear local slot.
    pub fn set_item_at(&self, slot: u16, item: impl Item<H>) -> Result<(), GridError> {
        self.with_slots(|slots| slots.set_item_at(slot, item))
    }

    /// Place a static icon at a linear local slot.
    pub fn set_icon_at(&self, slot: u16, content: H::Content) -> Result<(), GridError> {
        self.with_slots(|slots| slots.set_icon_at(slot, content))
    }

    /// Fill the outer ring with an icon.
    pub fn set_border(&self, content: H::Content) {
        self.with_slots(|slots| slots.set_border(content));
    }

    /// Remove every item. Nested panels stay.
    pub fn clear(&self) {
        self.with_slots(|slots| slots.clear());
    }

    /// Content of the item at local `(x, y)`, if any.
    pub fn content_at(&self, x: u16, y: u16) -> Option<H::Content> {
        self.with_slots(|slots| slots.content_at(x, y))
    }
}

/// Locked access to one panel's slots.
///
/// Handed to [`PanelBehavior::populate`] and [`Panel::with_slots`].
pub struct Slots<'a, H: Host> {
    node: &'a Arc<PanelNode<H>>,
    state: &'a mut State<H>,
}

impl<'a, H: Host> Slots<'a, H> {
    pub(crate) fn new(node: &'a Arc<PanelNode<H>>, state: &'a mut State<H>) -> Self {
        Self { node, state }
    }

    /// Width of the panel in slots.
    #[inline]
    pub fn width(&self) -> u16 {
        self.node.dims.width()
    }

    /// Height of the panel in slots.
    #[inline]
    pub fn height(&self) -> u16 {
        self.node.dims.height()
    }

    /// Number of local cells.
    #[inline]
    pub fn size(&self) -> usize {
        self.node.dims.area()
    }

    /// Place an item at local `(x, y)`. Last write wins.
    pub fn set_item(&mut self, x: u16, y: u16, item: impl Item<H>) -> Result<(), GridError> {
        self.set_shared_item(x, y, Arc::new(item))
    }

    /// Place an item that is shared with other slots or panels.
    pub fn set_shared_item(&mut self, x: u16, y: u16, item: Arc<dyn Item<H>>) -> Result<(), GridError> {
        self.node.dims.check(x, y)?;
        self.insert(x, y, item);
        Ok(())
    }

    /// Place a static icon at local `(x, y)`.
    pub fn set_icon(&mut self, x: u16, y: u16, content: H::Content) -> Result<(), GridError> {
        self.set_item(x, y, Icon::new(content))
    }

    /// Place a clickable icon at local `(x, y)`.
    pub fn set_button<F>(&mut self, x: u16, y: u16, content: H::Content, on_click: F) -> Result<(), GridError>
    where
        F: Fn(&mut Click<'_, H>) + Send + Sync + 'static,
    {
        self.set_item(x, y, Button::new(content, on_click))
    }

    /// Place an item at a linear local slot: `(slot % width, slot / width)`.
    pub fn set_item_at(&mut self, slot: u16, item: impl Item<H>) -> Result<(), GridError> {
        let (x, y) = self.node.dims.linear(slot);
        self.set_item(x, y, item)
    }

    /// Place a static icon at a linear local slot.
    pub fn set_icon_at(&mut self, slot: u16, content: H::Content) -> Result<(), GridError> {
        let (x, y) = self.node.dims.linear(slot);
        self.set_icon(x, y, content)
    }

    /// Place a clickable icon at a linear local slot.
    pub fn set_button_at<F>(&mut self, slot: u16, content: H::Content, on_click: F) -> Result<(), GridError>
    where
        F: Fn(&mut Click<'_, H>) + Send + Sync + 'static,
    {
        let (x, y) = self.node.dims.linear(slot);
        self.set_button(x, y, content, on_click)
    }

    /// Nest `panel` with its top-left corner at local `(x, y)`.
    ///
    /// The child inherits this panel's binding, as does its whole subtree.
    /// Nesting a child again under the same parent moves it.
    ///
    /// # Errors
    ///
    /// - `OutOfBounds` when `(x, y)` is outside this panel
    /// - `CyclicAttachment` when `panel` is this panel or an ancestor of it
    /// - `AlreadyAttached` when `panel` has another parent or is a menu root
    pub fn set_panel(&mut self, x: u16, y: u16, panel: &Panel<H>) -> Result<(), GridError> {
        self.node.dims.check(x, y)?;
        let child = panel.node();
        if self.node.is_self_or_ancestor(child) {
            return Err(GridError::CyclicAttachment);
        }
        let binding = self.node.lock_link().binding.clone();
        {
            let mut link = child.lock_link();
            if link.root {
                return Err(GridError::AlreadyAttached);
            }
            let foreign_parent = link
                .parent
                .upgrade()
                .is_some_and(|parent| !Arc::ptr_eq(&parent, self.node));
            if foreign_parent {
                return Err(GridError::AlreadyAttached);
            }
            link.origin = (x, y);
            link.parent = Arc::downgrade(self.node);
        }
        self.state
            .children
            .retain(|_, existing| !Arc::ptr_eq(existing.node(), child));
        self.state.children.insert((y, x), panel.clone());
        if let Some(binding) = binding {
            panel.bind(binding);
        }
        Ok(())
    }

    /// Nest `panel` at a linear local slot.
    pub fn set_panel_at(&mut self, slot: u16, panel: &Panel<H>) -> Result<(), GridError> {
        let (x, y) = self.node.dims.linear(slot);
        self.set_panel(x, y, panel)
    }

    /// Fill every cell of the outer ring with an icon.
    pub fn set_border(&mut self, content: H::Content) {
        let (width, height) = (self.width(), self.height());
        let icon: Arc<dyn Item<H>> = Arc::new(Icon::new(content));
        for y in 0..height {
            for x in 0..width {
                if x == 0 || y == 0 || x == width - 1 || y == height - 1 {
                    self.insert(x, y, Arc::clone(&icon));
                }
            }
        }
    }

    /// Remove every item. Nested panels stay.
    pub fn clear(&mut self) {
        self.state.items.clear();
    }

    /// Content of the item at local `(x, y)`, if any.
    pub fn content_at(&self, x: u16, y: u16) -> Option<H::Content> {
        self.state.items.get(&(y, x)).map(PlacedItem::content)
    }

    /// Number of items currently placed.
    pub fn item_count(&self) -> usize {
        self.state.items.len()
    }

    fn insert(&mut self, x: u16, y: u16, item: Arc<dyn Item<H>>) {
        let placed = PlacedItem::new(item, Arc::downgrade(self.node));
        self.state.items.insert((y, x), placed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotgrid_harness::{HeadlessHost, Stack};

    type P = Panel<HeadlessHost>;

    fn blank(width: u16, height: u16) -> P {
        Panel::new(width, height, |_, _| Ok(())).unwrap()
    }

    #[test]
    fn construction_validates_dimensions() {
        assert!(P::new(9, 6, |_, _| Ok(())).is_ok());
        assert_eq!(
            P::new(0, 1, |_, _| Ok(())).unwrap_err(),
            GridError::InvalidDimensions { width: 0, height: 1 }
        );
        assert_eq!(
            P::new(9, 7, |_, _| Ok(())).unwrap_err(),
            GridError::InvalidDimensions { width: 9, height: 7 }
        );
    }

    #[test]
    fn set_icon_out_of_bounds_leaves_panel_untouched() {
        let panel = blank(3, 2);
        let err = panel.set_icon(3, 0, Stack::new("stone")).unwrap_err();
        assert_eq!(
            err,
            GridError::OutOfBounds {
                x: 3,
                y: 0,
                width: 3,
                height: 2
            }
        );
        assert!(panel.set_icon(0, 2, Stack::new("stone")).is_err());
        assert_eq!(panel.with_slots(|slots| slots.item_count()), 0);
    }

    #[test]
    fn last_write_wins() {
        let panel = blank(2, 2);
        panel.set_icon(1, 1, Stack::new("dirt")).unwrap();
        panel.set_icon(1, 1, Stack::new("gold")).unwrap();
        assert_eq!(panel.content_at(1, 1), Some(Stack::new("gold")));
    }

    #[test]
    fn linear_slot_wraps_on_panel_width() {
        let panel = blank(4, 2);
        panel.set_icon_at(5, Stack::new("glass")).unwrap();
        assert_eq!(panel.content_at(1, 1), Some(Stack::new("glass")));
        assert!(panel.set_icon_at(8, Stack::new("glass")).is_err());
    }

    #[test]
    fn border_fills_only_outer_ring() {
        let panel = blank(4, 3);
        panel.set_border(Stack::new("pane"));
        assert_eq!(panel.with_slots(|slots| slots.item_count()), 10);
        assert_eq!(panel.content_at(1, 1), None);
        assert_eq!(panel.content_at(2, 1), None);
        assert_eq!(panel.content_at(3, 2), Some(Stack::new("pane")));
    }

    #[test]
    fn nesting_records_origin_and_parent() {
        let outer = blank(9, 3);
        let inner = blank(3, 1);
        outer.set_panel(4, 2, &inner).unwrap();
        assert_eq!(inner.origin(), (4, 2));
        assert!(inner.parent().unwrap().ptr_eq(&outer));
        assert_eq!(outer.children().len(), 1);
    }

    #[test]
    fn absolute_origin_accumulates_over_ancestors() {
        let root = blank(9, 6);
        let middle = blank(5, 4);
        let leaf = blank(2, 2);
        root.set_panel(3, 0, &middle).unwrap();
        middle.set_panel(2, 1, &leaf).unwrap();
        assert_eq!(leaf.absolute_origin(), (5, 1));
    }

    #[test]
    fn renesting_under_same_parent_moves_child() {
        let outer = blank(9, 3);
        let inner = blank(2, 1);
        outer.set_panel(0, 0, &inner).unwrap();
        outer.set_panel(5, 1, &inner).unwrap();
        assert_eq!(outer.children().len(), 1);
        assert_eq!(inner.origin(), (5, 1));
    }

    #[test]
    fn second_parent_is_rejected() {
        let first = blank(9, 3);
        let second = blank(9, 3);
        let inner = blank(2, 1);
        first.set_panel(0, 0, &inner).unwrap();
        assert_eq!(second.set_panel(0, 0, &inner), Err(GridError::AlreadyAttached));
    }

    #[test]
    fn cycles_are_rejected() {
        let outer = blank(9, 3);
        let inner = blank(4, 2);
        outer.set_panel(0, 0, &inner).unwrap();
        assert_eq!(outer.set_panel(1, 1, &outer), Err(GridError::CyclicAttachment));
        assert_eq!(inner.set_panel(0, 0, &outer), Err(GridError::CyclicAttachment));
    }

    #[test]
    fn roots_cannot_be_nested() {
        struct Nothing;
        impl PanelBehavior<HeadlessHost> for Nothing {
            fn populate(
                &self,
                _slots: &mut Slots<'_, HeadlessHost>,
                _viewer: &slotgrid_harness::HeadlessViewer,
            ) -> Result<(), Rejection> {
                Ok(())
            }
        }

        let root = P::root(Dimensions::new(9, 1).unwrap(), Box::new(Nothing));
        let other = blank(9, 3);
        assert!(root.is_root());
        assert_eq!(other.set_panel(0, 0, &root), Err(GridError::AlreadyAttached));
    }

    #[test]
    fn clear_keeps_children() {
        let outer = blank(9, 2);
        let inner = blank(1, 1);
        outer.set_icon(0, 0, Stack::new("apple")).unwrap();
        outer.set_panel(4, 1, &inner).unwrap();
        outer.clear();
        assert_eq!(outer.content_at(0, 0), None);
        assert_eq!(outer.children().len(), 1);
    }
}
