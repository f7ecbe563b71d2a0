#![forbid(unsafe_code)]

//! The menu: a root panel bound to exactly one host container.
//!
//! # Lifecycle
//!
//! ```text
//! Constructed --open--> Open --close event / rejection--> Closed
//! ```
//!
//! `Open` loops on itself through `update` and `set_title`. `Closed` is
//! terminal; a closed menu is never reopened.
//!
//! # Threads
//!
//! `open` renders on the host's background context and shows the container
//! on the foreground context. Container recreation happens on the foreground
//! context; a caller on any other thread blocks until it was applied.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use slotgrid_core::event::ClickEvent;
use slotgrid_core::{
    Container, ContainerKind, Dimensions, GRID_COLUMNS, Host, ListenerId, Rejection, SlotContent,
    Viewer,
};
use slotgrid_render::{Binding, MenuLink, Panel, PanelBehavior, RenderOutcome, Slots, from_fn};

use crate::config::MenuConfig;
use crate::error::MenuError;
use crate::listener::MenuListener;
use crate::rendezvous::{OpenOutcome, Opening, oneshot};

/// Menu lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lifecycle {
    /// Built, container allocated, not shown yet.
    Constructed,
    /// Shown and receiving events.
    Open,
    /// Terminal.
    Closed,
}

impl fmt::Display for Lifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Constructed => "constructed",
            Self::Open => "open",
            Self::Closed => "closed",
        };
        f.write_str(name)
    }
}

type CloseHook<H> = Box<dyn Fn(&<H as Host>::Viewer) + Send + Sync>;
type BottomClickHook<H> = Box<dyn Fn(&<H as Host>::Viewer, &mut ClickEvent) + Send + Sync>;

pub(crate) struct Hooks<H: Host> {
    pub(crate) on_close: Option<CloseHook<H>>,
    pub(crate) on_bottom_click: Option<BottomClickHook<H>>,
}

pub(crate) struct MenuState<H: Host> {
    pub(crate) lifecycle: Lifecycle,
    pub(crate) opening: bool,
    pub(crate) title: String,
    pub(crate) container: Arc<H::Container>,
    pub(crate) listener: Option<ListenerId>,
}

pub(crate) struct MenuShared<H: Host> {
    pub(crate) host: Arc<H>,
    pub(crate) config: MenuConfig,
    pub(crate) root: Panel<H>,
    pub(crate) hooks: Hooks<H>,
    state: Mutex<MenuState<H>>,
    this: Weak<MenuShared<H>>,
}

/// A menu handle. Cloning yields another handle to the same menu.
pub struct Menu<H: Host> {
    shared: Arc<MenuShared<H>>,
}

impl<H: Host> Clone for Menu<H> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<H: Host> fmt::Debug for Menu<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.shared.lock_state();
        f.debug_struct("Menu")
            .field("kind", &self.shared.config.kind)
            .field("title", &state.title)
            .field("lifecycle", &state.lifecycle)
            .field("container", &state.container.id())
            .finish_non_exhaustive()
    }
}

/// Builder for [`Menu`].
pub struct MenuBuilder<H: Host> {
    host: Arc<H>,
    config: MenuConfig,
    behavior: Option<Box<dyn PanelBehavior<H>>>,
    hooks: Hooks<H>,
}

impl<H: Host> MenuBuilder<H> {
    /// Populate the root panel with a closure.
    #[must_use]
    pub fn populate<F>(mut self, populate: F) -> Self
    where
        F: Fn(&mut Slots<'_, H>, &H::Viewer) -> Result<(), Rejection> + Send + Sync + 'static,
    {
        self.behavior = Some(Box::new(from_fn(populate)));
        self
    }

    /// Populate the root panel with custom hooks.
    #[must_use]
    pub fn behavior(mut self, behavior: impl PanelBehavior<H>) -> Self {
        self.behavior = Some(Box::new(behavior));
        self
    }

    /// Run `hook` once the menu closed for a viewer.
    #[must_use]
    pub fn on_close<F>(mut self, hook: F) -> Self
    where
        F: Fn(&H::Viewer) + Send + Sync + 'static,
    {
        self.hooks.on_close = Some(Box::new(hook));
        self
    }

    /// Receive clicks in the viewer's own inventory.
    ///
    /// Only called when bottom interaction is enabled in the config.
    #[must_use]
    pub fn on_bottom_click<F>(mut self, hook: F) -> Self
    where
        F: Fn(&H::Viewer, &mut ClickEvent) + Send + Sync + 'static,
    {
        self.hooks.on_bottom_click = Some(Box::new(hook));
        self
    }

    /// Allocate the container and build the menu.
    ///
    /// # Errors
    ///
    /// `MenuError::Grid` when the container kind needs more than six rows
    /// or none at all.
    pub fn build(self) -> Result<Menu<H>, MenuError> {
        let dims = Dimensions::new(GRID_COLUMNS, root_rows(&self.config))?;
        let behavior: Box<dyn PanelBehavior<H>> = match self.behavior {
            Some(behavior) => behavior,
            None => Box::new(from_fn(|_, _| Ok(()))),
        };
        let root = Panel::root(dims, behavior);
        let container = self
            .host
            .create_container(&self.config.kind, &self.config.title);

        let shared = Arc::new_cyclic(|this: &Weak<MenuShared<H>>| {
            let link: Weak<dyn MenuLink<H>> = this.clone();
            root.bind(Binding::new(Arc::clone(&container), link));
            MenuShared {
                host: self.host,
                root,
                hooks: self.hooks,
                state: Mutex::new(MenuState {
                    lifecycle: Lifecycle::Constructed,
                    opening: false,
                    title: self.config.title.clone(),
                    container,
                    listener: None,
                }),
                config: self.config,
                this: this.clone(),
            }
        });
        tracing::debug!(kind = %shared.config.kind, "menu constructed");
        Ok(Menu { shared })
    }
}

fn root_rows(config: &MenuConfig) -> u16 {
    match config.kind {
        ContainerKind::Chest { rows } => rows,
        ContainerKind::Typed { .. } => config.kind.rows(),
    }
}

impl<H: Host> Menu<H> {
    /// Start building a menu on `host`.
    pub fn builder(host: Arc<H>, config: MenuConfig) -> MenuBuilder<H> {
        MenuBuilder {
            host,
            config,
            behavior: None,
            hooks: Hooks {
                on_close: None,
                on_bottom_click: None,
            },
        }
    }

    /// Build a menu whose root is populated by `populate`.
    pub fn new<F>(host: Arc<H>, config: MenuConfig, populate: F) -> Result<Self, MenuError>
    where
        F: Fn(&mut Slots<'_, H>, &H::Viewer) -> Result<(), Rejection> + Send + Sync + 'static,
    {
        Self::builder(host, config).populate(populate).build()
    }

    /// Render for `viewer` and show the container.
    ///
    /// The first render runs on the background context; showing and event
    /// registration follow on the foreground context. Off the foreground the
    /// call blocks until that step ran and returns a resolved handle. On the
    /// foreground it returns at once.
    ///
    /// # Errors
    ///
    /// `MenuError::AlreadyOpened` unless the menu is `Constructed` and not
    /// already opening.
    pub fn open(&self, viewer: &H::Viewer) -> Result<Opening, MenuError> {
        {
            let mut state = self.shared.lock_state();
            if state.lifecycle != Lifecycle::Constructed || state.opening {
                return Err(MenuError::AlreadyOpened {
                    state: state.lifecycle,
                });
            }
            state.opening = true;
        }
        tracing::debug!(viewer = viewer.id().get(), "menu opening");

        let (mut opening, signal) = Opening::channel();
        let shared = Arc::clone(&self.shared);
        let viewer = viewer.clone();
        self.shared.host.run_background(Box::new(move || {
            if let RenderOutcome::Rejected(rejection) = shared.root.update(&viewer) {
                shared.lock_state().opening = false;
                signal.send(OpenOutcome::Rejected(rejection));
                return;
            }
            let host = Arc::clone(&shared.host);
            host.run_foreground(Box::new(move || {
                let outcome = shared.finish_open(&viewer);
                signal.send(outcome);
            }));
        }));
        if !self.shared.host.is_foreground() {
            opening.settle();
        }
        Ok(opening)
    }

    /// Re-render the whole tree for `viewer`.
    pub fn update(&self, viewer: &H::Viewer) -> RenderOutcome {
        self.shared.root.update(viewer)
    }

    /// Change the title. A different title recreates the container.
    pub fn set_title(&self, title: &str) {
        self.shared.request_title(title);
    }

    /// Current title.
    pub fn title(&self) -> String {
        self.shared.lock_state().title.clone()
    }

    /// Current lifecycle state.
    pub fn lifecycle(&self) -> Lifecycle {
        self.shared.lock_state().lifecycle
    }

    /// Whether the menu is `Open`.
    pub fn is_open(&self) -> bool {
        self.lifecycle() == Lifecycle::Open
    }

    /// The container currently bound to the tree.
    pub fn container(&self) -> Arc<H::Container> {
        Arc::clone(&self.shared.lock_state().container)
    }

    /// Root panel. Nest child panels here.
    pub fn root(&self) -> &Panel<H> {
        &self.shared.root
    }

    /// The configuration the menu was built with.
    pub fn config(&self) -> &MenuConfig {
        &self.shared.config
    }

    /// Close the view for `viewer` on the next foreground tick.
    pub fn close(&self, viewer: &H::Viewer) {
        self.shared.schedule_close(viewer, None);
    }

    /// Close the view for `viewer` and send them `message`.
    pub fn close_with(&self, viewer: &H::Viewer, message: &str) {
        self.shared.schedule_close(viewer, Some(message));
    }
}

impl<H: Host> MenuShared<H> {
    pub(crate) fn lock_state(&self) -> MutexGuard<'_, MenuState<H>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn link(&self) -> Weak<dyn MenuLink<H>> {
        self.this.clone()
    }

    fn finish_open(&self, viewer: &H::Viewer) -> OpenOutcome {
        let container = {
            let mut state = self.lock_state();
            state.opening = false;
            if state.lifecycle != Lifecycle::Constructed {
                return OpenOutcome::Abandoned;
            }
            Arc::clone(&state.container)
        };

        self.host.show(viewer, &container);
        let listener = self.host.register(Arc::new(MenuListener::new(self.this.clone())));
        {
            let mut state = self.lock_state();
            state.listener = Some(listener);
            state.lifecycle = Lifecycle::Open;
        }
        tracing::debug!(
            viewer = viewer.id().get(),
            container = container.id().get(),
            "menu open"
        );
        OpenOutcome::Opened
    }

    /// Open→Closed: deregister, fire `on_close`, sweep owned items.
    pub(crate) fn handle_close(&self, viewer: &H::Viewer) {
        let listener = {
            let mut state = self.lock_state();
            if state.lifecycle == Lifecycle::Closed {
                return;
            }
            state.lifecycle = Lifecycle::Closed;
            state.opening = false;
            state.listener.take()
        };
        if let Some(id) = listener {
            self.host.unregister(id);
        }
        tracing::debug!(viewer = viewer.id().get(), "menu closed");

        if let Some(hook) = &self.hooks.on_close {
            hook(viewer);
        }
        if self.config.sweep_on_close && viewer.is_online() {
            sweep_owned(viewer);
        }
    }

    fn apply_rejection(&self, viewer: &H::Viewer, rejection: &Rejection) {
        let was_open = match self.lock_state().lifecycle {
            Lifecycle::Closed => return,
            lifecycle => lifecycle == Lifecycle::Open,
        };
        self.handle_close(viewer);
        if was_open {
            self.host.close_view(viewer);
        }
        viewer.send_message(rejection.reason());
    }

    fn request_title(&self, title: &str) {
        if self.lock_state().title == title {
            return;
        }
        if self.host.is_foreground() {
            self.recreate(title);
            return;
        }
        let (signal, done) = oneshot::<()>();
        let this = self.this.clone();
        let title = title.to_owned();
        self.host.run_foreground(Box::new(move || {
            if let Some(menu) = this.upgrade() {
                menu.recreate(&title);
            }
            signal.send(());
        }));
        // Disconnected means the task was dropped unrun; nothing to wait for.
        let _ = done.recv();
    }

    /// Swap in a container with the new title, keeping content and viewers.
    fn recreate(&self, title: &str) {
        let mut state = self.lock_state();
        if state.title == title {
            return;
        }
        state.title = title.to_owned();
        if state.lifecycle == Lifecycle::Closed {
            return;
        }
        let fresh = self.host.create_container(&self.config.kind, title);
        let viewers = {
            let old = Arc::clone(&state.container);
            let mut copied = 0usize;
            for slot in 0..old.size().min(fresh.size()) {
                let content = old.get(slot);
                if !content.is_empty() {
                    fresh.set(slot, content);
                    copied += 1;
                }
            }
            self.root.bind(Binding::new(Arc::clone(&fresh), self.link()));
            state.container = Arc::clone(&fresh);
            tracing::info!(
                from = old.id().get(),
                to = fresh.id().get(),
                copied,
                "menu container recreated"
            );
            old.viewers()
        };
        drop(state);
        for viewer in &viewers {
            self.host.show(viewer, &fresh);
        }
    }

    fn schedule_close(&self, viewer: &H::Viewer, message: Option<&str>) {
        let host = Arc::clone(&self.host);
        let viewer = viewer.clone();
        let message = message.map(str::to_owned);
        self.host.run_foreground(Box::new(move || {
            host.close_view(&viewer);
            if let Some(message) = message {
                viewer.send_message(&message);
            }
        }));
    }
}

fn sweep_owned<V: Viewer>(viewer: &V) {
    let mut removed = 0usize;
    for slot in 0..viewer.inventory_size() {
        let item = viewer.inventory_item(slot);
        if !item.is_empty() && item.is_owned() {
            viewer.clear_inventory_item(slot);
            removed += 1;
        }
    }
    if removed > 0 {
        tracing::debug!(viewer = viewer.id().get(), removed, "swept menu items");
    }
}

impl<H: Host> MenuLink<H> for MenuShared<H> {
    fn reject(&self, viewer: &H::Viewer, rejection: Rejection) {
        let this = self.this.clone();
        let viewer = viewer.clone();
        self.host.run_foreground_now(Box::new(move || {
            if let Some(menu) = this.upgrade() {
                menu.apply_rejection(&viewer, &rejection);
            }
        }));
    }

    fn update_menu(&self, viewer: &H::Viewer) -> RenderOutcome {
        self.root.update(viewer)
    }

    fn set_title(&self, title: &str) {
        self.request_title(title);
    }

    fn close(&self, viewer: &H::Viewer, message: Option<&str>) {
        self.schedule_close(viewer, message);
    }
}
