#![forbid(unsafe_code)]

//! In-memory container with write accounting.

use std::fmt;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use slotgrid_core::{Container, ContainerId, ContainerKind, SlotContent, Viewer};

use crate::stack::Stack;
use crate::viewer::HeadlessViewer;

static NEXT_CONTAINER_ID: AtomicU64 = AtomicU64::new(1);

/// A container backed by a `Vec<Stack>`.
pub struct HeadlessContainer {
    id: ContainerId,
    kind: ContainerKind,
    title: String,
    slots: Mutex<Vec<Stack>>,
    viewers: Mutex<Vec<HeadlessViewer>>,
    writes: AtomicUsize,
}

impl HeadlessContainer {
    /// Allocate an empty container of `kind`.
    pub fn new(kind: ContainerKind, title: impl Into<String>) -> Self {
        let size = kind.slot_count();
        Self {
            id: ContainerId::new(NEXT_CONTAINER_ID.fetch_add(1, Ordering::Relaxed)),
            kind,
            title: title.into(),
            slots: Mutex::new(vec![Stack::empty(); size]),
            viewers: Mutex::new(Vec::new()),
            writes: AtomicUsize::new(0),
        }
    }

    /// The kind this container was created with.
    pub fn kind(&self) -> &ContainerKind {
        &self.kind
    }

    /// Title shown to viewers.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Total `set` calls since creation.
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Copy of every slot.
    pub fn snapshot(&self) -> Vec<Stack> {
        self.lock_slots().clone()
    }

    fn lock_slots(&self) -> MutexGuard<'_, Vec<Stack>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_viewers(&self) -> MutexGuard<'_, Vec<HeadlessViewer>> {
        self.viewers.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn add_viewer(&self, viewer: &HeadlessViewer) {
        let mut viewers = self.lock_viewers();
        if !viewers.iter().any(|v| v.id() == viewer.id()) {
            viewers.push(viewer.clone());
        }
    }

    pub(crate) fn remove_viewer(&self, viewer: &HeadlessViewer) {
        self.lock_viewers().retain(|v| v.id() != viewer.id());
    }
}

impl Container for HeadlessContainer {
    type Content = Stack;
    type Viewer = HeadlessViewer;

    fn id(&self) -> ContainerId {
        self.id
    }

    fn size(&self) -> usize {
        self.lock_slots().len()
    }

    fn get(&self, slot: usize) -> Stack {
        self.lock_slots().get(slot).cloned().unwrap_or_default()
    }

    fn set(&self, slot: usize, content: Stack) {
        if let Some(cell) = self.lock_slots().get_mut(slot) {
            *cell = content;
            self.writes.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn viewers(&self) -> Vec<HeadlessViewer> {
        self.lock_viewers().clone()
    }
}

impl fmt::Debug for HeadlessContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HeadlessContainer")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("title", &self.title)
            .finish_non_exhaustive()
    }
}
