#![forbid(unsafe_code)]

//! In-memory viewer with a personal inventory and a message log.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use slotgrid_core::{SlotContent, Viewer, ViewerId};

use crate::container::HeadlessContainer;
use crate::stack::Stack;

/// Slots in a viewer's personal inventory.
pub const INVENTORY_SIZE: usize = 36;

struct ViewerInner {
    id: ViewerId,
    online: AtomicBool,
    messages: Mutex<Vec<String>>,
    inventory: Mutex<Vec<Stack>>,
    view: Mutex<Option<Arc<HeadlessContainer>>>,
}

/// A cheaply clonable viewer handle. Clones share state.
#[derive(Clone)]
pub struct HeadlessViewer {
    inner: Arc<ViewerInner>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl HeadlessViewer {
    /// An online viewer with an empty inventory.
    pub fn new(raw_id: u64) -> Self {
        Self {
            inner: Arc::new(ViewerInner {
                id: ViewerId::new(raw_id),
                online: AtomicBool::new(true),
                messages: Mutex::new(Vec::new()),
                inventory: Mutex::new(vec![Stack::empty(); INVENTORY_SIZE]),
                view: Mutex::new(None),
            }),
        }
    }

    /// Simulate a disconnect or reconnect.
    pub fn set_online(&self, online: bool) {
        self.inner.online.store(online, Ordering::SeqCst);
    }

    /// Every message delivered so far.
    pub fn messages(&self) -> Vec<String> {
        lock(&self.inner.messages).clone()
    }

    /// Put a stack into a personal inventory slot.
    pub fn give(&self, slot: usize, stack: Stack) {
        if let Some(cell) = lock(&self.inner.inventory).get_mut(slot) {
            *cell = stack;
        }
    }

    /// Copy of the personal inventory.
    pub fn inventory(&self) -> Vec<Stack> {
        lock(&self.inner.inventory).clone()
    }

    /// The container currently shown, if any.
    pub fn current_view(&self) -> Option<Arc<HeadlessContainer>> {
        lock(&self.inner.view).clone()
    }

    pub(crate) fn replace_view(
        &self,
        view: Option<Arc<HeadlessContainer>>,
    ) -> Option<Arc<HeadlessContainer>> {
        std::mem::replace(&mut *lock(&self.inner.view), view)
    }
}

impl Viewer for HeadlessViewer {
    type Content = Stack;

    fn id(&self) -> ViewerId {
        self.inner.id
    }

    fn is_online(&self) -> bool {
        self.inner.online.load(Ordering::SeqCst)
    }

    fn send_message(&self, message: &str) {
        lock(&self.inner.messages).push(message.to_owned());
    }

    fn inventory_size(&self) -> usize {
        INVENTORY_SIZE
    }

    fn inventory_item(&self, slot: usize) -> Stack {
        lock(&self.inner.inventory)
            .get(slot)
            .cloned()
            .unwrap_or_default()
    }

    fn clear_inventory_item(&self, slot: usize) {
        self.give(slot, Stack::empty());
    }
}

impl PartialEq for HeadlessViewer {
    fn eq(&self, other: &Self) -> bool {
        self.inner.id == other.inner.id
    }
}

impl Eq for HeadlessViewer {}

impl fmt::Debug for HeadlessViewer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HeadlessViewer")
            .field("id", &self.inner.id)
            .field("online", &self.is_online())
            .finish_non_exhaustive()
    }
}
