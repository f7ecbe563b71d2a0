#![forbid(unsafe_code)]

//! A deterministic, single-process host.
//!
//! The thread that creates a [`HeadlessHost`] is its foreground thread.
//! Foreground tasks are queued and run by [`HeadlessHost::run_until_idle`];
//! background tasks each get a short-lived thread.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, ThreadId};
use std::time::{Duration, Instant};

use slotgrid_core::event::{ClickArea, ClickEvent, CloseEvent, DragEvent, Modifiers};
use slotgrid_core::{
    Container, ContainerKind, Host, Listener, ListenerId, Scheduler, Task, Viewer,
};

use crate::container::HeadlessContainer;
use crate::stack::Stack;
use crate::viewer::{HeadlessViewer, INVENTORY_SIZE};

/// How long [`HeadlessHost::run_until_idle`] waits before giving up.
pub const IDLE_TIMEOUT: Duration = Duration::from_secs(5);

type Registry = Vec<(ListenerId, Arc<dyn Listener<HeadlessHost>>)>;

/// In-memory [`Host`] with an explicit foreground queue.
pub struct HeadlessHost {
    foreground: ThreadId,
    queue: Mutex<VecDeque<Task>>,
    in_flight: Arc<AtomicUsize>,
    listeners: Mutex<Registry>,
    next_listener: AtomicU64,
    created: AtomicUsize,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

struct InFlight(Arc<AtomicUsize>);

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl Default for HeadlessHost {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessHost {
    /// Create a host whose foreground thread is the calling thread.
    pub fn new() -> Self {
        Self {
            foreground: thread::current().id(),
            queue: Mutex::new(VecDeque::new()),
            in_flight: Arc::new(AtomicUsize::new(0)),
            listeners: Mutex::new(Vec::new()),
            next_listener: AtomicU64::new(1),
            created: AtomicUsize::new(0),
        }
    }

    /// Run queued foreground tasks until no task is queued and no
    /// background task is running.
    ///
    /// Returns `false` if that point was not reached within [`IDLE_TIMEOUT`].
    ///
    /// # Panics
    ///
    /// When called off the foreground thread.
    pub fn run_until_idle(&self) -> bool {
        assert!(
            self.is_foreground(),
            "run_until_idle must be called on the foreground thread"
        );
        let deadline = Instant::now() + IDLE_TIMEOUT;
        loop {
            let next = lock(&self.queue).pop_front();
            if let Some(task) = next {
                task();
                continue;
            }
            // A background task queues its follow-up before it finishes, so
            // a zero count observed first means the queue is final.
            if self.in_flight.load(Ordering::SeqCst) == 0 && lock(&self.queue).is_empty() {
                return true;
            }
            if Instant::now() >= deadline {
                tracing::warn!("headless host did not reach idle before the deadline");
                return false;
            }
            thread::sleep(Duration::from_millis(1));
        }
    }

    /// Number of queued foreground tasks.
    pub fn pending(&self) -> usize {
        lock(&self.queue).len()
    }

    /// Number of registered listeners.
    pub fn listener_count(&self) -> usize {
        lock(&self.listeners).len()
    }

    /// Containers allocated through [`Host::create_container`].
    pub fn containers_created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }

    fn registry(&self) -> Registry {
        lock(&self.listeners).clone()
    }

    /// Deliver a click to every listener and return the resulting event.
    pub fn dispatch_click(&self, viewer: &HeadlessViewer, mut event: ClickEvent) -> ClickEvent {
        for (_, listener) in self.registry() {
            listener.on_click(viewer, &mut event);
        }
        event
    }

    /// Click a raw slot of the viewer's current view.
    ///
    /// Slots below the container size hit the top area, the next
    /// [`INVENTORY_SIZE`] slots hit the personal inventory.
    pub fn click(&self, viewer: &HeadlessViewer, raw_slot: usize) -> ClickEvent {
        self.dispatch_click(viewer, self.event_for(viewer, raw_slot))
    }

    /// Shift-click a raw slot of the viewer's current view.
    pub fn shift_click(&self, viewer: &HeadlessViewer, raw_slot: usize) -> ClickEvent {
        let event = self
            .event_for(viewer, raw_slot)
            .with_modifiers(Modifiers::SHIFT);
        self.dispatch_click(viewer, event)
    }

    fn event_for(&self, viewer: &HeadlessViewer, raw_slot: usize) -> ClickEvent {
        let (view, size) = match viewer.current_view() {
            Some(container) => (container.id(), container.size()),
            None => (slotgrid_core::ContainerId::new(0), 0),
        };
        let (area, slot) = if raw_slot < size {
            (ClickArea::Top, raw_slot)
        } else if raw_slot < size + INVENTORY_SIZE {
            (ClickArea::Bottom, raw_slot - size)
        } else {
            (ClickArea::Outside, raw_slot)
        };
        ClickEvent::new(view, area, slot)
    }

    /// Drag across raw slots of the viewer's current view.
    pub fn drag(&self, viewer: &HeadlessViewer, raw_slots: &[usize]) -> DragEvent {
        let view = viewer
            .current_view()
            .map_or(slotgrid_core::ContainerId::new(0), |container| container.id());
        let mut event = DragEvent::new(view, raw_slots.to_vec());
        for (_, listener) in self.registry() {
            listener.on_drag(viewer, &mut event);
        }
        event
    }

    /// The viewer closes whatever they are looking at.
    pub fn close(&self, viewer: &HeadlessViewer) {
        if let Some(previous) = viewer.replace_view(None) {
            self.detach(viewer, &previous);
        }
    }

    fn detach(&self, viewer: &HeadlessViewer, container: &Arc<HeadlessContainer>) {
        container.remove_viewer(viewer);
        let event = CloseEvent::new(container.id());
        for (_, listener) in self.registry() {
            listener.on_close(viewer, &event);
        }
    }
}

impl Scheduler for HeadlessHost {
    fn is_foreground(&self) -> bool {
        thread::current().id() == self.foreground
    }

    fn run_foreground(&self, task: Task) {
        lock(&self.queue).push_back(task);
    }

    fn run_background(&self, task: Task) {
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        let guard = InFlight(Arc::clone(&self.in_flight));
        thread::spawn(move || {
            let _guard = guard;
            task();
        });
    }
}

impl Host for HeadlessHost {
    type Content = Stack;
    type Viewer = HeadlessViewer;
    type Container = HeadlessContainer;

    fn create_container(&self, kind: &ContainerKind, title: &str) -> Arc<HeadlessContainer> {
        self.created.fetch_add(1, Ordering::SeqCst);
        Arc::new(HeadlessContainer::new(kind.clone(), title))
    }

    fn show(&self, viewer: &HeadlessViewer, container: &Arc<HeadlessContainer>) {
        let previous = viewer.replace_view(Some(Arc::clone(container)));
        container.add_viewer(viewer);
        if let Some(previous) = previous.filter(|previous| !Arc::ptr_eq(previous, container)) {
            self.detach(viewer, &previous);
        }
        tracing::trace!(viewer = viewer.id().get(), container = container.id().get(), "shown");
    }

    fn close_view(&self, viewer: &HeadlessViewer) {
        self.close(viewer);
    }

    fn register(&self, listener: Arc<dyn Listener<HeadlessHost>>) -> ListenerId {
        let id = ListenerId::new(self.next_listener.fetch_add(1, Ordering::Relaxed));
        lock(&self.listeners).push((id, listener));
        id
    }

    fn unregister(&self, id: ListenerId) {
        lock(&self.listeners).retain(|(registered, _)| *registered != id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Counter {
        clicks: AtomicUsize,
        closes: AtomicUsize,
    }

    impl Listener<HeadlessHost> for Counter {
        fn on_click(&self, _viewer: &HeadlessViewer, event: &mut ClickEvent) {
            self.clicks.fetch_add(1, Ordering::SeqCst);
            event.cancel();
        }

        fn on_drag(&self, _viewer: &HeadlessViewer, _event: &mut DragEvent) {}

        fn on_close(&self, _viewer: &HeadlessViewer, _event: &CloseEvent) {
            self.closes.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn foreground_tasks_wait_for_run_until_idle() {
        let host = HeadlessHost::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);
        host.run_foreground(Box::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }));
        assert_eq!(hits.load(Ordering::SeqCst), 0);
        assert!(host.run_until_idle());
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn background_tasks_run_off_the_foreground_thread() {
        let host = Arc::new(HeadlessHost::new());
        let seen = Arc::new(Mutex::new(None));
        let (probe, slot) = (Arc::clone(&host), Arc::clone(&seen));
        host.run_background(Box::new(move || {
            *slot.lock().unwrap() = Some(probe.is_foreground());
        }));
        assert!(host.run_until_idle());
        assert_eq!(*seen.lock().unwrap(), Some(false));
    }

    #[test]
    fn run_foreground_now_is_inline_on_foreground() {
        let host = HeadlessHost::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);
        host.run_foreground_now(Box::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(host.pending(), 0);
    }

    #[test]
    fn show_replacing_a_view_closes_the_old_one() {
        let host = HeadlessHost::new();
        let counter = Arc::new(Counter::default());
        host.register(counter.clone());
        let viewer = HeadlessViewer::new(1);
        let first = host.create_container(&ContainerKind::Chest { rows: 1 }, "a");
        let second = host.create_container(&ContainerKind::Chest { rows: 1 }, "b");

        host.show(&viewer, &first);
        host.show(&viewer, &first);
        assert_eq!(counter.closes.load(Ordering::SeqCst), 0);
        host.show(&viewer, &second);
        assert_eq!(counter.closes.load(Ordering::SeqCst), 1);
        assert!(first.viewers().is_empty());
        assert_eq!(second.viewers(), vec![viewer.clone()]);
    }

    #[test]
    fn click_areas_follow_container_size() {
        let host = HeadlessHost::new();
        let viewer = HeadlessViewer::new(1);
        let chest = host.create_container(&ContainerKind::Chest { rows: 1 }, "a");
        host.show(&viewer, &chest);

        assert_eq!(host.click(&viewer, 3).area, ClickArea::Top);
        let bottom = host.click(&viewer, 9);
        assert_eq!((bottom.area, bottom.slot), (ClickArea::Bottom, 0));
        assert_eq!(host.click(&viewer, 45).area, ClickArea::Outside);
        assert!(host.shift_click(&viewer, 0).is_shift_click());
    }

    #[test]
    fn unregistered_listeners_stop_receiving() {
        let host = HeadlessHost::new();
        let counter = Arc::new(Counter::default());
        let id = host.register(counter.clone());
        let viewer = HeadlessViewer::new(1);
        assert!(host.click(&viewer, 0).is_cancelled());
        host.unregister(id);
        assert!(!host.click(&viewer, 0).is_cancelled());
        assert_eq!(counter.clicks.load(Ordering::SeqCst), 1);
        assert_eq!(host.listener_count(), 0);
    }
}
