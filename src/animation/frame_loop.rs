//! Per-frame callback registry
//!
//! The host calls [`FrameLoop::tick`] once per drawn frame. Every live
//! callback runs exactly once, in registration order, before the frame is
//! drawn. Registrations are owned by [`Subscription`] handles and end when
//! the handle is dropped.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::gfx::scene::SceneGraph;

/// Timing of the frame being produced
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameState {
    /// Seconds since the previous frame, zero on the first one
    pub delta: f32,
    /// Seconds since the clock started
    pub elapsed: f32,
    /// Index of this frame, starting at zero
    pub frame: u64,
}

type Callback = Rc<RefCell<dyn FnMut(&FrameState, &mut SceneGraph)>>;

#[derive(Default)]
struct Registry {
    next_id: u64,
    entries: Vec<(u64, Callback)>,
}

impl Registry {
    fn contains(&self, id: u64) -> bool {
        self.entries.iter().any(|(entry_id, _)| *entry_id == id)
    }

    fn remove(&mut self, id: u64) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry_id, _)| *entry_id != id);
        self.entries.len() != before
    }
}

#[derive(Default)]
pub struct FrameLoop {
    registry: Rc<RefCell<Registry>>,
}

impl FrameLoop {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `callback` to run on every subsequent tick
    ///
    /// Callbacks added during a tick first run on the next one.
    #[must_use = "dropping the subscription unregisters the callback"]
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: FnMut(&FrameState, &mut SceneGraph) + 'static,
    {
        let mut registry = self.registry.borrow_mut();
        let id = registry.next_id;
        registry.next_id += 1;
        let callback: Callback = Rc::new(RefCell::new(callback));
        registry.entries.push((id, callback));
        log::trace!("Frame callback {} subscribed", id);

        Subscription {
            id,
            registry: Rc::downgrade(&self.registry),
        }
    }

    /// Runs every live callback once
    ///
    /// A callback unsubscribed by an earlier callback of the same tick is
    /// not invoked.
    pub fn tick(&self, state: &FrameState, graph: &mut SceneGraph) {
        let snapshot: Vec<(u64, Callback)> = self.registry.borrow().entries.clone();
        for (id, callback) in snapshot {
            if !self.registry.borrow().contains(id) {
                continue;
            }
            match callback.try_borrow_mut() {
                Ok(mut callback) => (&mut *callback)(state, graph),
                Err(_) => log::warn!("Frame callback {} re-entered, skipping", id),
            }
        }
    }

    pub fn len(&self) -> usize {
        self.registry.borrow().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.borrow().entries.is_empty()
    }
}

/// Handle to a registered frame callback
///
/// Unsubscribes when dropped. Outliving the [`FrameLoop`] is fine.
pub struct Subscription {
    id: u64,
    registry: Weak<RefCell<Registry>>,
}

impl Subscription {
    pub fn unsubscribe(self) {
        // Drop does the work
    }

    /// Whether the callback is still registered
    pub fn is_active(&self) -> bool {
        self.registry
            .upgrade()
            .is_some_and(|registry| registry.borrow().contains(self.id))
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            if registry.borrow_mut().remove(self.id) {
                log::trace!("Frame callback {} unsubscribed", self.id);
            }
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("active", &self.is_active())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn state() -> FrameState {
        FrameState {
            delta: 0.016,
            elapsed: 1.0,
            frame: 60,
        }
    }

    #[test]
    fn test_callbacks_run_once_in_order() {
        let frame_loop = FrameLoop::new();
        let order = Rc::new(RefCell::new(Vec::new()));

        let subs: Vec<Subscription> = (0..3)
            .map(|i| {
                let order = order.clone();
                frame_loop.subscribe(move |_, _| order.borrow_mut().push(i))
            })
            .collect();

        frame_loop.tick(&state(), &mut SceneGraph::new());
        assert_eq!(*order.borrow(), vec![0, 1, 2]);
        assert_eq!(frame_loop.len(), subs.len());
    }

    #[test]
    fn test_dropped_subscription_is_never_invoked() {
        let frame_loop = FrameLoop::new();
        let calls = Rc::new(Cell::new(0));

        let calls_in = calls.clone();
        let sub = frame_loop.subscribe(move |_, _| calls_in.set(calls_in.get() + 1));
        let mut graph = SceneGraph::new();

        frame_loop.tick(&state(), &mut graph);
        assert!(sub.is_active());
        drop(sub);
        frame_loop.tick(&state(), &mut graph);
        frame_loop.tick(&state(), &mut graph);

        assert_eq!(calls.get(), 1);
        assert!(frame_loop.is_empty());
    }

    #[test]
    fn test_explicit_unsubscribe() {
        let frame_loop = FrameLoop::new();
        let sub = frame_loop.subscribe(|_, _| {});
        assert_eq!(frame_loop.len(), 1);
        sub.unsubscribe();
        assert!(frame_loop.is_empty());
    }

    #[test]
    fn test_removal_mid_tick_takes_effect_immediately() {
        let frame_loop = FrameLoop::new();
        let victim_calls = Rc::new(Cell::new(0));
        let victim_slot: Rc<RefCell<Option<Subscription>>> = Rc::new(RefCell::new(None));

        let slot = victim_slot.clone();
        let _killer = frame_loop.subscribe(move |_, _| {
            slot.borrow_mut().take();
        });

        let calls = victim_calls.clone();
        *victim_slot.borrow_mut() =
            Some(frame_loop.subscribe(move |_, _| calls.set(calls.get() + 1)));

        frame_loop.tick(&state(), &mut SceneGraph::new());
        assert_eq!(victim_calls.get(), 0);
        assert_eq!(frame_loop.len(), 1);
    }

    #[test]
    fn test_subscribe_during_tick_runs_next_frame() {
        let frame_loop = Rc::new(FrameLoop::new());
        let late_calls = Rc::new(Cell::new(0));
        let late: Rc<RefCell<Vec<Subscription>>> = Rc::new(RefCell::new(Vec::new()));

        let weak_loop = Rc::downgrade(&frame_loop);
        let late_in = late.clone();
        let calls = late_calls.clone();
        let _spawner = frame_loop.subscribe(move |_, _| {
            if let Some(frame_loop) = weak_loop.upgrade() {
                if late_in.borrow().is_empty() {
                    let calls = calls.clone();
                    let sub = frame_loop.subscribe(move |_, _| calls.set(calls.get() + 1));
                    late_in.borrow_mut().push(sub);
                }
            }
        });

        let mut graph = SceneGraph::new();
        frame_loop.tick(&state(), &mut graph);
        assert_eq!(late_calls.get(), 0);
        frame_loop.tick(&state(), &mut graph);
        assert_eq!(late_calls.get(), 1);
    }

    #[test]
    fn test_subscription_outlives_loop() {
        let frame_loop = FrameLoop::new();
        let sub = frame_loop.subscribe(|_, _| {});
        drop(frame_loop);
        assert!(!sub.is_active());
        drop(sub);
    }
}
