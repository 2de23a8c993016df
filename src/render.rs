//! Hand-off of draw commands from the simulation thread to a renderer.
//!
//! The simulation fills a [`DrawQueue`] each frame and publishes it through
//! a shared [`FrameExchange`]. Publishing never waits: if the renderer has
//! not picked up the previous frame, that frame is replaced. The renderer
//! blocks in [`FrameExchange::wait_for_frame`] until something arrives and
//! hands finished queues back for reuse, so three queues circulate in
//! steady state.

use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};

use glam::Vec2;
use log::{debug, trace, warn};

use crate::fixed_array::{CapacityError, FixedSizeArray};

/// Opaque handle to something the renderer knows how to draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DrawableId(pub u32);

/// One scheduled draw call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderElement {
    pub drawable: DrawableId,
    pub position: Vec2,
    /// Lower priorities are drawn first.
    pub priority: i32,
    /// Position is in screen space rather than world space.
    pub camera_relative: bool,
}

/// Fixed-capacity list of draw calls for one frame.
#[derive(Debug)]
pub struct DrawQueue {
    elements: FixedSizeArray<RenderElement>,
}

impl DrawQueue {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            elements: FixedSizeArray::new(capacity),
        }
    }

    /// Appends a draw call.
    ///
    /// # Errors
    /// Returns [`CapacityError`] once the queue is full.
    pub fn push(&mut self, element: RenderElement) -> Result<(), CapacityError> {
        self.elements.add(element)
    }

    /// Orders calls by priority; calls of equal priority keep their order.
    pub fn sort_by_priority(&mut self) {
        self.elements
            .sort_by(false, |a, b| a.priority.cmp(&b.priority));
    }

    #[must_use]
    pub fn elements(&self) -> &[RenderElement] {
        self.elements.as_slice()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.elements.capacity()
    }

    pub fn clear(&mut self) {
        self.elements.clear();
    }
}

/// A published frame of draw calls.
#[derive(Debug)]
pub struct RenderFrame {
    pub number: u64,
    pub queue: DrawQueue,
}

#[derive(Debug, Default)]
struct ExchangeState {
    ready: Option<RenderFrame>,
    spare: Vec<DrawQueue>,
    closed: bool,
}

/// Lock-and-condvar mailbox between simulation and renderer.
#[derive(Debug, Default)]
pub struct FrameExchange {
    state: Mutex<ExchangeState>,
    published: Condvar,
}

impl FrameExchange {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, ExchangeState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Makes `frame` the newest frame and wakes the renderer.
    ///
    /// Returns a queue the caller may reuse: the unconsumed previous frame,
    /// or one the renderer handed back.
    pub fn publish(&self, frame: RenderFrame) -> Option<DrawQueue> {
        let mut state = self.lock();
        if state.closed {
            return Some(frame.queue);
        }
        let replaced = state.ready.replace(frame).map(|stale| {
            trace!("render frame {} dropped unseen", stale.number);
            stale.queue
        });
        let reusable = replaced.or_else(|| state.spare.pop());
        drop(state);
        self.published.notify_all();
        reusable
    }

    /// Blocks until a frame is published, then takes it. Returns `None` once
    /// the exchange is closed and no frame is pending.
    pub fn wait_for_frame(&self) -> Option<RenderFrame> {
        let mut state = self
            .published
            .wait_while(self.lock(), |state| state.ready.is_none() && !state.closed)
            .unwrap_or_else(PoisonError::into_inner);
        state.ready.take()
    }

    /// Takes the pending frame without waiting.
    pub fn try_take_frame(&self) -> Option<RenderFrame> {
        self.lock().ready.take()
    }

    /// Gives a drawn queue back to the simulation.
    pub fn recycle(&self, mut queue: DrawQueue) {
        queue.clear();
        self.lock().spare.push(queue);
    }

    /// Stops the exchange and wakes every waiting renderer.
    pub fn close(&self) {
        self.lock().closed = true;
        self.published.notify_all();
        debug!("render exchange closed");
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }
}

/// Collects the frame's draw calls and publishes them.
#[derive(Debug)]
pub struct RenderSystem {
    queue: DrawQueue,
    exchange: Arc<FrameExchange>,
    frame: u64,
}

impl RenderSystem {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self::with_exchange(capacity, Arc::new(FrameExchange::new()))
    }

    #[must_use]
    pub fn with_exchange(capacity: usize, exchange: Arc<FrameExchange>) -> Self {
        Self {
            queue: DrawQueue::new(capacity),
            exchange,
            frame: 0,
        }
    }

    /// The exchange a renderer should read from.
    #[must_use]
    pub fn exchange(&self) -> Arc<FrameExchange> {
        Arc::clone(&self.exchange)
    }

    /// Adds a draw call to the frame being built. Returns `false` when the
    /// queue is full and the call was dropped.
    pub fn schedule(&mut self, element: RenderElement) -> bool {
        if self.queue.push(element).is_err() {
            warn!("draw queue full; {:?} skipped", element.drawable);
            return false;
        }
        true
    }

    #[must_use]
    pub fn pending(&self) -> &DrawQueue {
        &self.queue
    }

    /// Sorts and publishes the frame being built, then starts a new one.
    /// Returns the published frame number.
    pub fn publish(&mut self) -> u64 {
        self.frame += 1;
        self.queue.sort_by_priority();
        let capacity = self.queue.capacity();
        let next = self
            .exchange
            .publish(RenderFrame {
                number: self.frame,
                queue: std::mem::replace(&mut self.queue, DrawQueue::new(0)),
            })
            .unwrap_or_else(|| DrawQueue::new(capacity));
        self.queue = next;
        self.queue.clear();
        self.frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use static_assertions::assert_impl_all;
    use std::thread;

    assert_impl_all!(FrameExchange: Send, Sync);
    assert_impl_all!(RenderSystem: Send);

    fn element(id: u32, priority: i32) -> RenderElement {
        RenderElement {
            drawable: DrawableId(id),
            position: Vec2::ZERO,
            priority,
            camera_relative: false,
        }
    }

    #[rstest]
    fn published_frames_are_priority_sorted() {
        let mut render = RenderSystem::new(4);
        render.schedule(element(1, 5));
        render.schedule(element(2, -1));
        render.schedule(element(3, 5));
        assert_eq!(render.publish(), 1);
        let frame = render.exchange().try_take_frame().expect("published");
        let order: Vec<u32> = frame.queue.elements().iter().map(|e| e.drawable.0).collect();
        assert_eq!(order, vec![2, 1, 3]);
        assert!(render.pending().is_empty());
    }

    #[rstest]
    fn full_queue_drops_calls() {
        let mut render = RenderSystem::new(1);
        assert!(render.schedule(element(1, 0)));
        assert!(!render.schedule(element(2, 0)));
    }

    #[rstest]
    fn unseen_frames_are_replaced() {
        let mut render = RenderSystem::new(2);
        render.publish();
        render.schedule(element(9, 0));
        render.publish();
        let frame = render.exchange().try_take_frame().expect("published");
        assert_eq!(frame.number, 2);
        assert_eq!(frame.queue.len(), 1);
    }

    #[rstest]
    fn renderer_wakes_on_publish() {
        let mut render = RenderSystem::new(2);
        let exchange = render.exchange();
        let renderer = thread::spawn(move || exchange.wait_for_frame().map(|frame| frame.number));
        render.schedule(element(1, 0));
        render.publish();
        assert_eq!(renderer.join().expect("renderer thread"), Some(1));
    }

    #[rstest]
    fn close_releases_waiting_renderer() {
        let exchange = Arc::new(FrameExchange::new());
        let waiting = Arc::clone(&exchange);
        let renderer = thread::spawn(move || waiting.wait_for_frame().is_none());
        exchange.close();
        assert!(renderer.join().expect("renderer thread"));
    }

    #[rstest]
    fn recycled_queues_come_back() {
        let mut render = RenderSystem::new(2);
        render.publish();
        let exchange = render.exchange();
        let frame = exchange.try_take_frame().expect("published");
        exchange.recycle(frame.queue);
        render.publish();
        assert!(exchange.try_take_frame().is_some());
    }
}
