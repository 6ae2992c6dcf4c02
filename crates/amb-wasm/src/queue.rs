// ============================================================================
// Event queue between DOM callbacks and the controller
// Callbacks only enqueue; the queue drains whenever the controller is free
// ============================================================================

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::{Rc, Weak};

use amb_transition::TransitionEvent;

/// Anything that can consume queued events
pub(crate) trait EventSink {
    fn handle(&mut self, event: TransitionEvent);
}

pub(crate) struct EventQueue<S: EventSink> {
    pending: RefCell<VecDeque<TransitionEvent>>,
    target: RefCell<Weak<RefCell<S>>>,
}

impl<S: EventSink> EventQueue<S> {
    pub(crate) fn new() -> Rc<Self> {
        Rc::new(Self {
            pending: RefCell::new(VecDeque::new()),
            target: RefCell::new(Weak::new()),
        })
    }

    pub(crate) fn bind(&self, target: &Rc<RefCell<S>>) {
        *self.target.borrow_mut() = Rc::downgrade(target);
    }

    /// Enqueue and try to deliver right away
    pub(crate) fn push(&self, event: TransitionEvent) {
        self.pending.borrow_mut().push_back(event);
        self.drain();
    }

    /// Deliver in arrival order. If the target is busy (the event came from
    /// inside one of its own calls) the events stay queued for the caller's
    /// next drain.
    pub(crate) fn drain(&self) {
        let Some(target) = self.target.borrow().upgrade() else {
            self.pending.borrow_mut().clear();
            return;
        };
        let Ok(mut target) = target.try_borrow_mut() else {
            return;
        };
        loop {
            let next = self.pending.borrow_mut().pop_front();
            match next {
                Some(event) => target.handle(event),
                None => break,
            }
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.pending.borrow().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Collect(Vec<&'static str>);

    impl EventSink for Collect {
        fn handle(&mut self, event: TransitionEvent) {
            self.0.push(event.name());
        }
    }

    #[test]
    fn test_busy_target_keeps_events() {
        let target = Rc::new(RefCell::new(Collect::default()));
        let queue = EventQueue::new();
        queue.bind(&target);

        {
            let _busy = target.borrow_mut();
            queue.push(TransitionEvent::Gesture);
            queue.push(TransitionEvent::ModalClosed);
            assert_eq!(queue.len(), 2);
        }

        queue.drain();
        assert_eq!(queue.len(), 0);
        assert_eq!(target.borrow().0, vec!["gesture", "modal_closed"]);
    }

    #[test]
    fn test_dropped_target_discards() {
        let queue: Rc<EventQueue<Collect>> = EventQueue::new();
        {
            let target = Rc::new(RefCell::new(Collect::default()));
            queue.bind(&target);
        }
        queue.push(TransitionEvent::Gesture);
        assert_eq!(queue.len(), 0);
    }
}
