//! State/side-effect container shared by the screen view models.
//!
//! Every screen keeps one immutable state value that is replaced through
//! `reduce`, plus a queue of one-shot side effects (navigation, toasts).
//! Observers get a `watch::Receiver` for state and the single
//! `UnboundedReceiver` handed out at construction for side effects.

use tokio::sync::{mpsc, watch};

#[derive(Debug)]
pub struct Container<S, E> {
    state: watch::Sender<S>,
    side_effects: mpsc::UnboundedSender<E>,
}

impl<S, E> Container<S, E>
where
    S: Clone + Send + Sync + 'static,
    E: Send + 'static,
{
    pub fn new(initial: S) -> (Self, mpsc::UnboundedReceiver<E>) {
        let (state, _) = watch::channel(initial);
        let (side_effects, receiver) = mpsc::unbounded_channel();
        (Self { state, side_effects }, receiver)
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> S {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<S> {
        self.state.subscribe()
    }

    pub fn reduce(&self, reducer: impl FnOnce(&mut S)) {
        self.state.send_modify(reducer);
    }

    /// Applies a reducer that may decline to change anything.
    ///
    /// Observers are only notified when the reducer returns `Some`.
    pub fn reduce_with<R>(&self, reducer: impl FnOnce(&mut S) -> Option<R>) -> Option<R> {
        let mut outcome = None;
        self.state.send_if_modified(|state| {
            outcome = reducer(state);
            outcome.is_some()
        });
        outcome
    }

    pub fn post_side_effect(&self, effect: E) {
        if self.side_effects.send(effect).is_err() {
            tracing::debug!("side effect dropped, no collector attached");
        }
    }
}
