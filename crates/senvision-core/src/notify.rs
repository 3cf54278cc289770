//! User-facing notification sinks.
//!
//! The cart announces changes through a [`Notifier`] ("Panier vidé", ...).
//! [`ToastBoard`] keeps the visible toasts and dismisses each one after a
//! fixed lifetime of virtual time.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use crate::schedule::Scheduler;

/// How long a toast stays on screen
pub const DEFAULT_TOAST_LIFETIME: Duration = Duration::from_secs(3);

/// Fire-and-forget message sink
pub trait Notifier {
    fn notify(&self, message: &str);
}

impl<T: Notifier + ?Sized> Notifier for Arc<T> {
    fn notify(&self, message: &str) {
        (**self).notify(message)
    }
}

/// Discards every message
#[derive(Debug, Default, Clone, Copy)]
pub struct Silent;

impl Notifier for Silent {
    fn notify(&self, _message: &str) {}
}

/// Fired once after a successful checkout (the storefront shows confetti)
pub trait Celebration {
    fn celebrate(&self);
}

impl<T: Celebration + ?Sized> Celebration for Arc<T> {
    fn celebrate(&self) {
        (**self).celebrate()
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoCelebration;

impl Celebration for NoCelebration {
    fn celebrate(&self) {}
}

/// Identifier of a toast on a [`ToastBoard`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ToastId(u64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub id: ToastId,
    pub message: String,
}

#[derive(Debug, Default)]
struct BoardState {
    next_id: u64,
    visible: Vec<Toast>,
    dismissals: Scheduler<ToastId>,
}

/// Stack of auto-dismissing toasts
#[derive(Debug)]
pub struct ToastBoard {
    lifetime: Duration,
    state: Mutex<BoardState>,
}

impl Default for ToastBoard {
    fn default() -> Self {
        Self::new(DEFAULT_TOAST_LIFETIME)
    }
}

impl ToastBoard {
    pub fn new(lifetime: Duration) -> Self {
        Self {
            lifetime,
            state: Mutex::new(BoardState::default()),
        }
    }

    /// Toasts currently on screen, oldest first
    pub fn visible(&self) -> Vec<Toast> {
        self.state.lock().visible.clone()
    }

    /// Advance virtual time, returning the toasts that were dismissed
    pub fn advance(&self, by: Duration) -> Vec<Toast> {
        let mut state = self.state.lock();
        let expired = state.dismissals.advance(by);
        let mut dismissed = Vec::with_capacity(expired.len());
        for id in expired {
            if let Some(pos) = state.visible.iter().position(|t| t.id == id) {
                dismissed.push(state.visible.remove(pos));
            }
        }
        dismissed
    }

    pub fn next_deadline(&self) -> Option<Duration> {
        self.state.lock().dismissals.next_deadline()
    }

    /// Remove every toast and cancel pending dismissals
    pub fn clear(&self) {
        let mut state = self.state.lock();
        state.visible.clear();
        state.dismissals.cancel_all();
    }
}

impl Notifier for ToastBoard {
    fn notify(&self, message: &str) {
        let mut state = self.state.lock();
        let id = ToastId(state.next_id);
        state.next_id += 1;
        state.visible.push(Toast {
            id,
            message: message.to_string(),
        });
        state.dismissals.schedule(self.lifetime, id);
        tracing::debug!(toast = message, "toast shown");
    }
}
