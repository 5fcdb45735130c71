/*
 * Quesuene - Idle Timer Module
 * Version: 1.0
 * Copyright (c) 2025 Peter Leukanič
 * Under MIT License
 * Feel free to share and modify
 *
 * Auto-close policy for the overlay
 */

use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::time::Duration;
use tracing::info;

pub const DEFAULT_INITIAL_TIMEOUT: Duration = Duration::from_millis(3000);
pub const DEFAULT_ACTIVITY_TIMEOUT: Duration = Duration::from_millis(1500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdleState {
    Unarmed,
    Armed(Duration),
    Closed,
}

/// Single-shot countdown that closes the overlay. The first window is longer
/// than the ones that follow an interaction.
#[derive(Debug, Clone)]
pub struct IdleTimer {
    initial: Duration,
    activity: Duration,
    state: IdleState,
}

impl Default for IdleTimer {
    fn default() -> Self {
        Self::new(DEFAULT_INITIAL_TIMEOUT, DEFAULT_ACTIVITY_TIMEOUT)
    }
}

impl IdleTimer {
    pub fn new(initial: Duration, activity: Duration) -> Self {
        Self {
            initial,
            activity,
            state: IdleState::Unarmed,
        }
    }

    pub fn state(&self) -> IdleState {
        self.state
    }

    pub fn is_closed(&self) -> bool {
        self.state == IdleState::Closed
    }

    /// Arm the countdown for the initial window.
    pub fn start(&mut self) -> Duration {
        self.state = IdleState::Armed(self.initial);
        self.initial
    }

    /// Restart the countdown after an interaction. Returns `None` once closed.
    pub fn record_activity(&mut self) -> Option<Duration> {
        match self.state {
            IdleState::Closed => None,
            _ => {
                self.state = IdleState::Armed(self.activity);
                Some(self.activity)
            }
        }
    }

    pub fn expire(&mut self) {
        self.state = IdleState::Closed;
    }
}

/// One-shot timeouts on the UI event loop.
pub trait Scheduler {
    type Handle: 'static;

    fn schedule(&self, after: Duration, on_expire: Box<dyn FnOnce()>) -> Self::Handle;

    fn cancel(&self, handle: Self::Handle);
}

/// Drives an `IdleTimer` on a `Scheduler` and runs `on_close` exactly once,
/// on expiry or on explicit close.
pub struct IdleSession<S: Scheduler> {
    timer: RefCell<IdleTimer>,
    scheduler: S,
    pending: RefCell<Option<S::Handle>>,
    on_close: Box<dyn Fn()>,
}

impl<S: Scheduler + 'static> IdleSession<S> {
    pub fn new(timer: IdleTimer, scheduler: S, on_close: impl Fn() + 'static) -> Rc<Self> {
        Rc::new(Self {
            timer: RefCell::new(timer),
            scheduler,
            pending: RefCell::new(None),
            on_close: Box::new(on_close),
        })
    }

    pub fn state(&self) -> IdleState {
        self.timer.borrow().state()
    }

    pub fn is_closed(&self) -> bool {
        self.timer.borrow().is_closed()
    }

    pub fn start(self: &Rc<Self>) {
        let duration = self.timer.borrow_mut().start();
        self.arm(duration);
    }

    /// Restart the countdown with the activity window. No-op once closed.
    pub fn record_activity(self: &Rc<Self>) {
        let next = self.timer.borrow_mut().record_activity();
        if let Some(duration) = next {
            self.arm(duration);
        }
    }

    pub fn close(&self) {
        if self.is_closed() {
            return;
        }
        self.shutdown();
        (self.on_close)();
    }

    /// Stop the countdown without running `on_close`.
    pub fn shutdown(&self) {
        self.timer.borrow_mut().expire();
        self.cancel_pending();
    }

    fn arm(self: &Rc<Self>, duration: Duration) {
        self.cancel_pending();

        let weak: Weak<Self> = Rc::downgrade(self);
        let handle = self.scheduler.schedule(
            duration,
            Box::new(move || {
                if let Some(session) = weak.upgrade() {
                    // Already fired, nothing left to cancel
                    session.pending.borrow_mut().take();
                    info!("No activity, closing overlay");
                    session.close();
                }
            }),
        );
        *self.pending.borrow_mut() = Some(handle);
    }

    fn cancel_pending(&self) {
        let pending = self.pending.borrow_mut().take();
        if let Some(handle) = pending {
            self.scheduler.cancel(handle);
        }
    }
}
