//! Per-instance lifecycle state and blocking-wait primitives.
//!
//! One lock/condvar pair per socket guards `{lifecycle, init_done, closed,
//! close_requested}`. Every transition and every `is_open()` read goes
//! through this module, so flag reads never race callback-driven writes.
//! All waits are predicate-checked loops bounded by a deadline, tolerant of
//! spurious wakeups.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

// ============================================================================
// Lifecycle
// ============================================================================

/// Socket lifecycle states.
///
/// `Closed` is terminal. `Initializing -> Closed` is a valid transition: the
/// transport may refuse the connection before it ever opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    /// No Initialize command issued yet.
    Uninitialized,
    /// Document loading, transport not yet open.
    Initializing,
    /// Transport connection established.
    Open,
    /// Native close requested, awaiting transport confirmation.
    Closing,
    /// Terminal.
    Closed,
}

impl Lifecycle {
    /// Returns `true` for the terminal state.
    #[inline]
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Closed)
    }

    /// Returns a short label for logging.
    #[inline]
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Uninitialized => "uninitialized",
            Self::Initializing => "initializing",
            Self::Open => "open",
            Self::Closing => "closing",
            Self::Closed => "closed",
        }
    }
}

impl fmt::Display for Lifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ============================================================================
// Shared State
// ============================================================================

/// Flags guarded by the instance lock.
struct StateFlags {
    lifecycle: Lifecycle,
    /// `Opened` has been observed.
    init_done: bool,
    /// `Closed` has been observed or `close()` has committed.
    closed: bool,
    /// A Close command has been enqueued (at most one per instance).
    close_requested: bool,
}

/// The per-instance lock/condvar pair.
pub(crate) struct Shared {
    state: Mutex<StateFlags>,
    cond: Condvar,
}

/// Outcome of the `init()` wait.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum InitWait {
    /// `Opened` or `Closed` was observed.
    Completed,
    /// Neither arrived within the deadline.
    TimedOut,
}

/// Decision taken at the top of `close()`.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum CloseDecision {
    /// Instance already closed; nothing to do.
    AlreadyClosed,
    /// Instance never opened; it is now marked closed, no wait needed.
    ClosedBeforeOpen,
    /// This caller must enqueue the single Close command, then wait.
    RequestClose,
    /// Another caller already enqueued Close; just wait.
    AwaitClose,
}

impl Shared {
    pub(crate) fn new() -> Self {
        Self {
            state: Mutex::new(StateFlags {
                lifecycle: Lifecycle::Uninitialized,
                init_done: false,
                closed: false,
                close_requested: false,
            }),
            cond: Condvar::new(),
        }
    }

    /// `Opened` observed and `Closed` not observed.
    pub(crate) fn is_open(&self) -> bool {
        let st = self.state.lock();
        st.init_done && !st.closed
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    pub(crate) fn lifecycle(&self) -> Lifecycle {
        self.state.lock().lifecycle
    }

    /// Transition taken when the Initialize command is enqueued.
    pub(crate) fn mark_initializing(&self) {
        let mut st = self.state.lock();
        if st.lifecycle == Lifecycle::Uninitialized {
            st.lifecycle = Lifecycle::Initializing;
        }
    }

    /// Records an observed `Opened`.
    ///
    /// Returns `false` for a duplicate or post-close delivery, which the
    /// caller must ignore.
    pub(crate) fn try_mark_opened(&self) -> bool {
        let mut st = self.state.lock();
        if st.closed || st.init_done {
            return false;
        }
        st.init_done = true;
        st.lifecycle = Lifecycle::Open;
        self.cond.notify_all();
        true
    }

    /// Records an observed `Closed` (or a local terminal failure).
    ///
    /// Returns `false` if the instance was already closed.
    pub(crate) fn try_mark_closed(&self) -> bool {
        let mut st = self.state.lock();
        if st.closed {
            return false;
        }
        st.closed = true;
        st.lifecycle = Lifecycle::Closed;
        self.cond.notify_all();
        true
    }

    /// A message survives relay only while the instance is open.
    pub(crate) fn accepts_messages(&self) -> bool {
        let st = self.state.lock();
        st.init_done && !st.closed
    }

    /// Takes the `close()` entry decision atomically.
    pub(crate) fn begin_close(&self) -> CloseDecision {
        let mut st = self.state.lock();
        if st.closed {
            return CloseDecision::AlreadyClosed;
        }
        if !st.init_done {
            st.closed = true;
            st.lifecycle = Lifecycle::Closed;
            self.cond.notify_all();
            return CloseDecision::ClosedBeforeOpen;
        }
        if !st.close_requested {
            st.close_requested = true;
            st.lifecycle = Lifecycle::Closing;
            return CloseDecision::RequestClose;
        }
        CloseDecision::AwaitClose
    }

    /// Blocks until `Opened` or `Closed` is observed, or the deadline passes.
    pub(crate) fn wait_init(&self, timeout: Duration) -> InitWait {
        let deadline = Instant::now() + timeout;
        let mut st = self.state.lock();
        while !(st.init_done || st.closed) {
            let now = Instant::now();
            if now >= deadline {
                return InitWait::TimedOut;
            }
            self.cond.wait_for(&mut st, deadline - now);
        }
        InitWait::Completed
    }

    /// Blocks until `closed`, or the deadline passes. Returns `true` if
    /// closure was observed.
    pub(crate) fn wait_closed(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut st = self.state.lock();
        while !st.closed {
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            self.cond.wait_for(&mut st, deadline - now);
        }
        true
    }
}

// ============================================================================
// Tests
// ============================================================================
