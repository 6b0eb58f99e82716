//! Editor text buffer with debounced and immediate commits
//!
//! Wraps a [`HistoryState`] with the two public write paths of the editor:
//!
//! - [`EditBuffer::set_debounced`] for keystrokes: the text updates at once,
//!   and a single pending commit is (re)scheduled for after the quiet period.
//! - [`EditBuffer::set_immediate`] for programmatic loads (templates,
//!   generated widgets, reorders): one undo step, right now.
//!
//! The pending commit is an owned slot holding at most one deadline. The
//! host drives it by calling [`EditBuffer::poll`] with the current time,
//! typically after sleeping until [`EditBuffer::next_deadline`].

use std::time::{Duration, Instant};

use crate::constants::history::{DEBOUNCE_MS, MAX_PAST};
use crate::history::HistoryState;

#[derive(Debug, Clone)]
struct PendingCommit {
    value: String,
    due: Instant,
}

/// The editor's JSON text with undo/redo
#[derive(Debug, Clone)]
pub struct EditBuffer {
    history: HistoryState,
    pending: Option<PendingCommit>,
    quiet_period: Duration,
}

impl EditBuffer {
    /// Create a buffer with the default quiet period and history limit
    pub fn new(initial: impl Into<String>) -> Self {
        Self::with_options(initial, Duration::from_millis(DEBOUNCE_MS), MAX_PAST)
    }

    pub fn with_options(initial: impl Into<String>, quiet_period: Duration, limit: usize) -> Self {
        Self {
            history: HistoryState::with_limit(initial, limit),
            pending: None,
            quiet_period,
        }
    }

    /// Update the text now and schedule a commit after the quiet period
    ///
    /// Any previously scheduled commit is replaced, never stacked.
    pub fn set_debounced(&mut self, value: impl Into<String>, now: Instant) {
        let value = value.into();
        self.history.set_draft(value.clone());
        self.pending = Some(PendingCommit {
            value,
            due: now + self.quiet_period,
        });
    }

    /// Commit `value` as its own undo step, cancelling any pending commit
    pub fn set_immediate(&mut self, value: impl Into<String>) -> bool {
        self.pending = None;
        self.history.commit(value)
    }

    /// Fire the pending commit if its quiet period has elapsed
    ///
    /// Returns true if an undo step was created.
    pub fn poll(&mut self, now: Instant) -> bool {
        if self.pending.as_ref().is_some_and(|p| p.due <= now) {
            self.fire_pending()
        } else {
            false
        }
    }

    /// Fire the pending commit regardless of its deadline
    pub fn flush(&mut self) -> bool {
        if self.pending.is_some() {
            self.fire_pending()
        } else {
            false
        }
    }

    fn fire_pending(&mut self) -> bool {
        let Some(pending) = self.pending.take() else {
            return false;
        };
        if pending.value == self.history.committed() {
            return false;
        }
        self.history.commit(pending.value)
    }

    /// When the pending commit is due, if one is scheduled
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|p| p.due)
    }

    /// Undo one step; a no-op that keeps any pending commit when unavailable
    pub fn undo(&mut self) -> bool {
        if !self.can_undo() {
            return false;
        }
        self.pending = None;
        self.history.undo()
    }

    /// Redo one step; a no-op that keeps any pending commit when unavailable
    pub fn redo(&mut self) -> bool {
        if !self.can_redo() {
            return false;
        }
        self.pending = None;
        self.history.redo()
    }

    pub fn clear_history(&mut self) {
        self.pending = None;
        self.history.clear();
    }

    /// The current editor text
    pub fn text(&self) -> &str {
        self.history.present()
    }

    pub fn history(&self) -> &HistoryState {
        &self.history
    }

    /// Undo is offered while there are past steps or an uncommitted draft
    pub fn can_undo(&self) -> bool {
        self.history.can_undo() || self.history.has_draft()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}
