//! Undo/redo history over the editor's JSON text
//!
//! `past` and `future` only ever hold committed snapshots. Live typing goes
//! through [`HistoryState::set_draft`], which changes `present` without
//! creating an undo step; the value that was current before the first
//! keystroke is remembered as the draft base, and it is that base (not the
//! half-typed text) that lands in `past` on the next commit.

use std::collections::VecDeque;
use std::mem;

use serde::{Deserialize, Serialize};

use crate::constants::history::MAX_PAST;

/// Undo/redo state for one editor session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryState {
    /// Committed snapshots, oldest first
    past: VecDeque<String>,
    /// Authoritative current text (may be a draft)
    present: String,
    /// Undone snapshots, next redo first
    future: VecDeque<String>,
    /// Last committed text while `present` holds an uncommitted draft
    #[serde(skip)]
    draft_base: Option<String>,
    #[serde(skip, default = "default_limit")]
    limit: usize,
}

fn default_limit() -> usize {
    MAX_PAST
}

impl HistoryState {
    /// Create a history whose present is `initial`
    pub fn new(initial: impl Into<String>) -> Self {
        Self::with_limit(initial, MAX_PAST)
    }

    /// Create a history keeping at most `limit` undo steps
    pub fn with_limit(initial: impl Into<String>, limit: usize) -> Self {
        Self {
            past: VecDeque::new(),
            present: initial.into(),
            future: VecDeque::new(),
            draft_base: None,
            limit: limit.max(1),
        }
    }

    /// Record `value` as a new undo step
    ///
    /// Committing the last committed value again is a no-op (apart from
    /// discarding an outstanding draft). Any redo history is dropped.
    /// Returns whether an undo step was created.
    pub fn commit(&mut self, value: impl Into<String>) -> bool {
        let value = value.into();
        let base = self
            .draft_base
            .take()
            .unwrap_or_else(|| self.present.clone());

        if value == base {
            self.present = value;
            return false;
        }

        self.past.push_back(base);
        while self.past.len() > self.limit {
            self.past.pop_front();
        }
        self.present = value;
        self.future.clear();
        log::debug!("History commit: {} undo steps", self.past.len());
        true
    }

    /// Replace `present` without creating an undo step
    pub fn set_draft(&mut self, value: impl Into<String>) {
        let previous = mem::replace(&mut self.present, value.into());
        if self.draft_base.is_none() {
            self.draft_base = Some(previous);
        }
        if self.draft_base.as_deref() == Some(self.present.as_str()) {
            self.draft_base = None;
        }
    }

    /// Step back one snapshot; an outstanding draft is committed first
    ///
    /// Returns false when there is nothing to undo.
    pub fn undo(&mut self) -> bool {
        self.settle_draft();
        let Some(previous) = self.past.pop_back() else {
            return false;
        };
        let current = mem::replace(&mut self.present, previous);
        self.future.push_front(current);
        log::debug!(
            "History undo: {} undo / {} redo steps",
            self.past.len(),
            self.future.len()
        );
        true
    }

    /// Step forward one snapshot
    ///
    /// Returns false, leaving the state untouched, when there is nothing to
    /// redo. An open draft hides the redo history: committing it will drop
    /// those steps.
    pub fn redo(&mut self) -> bool {
        if !self.can_redo() {
            return false;
        }
        let Some(next) = self.future.pop_front() else {
            return false;
        };
        let current = mem::replace(&mut self.present, next);
        self.past.push_back(current);
        while self.past.len() > self.limit {
            self.past.pop_front();
        }
        log::debug!(
            "History redo: {} undo / {} redo steps",
            self.past.len(),
            self.future.len()
        );
        true
    }

    /// Forget all undo and redo steps, keeping the present text
    pub fn clear(&mut self) {
        self.past.clear();
        self.future.clear();
        self.draft_base = None;
    }

    fn settle_draft(&mut self) {
        if self.draft_base.is_some() {
            let draft = self.present.clone();
            self.commit(draft);
        }
    }

    pub fn present(&self) -> &str {
        &self.present
    }

    /// The last committed text (equal to `present` unless a draft is open)
    pub fn committed(&self) -> &str {
        self.draft_base.as_deref().unwrap_or(&self.present)
    }

    pub fn past(&self) -> &VecDeque<String> {
        &self.past
    }

    pub fn future(&self) -> &VecDeque<String> {
        &self.future
    }

    pub fn has_draft(&self) -> bool {
        self.draft_base.is_some()
    }

    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.future.is_empty() && self.draft_base.is_none()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }
}

impl Default for HistoryState {
    fn default() -> Self {
        Self::new(String::new())
    }
}
