use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::classify::{derive_course, ClassifyError};
use crate::model::{Classification, DynamicValue, GroupedClassification};

/// The last successfully derived state for one course: the flat record
/// snapshot it was computed from plus the roll-ups. Replaced wholesale on
/// every successful refresh, never patched.
#[derive(Debug, Clone)]
pub struct PublishedView {
    pub records: Vec<Classification>,
    pub groups: Vec<GroupedClassification>,
    pub final_value: Option<DynamicValue>,
    pub fetched_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct CourseState {
    /// Token of the newest refresh the caller has begun. Commits carrying
    /// any other token arrive from a superseded fetch and are discarded.
    pending: Option<Uuid>,
    published: Option<PublishedView>,
    last_error: Option<ClassifyError>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    Published,
    /// A newer refresh began before this one committed; last-fetch-wins
    /// means the older snapshot is dropped, not merged.
    Superseded,
}

/// In-memory classification store, one state cell per course code.
///
/// The request loop is single-threaded, so the two-phase begin/commit token
/// is the whole concurrency story: overlapping refreshes race at the caller,
/// and the token decides which snapshot is current.
#[derive(Debug, Default)]
pub struct CourseStore {
    courses: HashMap<String, CourseState>,
}

impl CourseStore {
    /// Starts a refresh for `code` and returns its snapshot token,
    /// superseding any refresh still in flight for the same course.
    pub fn begin_refresh(&mut self, code: &str) -> Uuid {
        let token = Uuid::new_v4();
        let state = self.courses.entry(code.to_string()).or_default();
        if let Some(old) = state.pending.replace(token) {
            debug!(course = %code, superseded = %old, "refresh superseded by newer begin");
        }
        token
    }

    /// Commits a fetched snapshot. A stale token is discarded without
    /// touching published state. A structural error in the records fails the
    /// derivation for this course but leaves the previously published view
    /// intact for display.
    pub fn commit_refresh(
        &mut self,
        code: &str,
        token: Uuid,
        records: Vec<Classification>,
    ) -> Result<CommitOutcome, ClassifyError> {
        let state = self.courses.entry(code.to_string()).or_default();
        if state.pending != Some(token) {
            debug!(course = %code, token = %token, "discarding commit for superseded snapshot");
            return Ok(CommitOutcome::Superseded);
        }
        state.pending = None;

        match derive_course(&records) {
            Ok(derived) => {
                state.published = Some(PublishedView {
                    records,
                    groups: derived.groups,
                    final_value: derived.final_value,
                    fetched_at: Utc::now(),
                });
                state.last_error = None;
                Ok(CommitOutcome::Published)
            }
            Err(e) => {
                warn!(course = %code, error = %e, "classification derivation failed");
                state.last_error = Some(e.clone());
                Err(e)
            }
        }
    }

    /// Last successfully published view for `code`, if any.
    pub fn view(&self, code: &str) -> Option<&PublishedView> {
        self.courses.get(code).and_then(|s| s.published.as_ref())
    }

    /// Structural error recorded by the most recent failed commit, cleared
    /// by the next successful one.
    pub fn last_error(&self, code: &str) -> Option<&ClassifyError> {
        self.courses.get(code).and_then(|s| s.last_error.as_ref())
    }
}
