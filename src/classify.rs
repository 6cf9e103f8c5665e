use std::collections::{HashMap, HashSet};

use thiserror::Error;

use crate::model::{Classification, DynamicValue, GroupedClassification, FINAL_SCORE, POINTS_TOTAL};

/// Structural errors in a course's classification data. Either one fails the
/// whole derivation pass for the affected course; there is no partial output.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClassifyError {
    #[error("classification {id} references parent {parent_id} which is not in the record set")]
    DanglingReference { id: i64, parent_id: i64 },
    #[error("classification {id} is part of a parent cycle")]
    CycleDetected { id: i64 },
}

impl ClassifyError {
    /// Stable wire code for the IPC error envelope.
    pub fn code(&self) -> &'static str {
        match self {
            ClassifyError::DanglingReference { .. } => "dangling_reference",
            ClassifyError::CycleDetected { .. } => "cycle_detected",
        }
    }
}

/// Everything derived from one course's flat record list in a single pass.
#[derive(Debug, Clone, PartialEq)]
pub struct CourseDerivation {
    pub groups: Vec<GroupedClassification>,
    pub final_value: Option<DynamicValue>,
}

/// Follows `parent_id` links from `start` until a root is reached and returns
/// the root's id. Bounded: a visited set turns any loop into `CycleDetected`
/// instead of an unbounded walk.
pub fn resolve_root(
    start: &Classification,
    by_id: &HashMap<i64, &Classification>,
) -> Result<i64, ClassifyError> {
    let mut current = start;
    let mut visited: HashSet<i64> = HashSet::new();
    visited.insert(current.id);

    while let Some(parent_id) = current.parent_id {
        let Some(parent) = by_id.get(&parent_id) else {
            return Err(ClassifyError::DanglingReference {
                id: current.id,
                parent_id,
            });
        };
        if !visited.insert(parent.id) {
            return Err(ClassifyError::CycleDetected { id: start.id });
        }
        current = parent;
    }

    Ok(current.id)
}

/// Groups a flat classification list by root classification.
///
/// Groups appear in the order their roots first appear in the input; within a
/// group, items keep input order. An empty input is the valid "not yet
/// graded" state and produces an empty output.
pub fn group_classifications(
    classifications: &[Classification],
) -> Result<Vec<GroupedClassification>, ClassifyError> {
    let by_id: HashMap<i64, &Classification> =
        classifications.iter().map(|c| (c.id, c)).collect();

    let mut groups: Vec<GroupedClassification> = Vec::new();
    let mut group_index: HashMap<i64, usize> = HashMap::new();
    for root in classifications.iter().filter(|c| c.parent_id.is_none()) {
        group_index.insert(root.id, groups.len());
        groups.push(GroupedClassification::from_root(root));
    }

    for child in classifications.iter().filter(|c| c.parent_id.is_some()) {
        let root_id = resolve_root(child, &by_id)?;
        // resolve_root only returns ids of records with no parent, all of
        // which were indexed above. A miss here means the record set changed
        // shape mid-pass, which the map construction rules out; surface it as
        // a dangling reference rather than indexing unchecked.
        let Some(&idx) = group_index.get(&root_id) else {
            return Err(ClassifyError::DanglingReference {
                id: child.id,
                parent_id: child.parent_id.unwrap_or(root_id),
            });
        };
        groups[idx].items.push(child.clone());
    }

    Ok(groups)
}

/// Selects the course-level summary value from the flat record list: the
/// first `POINTS_TOTAL` record carrying a value wins, then the first
/// `FINAL_SCORE`, otherwise the course simply has no derived value yet.
pub fn derive_final_value(classifications: &[Classification]) -> Option<DynamicValue> {
    let first_valued = |kind: &str| {
        classifications
            .iter()
            .find(|c| c.kind == kind && c.value.is_some())
            .and_then(|c| c.value.clone())
    };
    first_valued(POINTS_TOTAL).or_else(|| first_valued(FINAL_SCORE))
}

/// Full derivation pass over one course snapshot.
pub fn derive_course(
    classifications: &[Classification],
) -> Result<CourseDerivation, ClassifyError> {
    Ok(CourseDerivation {
        groups: group_classifications(classifications)?,
        final_value: derive_final_value(classifications),
    })
}
