use std::collections::HashMap;

use tracing::warn;

use crate::model::{Course, CourseRaw, CourseRole, CoursesByRoles, CoursesByRolesRaw};

/// Result of merging the role membership payload with hydrated course
/// records. Codes with no hydrated record are dropped from the roster and
/// surfaced in `unmatched` so the caller can report the gap; a hole in the
/// upstream data is not a reason to fail the whole roster.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RosterMerge {
    pub courses: CoursesByRoles,
    pub unmatched: Vec<String>,
}

/// Merges role lists with hydrated courses, preserving each code's position
/// within its role list. A code present in both role lists yields two
/// independent entries.
pub fn merge_roster(roles: &CoursesByRolesRaw, hydrated: &[CourseRaw]) -> RosterMerge {
    let by_code: HashMap<&str, &CourseRaw> =
        hydrated.iter().map(|c| (c.code.as_str(), c)).collect();

    let mut merge = RosterMerge::default();

    for code in &roles.student_courses {
        match by_code.get(code.as_str()) {
            Some(raw) => merge.courses.student.push(Course {
                code: raw.code.clone(),
                name: raw.name.clone(),
                role: CourseRole::Student {
                    final_value: raw.final_value.clone(),
                },
            }),
            None => {
                warn!(code = %code, role = "student", "role list code has no hydrated course");
                merge.unmatched.push(code.clone());
            }
        }
    }

    for code in &roles.teacher_courses {
        match by_code.get(code.as_str()) {
            Some(raw) => merge.courses.teacher.push(Course {
                code: raw.code.clone(),
                name: raw.name.clone(),
                role: CourseRole::Teacher,
            }),
            None => {
                warn!(code = %code, role = "teacher", "role list code has no hydrated course");
                merge.unmatched.push(code.clone());
            }
        }
    }

    merge
}

/// Order-preserving set difference on course codes, mirroring the hidden
/// course filter the client applies.
pub fn filter_hidden(courses: &CoursesByRoles, hidden: &[String]) -> CoursesByRoles {
    let keep = |c: &&Course| !hidden.iter().any(|h| h == &c.code);
    CoursesByRoles {
        student: courses.student.iter().filter(keep).cloned().collect(),
        teacher: courses.teacher.iter().filter(keep).cloned().collect(),
    }
}
