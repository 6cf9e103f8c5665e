use serde::{Deserialize, Serialize};

/// Classification type tag carrying the course-level total points.
pub const POINTS_TOTAL: &str = "POINTS_TOTAL";
/// Classification type tag carrying the course-level final score/grade.
pub const FINAL_SCORE: &str = "FINAL_SCORE";

/// A grading value: exactly one of number, text, or boolean.
///
/// Untagged on the wire — the grading API sends a bare JSON number, string,
/// or bool in the `value` field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DynamicValue {
    Number(f64),
    Text(String),
    Bool(bool),
}

impl DynamicValue {
    /// Parses user/locale numeric input. A comma decimal separator is
    /// accepted and normalized to a period. Unparseable text yields `None`.
    pub fn parse_number(input: &str) -> Option<f64> {
        input.trim().replace(',', ".").parse::<f64>().ok()
    }
}

/// A single gradable item belonging to a course, possibly nested under a
/// parent classification. `parent_id == None` marks a tree root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Classification {
    pub id: i64,
    #[serde(default)]
    pub parent_id: Option<i64>,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub value: Option<DynamicValue>,
}

/// One root classification plus all its descendants, used as a single
/// display/aggregation unit. Rebuilt fresh on every refresh, never patched.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupedClassification {
    pub id: i64,
    pub header: String,
    pub items: Vec<Classification>,
}

impl GroupedClassification {
    pub fn from_root(root: &Classification) -> Self {
        Self {
            id: root.id,
            header: root
                .name
                .clone()
                .unwrap_or_else(|| root.kind.clone()),
            items: Vec::new(),
        }
    }
}

/// The caller's relationship to a course. A student course carries the
/// derived final value; a teacher-authored course has no personal grade.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", tag = "role")]
pub enum CourseRole {
    #[serde(rename_all = "camelCase")]
    Student {
        #[serde(skip_serializing_if = "Option::is_none")]
        final_value: Option<DynamicValue>,
    },
    Teacher,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(flatten)]
    pub role: CourseRole,
}

/// Hydrated course metadata as supplied by the upstream API, before any
/// role is attached.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseRaw {
    #[serde(rename = "courseCode")]
    pub code: String,
    #[serde(rename = "courseName", default)]
    pub name: Option<String>,
    #[serde(default)]
    pub final_value: Option<DynamicValue>,
}

/// Course membership split by role. A code may appear in both lists
/// independently.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoursesByRoles {
    pub student: Vec<Course>,
    pub teacher: Vec<Course>,
}

/// Raw role membership payload: two ordered lists of course codes.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoursesByRolesRaw {
    #[serde(default)]
    pub student_courses: Vec<String>,
    #[serde(default)]
    pub teacher_courses: Vec<String>,
}
