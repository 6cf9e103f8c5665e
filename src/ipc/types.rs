use serde::Deserialize;

use crate::model::CoursesByRoles;
use crate::store::CourseStore;

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

#[derive(Default)]
pub struct AppState {
    pub roster: Option<CoursesByRoles>,
    pub hidden: Vec<String>,
    pub store: CourseStore,
}
