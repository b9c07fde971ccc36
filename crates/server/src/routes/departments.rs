use axum::{Router, response::Json as ResponseJson, routing::get};
use db::models::department::Department;
use serde::Serialize;
use strum::IntoEnumIterator;
use ts_rs::TS;
use utils::response::ApiResponse;

use crate::AppState;

#[derive(Debug, Serialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentPrefix {
    pub department: Department,
    pub prefix: String,
}

/// GET /api/departments
/// Department tags and the job code prefix each one gets.
pub async fn list_departments() -> ResponseJson<ApiResponse<Vec<DepartmentPrefix>>> {
    let departments = Department::iter()
        .map(|department| DepartmentPrefix {
            department,
            prefix: department.prefix().to_string(),
        })
        .collect();
    ResponseJson(ApiResponse::success(departments))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/departments", get(list_departments))
}
