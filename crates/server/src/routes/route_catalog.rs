use axum::{Router, response::Json as ResponseJson, routing::get};
use serde::Serialize;
use utils::response::ApiResponse;

use crate::AppState;

#[derive(Debug, Clone, Serialize)]
pub struct RouteInfo {
    pub path: &'static str,
    pub methods: &'static [&'static str],
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub description: &'static str,
}

const fn route(
    path: &'static str,
    methods: &'static [&'static str],
    kind: &'static str,
    description: &'static str,
) -> RouteInfo {
    RouteInfo {
        path,
        methods,
        kind,
        description,
    }
}

pub const ROUTES: &[RouteInfo] = &[
    route("/api/health", &["GET"], "System", "Health check"),
    route("/api/routes", &["GET"], "System", "List all available routes"),
    route("/api/departments", &["GET"], "System", "Departments and job code prefixes"),
    route("/api/users", &["GET"], "User", "Get all users"),
    route("/api/users", &["POST"], "User", "Create new user"),
    route("/api/users/{id}", &["GET"], "User", "Get user by ID"),
    route("/api/users/{id}", &["PUT"], "User", "Update user"),
    route("/api/users/{id}", &["DELETE"], "User", "Delete user"),
    route("/api/admin/settings", &["GET"], "Admin", "Get all admin settings"),
    route("/api/admin/settings", &["POST"], "Admin", "Create new admin setting"),
    route("/api/admin/settings/{key}", &["GET"], "Admin", "Get admin setting by key"),
    route("/api/admin/settings/{key}", &["PUT"], "Admin", "Update admin setting"),
    route("/api/admin/settings/{key}", &["DELETE"], "Admin", "Delete admin setting"),
    route("/api/clients", &["GET"], "Client", "Get all active clients"),
    route("/api/clients", &["POST"], "Client", "Create new client"),
    route("/api/clients/{id}", &["GET"], "Client", "Get client by ID"),
    route("/api/clients/{id}", &["PUT"], "Client", "Update client"),
    route("/api/clients/{id}", &["DELETE"], "Client", "Delete client"),
    route("/api/clients/{id}/approve", &["PUT"], "Client", "Approve credit application"),
    route("/api/clients/{id}/reject", &["PUT"], "Client", "Reject credit application"),
    route("/api/jobs", &["GET"], "Job", "Get all jobs, optionally by ?department="),
    route("/api/jobs", &["POST"], "Job", "Create new job"),
    route("/api/jobs/{id}", &["GET"], "Job", "Get job by ID"),
    route("/api/jobs/{id}", &["PUT"], "Job", "Update job"),
    route("/api/jobs/{id}", &["DELETE"], "Job", "Delete job"),
    route("/api/jobs/{id}/items", &["GET"], "Job", "Get job items"),
    route("/api/jobs/{id}/items", &["POST"], "Job", "Create job item"),
    route("/api/job-items/bulk", &["POST"], "Job", "Replace all items of a job"),
    route("/api/job-items/{id}", &["GET"], "Job", "Get job items by job ID"),
    route("/api/job-items/{id}", &["PUT"], "Job", "Update job item"),
    route("/api/job-items/{id}", &["DELETE"], "Job", "Delete job item"),
    route("/api/performance/summary", &["GET"], "Report", "Dashboard performance figures"),
];

/// GET /api/routes
pub async fn list_routes() -> ResponseJson<ApiResponse<&'static [RouteInfo]>> {
    ResponseJson(ApiResponse::success(ROUTES))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/routes", get(list_routes))
}
