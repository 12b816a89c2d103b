use axum::{
    middleware,
    routing::{get, put},
    Router,
};
use std::sync::Arc;

use crate::handler::project_handler::{
    get_project_handler, list_projects_handler, update_milestone_status_handler,
    update_progress_handler,
};
use crate::middlewares::staff_middleware::{staff_auth, StaffAuthState};
use crate::service::project_service::ProjectServiceImpl;

/// Project tracking is staff-only end to end.
pub fn project_router(
    service: Arc<ProjectServiceImpl>,
    staff_auth_state: Arc<StaffAuthState>,
) -> Router {
    Router::new()
        .route("/projects", get(list_projects_handler))
        .route("/projects/{id}", get(get_project_handler))
        .route("/projects/{id}/progress", put(update_progress_handler))
        .route("/milestones/{id}/status", put(update_milestone_status_handler))
        .route_layer(middleware::from_fn_with_state(staff_auth_state, staff_auth))
        .with_state(service)
}
