use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use bson::oid::ObjectId;
use std::sync::Arc;

use crate::dto::project_dto::{ProjectListQuery, UpdateMilestoneStatusRequest, UpdateProgressRequest};
use crate::service::project_service::{ProjectService, ProjectServiceImpl};
use crate::util::error::HandlerError;

fn parse_id(raw: &str, what: &str) -> Result<ObjectId, HandlerError> {
    ObjectId::parse_str(raw).map_err(|_| HandlerError::bad_request(format!("Invalid {} id", what)))
}

pub async fn list_projects_handler(
    State(service): State<Arc<ProjectServiceImpl>>,
    Query(query): Query<ProjectListQuery>,
) -> Result<impl IntoResponse, HandlerError> {
    let page = query.page.unwrap_or(1).max(1);
    let limit = query.limit.unwrap_or(20).clamp(1, 100);
    let projects = service.list_projects(query.status, page, limit).await?;
    Ok(Json(projects))
}

pub async fn get_project_handler(
    State(service): State<Arc<ProjectServiceImpl>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let id = parse_id(&id, "project")?;
    let project = service.get_project(id).await?;
    Ok(Json(project))
}

pub async fn update_progress_handler(
    State(service): State<Arc<ProjectServiceImpl>>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateProgressRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    let id = parse_id(&id, "project")?;
    let updated = service
        .update_progress(id, payload.progress_percentage)
        .await?;
    Ok(Json(updated))
}

pub async fn update_milestone_status_handler(
    State(service): State<Arc<ProjectServiceImpl>>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateMilestoneStatusRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    let id = parse_id(&id, "milestone")?;
    let updated = service.update_milestone_status(id, payload.status).await?;
    Ok(Json(updated))
}
