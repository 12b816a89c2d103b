use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use bson::oid::ObjectId;
use std::sync::Arc;
use validator::Validate;

use crate::dto::catalog_dto::{
    CreateServicePackageRequest, CreateTemplateRequest, TemplateListQuery,
};
use crate::service::catalog_service::{CatalogService, CatalogServiceImpl};
use crate::util::error::HandlerError;

pub async fn list_templates_handler(
    State(service): State<Arc<CatalogServiceImpl>>,
    Query(query): Query<TemplateListQuery>,
) -> Result<impl IntoResponse, HandlerError> {
    let templates = service.list_templates(query.user_type).await?;
    Ok(Json(templates))
}

pub async fn get_template_handler(
    State(service): State<Arc<CatalogServiceImpl>>,
    Path(id): Path<String>,
    Query(query): Query<TemplateListQuery>,
) -> Result<impl IntoResponse, HandlerError> {
    let id =
        ObjectId::parse_str(&id).map_err(|_| HandlerError::bad_request("Invalid template id"))?;
    let template = service.get_template(id, query.user_type).await?;
    Ok(Json(template))
}

pub async fn create_template_handler(
    State(service): State<Arc<CatalogServiceImpl>>,
    Json(payload): Json<CreateTemplateRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    payload
        .validate()
        .map_err(|e| HandlerError::validation(format!("Validation error: {}", e)))?;
    let created = service.create_template(payload).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn list_packages_handler(
    State(service): State<Arc<CatalogServiceImpl>>,
    Query(query): Query<TemplateListQuery>,
) -> Result<impl IntoResponse, HandlerError> {
    let packages = service.list_packages(query.user_type).await?;
    Ok(Json(packages))
}

pub async fn create_package_handler(
    State(service): State<Arc<CatalogServiceImpl>>,
    Json(payload): Json<CreateServicePackageRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    payload
        .validate()
        .map_err(|e| HandlerError::validation(format!("Validation error: {}", e)))?;
    let created = service.create_package(payload).await?;
    Ok((StatusCode::CREATED, Json(created)))
}
