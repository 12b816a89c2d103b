use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use bson::oid::ObjectId;
use std::sync::Arc;
use validator::Validate;

use crate::dto::pricing_dto::EstimateRequestBody;
use crate::dto::request_dto::{
    ConvertRequestBody, CreateProjectRequestRequest, QuoteRequestBody, RejectRequestBody,
    RequestListQuery,
};
use crate::middlewares::staff_middleware::ClientIdentity;
use crate::repository::request_repo::RequestListFilter;
use crate::service::conversion_service::{ConversionService, ConversionServiceImpl};
use crate::service::request_service::{RequestService, RequestServiceImpl};
use crate::util::error::HandlerError;

/// Shared state of the request routes. Conversion lives here because
/// it is addressed through a request id.
pub struct RequestHandlerState {
    pub request_service: Arc<RequestServiceImpl>,
    pub conversion_service: Arc<ConversionServiceImpl>,
}

fn parse_id(raw: &str) -> Result<ObjectId, HandlerError> {
    ObjectId::parse_str(raw).map_err(|_| HandlerError::bad_request("Invalid request id"))
}

pub async fn create_request_handler(
    State(state): State<Arc<RequestHandlerState>>,
    Extension(identity): Extension<ClientIdentity>,
    Json(payload): Json<CreateProjectRequestRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    payload
        .validate()
        .map_err(|e| HandlerError::validation(format!("Validation error: {}", e)))?;
    let created = state.request_service.create_request(payload, identity.0).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn estimate_handler(
    State(state): State<Arc<RequestHandlerState>>,
    Json(payload): Json<EstimateRequestBody>,
) -> Result<impl IntoResponse, HandlerError> {
    let quote = state.request_service.estimate(payload).await?;
    Ok(Json(quote))
}

pub async fn get_request_handler(
    State(state): State<Arc<RequestHandlerState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let id = parse_id(&id)?;
    let request = state.request_service.get_request(id).await?;
    Ok(Json(request))
}

pub async fn list_requests_handler(
    State(state): State<Arc<RequestHandlerState>>,
    Query(query): Query<RequestListQuery>,
) -> Result<impl IntoResponse, HandlerError> {
    let filter = RequestListFilter {
        status: query.status,
        user_type: query.user_type,
        request_type: query.request_type,
    };
    let page = query.page.unwrap_or(1).max(1);
    let limit = query.limit.unwrap_or(20).clamp(1, 100);
    let requests = state.request_service.list_requests(filter, page, limit).await?;
    Ok(Json(requests))
}

pub async fn review_request_handler(
    State(state): State<Arc<RequestHandlerState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let id = parse_id(&id)?;
    let updated = state.request_service.start_review(id).await?;
    Ok(Json(updated))
}

pub async fn quote_request_handler(
    State(state): State<Arc<RequestHandlerState>>,
    Path(id): Path<String>,
    Json(payload): Json<QuoteRequestBody>,
) -> Result<impl IntoResponse, HandlerError> {
    let id = parse_id(&id)?;
    payload
        .validate()
        .map_err(|e| HandlerError::validation(format!("Validation error: {}", e)))?;
    let updated = state
        .request_service
        .quote_request(id, payload.quoted_price)
        .await?;
    Ok(Json(updated))
}

pub async fn approve_request_handler(
    State(state): State<Arc<RequestHandlerState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let id = parse_id(&id)?;
    let updated = state.request_service.approve_request(id).await?;
    Ok(Json(updated))
}

pub async fn reject_request_handler(
    State(state): State<Arc<RequestHandlerState>>,
    Path(id): Path<String>,
    Json(payload): Json<RejectRequestBody>,
) -> Result<impl IntoResponse, HandlerError> {
    let id = parse_id(&id)?;
    payload
        .validate()
        .map_err(|e| HandlerError::validation(format!("Validation error: {}", e)))?;
    let updated = state.request_service.reject_request(id, payload.note).await?;
    Ok(Json(updated))
}

pub async fn resubmit_request_handler(
    State(state): State<Arc<RequestHandlerState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let id = parse_id(&id)?;
    let updated = state.request_service.resubmit_request(id).await?;
    Ok(Json(updated))
}

pub async fn convert_request_handler(
    State(state): State<Arc<RequestHandlerState>>,
    Path(id): Path<String>,
    Json(payload): Json<ConvertRequestBody>,
) -> Result<impl IntoResponse, HandlerError> {
    let id = parse_id(&id)?;
    let converted = state.conversion_service.convert_request(id, payload).await?;
    Ok((StatusCode::CREATED, Json(converted)))
}
