use axum::{
    body::Body, extract::State, http::Request, http::StatusCode, middleware::Next,
    response::Response,
};
use bson::oid::ObjectId;
use std::sync::Arc;

use crate::util::jwt::{JwtTokenUtils, JwtTokenUtilsImpl};

pub struct StaffAuthState {
    pub jwt_utils: Arc<JwtTokenUtilsImpl>,
}

/// The resolved account behind an optional-auth request. Anonymous
/// callers carry None.
#[derive(Debug, Clone)]
pub struct ClientIdentity(pub Option<ObjectId>);

/// Guards the staff routes: a valid token with a staff role is
/// required. Claims are attached to the request for handlers that
/// need them.
pub async fn staff_auth(
    State(state): State<Arc<StaffAuthState>>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    let auth_header = req
        .headers()
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let token = state
        .jwt_utils
        .extract_token_from_header(auth_header)
        .map_err(|_| StatusCode::UNAUTHORIZED)?;
    let claims = state
        .jwt_utils
        .validate_access_token(&token)
        .map_err(|_| StatusCode::UNAUTHORIZED)?;

    if !claims.is_staff() {
        return Err(StatusCode::FORBIDDEN);
    }

    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

/// Public intake accepts anonymous callers but records the account
/// when a valid token is present. A bad token is ignored rather than
/// rejected.
pub async fn client_identity(
    State(state): State<Arc<StaffAuthState>>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let submitter = req
        .headers()
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|header| state.jwt_utils.extract_token_from_header(header).ok())
        .and_then(|token| state.jwt_utils.validate_access_token(&token).ok())
        .and_then(|claims| ObjectId::parse_str(&claims.sub).ok());

    req.extensions_mut().insert(ClientIdentity(submitter));
    next.run(req).await
}
