use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::handler::request_handler::{
    approve_request_handler, convert_request_handler, create_request_handler, estimate_handler,
    get_request_handler, list_requests_handler, quote_request_handler, reject_request_handler,
    resubmit_request_handler, review_request_handler, RequestHandlerState,
};
use crate::middlewares::staff_middleware::{client_identity, staff_auth, StaffAuthState};

pub fn request_router(
    state: Arc<RequestHandlerState>,
    staff_auth_state: Arc<StaffAuthState>,
) -> Router {
    // Intake records the submitter when a valid token is present but
    // never requires one.
    let intake = Router::new()
        .route("/requests", post(create_request_handler))
        .route_layer(middleware::from_fn_with_state(
            staff_auth_state.clone(),
            client_identity,
        ));

    let public = Router::new()
        .route("/requests/estimate", post(estimate_handler))
        .route("/requests/{id}/resubmit", post(resubmit_request_handler));

    let staff = Router::new()
        .route("/requests", get(list_requests_handler))
        .route("/requests/{id}", get(get_request_handler))
        .route("/requests/{id}/review", post(review_request_handler))
        .route("/requests/{id}/quote", post(quote_request_handler))
        .route("/requests/{id}/approve", post(approve_request_handler))
        .route("/requests/{id}/reject", post(reject_request_handler))
        .route("/requests/{id}/convert", post(convert_request_handler))
        .route_layer(middleware::from_fn_with_state(staff_auth_state, staff_auth));

    intake.merge(public).merge(staff).with_state(state)
}
