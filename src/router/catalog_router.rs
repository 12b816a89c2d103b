use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::handler::catalog_handler::{
    create_package_handler, create_template_handler, get_template_handler, list_packages_handler,
    list_templates_handler,
};
use crate::middlewares::staff_middleware::{staff_auth, StaffAuthState};
use crate::service::catalog_service::CatalogServiceImpl;

pub fn catalog_router(
    service: Arc<CatalogServiceImpl>,
    staff_auth_state: Arc<StaffAuthState>,
) -> Router {
    // Browsing the catalog is public; editing it is staff-only.
    let public = Router::new()
        .route("/templates", get(list_templates_handler))
        .route("/templates/{id}", get(get_template_handler))
        .route("/services", get(list_packages_handler));

    let staff = Router::new()
        .route("/templates", post(create_template_handler))
        .route("/services", post(create_package_handler))
        .route_layer(middleware::from_fn_with_state(staff_auth_state, staff_auth));

    public.merge(staff).with_state(service)
}
