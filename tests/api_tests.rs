mod common;

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use common::{
    init_tracing, sample_request, sample_template, InMemoryMilestoneRepo, InMemoryPackageRepo,
    InMemoryProjectRepo, InMemoryRequestRepo, InMemoryTemplateRepo,
};
use projecthub_backend::config::JwtConfig;
use projecthub_backend::handler::request_handler::RequestHandlerState;
use projecthub_backend::middlewares::staff_middleware::StaffAuthState;
use projecthub_backend::model::request::RequestStatus;
use projecthub_backend::router::catalog_router::catalog_router;
use projecthub_backend::router::request_router::request_router;
use projecthub_backend::service::catalog_service::CatalogServiceImpl;
use projecthub_backend::service::conversion_service::ConversionServiceImpl;
use projecthub_backend::service::pricing_service::PricingResolver;
use projecthub_backend::service::request_service::RequestServiceImpl;
use projecthub_backend::util::jwt::{JwtTokenUtils, JwtTokenUtilsImpl};

struct TestApp {
    router: axum::Router,
    request_repo: Arc<InMemoryRequestRepo>,
    template_repo: Arc<InMemoryTemplateRepo>,
    jwt_utils: Arc<JwtTokenUtilsImpl>,
}

fn test_app() -> TestApp {
    init_tracing();
    let request_repo = Arc::new(InMemoryRequestRepo::default());
    let project_repo = Arc::new(InMemoryProjectRepo::default());
    let milestone_repo = Arc::new(InMemoryMilestoneRepo::default());
    let template_repo = Arc::new(InMemoryTemplateRepo::default());
    let package_repo = Arc::new(InMemoryPackageRepo::default());

    let pricing = PricingResolver::new(template_repo.clone(), package_repo.clone());
    let request_service = Arc::new(RequestServiceImpl::new(request_repo.clone(), pricing));
    let conversion_service = Arc::new(ConversionServiceImpl::new(
        request_repo.clone(),
        project_repo,
        milestone_repo,
    ));
    let catalog_service = Arc::new(CatalogServiceImpl::new(
        template_repo.clone(),
        package_repo,
    ));

    let jwt_utils = Arc::new(JwtTokenUtilsImpl::new(JwtConfig::default()));
    let staff_auth_state = Arc::new(StaffAuthState {
        jwt_utils: jwt_utils.clone(),
    });

    let state = Arc::new(RequestHandlerState {
        request_service,
        conversion_service,
    });
    let router = request_router(state, staff_auth_state.clone())
        .merge(catalog_router(catalog_service, staff_auth_state));

    TestApp {
        router,
        request_repo,
        template_repo,
        jwt_utils,
    }
}

fn staff_token(app: &TestApp) -> String {
    app.jwt_utils
        .generate_access_token(&bson::oid::ObjectId::new().to_hex(), "staff@example.com", "admin")
        .unwrap()
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_create_request_returns_created_with_estimate() {
    let app = test_app();
    let payload = json!({
        "title": "Course registration portal",
        "description": "A web portal for students to register for courses each term",
        "user_type": "student",
        "request_type": "new",
        "complexity_level": "simple",
        "contact_name": "Alex Doe",
        "contact_email": "alex@example.com"
    });

    let response = app
        .router
        .oneshot(json_request("POST", "/requests", payload))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = body_json(response).await;
    assert_eq!(body["status"], "pending");
    assert_eq!(body["estimated_cost"], 0);
    // Anonymous intake: no submitter recorded.
    assert!(body["submitter"].is_null());
}

#[tokio::test]
async fn test_create_request_rejects_invalid_payload() {
    let app = test_app();
    let payload = json!({
        "title": "x",
        "description": "too short",
        "user_type": "student",
        "request_type": "new",
        "contact_name": "Alex Doe",
        "contact_email": "not-an-email"
    });

    let response = app
        .router
        .oneshot(json_request("POST", "/requests", payload))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_estimate_is_public_and_lenient() {
    let app = test_app();
    let template_id = app.template_repo.insert(sample_template(150_000));

    // Unknown user type degrades to student, unknown complexity to
    // medium; nothing is persisted.
    let payload = json!({
        "user_type": "wholesale",
        "request_type": "existing",
        "template_id": template_id.to_hex()
    });
    let response = app
        .router
        .oneshot(json_request("POST", "/requests/estimate", payload))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["estimated_cost"], 150_000);
    assert_eq!(body["user_type"], "student");
    assert_eq!(body["template_found"], true);
    assert!(app.request_repo.requests.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_estimate_flags_missing_template() {
    let app = test_app();
    let payload = json!({
        "request_type": "existing",
        "template_id": bson::oid::ObjectId::new().to_hex()
    });
    let response = app
        .router
        .oneshot(json_request("POST", "/requests/estimate", payload))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["estimated_cost"], 0);
    assert_eq!(body["template_found"], false);
}

#[tokio::test]
async fn test_staff_routes_require_token() {
    let app = test_app();
    let response = app
        .router
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/requests")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_staff_routes_reject_client_tokens() {
    let app = test_app();
    let token = app
        .jwt_utils
        .generate_access_token("user-1", "client@example.com", "client")
        .unwrap();

    let response = app
        .router
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/requests")
                .header("authorization", format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_staff_can_list_and_transition_requests() {
    let app = test_app();
    let id = app.request_repo.insert(sample_request(RequestStatus::Pending));
    let token = staff_token(&app);

    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/requests?status=pending")
                .header("authorization", format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body.as_array().unwrap().len(), 1);

    let response = app
        .router
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/requests/{}/review", id.to_hex()))
                .header("authorization", format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "reviewing");
}

#[tokio::test]
async fn test_disallowed_transition_returns_conflict() {
    let app = test_app();
    let id = app.request_repo.insert(sample_request(RequestStatus::Pending));
    let token = staff_token(&app);

    let response = app
        .router
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/requests/{}/approve", id.to_hex()))
                .header("authorization", format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_convert_endpoint_is_exactly_once() {
    let app = test_app();
    let mut request = sample_request(RequestStatus::Approved);
    request.quoted_price = Some(800_000);
    let id = app.request_repo.insert(request);
    let token = staff_token(&app);
    let payload = json!({ "start_date": "2026-03-01", "end_date": "2026-04-10" });

    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/requests/{}/convert", id.to_hex()))
                .header("authorization", format!("Bearer {}", token))
                .header("content-type", "application/json")
                .body(Body::from(payload.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["milestones"].as_array().unwrap().len(), 4);

    let response = app
        .router
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/requests/{}/convert", id.to_hex()))
                .header("authorization", format!("Bearer {}", token))
                .header("content-type", "application/json")
                .body(Body::from(payload.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_malformed_id_is_a_bad_request() {
    let app = test_app();
    let token = staff_token(&app);
    let response = app
        .router
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/requests/not-an-object-id")
                .header("authorization", format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_catalog_browse_is_public_and_priced() {
    let app = test_app();
    let mut template = sample_template(200_000);
    template.student_price = Some(90_000);
    app.template_repo.insert(template);

    let response = app
        .router
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/templates?user_type=student")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    let items = body.as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["price"], 90_000);
}
