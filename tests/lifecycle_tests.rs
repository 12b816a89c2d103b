mod common;

use std::sync::Arc;

use common::{init_tracing, sample_request, InMemoryPackageRepo, InMemoryRequestRepo, InMemoryTemplateRepo};
use projecthub_backend::model::request::RequestStatus;
use projecthub_backend::service::pricing_service::PricingResolver;
use projecthub_backend::service::request_service::{RequestService, RequestServiceImpl};
use projecthub_backend::util::error::ServiceError;

fn service(repo: Arc<InMemoryRequestRepo>) -> RequestServiceImpl {
    let pricing = PricingResolver::new(
        Arc::new(InMemoryTemplateRepo::default()),
        Arc::new(InMemoryPackageRepo::default()),
    );
    RequestServiceImpl::new(repo, pricing)
}

#[tokio::test]
async fn test_full_lifecycle_pending_to_approved() {
    init_tracing();
    let repo = Arc::new(InMemoryRequestRepo::default());
    let id = repo.insert(sample_request(RequestStatus::Pending));
    let service = service(repo.clone());

    let r = service.start_review(id).await.unwrap();
    assert_eq!(r.status, RequestStatus::Reviewing);

    let r = service.quote_request(id, 450_000).await.unwrap();
    assert_eq!(r.status, RequestStatus::Quoted);
    assert_eq!(r.quoted_price, Some(450_000));

    let r = service.approve_request(id).await.unwrap();
    assert_eq!(r.status, RequestStatus::Approved);
}

#[tokio::test]
async fn test_skipping_states_is_a_conflict() {
    init_tracing();
    let repo = Arc::new(InMemoryRequestRepo::default());
    let id = repo.insert(sample_request(RequestStatus::Pending));
    let service = service(repo.clone());

    // pending -> approved is not in the table.
    let err = service.approve_request(id).await.unwrap_err();
    assert!(matches!(err, ServiceError::Conflict(_)));

    // Quoting straight from pending is not allowed either.
    let err = service.quote_request(id, 100_000).await.unwrap_err();
    assert!(matches!(err, ServiceError::Conflict(_)));

    // The stored status did not move.
    assert_eq!(repo.get(id).unwrap().status, RequestStatus::Pending);
}

#[tokio::test]
async fn test_rejection_from_pending_and_reviewing_only() {
    init_tracing();
    let repo = Arc::new(InMemoryRequestRepo::default());
    let service = service(repo.clone());

    let pending = repo.insert(sample_request(RequestStatus::Pending));
    let r = service
        .reject_request(pending, Some("Out of scope".to_string()))
        .await
        .unwrap();
    assert_eq!(r.status, RequestStatus::Rejected);
    assert_eq!(r.internal_notes.as_deref(), Some("Out of scope"));

    let reviewing = repo.insert(sample_request(RequestStatus::Reviewing));
    let r = service.reject_request(reviewing, None).await.unwrap();
    assert_eq!(r.status, RequestStatus::Rejected);

    // Once quoted there is no path back to rejected.
    let quoted = repo.insert(sample_request(RequestStatus::Quoted));
    let err = service.reject_request(quoted, None).await.unwrap_err();
    assert!(matches!(err, ServiceError::Conflict(_)));
}

#[tokio::test]
async fn test_resubmission_restarts_the_lifecycle() {
    init_tracing();
    let repo = Arc::new(InMemoryRequestRepo::default());
    let mut request = sample_request(RequestStatus::Rejected);
    request.quoted_price = Some(300_000);
    let id = repo.insert(request);
    let service = service(repo.clone());

    let r = service.resubmit_request(id).await.unwrap();
    assert_eq!(r.status, RequestStatus::Pending);
    // The stale quote from the rejected round is gone.
    assert_eq!(r.quoted_price, None);

    // Only rejected requests can be resubmitted.
    let err = service.resubmit_request(id).await.unwrap_err();
    assert!(matches!(err, ServiceError::Conflict(_)));
}

#[tokio::test]
async fn test_converted_is_terminal() {
    init_tracing();
    let repo = Arc::new(InMemoryRequestRepo::default());
    let id = repo.insert(sample_request(RequestStatus::Converted));
    let service = service(repo.clone());

    for result in [
        service.start_review(id).await,
        service.approve_request(id).await,
        service.reject_request(id, None).await,
        service.resubmit_request(id).await,
    ] {
        assert!(matches!(result.unwrap_err(), ServiceError::Conflict(_)));
    }
}

#[tokio::test]
async fn test_quote_requires_positive_price() {
    init_tracing();
    let repo = Arc::new(InMemoryRequestRepo::default());
    let id = repo.insert(sample_request(RequestStatus::Reviewing));
    let service = service(repo.clone());

    let err = service.quote_request(id, 0).await.unwrap_err();
    assert!(matches!(err, ServiceError::InvalidInput(_)));
    let err = service.quote_request(id, -5).await.unwrap_err();
    assert!(matches!(err, ServiceError::InvalidInput(_)));
}
