use std::sync::Arc;

use async_trait::async_trait;
use bson::oid::ObjectId;
use tracing::{info, instrument, warn};

use crate::dto::pricing_dto::{EstimateRequestBody, PriceQuote};
use crate::dto::request_dto::CreateProjectRequestRequest;
use crate::model::request::{ComplexityLevel, ProjectRequest, RequestStatus, RequestType, UserType};
use crate::repository::request_repo::{ProjectRequestRepository, RequestListFilter};
use crate::service::pricing_service::PricingResolver;
use crate::util::error::ServiceError;

#[async_trait]
pub trait RequestService: Send + Sync {
    /// Public intake. Computes and stores the automatic estimate; the
    /// request always starts out pending.
    async fn create_request(
        &self,
        dto: CreateProjectRequestRequest,
        submitter: Option<ObjectId>,
    ) -> Result<ProjectRequest, ServiceError>;

    /// Public cost calculator. Persists nothing and parses leniently
    /// so a half-filled form still gets a number back.
    async fn estimate(&self, body: EstimateRequestBody) -> Result<PriceQuote, ServiceError>;

    async fn get_request(&self, id: ObjectId) -> Result<ProjectRequest, ServiceError>;
    async fn list_requests(
        &self,
        filter: RequestListFilter,
        page: u32,
        limit: u32,
    ) -> Result<Vec<ProjectRequest>, ServiceError>;

    /// pending -> reviewing
    async fn start_review(&self, id: ObjectId) -> Result<ProjectRequest, ServiceError>;
    /// reviewing -> quoted, recording the price
    async fn quote_request(
        &self,
        id: ObjectId,
        quoted_price: i64,
    ) -> Result<ProjectRequest, ServiceError>;
    /// quoted -> approved
    async fn approve_request(&self, id: ObjectId) -> Result<ProjectRequest, ServiceError>;
    /// pending/reviewing -> rejected
    async fn reject_request(
        &self,
        id: ObjectId,
        note: Option<String>,
    ) -> Result<ProjectRequest, ServiceError>;
    /// rejected -> pending, clearing any stale quote
    async fn resubmit_request(&self, id: ObjectId) -> Result<ProjectRequest, ServiceError>;
}

pub struct RequestServiceImpl {
    pub request_repo: Arc<dyn ProjectRequestRepository>,
    pub pricing: PricingResolver,
}

impl RequestServiceImpl {
    pub fn new(request_repo: Arc<dyn ProjectRequestRepository>, pricing: PricingResolver) -> Self {
        RequestServiceImpl {
            request_repo,
            pricing,
        }
    }

    fn parse_object_id(raw: &str, what: &str) -> Result<ObjectId, ServiceError> {
        ObjectId::parse_str(raw)
            .map_err(|_| ServiceError::InvalidInput(format!("Invalid {} id: {}", what, raw)))
    }

    /// Shared guard for the simple status moves: checks the lifecycle
    /// table against the current status, then performs the conditional
    /// write. A None from the repository means another writer moved
    /// the request first.
    async fn transition(
        &self,
        id: ObjectId,
        to: RequestStatus,
    ) -> Result<ProjectRequest, ServiceError> {
        let current = self.request_repo.get_by_id(id).await?;
        if !current.status.can_transition_to(to) {
            return Err(ServiceError::Conflict(format!(
                "Cannot move request from '{}' to '{}'",
                current.status, to
            )));
        }
        match self
            .request_repo
            .transition_status(id, current.status, to)
            .await?
        {
            Some(updated) => Ok(updated),
            None => {
                warn!("Request {} changed status during transition to {}", id, to);
                Err(ServiceError::Conflict(format!(
                    "Request {} was modified concurrently",
                    id
                )))
            }
        }
    }
}

#[async_trait]
impl RequestService for RequestServiceImpl {
    #[instrument(skip(self, dto), fields(title = %dto.title))]
    async fn create_request(
        &self,
        dto: CreateProjectRequestRequest,
        submitter: Option<ObjectId>,
    ) -> Result<ProjectRequest, ServiceError> {
        info!("Creating project request");

        let template_id = match dto.template_id.as_deref() {
            Some(raw) => Some(Self::parse_object_id(raw, "template")?),
            None => None,
        };
        if dto.request_type == RequestType::Existing && template_id.is_none() {
            return Err(ServiceError::InvalidInput(
                "A template id is required for template-based requests".to_string(),
            ));
        }

        let mut selected_services = Vec::with_capacity(dto.selected_services.len());
        for raw in &dto.selected_services {
            selected_services.push(Self::parse_object_id(raw, "service package")?);
        }

        let complexity_level = ComplexityLevel::parse_lenient(dto.complexity_level.as_deref());

        let quote = self
            .pricing
            .resolve(
                dto.user_type,
                dto.request_type,
                template_id,
                complexity_level,
                &selected_services,
            )
            .await?;

        let request = ProjectRequest {
            id: None,
            title: dto.title,
            description: dto.description,
            requirements: dto.requirements,
            user_type: dto.user_type,
            request_type: dto.request_type,
            template_id,
            complexity_level,
            selected_services,
            preferred_technologies: dto.preferred_technologies,
            customizations: dto.customizations,
            course_category: dto.course_category,
            academic_level: dto.academic_level,
            institution: dto.institution,
            budget_range: dto.budget_range,
            preferred_deadline: dto.preferred_deadline,
            contact_name: dto.contact_name,
            contact_email: dto.contact_email,
            contact_phone: dto.contact_phone,
            submitter,
            status: RequestStatus::Pending,
            estimated_cost: Some(quote.estimated_cost),
            quoted_price: None,
            internal_notes: None,
            converted_project_id: None,
            created_at: None,
            updated_at: None,
        };

        let created = self.request_repo.create(request).await?;
        info!(estimated_cost = quote.estimated_cost, "Project request created");
        Ok(created)
    }

    #[instrument(skip(self, body))]
    async fn estimate(&self, body: EstimateRequestBody) -> Result<PriceQuote, ServiceError> {
        let user_type = UserType::parse_lenient(body.user_type.as_deref());
        let request_type = RequestType::parse_lenient(body.request_type.as_deref());
        let complexity_level = ComplexityLevel::parse_lenient(body.complexity_level.as_deref());

        // An unparseable template id is treated like a missing
        // template, not an error.
        let mut template_missing = false;
        let template_id = match body.template_id.as_deref() {
            Some(raw) => match ObjectId::parse_str(raw) {
                Ok(id) => Some(id),
                Err(_) => {
                    template_missing = true;
                    None
                }
            },
            None => None,
        };

        let selected_services: Vec<ObjectId> = body
            .selected_services
            .iter()
            .filter_map(|raw| ObjectId::parse_str(raw).ok())
            .collect();

        let mut quote = self
            .pricing
            .resolve(
                user_type,
                request_type,
                template_id,
                complexity_level,
                &selected_services,
            )
            .await?;
        if template_missing {
            quote.template_found = false;
        }
        Ok(quote)
    }

    async fn get_request(&self, id: ObjectId) -> Result<ProjectRequest, ServiceError> {
        Ok(self.request_repo.get_by_id(id).await?)
    }

    async fn list_requests(
        &self,
        filter: RequestListFilter,
        page: u32,
        limit: u32,
    ) -> Result<Vec<ProjectRequest>, ServiceError> {
        Ok(self.request_repo.list(filter, page, limit).await?)
    }

    #[instrument(skip(self), fields(id = %id))]
    async fn start_review(&self, id: ObjectId) -> Result<ProjectRequest, ServiceError> {
        self.transition(id, RequestStatus::Reviewing).await
    }

    #[instrument(skip(self), fields(id = %id, quoted_price = quoted_price))]
    async fn quote_request(
        &self,
        id: ObjectId,
        quoted_price: i64,
    ) -> Result<ProjectRequest, ServiceError> {
        if quoted_price <= 0 {
            return Err(ServiceError::InvalidInput(
                "Quoted price must be positive".to_string(),
            ));
        }
        let current = self.request_repo.get_by_id(id).await?;
        if !current.status.can_transition_to(RequestStatus::Quoted) {
            return Err(ServiceError::Conflict(format!(
                "Cannot quote a request in status '{}'",
                current.status
            )));
        }
        match self.request_repo.apply_quote(id, quoted_price).await? {
            Some(updated) => Ok(updated),
            None => Err(ServiceError::Conflict(format!(
                "Request {} was modified concurrently",
                id
            ))),
        }
    }

    #[instrument(skip(self), fields(id = %id))]
    async fn approve_request(&self, id: ObjectId) -> Result<ProjectRequest, ServiceError> {
        self.transition(id, RequestStatus::Approved).await
    }

    #[instrument(skip(self), fields(id = %id))]
    async fn reject_request(
        &self,
        id: ObjectId,
        note: Option<String>,
    ) -> Result<ProjectRequest, ServiceError> {
        let current = self.request_repo.get_by_id(id).await?;
        if !current.status.can_transition_to(RequestStatus::Rejected) {
            return Err(ServiceError::Conflict(format!(
                "Cannot reject a request in status '{}'",
                current.status
            )));
        }
        match self
            .request_repo
            .apply_rejection(id, current.status, note)
            .await?
        {
            Some(updated) => Ok(updated),
            None => Err(ServiceError::Conflict(format!(
                "Request {} was modified concurrently",
                id
            ))),
        }
    }

    #[instrument(skip(self), fields(id = %id))]
    async fn resubmit_request(&self, id: ObjectId) -> Result<ProjectRequest, ServiceError> {
        let current = self.request_repo.get_by_id(id).await?;
        if current.status != RequestStatus::Rejected {
            return Err(ServiceError::Conflict(format!(
                "Only rejected requests can be resubmitted, this one is '{}'",
                current.status
            )));
        }
        match self.request_repo.reset_to_pending(id).await? {
            Some(updated) => Ok(updated),
            None => Err(ServiceError::Conflict(format!(
                "Request {} was modified concurrently",
                id
            ))),
        }
    }
}
