use std::sync::Arc;

use async_trait::async_trait;
use bson::oid::ObjectId;
use chrono::{Duration, NaiveDate};
use tracing::{error, info, instrument, warn};

use crate::dto::project_dto::ProjectResponseDto;
use crate::dto::request_dto::ConvertRequestBody;
use crate::model::project::{MilestoneStatus, Project, ProjectMilestone, ProjectStatus};
use crate::model::request::{ProjectRequest, RequestStatus};
use crate::repository::milestone_repo::MilestoneRepository;
use crate::repository::project_repo::ProjectRepository;
use crate::repository::request_repo::ProjectRequestRepository;
use crate::util::error::ServiceError;

/// The four-phase payment plan every converted project starts with.
/// Percentages sum to 100; the last amount absorbs rounding so the
/// milestone total always equals the project budget exactly.
const MILESTONE_PHASES: [(&str, &str, i64); 4] = [
    (
        "Project Initiation & Planning",
        "Requirements analysis, project setup and detailed planning",
        25,
    ),
    (
        "Design & Architecture",
        "System design, architecture decisions and technology setup",
        25,
    ),
    (
        "Development Phase 1",
        "Core feature implementation and integration",
        30,
    ),
    (
        "Final Development & Deployment",
        "Remaining features, testing, delivery and deployment",
        20,
    ),
];

/// A planned milestone before it is persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct MilestoneDraft {
    pub name: String,
    pub description: String,
    pub amount: i64,
    pub due_date: Option<NaiveDate>,
    pub order: u32,
}

/// Computes the standard milestone schedule for a budget and an
/// optional project window.
///
/// Amounts follow the 25/25/30/20 split, with the final milestone
/// taking whatever remains so the four amounts sum to the budget
/// exactly. Due dates divide the window into four equal intervals and
/// are only produced when both dates are present and at least four
/// days apart; a shorter window is treated like a missing one.
pub fn build_milestone_plan(
    budget: Option<i64>,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
) -> Vec<MilestoneDraft> {
    let budget = budget.unwrap_or(0);

    let interval_days = match (start_date, end_date) {
        (Some(start), Some(end)) if (end - start).num_days() >= 4 => {
            Some((end - start).num_days() / 4)
        }
        _ => None,
    };

    let mut drafts = Vec::with_capacity(MILESTONE_PHASES.len());
    let mut allocated: i64 = 0;
    let last = MILESTONE_PHASES.len() - 1;

    for (i, (name, description, percent)) in MILESTONE_PHASES.iter().enumerate() {
        let amount = if i == last {
            budget - allocated
        } else {
            budget * percent / 100
        };
        allocated += amount;

        let due_date = interval_days.and_then(|interval| {
            start_date.map(|start| start + Duration::days(interval * (i as i64 + 1)))
        });

        drafts.push(MilestoneDraft {
            name: (*name).to_string(),
            description: (*description).to_string(),
            amount,
            due_date,
            order: i as u32 + 1,
        });
    }

    drafts
}

#[async_trait]
pub trait ConversionService: Send + Sync {
    /// Turns an approved request into a project with its milestone
    /// schedule. Safe to call concurrently: at most one call succeeds
    /// per request, the rest get a conflict.
    async fn convert_request(
        &self,
        request_id: ObjectId,
        body: ConvertRequestBody,
    ) -> Result<ProjectResponseDto, ServiceError>;
}

pub struct ConversionServiceImpl {
    pub request_repo: Arc<dyn ProjectRequestRepository>,
    pub project_repo: Arc<dyn ProjectRepository>,
    pub milestone_repo: Arc<dyn MilestoneRepository>,
}

impl ConversionServiceImpl {
    pub fn new(
        request_repo: Arc<dyn ProjectRequestRepository>,
        project_repo: Arc<dyn ProjectRepository>,
        milestone_repo: Arc<dyn MilestoneRepository>,
    ) -> Self {
        ConversionServiceImpl {
            request_repo,
            project_repo,
            milestone_repo,
        }
    }

    fn project_from_request(request: &ProjectRequest, body: &ConvertRequestBody) -> Project {
        Project {
            id: None,
            title: request.title.clone(),
            description: request.description.clone(),
            requirements: request.requirements.clone(),
            user_type: request.user_type,
            status: ProjectStatus::Planning,
            course_category: request.course_category.clone(),
            academic_level: request.academic_level.clone(),
            // The agreed quote wins; the automatic estimate is only a
            // fallback for requests converted without one.
            budget: request.quoted_price.or(request.estimated_cost),
            start_date: body.start_date,
            end_date: body.end_date,
            technologies: request.preferred_technologies.clone(),
            customizations: request.customizations.clone(),
            assigned_users: Vec::new(),
            contact_name: request.contact_name.clone(),
            contact_email: request.contact_email.clone(),
            contact_phone: request.contact_phone.clone(),
            progress_percentage: 0,
            source_request_id: request.id,
            created_at: None,
            updated_at: None,
        }
    }

    /// Best-effort cleanup after a failed conversion. Errors here are
    /// logged but never override the original failure.
    async fn compensate(&self, request_id: ObjectId, project_id: ObjectId, revert_status: bool) {
        if let Err(e) = self.milestone_repo.delete_by_project(project_id).await {
            error!("Compensation failed to remove milestones: {}", e);
        }
        if let Err(e) = self.project_repo.delete(project_id).await {
            error!("Compensation failed to remove project {}: {}", project_id, e);
        }
        if revert_status {
            if let Err(e) = self.request_repo.revert_conversion(request_id).await {
                error!(
                    "Compensation failed to revert request {} to approved: {}",
                    request_id, e
                );
            }
        }
    }
}

#[async_trait]
impl ConversionService for ConversionServiceImpl {
    #[instrument(skip(self, body), fields(request_id = %request_id))]
    async fn convert_request(
        &self,
        request_id: ObjectId,
        body: ConvertRequestBody,
    ) -> Result<ProjectResponseDto, ServiceError> {
        info!("Converting request to project");
        let request = self.request_repo.get_by_id(request_id).await?;

        if request.converted_project_id.is_some() {
            return Err(ServiceError::Conflict(format!(
                "Request {} has already been converted",
                request_id
            )));
        }
        if request.status != RequestStatus::Approved {
            return Err(ServiceError::Conflict(format!(
                "Cannot convert a request in status '{}', it must be approved",
                request.status
            )));
        }

        let project = Self::project_from_request(&request, &body);
        let project = self.project_repo.create(project).await?;
        let project_id = project.id.ok_or_else(|| {
            ServiceError::InternalError("Created project is missing its id".to_string())
        })?;

        // Conditional write on {approved, unconverted}: whichever
        // concurrent call loses gets None back and undoes its project.
        match self.request_repo.mark_converted(request_id, project_id).await {
            Ok(Some(_)) => {}
            Ok(None) => {
                warn!("Lost conversion race for request {}", request_id);
                self.compensate(request_id, project_id, false).await;
                return Err(ServiceError::Conflict(format!(
                    "Request {} was converted by a concurrent call",
                    request_id
                )));
            }
            Err(e) => {
                self.compensate(request_id, project_id, false).await;
                return Err(e.into());
            }
        }

        let drafts = build_milestone_plan(project.budget, body.start_date, body.end_date);
        let milestones: Vec<ProjectMilestone> = drafts
            .into_iter()
            .map(|d| ProjectMilestone {
                id: None,
                project_id,
                name: d.name,
                description: d.description,
                amount: d.amount,
                status: MilestoneStatus::Pending,
                due_date: d.due_date,
                completed_date: None,
                order: d.order,
                created_at: None,
                updated_at: None,
            })
            .collect();

        let milestones = match self.milestone_repo.create_many(milestones).await {
            Ok(milestones) => milestones,
            Err(e) => {
                error!("Milestone creation failed, reverting conversion: {}", e);
                self.compensate(request_id, project_id, true).await;
                return Err(e.into());
            }
        };

        info!(
            project_id = %project_id,
            milestones = milestones.len(),
            "Request converted successfully"
        );
        Ok(ProjectResponseDto {
            project,
            milestones,
        })
    }
}
