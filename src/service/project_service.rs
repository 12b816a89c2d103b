use std::sync::Arc;

use async_trait::async_trait;
use bson::oid::ObjectId;
use tracing::{info, instrument};

use crate::dto::project_dto::ProjectResponseDto;
use crate::model::project::{MilestoneStatus, Project, ProjectMilestone, ProjectStatus};
use crate::repository::milestone_repo::MilestoneRepository;
use crate::repository::project_repo::ProjectRepository;
use crate::util::error::ServiceError;

#[async_trait]
pub trait ProjectService: Send + Sync {
    /// A project with its milestones in schedule order.
    async fn get_project(&self, id: ObjectId) -> Result<ProjectResponseDto, ServiceError>;
    async fn list_projects(
        &self,
        status: Option<ProjectStatus>,
        page: u32,
        limit: u32,
    ) -> Result<Vec<Project>, ServiceError>;

    /// Values above 100 are clamped, never rejected.
    async fn update_progress(
        &self,
        id: ObjectId,
        progress: u32,
    ) -> Result<Project, ServiceError>;

    async fn update_milestone_status(
        &self,
        milestone_id: ObjectId,
        status: MilestoneStatus,
    ) -> Result<ProjectMilestone, ServiceError>;
}

pub struct ProjectServiceImpl {
    pub project_repo: Arc<dyn ProjectRepository>,
    pub milestone_repo: Arc<dyn MilestoneRepository>,
}

impl ProjectServiceImpl {
    pub fn new(
        project_repo: Arc<dyn ProjectRepository>,
        milestone_repo: Arc<dyn MilestoneRepository>,
    ) -> Self {
        ProjectServiceImpl {
            project_repo,
            milestone_repo,
        }
    }
}

#[async_trait]
impl ProjectService for ProjectServiceImpl {
    #[instrument(skip(self), fields(id = %id))]
    async fn get_project(&self, id: ObjectId) -> Result<ProjectResponseDto, ServiceError> {
        let project = self.project_repo.get_by_id(id).await?;
        let milestones = self.milestone_repo.list_by_project(id).await?;
        Ok(ProjectResponseDto {
            project,
            milestones,
        })
    }

    async fn list_projects(
        &self,
        status: Option<ProjectStatus>,
        page: u32,
        limit: u32,
    ) -> Result<Vec<Project>, ServiceError> {
        Ok(self.project_repo.list(status, page, limit).await?)
    }

    #[instrument(skip(self), fields(id = %id, progress = progress))]
    async fn update_progress(&self, id: ObjectId, progress: u32) -> Result<Project, ServiceError> {
        let clamped = progress.min(100);
        if clamped != progress {
            info!("Clamping progress {} to {}", progress, clamped);
        }
        Ok(self.project_repo.update_progress(id, clamped).await?)
    }

    #[instrument(skip(self), fields(milestone_id = %milestone_id))]
    async fn update_milestone_status(
        &self,
        milestone_id: ObjectId,
        status: MilestoneStatus,
    ) -> Result<ProjectMilestone, ServiceError> {
        info!("Setting milestone status to {}", status.as_str());
        Ok(self.milestone_repo.update_status(milestone_id, status).await?)
    }
}
