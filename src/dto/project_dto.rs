use serde::{Deserialize, Serialize};

use crate::model::project::{MilestoneStatus, Project, ProjectMilestone, ProjectStatus};

/// A project together with its ordered milestones.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectResponseDto {
    pub project: Project,
    pub milestones: Vec<ProjectMilestone>,
}

/// Out-of-range values are clamped to 100, not rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateProgressRequest {
    pub progress_percentage: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateMilestoneStatusRequest {
    pub status: MilestoneStatus,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProjectListQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub status: Option<ProjectStatus>,
}
