use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::model::request::UserType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    Planning,
    InProgress,
    Review,
    Completed,
    OnHold,
    Cancelled,
}

impl ProjectStatus {
    pub fn as_str(&self) -> &str {
        match self {
            ProjectStatus::Planning => "planning",
            ProjectStatus::InProgress => "in_progress",
            ProjectStatus::Review => "review",
            ProjectStatus::Completed => "completed",
            ProjectStatus::OnHold => "on_hold",
            ProjectStatus::Cancelled => "cancelled",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MilestoneStatus {
    Pending,
    InProgress,
    Completed,
    Paid,
    Overdue,
}

impl MilestoneStatus {
    pub fn as_str(&self) -> &str {
        match self {
            MilestoneStatus::Pending => "pending",
            MilestoneStatus::InProgress => "in_progress",
            MilestoneStatus::Completed => "completed",
            MilestoneStatus::Paid => "paid",
            MilestoneStatus::Overdue => "overdue",
        }
    }

    /// Completed and paid milestones carry a completion date.
    pub fn is_done(&self) -> bool {
        matches!(self, MilestoneStatus::Completed | MilestoneStatus::Paid)
    }
}

/// An active, tracked project. Created exactly once from an approved
/// ProjectRequest by the conversion operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    #[serde(rename = "_id")]
    pub id: Option<ObjectId>,
    pub title: String,
    pub description: String,
    pub requirements: Option<String>,

    pub user_type: UserType,
    pub status: ProjectStatus,

    pub course_category: Option<String>,
    pub academic_level: Option<String>,

    pub budget: Option<i64>,
    pub start_date: Option<chrono::NaiveDate>,
    pub end_date: Option<chrono::NaiveDate>,

    pub technologies: Vec<String>,
    pub customizations: Option<serde_json::Value>,
    pub assigned_users: Vec<ObjectId>,

    pub contact_name: String,
    pub contact_email: String,
    pub contact_phone: Option<String>,

    // Always kept in 0..=100, see set_progress.
    pub progress_percentage: u32,

    pub source_request_id: Option<ObjectId>,

    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl Project {
    /// Clamp on every write so no caller can push the value out of range.
    pub fn set_progress(&mut self, value: u32) {
        self.progress_percentage = value.min(100);
    }
}

/// A dated, priced sub-deliverable of a project, used for progress and
/// payment tracking. `order` is unique within a project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectMilestone {
    #[serde(rename = "_id")]
    pub id: Option<ObjectId>,
    pub project_id: ObjectId,
    pub name: String,
    pub description: String,
    pub amount: i64,
    pub status: MilestoneStatus,
    pub due_date: Option<chrono::NaiveDate>,
    pub completed_date: Option<chrono::NaiveDate>,
    pub order: u32,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}
