use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// Who is asking for the project. Drives template pricing and which
/// service packages apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserType {
    Student,
    Client,
    Business,
}

impl UserType {
    pub fn as_str(&self) -> &str {
        match self {
            UserType::Student => "student",
            UserType::Client => "client",
            UserType::Business => "business",
        }
    }

    /// Lenient parse for the public estimate endpoint: unknown or
    /// missing input degrades to `student` instead of failing.
    pub fn parse_lenient(value: Option<&str>) -> Self {
        match value {
            Some("client") => UserType::Client,
            Some("business") => UserType::Business,
            _ => UserType::Student,
        }
    }
}

/// A request is either built from scratch or based on an existing
/// catalog template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestType {
    New,
    Existing,
}

impl RequestType {
    pub fn as_str(&self) -> &str {
        match self {
            RequestType::New => "new",
            RequestType::Existing => "existing",
        }
    }

    /// Missing or unknown values default to a custom build.
    pub fn parse_lenient(value: Option<&str>) -> Self {
        match value {
            Some("existing") => RequestType::Existing,
            _ => RequestType::New,
        }
    }
}

/// Effort tier for custom ("new") requests. Applied as a flat scalar
/// on top of the additive service-package costs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComplexityLevel {
    Simple,
    Medium,
    Complex,
    Enterprise,
}

impl ComplexityLevel {
    pub fn multiplier(&self) -> f64 {
        match self {
            ComplexityLevel::Simple => 1.0,
            ComplexityLevel::Medium => 1.5,
            ComplexityLevel::Complex => 2.0,
            ComplexityLevel::Enterprise => 3.0,
        }
    }

    /// Unknown or missing tiers degrade to `medium` rather than
    /// rejecting the request.
    pub fn parse_lenient(value: Option<&str>) -> Self {
        match value {
            Some("simple") => ComplexityLevel::Simple,
            Some("complex") => ComplexityLevel::Complex,
            Some("enterprise") => ComplexityLevel::Enterprise,
            _ => ComplexityLevel::Medium,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    Pending,
    Reviewing,
    Quoted,
    Approved,
    Rejected,
    Converted,
}

impl RequestStatus {
    pub fn as_str(&self) -> &str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Reviewing => "reviewing",
            RequestStatus::Quoted => "quoted",
            RequestStatus::Approved => "approved",
            RequestStatus::Rejected => "rejected",
            RequestStatus::Converted => "converted",
        }
    }

    /// The lifecycle transition table. Every status write goes through
    /// this check; `converted` is terminal.
    pub fn allowed_next(&self) -> &'static [RequestStatus] {
        match self {
            RequestStatus::Pending => &[RequestStatus::Reviewing, RequestStatus::Rejected],
            RequestStatus::Reviewing => &[RequestStatus::Quoted, RequestStatus::Rejected],
            RequestStatus::Quoted => &[RequestStatus::Approved],
            RequestStatus::Approved => &[RequestStatus::Converted],
            RequestStatus::Rejected => &[RequestStatus::Pending],
            RequestStatus::Converted => &[],
        }
    }

    pub fn can_transition_to(&self, next: RequestStatus) -> bool {
        self.allowed_next().contains(&next)
    }
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A client inquiry for a project. Anonymous submissions are allowed:
/// `submitter` stays `None` and the contact fields carry traceability.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectRequest {
    #[serde(rename = "_id")]
    pub id: Option<ObjectId>,
    pub title: String,
    pub description: String,
    pub requirements: Option<String>,

    pub user_type: UserType,
    pub request_type: RequestType,
    pub template_id: Option<ObjectId>,
    pub complexity_level: ComplexityLevel,
    pub selected_services: Vec<ObjectId>,
    pub preferred_technologies: Vec<String>,
    pub customizations: Option<serde_json::Value>,

    pub course_category: Option<String>,
    pub academic_level: Option<String>,
    pub institution: Option<String>,

    // Budget range is what the client states, free text. The numbers
    // the business works with are estimated_cost / quoted_price.
    pub budget_range: Option<String>,
    pub preferred_deadline: Option<chrono::NaiveDate>,

    pub contact_name: String,
    pub contact_email: String,
    pub contact_phone: Option<String>,
    pub submitter: Option<ObjectId>,

    pub status: RequestStatus,
    pub estimated_cost: Option<i64>,
    pub quoted_price: Option<i64>,
    pub internal_notes: Option<String>,

    pub converted_project_id: Option<ObjectId>,

    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}
