use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::model::request::{RequestStatus, RequestType, UserType};

/// Public intake payload. `user_type` and `request_type` must be valid
/// enum values; complexity is parsed leniently and degrades to medium.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateProjectRequestRequest {
    #[validate(length(min = 2, max = 255))]
    pub title: String,

    #[validate(length(min = 10, max = 5000))]
    pub description: String,

    pub requirements: Option<String>,

    pub user_type: UserType,
    pub request_type: RequestType,

    /// Hex ObjectId of the catalog template, for "existing" requests.
    pub template_id: Option<String>,

    pub complexity_level: Option<String>,

    #[serde(default)]
    pub selected_services: Vec<String>,

    #[serde(default)]
    pub preferred_technologies: Vec<String>,

    pub customizations: Option<serde_json::Value>,

    pub course_category: Option<String>,
    pub academic_level: Option<String>,
    pub institution: Option<String>,

    #[validate(length(max = 100))]
    pub budget_range: Option<String>,

    pub preferred_deadline: Option<chrono::NaiveDate>,

    #[validate(length(min = 2, max = 100))]
    pub contact_name: String,

    #[validate(email)]
    pub contact_email: String,

    #[validate(length(min = 6, max = 20))]
    pub contact_phone: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct QuoteRequestBody {
    #[validate(range(min = 1))]
    pub quoted_price: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RejectRequestBody {
    #[validate(length(max = 2000))]
    pub note: Option<String>,
}

/// Staff supply the project schedule at conversion time; milestone due
/// dates are derived from it. Both dates optional.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConvertRequestBody {
    pub start_date: Option<chrono::NaiveDate>,
    pub end_date: Option<chrono::NaiveDate>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RequestListQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub status: Option<RequestStatus>,
    pub user_type: Option<UserType>,
    pub request_type: Option<RequestType>,
}
