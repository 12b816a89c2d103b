use serde::{Deserialize, Serialize};

use crate::model::request::{RequestType, UserType};

/// Public cost-calculator payload. Everything is optional and parsed
/// leniently: unknown user types fall back to student, unknown
/// complexity to medium, a missing request type to "new".
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct EstimateRequestBody {
    pub user_type: Option<String>,
    pub request_type: Option<String>,
    pub template_id: Option<String>,
    pub complexity_level: Option<String>,
    #[serde(default)]
    pub selected_services: Vec<String>,
}

/// The resolved estimate. `template_found = false` signals that a
/// referenced template was missing and the base cost degraded to zero.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceQuote {
    pub estimated_cost: i64,
    pub user_type: UserType,
    pub request_type: RequestType,
    pub template_found: bool,
}
