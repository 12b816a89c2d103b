use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::model::catalog::ProjectTemplate;
use crate::model::request::UserType;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateTemplateRequest {
    #[validate(length(min = 2, max = 255))]
    pub title: String,

    /// Defaults to a slugified title when absent.
    pub slug: Option<String>,

    #[validate(length(min = 10, max = 5000))]
    pub description: String,

    #[validate(length(min = 2, max = 100))]
    pub category: String,

    #[serde(default)]
    pub technologies: Vec<String>,

    #[serde(default)]
    pub features: Vec<String>,

    #[validate(range(min = 1))]
    pub base_price: i64,

    pub student_price: Option<i64>,
    pub client_price: Option<i64>,
    pub business_price: Option<i64>,

    #[serde(default)]
    pub is_featured: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateServicePackageRequest {
    #[validate(length(min = 2, max = 255))]
    pub name: String,

    #[validate(length(min = 2, max = 2000))]
    pub description: String,

    pub user_type: UserType,

    #[validate(range(min = 1))]
    pub price: i64,

    #[serde(default)]
    pub features: Vec<String>,

    #[serde(default)]
    pub order: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TemplateListQuery {
    /// When present, each template is annotated with the price this
    /// user type would pay.
    pub user_type: Option<UserType>,
}

/// A template with the viewer-specific resolved price.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateResponseDto {
    pub template: ProjectTemplate,
    pub price: Option<i64>,
}
