use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::model::request::UserType;

/// A ready-made project offering with per-user-type pricing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectTemplate {
    #[serde(rename = "_id")]
    pub id: Option<ObjectId>,
    pub title: String,
    pub slug: String,
    pub description: String,
    pub category: String,
    pub technologies: Vec<String>,
    pub features: Vec<String>,

    pub base_price: i64,
    pub student_price: Option<i64>,
    pub client_price: Option<i64>,
    pub business_price: Option<i64>,

    pub is_active: bool,
    pub is_featured: bool,

    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl ProjectTemplate {
    /// Per-user-type override when present, else the base price.
    pub fn price_for_user_type(&self, user_type: UserType) -> i64 {
        let override_price = match user_type {
            UserType::Student => self.student_price,
            UserType::Client => self.client_price,
            UserType::Business => self.business_price,
        };
        override_price.unwrap_or(self.base_price)
    }
}

/// An add-on service scoped to one user type. Package prices are
/// additive on top of the template or custom base cost, never a
/// multiplier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServicePackage {
    #[serde(rename = "_id")]
    pub id: Option<ObjectId>,
    pub name: String,
    pub description: String,
    pub user_type: UserType,
    pub price: i64,
    pub features: Vec<String>,
    pub is_active: bool,
    pub order: u32,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}
