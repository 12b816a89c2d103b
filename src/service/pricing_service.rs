use std::sync::Arc;

use bson::oid::ObjectId;
use tracing::{info, instrument, warn};

use crate::dto::pricing_dto::PriceQuote;
use crate::model::request::{ComplexityLevel, RequestType, UserType};
use crate::repository::package_repo::ServicePackageRepository;
use crate::repository::template_repo::TemplateRepository;
use crate::util::error::ServiceError;

/// Resolves an estimated cost from the catalog.
///
/// Template-based ("existing") requests start from the template's
/// per-user-type price; custom ("new") requests start from zero and get
/// the complexity multiplier applied at the end. Service packages are
/// always additive and only count when active and scoped to the same
/// user type.
pub struct PricingResolver {
    template_repo: Arc<dyn TemplateRepository>,
    package_repo: Arc<dyn ServicePackageRepository>,
}

impl PricingResolver {
    pub fn new(
        template_repo: Arc<dyn TemplateRepository>,
        package_repo: Arc<dyn ServicePackageRepository>,
    ) -> Self {
        PricingResolver {
            template_repo,
            package_repo,
        }
    }

    #[instrument(skip(self, selected_services), fields(user_type = %user_type.as_str()))]
    pub async fn resolve(
        &self,
        user_type: UserType,
        request_type: RequestType,
        template_id: Option<ObjectId>,
        complexity_level: ComplexityLevel,
        selected_services: &[ObjectId],
    ) -> Result<PriceQuote, ServiceError> {
        let mut base_cost: i64 = 0;
        let mut template_found = true;

        if request_type == RequestType::Existing {
            if let Some(template_id) = template_id {
                match self.template_repo.find_by_id(template_id).await? {
                    Some(template) => {
                        base_cost = template.price_for_user_type(user_type);
                    }
                    None => {
                        // Recoverable: degrade to a zero base cost but
                        // flag it so the caller can tell.
                        warn!("Template {} not found, defaulting base cost to 0", template_id);
                        template_found = false;
                    }
                }
            }
        }

        let packages = self
            .package_repo
            .find_active_by_ids(selected_services, user_type)
            .await?;
        let service_cost: i64 = packages.iter().map(|p| p.price).sum();
        base_cost += service_cost;

        if request_type == RequestType::New {
            base_cost = (base_cost as f64 * complexity_level.multiplier()) as i64;
        }

        info!(
            estimated_cost = base_cost,
            template_found, "Resolved price estimate"
        );

        Ok(PriceQuote {
            estimated_cost: base_cost,
            user_type,
            request_type,
            template_found,
        })
    }
}
