use std::sync::Arc;

use async_trait::async_trait;
use bson::oid::ObjectId;
use tracing::{info, instrument};

use crate::dto::catalog_dto::{
    CreateServicePackageRequest, CreateTemplateRequest, TemplateResponseDto,
};
use crate::model::catalog::{ProjectTemplate, ServicePackage};
use crate::model::request::UserType;
use crate::repository::package_repo::ServicePackageRepository;
use crate::repository::template_repo::TemplateRepository;
use crate::util::error::ServiceError;

/// Lowercases and strips the title down to `a-z0-9-`.
fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut last_dash = true;
    for c in title.chars() {
        let c = c.to_ascii_lowercase();
        if c.is_ascii_alphanumeric() {
            slug.push(c);
            last_dash = false;
        } else if !last_dash {
            slug.push('-');
            last_dash = true;
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

#[async_trait]
pub trait CatalogService: Send + Sync {
    async fn create_template(
        &self,
        dto: CreateTemplateRequest,
    ) -> Result<ProjectTemplate, ServiceError>;

    /// Active templates, optionally annotated with the price the
    /// given user type would pay.
    async fn list_templates(
        &self,
        user_type: Option<UserType>,
    ) -> Result<Vec<TemplateResponseDto>, ServiceError>;

    async fn get_template(
        &self,
        id: ObjectId,
        user_type: Option<UserType>,
    ) -> Result<TemplateResponseDto, ServiceError>;

    async fn create_package(
        &self,
        dto: CreateServicePackageRequest,
    ) -> Result<ServicePackage, ServiceError>;

    async fn list_packages(
        &self,
        user_type: Option<UserType>,
    ) -> Result<Vec<ServicePackage>, ServiceError>;
}

pub struct CatalogServiceImpl {
    pub template_repo: Arc<dyn TemplateRepository>,
    pub package_repo: Arc<dyn ServicePackageRepository>,
}

impl CatalogServiceImpl {
    pub fn new(
        template_repo: Arc<dyn TemplateRepository>,
        package_repo: Arc<dyn ServicePackageRepository>,
    ) -> Self {
        CatalogServiceImpl {
            template_repo,
            package_repo,
        }
    }

    fn annotate(template: ProjectTemplate, user_type: Option<UserType>) -> TemplateResponseDto {
        let price = user_type.map(|ut| template.price_for_user_type(ut));
        TemplateResponseDto { template, price }
    }
}

#[async_trait]
impl CatalogService for CatalogServiceImpl {
    #[instrument(skip(self, dto), fields(title = %dto.title))]
    async fn create_template(
        &self,
        dto: CreateTemplateRequest,
    ) -> Result<ProjectTemplate, ServiceError> {
        info!("Creating project template");
        let slug = match dto.slug {
            Some(slug) => slug,
            None => slugify(&dto.title),
        };
        if slug.is_empty() {
            return Err(ServiceError::InvalidInput(
                "Template slug cannot be empty".to_string(),
            ));
        }

        let template = ProjectTemplate {
            id: None,
            title: dto.title,
            slug,
            description: dto.description,
            category: dto.category,
            technologies: dto.technologies,
            features: dto.features,
            base_price: dto.base_price,
            student_price: dto.student_price,
            client_price: dto.client_price,
            business_price: dto.business_price,
            is_active: true,
            is_featured: dto.is_featured,
            created_at: None,
            updated_at: None,
        };
        Ok(self.template_repo.create(template).await?)
    }

    async fn list_templates(
        &self,
        user_type: Option<UserType>,
    ) -> Result<Vec<TemplateResponseDto>, ServiceError> {
        let templates = self.template_repo.list_active().await?;
        Ok(templates
            .into_iter()
            .map(|t| Self::annotate(t, user_type))
            .collect())
    }

    async fn get_template(
        &self,
        id: ObjectId,
        user_type: Option<UserType>,
    ) -> Result<TemplateResponseDto, ServiceError> {
        let template = self.template_repo.get_by_id(id).await?;
        Ok(Self::annotate(template, user_type))
    }

    #[instrument(skip(self, dto), fields(name = %dto.name))]
    async fn create_package(
        &self,
        dto: CreateServicePackageRequest,
    ) -> Result<ServicePackage, ServiceError> {
        info!("Creating service package");
        let package = ServicePackage {
            id: None,
            name: dto.name,
            description: dto.description,
            user_type: dto.user_type,
            price: dto.price,
            features: dto.features,
            is_active: true,
            order: dto.order,
            created_at: None,
            updated_at: None,
        };
        Ok(self.package_repo.create(package).await?)
    }

    async fn list_packages(
        &self,
        user_type: Option<UserType>,
    ) -> Result<Vec<ServicePackage>, ServiceError> {
        Ok(self.package_repo.list_active(user_type).await?)
    }
}
