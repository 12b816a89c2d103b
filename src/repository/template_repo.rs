use crate::config::mongo_conf::MongoConfig;
use crate::model::catalog::ProjectTemplate;
use crate::repository::repository_error::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use bson::{doc, oid::ObjectId};
use futures::stream::TryStreamExt;
use mongodb::options::FindOptions;
use tracing::{error, info, warn};

#[async_trait]
pub trait TemplateRepository: Send + Sync {
    async fn create(&self, template: ProjectTemplate) -> RepositoryResult<ProjectTemplate>;
    async fn get_by_id(&self, id: ObjectId) -> RepositoryResult<ProjectTemplate>;

    /// Lookup that tolerates a missing template: the pricing resolver
    /// degrades to a zero-cost default instead of failing.
    async fn find_by_id(&self, id: ObjectId) -> RepositoryResult<Option<ProjectTemplate>>;
    async fn list_active(&self) -> RepositoryResult<Vec<ProjectTemplate>>;
}

pub struct MongoTemplateRepository {
    collection: mongodb::Collection<ProjectTemplate>,
}

impl MongoTemplateRepository {
    pub async fn new(config: &MongoConfig) -> Result<Self, mongodb::error::Error> {
        let db = crate::repository::connect(config).await?;
        let collection = db.collection::<ProjectTemplate>("project_templates");
        Ok(MongoTemplateRepository { collection })
    }
}

#[async_trait]
impl TemplateRepository for MongoTemplateRepository {
    #[tracing::instrument(skip(self, template), fields(title = %template.title))]
    async fn create(&self, template: ProjectTemplate) -> RepositoryResult<ProjectTemplate> {
        info!("Creating project template");
        let mut new_template = template;
        new_template.id = Some(ObjectId::new());
        let now = chrono::Utc::now().to_rfc3339();
        new_template.created_at = Some(now.clone());
        new_template.updated_at = Some(now);

        match self.collection.insert_one(new_template.clone(), None).await {
            Ok(_) => Ok(new_template),
            Err(e) => {
                error!("Failed to create template: {}", e);
                Err(RepositoryError::from(e))
            }
        }
    }

    #[tracing::instrument(skip(self), fields(id = %id))]
    async fn get_by_id(&self, id: ObjectId) -> RepositoryResult<ProjectTemplate> {
        match self.find_by_id(id).await? {
            Some(template) => Ok(template),
            None => {
                warn!("Template not found for ID: {}", id);
                Err(RepositoryError::not_found(format!(
                    "Template not found for ID: {}",
                    id
                )))
            }
        }
    }

    #[tracing::instrument(skip(self), fields(id = %id))]
    async fn find_by_id(&self, id: ObjectId) -> RepositoryResult<Option<ProjectTemplate>> {
        let filter = doc! { "_id": id };
        self.collection
            .find_one(filter, None)
            .await
            .map_err(RepositoryError::from)
    }

    #[tracing::instrument(skip(self))]
    async fn list_active(&self) -> RepositoryResult<Vec<ProjectTemplate>> {
        let filter = doc! { "is_active": true };
        let options = FindOptions::builder()
            .sort(doc! { "is_featured": -1, "created_at": -1 })
            .build();
        let cursor = self
            .collection
            .find(filter, options)
            .await
            .map_err(RepositoryError::from)?;
        let templates: Vec<ProjectTemplate> =
            cursor.try_collect().await.map_err(RepositoryError::from)?;
        info!("Fetched {} active templates", templates.len());
        Ok(templates)
    }
}
