use crate::config::mongo_conf::MongoConfig;
use crate::model::project::{Project, ProjectStatus};
use crate::repository::repository_error::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use bson::{doc, oid::ObjectId};
use futures::stream::TryStreamExt;
use mongodb::options::FindOptions;
use tracing::{error, info, warn};

#[async_trait]
pub trait ProjectRepository: Send + Sync {
    async fn create(&self, project: Project) -> RepositoryResult<Project>;
    async fn get_by_id(&self, id: ObjectId) -> RepositoryResult<Project>;
    async fn list(
        &self,
        status: Option<ProjectStatus>,
        page: u32,
        limit: u32,
    ) -> RepositoryResult<Vec<Project>>;
    async fn update_progress(&self, id: ObjectId, progress: u32) -> RepositoryResult<Project>;

    /// Removes a project. Only used to compensate a failed conversion.
    async fn delete(&self, id: ObjectId) -> RepositoryResult<()>;
}

pub struct MongoProjectRepository {
    collection: mongodb::Collection<Project>,
}

impl MongoProjectRepository {
    pub async fn new(config: &MongoConfig) -> Result<Self, mongodb::error::Error> {
        let db = crate::repository::connect(config).await?;
        let collection = db.collection::<Project>("projects");
        Ok(MongoProjectRepository { collection })
    }
}

#[async_trait]
impl ProjectRepository for MongoProjectRepository {
    #[tracing::instrument(skip(self, project), fields(title = %project.title))]
    async fn create(&self, project: Project) -> RepositoryResult<Project> {
        info!("Creating new project");
        let mut new_project = project;
        new_project.id = Some(ObjectId::new());
        let now = chrono::Utc::now().to_rfc3339();
        new_project.created_at = Some(now.clone());
        new_project.updated_at = Some(now);

        match self.collection.insert_one(new_project.clone(), None).await {
            Ok(_) => {
                info!("Project created successfully");
                Ok(new_project)
            }
            Err(e) => {
                error!("Failed to create project: {}", e);
                Err(RepositoryError::from(e))
            }
        }
    }

    #[tracing::instrument(skip(self), fields(id = %id))]
    async fn get_by_id(&self, id: ObjectId) -> RepositoryResult<Project> {
        let filter = doc! { "_id": id };
        match self.collection.find_one(filter, None).await {
            Ok(Some(project)) => Ok(project),
            Ok(None) => {
                warn!("Project not found for ID: {}", id);
                Err(RepositoryError::not_found(format!(
                    "Project not found for ID: {}",
                    id
                )))
            }
            Err(e) => {
                error!("Failed to fetch project: {}", e);
                Err(RepositoryError::from(e))
            }
        }
    }

    #[tracing::instrument(skip(self), fields(page = page, limit = limit))]
    async fn list(
        &self,
        status: Option<ProjectStatus>,
        page: u32,
        limit: u32,
    ) -> RepositoryResult<Vec<Project>> {
        let mut filter = doc! {};
        if let Some(status) = status {
            filter.insert("status", status.as_str());
        }
        let skip = (page.saturating_sub(1) as u64) * limit as u64;
        let options = FindOptions::builder()
            .sort(doc! { "created_at": -1 })
            .skip(skip)
            .limit(limit as i64)
            .build();
        let cursor = self
            .collection
            .find(filter, options)
            .await
            .map_err(RepositoryError::from)?;
        let projects: Vec<Project> = cursor.try_collect().await.map_err(RepositoryError::from)?;
        info!("Fetched {} projects", projects.len());
        Ok(projects)
    }

    #[tracing::instrument(skip(self), fields(id = %id, progress = progress))]
    async fn update_progress(&self, id: ObjectId, progress: u32) -> RepositoryResult<Project> {
        // Clamped here as well so no write path can exceed the bound.
        let progress = progress.min(100);
        let filter = doc! { "_id": id };
        let update = doc! { "$set": {
            "progress_percentage": progress,
            "updated_at": chrono::Utc::now().to_rfc3339(),
        }};
        let result = self
            .collection
            .update_one(filter, update, None)
            .await
            .map_err(RepositoryError::from)?;
        if result.matched_count == 0 {
            return Err(RepositoryError::not_found(format!(
                "No project found to update for ID: {}",
                id
            )));
        }
        self.get_by_id(id).await
    }

    #[tracing::instrument(skip(self), fields(id = %id))]
    async fn delete(&self, id: ObjectId) -> RepositoryResult<()> {
        info!("Deleting project");
        let filter = doc! { "_id": id };
        let result = self
            .collection
            .delete_one(filter, None)
            .await
            .map_err(RepositoryError::from)?;
        if result.deleted_count == 0 {
            warn!("No project found to delete for ID: {}", id);
            return Err(RepositoryError::not_found(format!(
                "No project found to delete for ID: {}",
                id
            )));
        }
        Ok(())
    }
}
