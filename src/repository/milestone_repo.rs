use crate::config::mongo_conf::MongoConfig;
use crate::model::project::{MilestoneStatus, ProjectMilestone};
use crate::repository::repository_error::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use bson::{doc, oid::ObjectId};
use futures::stream::TryStreamExt;
use mongodb::options::FindOptions;
use tracing::{error, info, warn};

#[async_trait]
pub trait MilestoneRepository: Send + Sync {
    /// Inserts the conversion batch in one call.
    async fn create_many(
        &self,
        milestones: Vec<ProjectMilestone>,
    ) -> RepositoryResult<Vec<ProjectMilestone>>;
    async fn get_by_id(&self, id: ObjectId) -> RepositoryResult<ProjectMilestone>;
    async fn list_by_project(&self, project_id: ObjectId)
        -> RepositoryResult<Vec<ProjectMilestone>>;

    /// Staff-set milestone status. Completed/paid also records the
    /// completion date; moving away from those clears it.
    async fn update_status(
        &self,
        id: ObjectId,
        status: MilestoneStatus,
    ) -> RepositoryResult<ProjectMilestone>;

    /// Removes a project's milestones. Only used to compensate a
    /// failed conversion.
    async fn delete_by_project(&self, project_id: ObjectId) -> RepositoryResult<u64>;
}

pub struct MongoMilestoneRepository {
    collection: mongodb::Collection<ProjectMilestone>,
}

impl MongoMilestoneRepository {
    pub async fn new(config: &MongoConfig) -> Result<Self, mongodb::error::Error> {
        let db = crate::repository::connect(config).await?;
        let collection = db.collection::<ProjectMilestone>("project_milestones");
        Ok(MongoMilestoneRepository { collection })
    }
}

#[async_trait]
impl MilestoneRepository for MongoMilestoneRepository {
    #[tracing::instrument(skip(self, milestones), fields(count = milestones.len()))]
    async fn create_many(
        &self,
        milestones: Vec<ProjectMilestone>,
    ) -> RepositoryResult<Vec<ProjectMilestone>> {
        info!("Creating milestone batch");
        let now = chrono::Utc::now().to_rfc3339();
        let prepared: Vec<ProjectMilestone> = milestones
            .into_iter()
            .map(|mut m| {
                m.id = Some(ObjectId::new());
                m.created_at = Some(now.clone());
                m.updated_at = Some(now.clone());
                m
            })
            .collect();

        match self.collection.insert_many(prepared.clone(), None).await {
            Ok(_) => {
                info!("Inserted {} milestones", prepared.len());
                Ok(prepared)
            }
            Err(e) => {
                error!("Failed to insert milestones: {}", e);
                Err(RepositoryError::from(e))
            }
        }
    }

    #[tracing::instrument(skip(self), fields(id = %id))]
    async fn get_by_id(&self, id: ObjectId) -> RepositoryResult<ProjectMilestone> {
        let filter = doc! { "_id": id };
        match self.collection.find_one(filter, None).await {
            Ok(Some(milestone)) => Ok(milestone),
            Ok(None) => {
                warn!("Milestone not found for ID: {}", id);
                Err(RepositoryError::not_found(format!(
                    "Milestone not found for ID: {}",
                    id
                )))
            }
            Err(e) => {
                error!("Failed to fetch milestone: {}", e);
                Err(RepositoryError::from(e))
            }
        }
    }

    #[tracing::instrument(skip(self), fields(project_id = %project_id))]
    async fn list_by_project(
        &self,
        project_id: ObjectId,
    ) -> RepositoryResult<Vec<ProjectMilestone>> {
        let filter = doc! { "project_id": project_id };
        let options = FindOptions::builder().sort(doc! { "order": 1 }).build();
        let cursor = self
            .collection
            .find(filter, options)
            .await
            .map_err(RepositoryError::from)?;
        cursor.try_collect().await.map_err(RepositoryError::from)
    }

    #[tracing::instrument(skip(self), fields(id = %id, status = %status.as_str()))]
    async fn update_status(
        &self,
        id: ObjectId,
        status: MilestoneStatus,
    ) -> RepositoryResult<ProjectMilestone> {
        info!("Updating milestone status");
        let filter = doc! { "_id": id };
        let update = if status.is_done() {
            doc! { "$set": {
                "status": status.as_str(),
                "completed_date": chrono::Utc::now().date_naive().to_string(),
                "updated_at": chrono::Utc::now().to_rfc3339(),
            }}
        } else {
            doc! {
                "$set": {
                    "status": status.as_str(),
                    "updated_at": chrono::Utc::now().to_rfc3339(),
                },
                "$unset": { "completed_date": "" },
            }
        };
        let result = self
            .collection
            .update_one(filter, update, None)
            .await
            .map_err(RepositoryError::from)?;
        if result.matched_count == 0 {
            return Err(RepositoryError::not_found(format!(
                "No milestone found to update for ID: {}",
                id
            )));
        }
        self.get_by_id(id).await
    }

    #[tracing::instrument(skip(self), fields(project_id = %project_id))]
    async fn delete_by_project(&self, project_id: ObjectId) -> RepositoryResult<u64> {
        let filter = doc! { "project_id": project_id };
        let result = self
            .collection
            .delete_many(filter, None)
            .await
            .map_err(RepositoryError::from)?;
        info!("Deleted {} milestones", result.deleted_count);
        Ok(result.deleted_count)
    }
}
