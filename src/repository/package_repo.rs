use crate::config::mongo_conf::MongoConfig;
use crate::model::catalog::ServicePackage;
use crate::model::request::UserType;
use crate::repository::repository_error::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use bson::{doc, oid::ObjectId};
use futures::stream::TryStreamExt;
use mongodb::options::FindOptions;
use tracing::{error, info};

#[async_trait]
pub trait ServicePackageRepository: Send + Sync {
    async fn create(&self, package: ServicePackage) -> RepositoryResult<ServicePackage>;
    async fn list_active(
        &self,
        user_type: Option<UserType>,
    ) -> RepositoryResult<Vec<ServicePackage>>;

    /// Pricing lookup: only active packages scoped to the request's
    /// user type count towards the estimate. Unknown ids are simply
    /// not returned.
    async fn find_active_by_ids(
        &self,
        ids: &[ObjectId],
        user_type: UserType,
    ) -> RepositoryResult<Vec<ServicePackage>>;
}

pub struct MongoServicePackageRepository {
    collection: mongodb::Collection<ServicePackage>,
}

impl MongoServicePackageRepository {
    pub async fn new(config: &MongoConfig) -> Result<Self, mongodb::error::Error> {
        let db = crate::repository::connect(config).await?;
        let collection = db.collection::<ServicePackage>("service_packages");
        Ok(MongoServicePackageRepository { collection })
    }
}

#[async_trait]
impl ServicePackageRepository for MongoServicePackageRepository {
    #[tracing::instrument(skip(self, package), fields(name = %package.name))]
    async fn create(&self, package: ServicePackage) -> RepositoryResult<ServicePackage> {
        info!("Creating service package");
        let mut new_package = package;
        new_package.id = Some(ObjectId::new());
        let now = chrono::Utc::now().to_rfc3339();
        new_package.created_at = Some(now.clone());
        new_package.updated_at = Some(now);

        match self.collection.insert_one(new_package.clone(), None).await {
            Ok(_) => Ok(new_package),
            Err(e) => {
                error!("Failed to create service package: {}", e);
                Err(RepositoryError::from(e))
            }
        }
    }

    #[tracing::instrument(skip(self))]
    async fn list_active(
        &self,
        user_type: Option<UserType>,
    ) -> RepositoryResult<Vec<ServicePackage>> {
        let mut filter = doc! { "is_active": true };
        if let Some(user_type) = user_type {
            filter.insert("user_type", user_type.as_str());
        }
        let options = FindOptions::builder()
            .sort(doc! { "user_type": 1, "order": 1 })
            .build();
        let cursor = self
            .collection
            .find(filter, options)
            .await
            .map_err(RepositoryError::from)?;
        let packages: Vec<ServicePackage> =
            cursor.try_collect().await.map_err(RepositoryError::from)?;
        info!("Fetched {} active service packages", packages.len());
        Ok(packages)
    }

    #[tracing::instrument(skip(self, ids), fields(count = ids.len()))]
    async fn find_active_by_ids(
        &self,
        ids: &[ObjectId],
        user_type: UserType,
    ) -> RepositoryResult<Vec<ServicePackage>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let filter = doc! {
            "_id": { "$in": ids },
            "user_type": user_type.as_str(),
            "is_active": true,
        };
        let cursor = self
            .collection
            .find(filter, None)
            .await
            .map_err(RepositoryError::from)?;
        cursor.try_collect().await.map_err(RepositoryError::from)
    }
}
