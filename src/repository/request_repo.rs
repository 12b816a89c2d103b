use crate::config::mongo_conf::MongoConfig;
use crate::model::request::{ProjectRequest, RequestStatus, RequestType, UserType};
use crate::repository::repository_error::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use bson::{doc, oid::ObjectId, Document};
use futures::stream::TryStreamExt;
use mongodb::options::{FindOneAndUpdateOptions, FindOptions, ReturnDocument};
use tracing::{error, info, warn};

/// Optional filters for staff request listings.
#[derive(Debug, Clone, Default)]
pub struct RequestListFilter {
    pub status: Option<RequestStatus>,
    pub user_type: Option<UserType>,
    pub request_type: Option<RequestType>,
}

impl RequestListFilter {
    fn to_document(&self) -> Document {
        let mut filter = doc! {};
        if let Some(status) = self.status {
            filter.insert("status", status.as_str());
        }
        if let Some(user_type) = self.user_type {
            filter.insert("user_type", user_type.as_str());
        }
        if let Some(request_type) = self.request_type {
            filter.insert("request_type", request_type.as_str());
        }
        filter
    }
}

#[async_trait]
pub trait ProjectRequestRepository: Send + Sync {
    async fn create(&self, request: ProjectRequest) -> RepositoryResult<ProjectRequest>;
    async fn get_by_id(&self, id: ObjectId) -> RepositoryResult<ProjectRequest>;
    async fn list(
        &self,
        filter: RequestListFilter,
        page: u32,
        limit: u32,
    ) -> RepositoryResult<Vec<ProjectRequest>>;

    /// Conditional status write: only succeeds while the stored status
    /// still equals `from`. Returns None when another writer got there
    /// first or the request does not exist.
    async fn transition_status(
        &self,
        id: ObjectId,
        from: RequestStatus,
        to: RequestStatus,
    ) -> RepositoryResult<Option<ProjectRequest>>;

    /// Transition reviewing -> quoted and record the quoted price in
    /// the same write.
    async fn apply_quote(
        &self,
        id: ObjectId,
        quoted_price: i64,
    ) -> RepositoryResult<Option<ProjectRequest>>;

    /// Transition pending/reviewing -> rejected, optionally recording a
    /// staff note.
    async fn apply_rejection(
        &self,
        id: ObjectId,
        from: RequestStatus,
        note: Option<String>,
    ) -> RepositoryResult<Option<ProjectRequest>>;

    /// Resubmission: rejected -> pending, clearing the stale quote.
    async fn reset_to_pending(&self, id: ObjectId) -> RepositoryResult<Option<ProjectRequest>>;

    /// The conversion compare-and-swap. Matches only an approved,
    /// unconverted request; sets status = converted and the project
    /// back-reference in one atomic update. Returns None when the
    /// request was already converted (or raced with another convert).
    async fn mark_converted(
        &self,
        id: ObjectId,
        project_id: ObjectId,
    ) -> RepositoryResult<Option<ProjectRequest>>;

    /// Compensation for a conversion that failed after the CAS: puts
    /// the request back to approved and clears the back-reference.
    async fn revert_conversion(&self, id: ObjectId) -> RepositoryResult<Option<ProjectRequest>>;
}

pub struct MongoProjectRequestRepository {
    collection: mongodb::Collection<ProjectRequest>,
}

impl MongoProjectRequestRepository {
    pub async fn new(config: &MongoConfig) -> Result<Self, mongodb::error::Error> {
        let db = crate::repository::connect(config).await?;
        let collection_name = config
            .request_collection
            .as_deref()
            .unwrap_or("project_requests");
        let collection = db.collection::<ProjectRequest>(collection_name);
        Ok(MongoProjectRequestRepository { collection })
    }

    async fn find_and_update(
        &self,
        filter: Document,
        update: Document,
    ) -> RepositoryResult<Option<ProjectRequest>> {
        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();
        self.collection
            .find_one_and_update(filter, update, options)
            .await
            .map_err(RepositoryError::from)
    }
}

#[async_trait]
impl ProjectRequestRepository for MongoProjectRequestRepository {
    #[tracing::instrument(skip(self, request), fields(title = %request.title))]
    async fn create(&self, request: ProjectRequest) -> RepositoryResult<ProjectRequest> {
        info!("Creating new project request");
        let mut new_request = request;
        new_request.id = Some(ObjectId::new());
        new_request.status = RequestStatus::Pending;
        let now = chrono::Utc::now().to_rfc3339();
        new_request.created_at = Some(now.clone());
        new_request.updated_at = Some(now);

        match self.collection.insert_one(new_request.clone(), None).await {
            Ok(_) => {
                info!("Project request created successfully");
                Ok(new_request)
            }
            Err(e) => {
                error!("Failed to create project request: {}", e);
                Err(RepositoryError::from(e))
            }
        }
    }

    #[tracing::instrument(skip(self), fields(id = %id))]
    async fn get_by_id(&self, id: ObjectId) -> RepositoryResult<ProjectRequest> {
        let filter = doc! { "_id": id };
        match self.collection.find_one(filter, None).await {
            Ok(Some(request)) => Ok(request),
            Ok(None) => {
                warn!("Project request not found for ID: {}", id);
                Err(RepositoryError::not_found(format!(
                    "Project request not found for ID: {}",
                    id
                )))
            }
            Err(e) => {
                error!("Failed to fetch project request: {}", e);
                Err(RepositoryError::from(e))
            }
        }
    }

    #[tracing::instrument(skip(self), fields(page = page, limit = limit))]
    async fn list(
        &self,
        filter: RequestListFilter,
        page: u32,
        limit: u32,
    ) -> RepositoryResult<Vec<ProjectRequest>> {
        let skip = (page.saturating_sub(1) as u64) * limit as u64;
        let options = FindOptions::builder()
            .sort(doc! { "created_at": -1 })
            .skip(skip)
            .limit(limit as i64)
            .build();
        let cursor = self
            .collection
            .find(filter.to_document(), options)
            .await
            .map_err(RepositoryError::from)?;
        let requests: Vec<ProjectRequest> =
            cursor.try_collect().await.map_err(RepositoryError::from)?;
        info!("Fetched {} project requests", requests.len());
        Ok(requests)
    }

    #[tracing::instrument(skip(self), fields(id = %id, from = %from, to = %to))]
    async fn transition_status(
        &self,
        id: ObjectId,
        from: RequestStatus,
        to: RequestStatus,
    ) -> RepositoryResult<Option<ProjectRequest>> {
        info!("Transitioning request status");
        let filter = doc! { "_id": id, "status": from.as_str() };
        let update = doc! { "$set": {
            "status": to.as_str(),
            "updated_at": chrono::Utc::now().to_rfc3339(),
        }};
        self.find_and_update(filter, update).await
    }

    #[tracing::instrument(skip(self), fields(id = %id, quoted_price = quoted_price))]
    async fn apply_quote(
        &self,
        id: ObjectId,
        quoted_price: i64,
    ) -> RepositoryResult<Option<ProjectRequest>> {
        info!("Recording quote for request");
        let filter = doc! { "_id": id, "status": RequestStatus::Reviewing.as_str() };
        let update = doc! { "$set": {
            "status": RequestStatus::Quoted.as_str(),
            "quoted_price": quoted_price,
            "updated_at": chrono::Utc::now().to_rfc3339(),
        }};
        self.find_and_update(filter, update).await
    }

    #[tracing::instrument(skip(self, note), fields(id = %id, from = %from))]
    async fn apply_rejection(
        &self,
        id: ObjectId,
        from: RequestStatus,
        note: Option<String>,
    ) -> RepositoryResult<Option<ProjectRequest>> {
        info!("Rejecting request");
        let filter = doc! { "_id": id, "status": from.as_str() };
        let mut set = doc! {
            "status": RequestStatus::Rejected.as_str(),
            "updated_at": chrono::Utc::now().to_rfc3339(),
        };
        if let Some(note) = note {
            set.insert("internal_notes", note);
        }
        self.find_and_update(filter, doc! { "$set": set }).await
    }

    #[tracing::instrument(skip(self), fields(id = %id))]
    async fn reset_to_pending(&self, id: ObjectId) -> RepositoryResult<Option<ProjectRequest>> {
        info!("Resubmitting rejected request");
        let filter = doc! { "_id": id, "status": RequestStatus::Rejected.as_str() };
        let update = doc! {
            "$set": {
                "status": RequestStatus::Pending.as_str(),
                "updated_at": chrono::Utc::now().to_rfc3339(),
            },
            "$unset": { "quoted_price": "" },
        };
        self.find_and_update(filter, update).await
    }

    #[tracing::instrument(skip(self), fields(id = %id, project_id = %project_id))]
    async fn mark_converted(
        &self,
        id: ObjectId,
        project_id: ObjectId,
    ) -> RepositoryResult<Option<ProjectRequest>> {
        info!("Marking request as converted");
        // The exactly-once guard: status and the null back-reference
        // are both part of the match, so a concurrent convert can win
        // at most once.
        let filter = doc! {
            "_id": id,
            "status": RequestStatus::Approved.as_str(),
            "converted_project_id": bson::Bson::Null,
        };
        let update = doc! { "$set": {
            "status": RequestStatus::Converted.as_str(),
            "converted_project_id": project_id,
            "updated_at": chrono::Utc::now().to_rfc3339(),
        }};
        self.find_and_update(filter, update).await
    }

    #[tracing::instrument(skip(self), fields(id = %id))]
    async fn revert_conversion(&self, id: ObjectId) -> RepositoryResult<Option<ProjectRequest>> {
        warn!("Reverting conversion for request {}", id);
        let filter = doc! { "_id": id, "status": RequestStatus::Converted.as_str() };
        let update = doc! {
            "$set": {
                "status": RequestStatus::Approved.as_str(),
                "converted_project_id": bson::Bson::Null,
                "updated_at": chrono::Utc::now().to_rfc3339(),
            },
        };
        self.find_and_update(filter, update).await
    }
}
