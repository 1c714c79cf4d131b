use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::{doc, to_bson},
    options::{IndexOptions, ReplaceOptions},
    Collection, IndexModel,
};

use crate::{
    db::{collections, Database, ListOptions, QueryFilter, SortOrder},
    errors::{AppError, AppResult},
    models::domain::{ResumeStatus, ResumeSubmission},
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ResumeSubmissionRepository: Send + Sync {
    async fn create(&self, submission: ResumeSubmission) -> AppResult<ResumeSubmission>;
    async fn find_by_id(&self, id: &str) -> AppResult<Option<ResumeSubmission>>;
    async fn list(
        &self,
        status: Option<ResumeStatus>,
        offset: i64,
        limit: i64,
    ) -> AppResult<(Vec<ResumeSubmission>, i64)>;
    async fn count(&self, status: Option<ResumeStatus>) -> AppResult<i64>;
    async fn update(&self, submission: ResumeSubmission) -> AppResult<ResumeSubmission>;
    async fn delete(&self, id: &str) -> AppResult<()>;
}

pub struct MongoResumeSubmissionRepository {
    collection: Collection<ResumeSubmission>,
}

impl MongoResumeSubmissionRepository {
    pub fn new(db: &Database) -> Self {
        let collection = db.get_collection(collections::RESUME_SUBMISSIONS);
        Self { collection }
    }

    pub async fn ensure_indexes(&self) -> AppResult<()> {
        let id_index = IndexModel::builder()
            .keys(doc! { "id": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        let status_index = IndexModel::builder().keys(doc! { "status": 1 }).build();

        self.collection.create_index(id_index).await?;
        self.collection.create_index(status_index).await?;
        log::info!("Created indexes on resume_submissions.id and resume_submissions.status");
        Ok(())
    }
}

#[async_trait]
impl ResumeSubmissionRepository for MongoResumeSubmissionRepository {
    async fn create(&self, submission: ResumeSubmission) -> AppResult<ResumeSubmission> {
        self.collection.insert_one(&submission).await?;
        Ok(submission)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<ResumeSubmission>> {
        let submission = self.collection.find_one(doc! { "id": id }).await?;
        Ok(submission)
    }

    async fn list(
        &self,
        status: Option<ResumeStatus>,
        offset: i64,
        limit: i64,
    ) -> AppResult<(Vec<ResumeSubmission>, i64)> {
        let mut filter = QueryFilter::new();
        if let Some(status) = status {
            filter = filter.eq("status", to_bson(&status)?);
        }
        let filter = filter.into_document();
        let total = self.collection.count_documents(filter.clone()).await? as i64;

        let options = ListOptions::paged(offset, limit).sort_by("created_at", SortOrder::Desc);
        let cursor = self
            .collection
            .find(filter)
            .with_options(options.to_find_options())
            .await?;
        let items: Vec<ResumeSubmission> = cursor.try_collect().await?;

        Ok((items, total))
    }

    async fn count(&self, status: Option<ResumeStatus>) -> AppResult<i64> {
        let filter = match status {
            Some(status) => doc! { "status": status.as_str() },
            None => doc! {},
        };
        Ok(self.collection.count_documents(filter).await? as i64)
    }

    async fn update(&self, submission: ResumeSubmission) -> AppResult<ResumeSubmission> {
        let options = ReplaceOptions::builder().upsert(false).build();

        let result = self
            .collection
            .replace_one(doc! { "id": &submission.id }, &submission)
            .with_options(options)
            .await?;

        if result.matched_count == 0 {
            return Err(AppError::NotFound(format!(
                "Resume submission with id '{}' not found",
                submission.id
            )));
        }

        Ok(submission)
    }

    async fn delete(&self, id: &str) -> AppResult<()> {
        let result = self.collection.delete_one(doc! { "id": id }).await?;
        if result.deleted_count == 0 {
            return Err(AppError::NotFound(format!(
                "Resume submission with id '{}' not found",
                id
            )));
        }
        Ok(())
    }
}
