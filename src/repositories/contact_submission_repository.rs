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
    models::domain::{ContactStatus, ContactSubmission},
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContactSubmissionRepository: Send + Sync {
    async fn create(&self, submission: ContactSubmission) -> AppResult<ContactSubmission>;
    async fn find_by_id(&self, id: &str) -> AppResult<Option<ContactSubmission>>;
    async fn list(
        &self,
        status: Option<ContactStatus>,
        offset: i64,
        limit: i64,
    ) -> AppResult<(Vec<ContactSubmission>, i64)>;
    async fn count(&self, status: Option<ContactStatus>) -> AppResult<i64>;
    async fn update(&self, submission: ContactSubmission) -> AppResult<ContactSubmission>;
    async fn delete(&self, id: &str) -> AppResult<()>;
}

pub struct MongoContactSubmissionRepository {
    collection: Collection<ContactSubmission>,
}

impl MongoContactSubmissionRepository {
    pub fn new(db: &Database) -> Self {
        let collection = db.get_collection(collections::CONTACT_SUBMISSIONS);
        Self { collection }
    }

    pub async fn ensure_indexes(&self) -> AppResult<()> {
        let id_index = IndexModel::builder()
            .keys(doc! { "id": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        self.collection.create_index(id_index).await?;
        log::info!("Created unique index on contact_submissions.id");
        Ok(())
    }

    fn status_filter(status: Option<ContactStatus>) -> AppResult<QueryFilter> {
        let filter = match status {
            Some(status) => QueryFilter::new().eq("status", to_bson(&status)?),
            None => QueryFilter::new(),
        };
        Ok(filter)
    }
}

#[async_trait]
impl ContactSubmissionRepository for MongoContactSubmissionRepository {
    async fn create(&self, submission: ContactSubmission) -> AppResult<ContactSubmission> {
        self.collection.insert_one(&submission).await?;
        Ok(submission)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<ContactSubmission>> {
        let submission = self.collection.find_one(doc! { "id": id }).await?;
        Ok(submission)
    }

    async fn list(
        &self,
        status: Option<ContactStatus>,
        offset: i64,
        limit: i64,
    ) -> AppResult<(Vec<ContactSubmission>, i64)> {
        let filter = Self::status_filter(status)?.into_document();
        let total = self.collection.count_documents(filter.clone()).await? as i64;

        let options = ListOptions::paged(offset, limit).sort_by("created_at", SortOrder::Desc);
        let cursor = self
            .collection
            .find(filter)
            .with_options(options.to_find_options())
            .await?;
        let items: Vec<ContactSubmission> = cursor.try_collect().await?;

        Ok((items, total))
    }

    async fn count(&self, status: Option<ContactStatus>) -> AppResult<i64> {
        let filter = Self::status_filter(status)?.into_document();
        Ok(self.collection.count_documents(filter).await? as i64)
    }

    async fn update(&self, submission: ContactSubmission) -> AppResult<ContactSubmission> {
        let options = ReplaceOptions::builder().upsert(false).build();

        let result = self
            .collection
            .replace_one(doc! { "id": &submission.id }, &submission)
            .with_options(options)
            .await?;

        if result.matched_count == 0 {
            return Err(AppError::NotFound(format!(
                "Contact submission with id '{}' not found",
                submission.id
            )));
        }

        Ok(submission)
    }

    async fn delete(&self, id: &str) -> AppResult<()> {
        let result = self.collection.delete_one(doc! { "id": id }).await?;
        if result.deleted_count == 0 {
            return Err(AppError::NotFound(format!(
                "Contact submission with id '{}' not found",
                id
            )));
        }
        Ok(())
    }
}
