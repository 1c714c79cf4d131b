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
    models::domain::{AttemptStatus, TestAttempt},
};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttemptFilter {
    pub user_id: Option<String>,
    pub test_id: Option<String>,
}

impl AttemptFilter {
    pub fn matches(&self, attempt: &TestAttempt) -> bool {
        self.user_id.as_ref().map_or(true, |id| &attempt.user_id == id)
            && self.test_id.as_ref().map_or(true, |id| &attempt.test_id == id)
    }

    fn to_query(&self) -> QueryFilter {
        QueryFilter::new()
            .eq_opt("user_id", self.user_id.clone())
            .eq_opt("test_id", self.test_id.clone())
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TestAttemptRepository: Send + Sync {
    async fn create(&self, attempt: TestAttempt) -> AppResult<TestAttempt>;
    async fn find_by_id(&self, id: &str) -> AppResult<Option<TestAttempt>>;
    async fn find_in_progress(&self, user_id: &str, test_id: &str) -> AppResult<Option<TestAttempt>>;
    /// Attempts of any status the user has made on the test.
    async fn count_user_attempts(&self, user_id: &str, test_id: &str) -> AppResult<i64>;
    /// Newest first.
    async fn list(
        &self,
        filter: AttemptFilter,
        offset: i64,
        limit: i64,
    ) -> AppResult<(Vec<TestAttempt>, i64)>;
    async fn update(&self, attempt: TestAttempt) -> AppResult<TestAttempt>;
    async fn delete_by_test(&self, test_id: &str) -> AppResult<u64>;
}

pub struct MongoTestAttemptRepository {
    collection: Collection<TestAttempt>,
}

impl MongoTestAttemptRepository {
    pub fn new(db: &Database) -> Self {
        let collection = db.get_collection(collections::TEST_ATTEMPTS);
        Self { collection }
    }

    pub async fn ensure_indexes(&self) -> AppResult<()> {
        let id_index = IndexModel::builder()
            .keys(doc! { "id": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        let owner_index = IndexModel::builder()
            .keys(doc! { "user_id": 1, "test_id": 1 })
            .build();

        self.collection.create_index(id_index).await?;
        self.collection.create_index(owner_index).await?;
        log::info!("Created indexes on test_attempts.id and test_attempts.(user_id, test_id)");

        Ok(())
    }
}

#[async_trait]
impl TestAttemptRepository for MongoTestAttemptRepository {
    async fn create(&self, attempt: TestAttempt) -> AppResult<TestAttempt> {
        self.collection.insert_one(&attempt).await?;
        Ok(attempt)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<TestAttempt>> {
        let attempt = self.collection.find_one(doc! { "id": id }).await?;
        Ok(attempt)
    }

    async fn find_in_progress(&self, user_id: &str, test_id: &str) -> AppResult<Option<TestAttempt>> {
        let status = to_bson(&AttemptStatus::InProgress)?;
        let attempt = self
            .collection
            .find_one(doc! { "user_id": user_id, "test_id": test_id, "status": status })
            .await?;
        Ok(attempt)
    }

    async fn count_user_attempts(&self, user_id: &str, test_id: &str) -> AppResult<i64> {
        let count = self
            .collection
            .count_documents(doc! { "user_id": user_id, "test_id": test_id })
            .await?;
        Ok(count as i64)
    }

    async fn list(
        &self,
        filter: AttemptFilter,
        offset: i64,
        limit: i64,
    ) -> AppResult<(Vec<TestAttempt>, i64)> {
        let filter = filter.to_query().into_document();
        let total = self.collection.count_documents(filter.clone()).await? as i64;

        let options = ListOptions::paged(offset, limit).sort_by("started_at", SortOrder::Desc);
        let cursor = self
            .collection
            .find(filter)
            .with_options(options.to_find_options())
            .await?;
        let attempts: Vec<TestAttempt> = cursor.try_collect().await?;

        Ok((attempts, total))
    }

    async fn update(&self, attempt: TestAttempt) -> AppResult<TestAttempt> {
        let options = ReplaceOptions::builder().upsert(false).build();

        let result = self
            .collection
            .replace_one(doc! { "id": &attempt.id }, &attempt)
            .with_options(options)
            .await?;

        if result.matched_count == 0 {
            return Err(AppError::NotFound(format!(
                "Attempt with id '{}' not found",
                attempt.id
            )));
        }

        Ok(attempt)
    }

    async fn delete_by_test(&self, test_id: &str) -> AppResult<u64> {
        let result = self
            .collection
            .delete_many(doc! { "test_id": test_id })
            .await?;
        Ok(result.deleted_count)
    }
}
