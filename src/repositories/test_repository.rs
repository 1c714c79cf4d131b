use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::{doc, to_bson},
    options::{FindOneAndUpdateOptions, IndexOptions, ReturnDocument},
    Collection, IndexModel,
};

use crate::{
    db::{collections, Database, ListOptions, QueryFilter, SortOrder},
    errors::{AppError, AppResult},
    models::domain::Test,
};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TestFilter {
    pub course_id: Option<String>,
    pub published: Option<bool>,
    pub created_by: Option<String>,
}

impl TestFilter {
    pub fn matches(&self, test: &Test) -> bool {
        self.course_id
            .as_ref()
            .map_or(true, |id| test.course_id.as_ref() == Some(id))
            && self.published.map_or(true, |p| test.published == p)
            && self.created_by.as_ref().map_or(true, |id| &test.created_by == id)
    }

    fn to_query(&self) -> QueryFilter {
        QueryFilter::new()
            .eq_opt("course_id", self.course_id.clone())
            .eq_opt("published", self.published)
            .eq_opt("created_by", self.created_by.clone())
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TestRepository: Send + Sync {
    async fn create(&self, test: Test) -> AppResult<Test>;
    async fn find_by_id(&self, id: &str) -> AppResult<Option<Test>>;
    async fn find_by_course(&self, course_id: &str) -> AppResult<Vec<Test>>;
    async fn list(&self, filter: TestFilter, offset: i64, limit: i64) -> AppResult<(Vec<Test>, i64)>;
    async fn count(&self, filter: TestFilter) -> AppResult<i64>;
    /// Writes the editable fields of `test` and returns the stored document.
    /// `question_count` is owned by the question writes and is never set here.
    async fn update(&self, test: Test) -> AppResult<Test>;
    async fn delete(&self, id: &str) -> AppResult<()>;
    async fn set_question_count(&self, id: &str, count: i64) -> AppResult<()>;
}

pub struct MongoTestRepository {
    collection: Collection<Test>,
}

impl MongoTestRepository {
    pub fn new(db: &Database) -> Self {
        let collection = db.get_collection(collections::TESTS);
        Self { collection }
    }

    pub async fn ensure_indexes(&self) -> AppResult<()> {
        log::info!("Creating indexes for tests collection");

        let id_index = IndexModel::builder()
            .keys(doc! { "id": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("id_unique".to_string())
                    .build(),
            )
            .build();
        let course_index = IndexModel::builder().keys(doc! { "course_id": 1 }).build();

        self.collection.create_index(id_index).await?;
        self.collection.create_index(course_index).await?;

        log::info!("Successfully created indexes for tests collection");
        Ok(())
    }
}

#[async_trait]
impl TestRepository for MongoTestRepository {
    async fn create(&self, test: Test) -> AppResult<Test> {
        self.collection.insert_one(&test).await?;
        Ok(test)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<Test>> {
        let test = self.collection.find_one(doc! { "id": id }).await?;
        Ok(test)
    }

    async fn find_by_course(&self, course_id: &str) -> AppResult<Vec<Test>> {
        let cursor = self.collection.find(doc! { "course_id": course_id }).await?;
        let tests: Vec<Test> = cursor.try_collect().await?;
        Ok(tests)
    }

    async fn list(&self, filter: TestFilter, offset: i64, limit: i64) -> AppResult<(Vec<Test>, i64)> {
        let filter = filter.to_query().into_document();
        let total = self.collection.count_documents(filter.clone()).await? as i64;

        let options = ListOptions::paged(offset, limit).sort_by("created_at", SortOrder::Desc);
        let cursor = self
            .collection
            .find(filter)
            .with_options(options.to_find_options())
            .await?;
        let tests: Vec<Test> = cursor.try_collect().await?;

        Ok((tests, total))
    }

    async fn count(&self, filter: TestFilter) -> AppResult<i64> {
        let total = self
            .collection
            .count_documents(filter.to_query().into_document())
            .await?;
        Ok(total as i64)
    }

    async fn update(&self, test: Test) -> AppResult<Test> {
        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();

        let updated = self
            .collection
            .find_one_and_update(
                doc! { "id": &test.id },
                doc! {
                    "$set": {
                        "title": &test.title,
                        "description": to_bson(&test.description)?,
                        "passing_score": test.passing_score,
                        "max_attempts": test.max_attempts,
                        "time_limit_minutes": to_bson(&test.time_limit_minutes)?,
                        "published": test.published,
                        "modified_at": to_bson(&test.modified_at)?,
                    }
                },
            )
            .with_options(options)
            .await?;

        updated.ok_or_else(|| AppError::NotFound(format!("Test with id '{}' not found", test.id)))
    }

    async fn delete(&self, id: &str) -> AppResult<()> {
        let result = self.collection.delete_one(doc! { "id": id }).await?;
        if result.deleted_count == 0 {
            return Err(AppError::NotFound(format!("Test with id '{}' not found", id)));
        }
        Ok(())
    }

    async fn set_question_count(&self, id: &str, count: i64) -> AppResult<()> {
        let result = self
            .collection
            .update_one(doc! { "id": id }, doc! { "$set": { "question_count": count } })
            .await?;

        if result.matched_count == 0 {
            return Err(AppError::NotFound(format!("Test with id '{}' not found", id)));
        }
        Ok(())
    }
}
