use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::doc,
    options::{FindOptions, IndexOptions, ReplaceOptions},
    Collection, IndexModel,
};

use crate::{
    db::{collections, Database},
    errors::{AppError, AppResult},
    models::domain::Lesson,
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LessonRepository: Send + Sync {
    async fn create(&self, lesson: Lesson) -> AppResult<Lesson>;
    async fn find_by_id(&self, id: &str) -> AppResult<Option<Lesson>>;
    /// All lessons of a course, sub-lessons included, ordered by `order_number`.
    async fn list_by_course(&self, course_id: &str) -> AppResult<Vec<Lesson>>;
    async fn count_by_course(&self, course_id: &str) -> AppResult<i64>;
    async fn update(&self, lesson: Lesson) -> AppResult<Lesson>;
    async fn delete(&self, id: &str) -> AppResult<()>;
    async fn delete_by_parent(&self, parent_id: &str) -> AppResult<u64>;
    async fn delete_by_course(&self, course_id: &str) -> AppResult<u64>;
}

pub struct MongoLessonRepository {
    collection: Collection<Lesson>,
}

impl MongoLessonRepository {
    pub fn new(db: &Database) -> Self {
        let collection = db.get_collection(collections::LESSONS);
        Self { collection }
    }

    pub async fn ensure_indexes(&self) -> AppResult<()> {
        let id_index = IndexModel::builder()
            .keys(doc! { "id": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        let course_index = IndexModel::builder()
            .keys(doc! { "course_id": 1, "order_number": 1 })
            .build();

        self.collection.create_index(id_index).await?;
        self.collection.create_index(course_index).await?;
        log::info!("Created indexes on lessons.id and lessons.course_id");

        Ok(())
    }
}

#[async_trait]
impl LessonRepository for MongoLessonRepository {
    async fn create(&self, lesson: Lesson) -> AppResult<Lesson> {
        self.collection.insert_one(&lesson).await?;
        Ok(lesson)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<Lesson>> {
        let lesson = self.collection.find_one(doc! { "id": id }).await?;
        Ok(lesson)
    }

    async fn list_by_course(&self, course_id: &str) -> AppResult<Vec<Lesson>> {
        let options = FindOptions::builder()
            .sort(doc! { "order_number": 1, "created_at": 1 })
            .build();

        let cursor = self
            .collection
            .find(doc! { "course_id": course_id })
            .with_options(options)
            .await?;
        let lessons: Vec<Lesson> = cursor.try_collect().await?;
        Ok(lessons)
    }

    async fn count_by_course(&self, course_id: &str) -> AppResult<i64> {
        let count = self
            .collection
            .count_documents(doc! { "course_id": course_id })
            .await?;
        Ok(count as i64)
    }

    async fn update(&self, lesson: Lesson) -> AppResult<Lesson> {
        let options = ReplaceOptions::builder().upsert(false).build();

        let result = self
            .collection
            .replace_one(doc! { "id": &lesson.id }, &lesson)
            .with_options(options)
            .await?;

        if result.matched_count == 0 {
            return Err(AppError::NotFound(format!(
                "Lesson with id '{}' not found",
                lesson.id
            )));
        }

        Ok(lesson)
    }

    async fn delete(&self, id: &str) -> AppResult<()> {
        let result = self.collection.delete_one(doc! { "id": id }).await?;
        if result.deleted_count == 0 {
            return Err(AppError::NotFound(format!("Lesson with id '{}' not found", id)));
        }
        Ok(())
    }

    async fn delete_by_parent(&self, parent_id: &str) -> AppResult<u64> {
        let result = self
            .collection
            .delete_many(doc! { "parent_id": parent_id })
            .await?;
        Ok(result.deleted_count)
    }

    async fn delete_by_course(&self, course_id: &str) -> AppResult<u64> {
        let result = self
            .collection
            .delete_many(doc! { "course_id": course_id })
            .await?;
        Ok(result.deleted_count)
    }
}
