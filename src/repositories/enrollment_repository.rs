use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::{doc, to_bson},
    options::{FindOneAndUpdateOptions, IndexOptions, ReturnDocument},
    Collection, IndexModel,
};

use crate::{
    db::{collections, is_duplicate_key, Database, ListOptions, QueryFilter, SortOrder},
    errors::{AppError, AppResult},
    models::domain::{CertificateStatus, Enrollment},
};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnrollmentFilter {
    pub user_id: Option<String>,
    pub course_id: Option<String>,
    pub certificate_status: Option<CertificateStatus>,
}

impl EnrollmentFilter {
    pub fn matches(&self, enrollment: &Enrollment) -> bool {
        self.user_id.as_ref().map_or(true, |id| &enrollment.user_id == id)
            && self
                .course_id
                .as_ref()
                .map_or(true, |id| &enrollment.course_id == id)
            && self
                .certificate_status
                .map_or(true, |s| enrollment.certificate_status == s)
    }

    fn to_query(&self) -> AppResult<QueryFilter> {
        let mut filter = QueryFilter::new()
            .eq_opt("user_id", self.user_id.clone())
            .eq_opt("course_id", self.course_id.clone());
        if let Some(status) = self.certificate_status {
            filter = filter.eq("certificate_status", to_bson(&status)?);
        }
        Ok(filter)
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EnrollmentRepository: Send + Sync {
    async fn create(&self, enrollment: Enrollment) -> AppResult<Enrollment>;
    async fn find_by_id(&self, id: &str) -> AppResult<Option<Enrollment>>;
    async fn find_by_user_and_course(
        &self,
        user_id: &str,
        course_id: &str,
    ) -> AppResult<Option<Enrollment>>;
    async fn list(
        &self,
        filter: EnrollmentFilter,
        offset: i64,
        limit: i64,
    ) -> AppResult<(Vec<Enrollment>, i64)>;
    async fn count(&self, filter: EnrollmentFilter) -> AppResult<i64>;
    /// Writes everything but `rating`, which only `set_rating` touches.
    async fn update(&self, enrollment: Enrollment) -> AppResult<Enrollment>;
    /// Stores the student's rating and returns the one it replaced.
    async fn set_rating(&self, id: &str, rating: i32) -> AppResult<Option<i32>>;
    async fn delete(&self, id: &str) -> AppResult<()>;
    async fn delete_by_course(&self, course_id: &str) -> AppResult<u64>;
}

pub struct MongoEnrollmentRepository {
    collection: Collection<Enrollment>,
}

impl MongoEnrollmentRepository {
    pub fn new(db: &Database) -> Self {
        let collection = db.get_collection(collections::ENROLLMENTS);
        Self { collection }
    }

    pub async fn ensure_indexes(&self) -> AppResult<()> {
        log::info!("Creating indexes for enrollments collection");

        let id_index = IndexModel::builder()
            .keys(doc! { "id": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        let pair_index = IndexModel::builder()
            .keys(doc! { "user_id": 1, "course_id": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("user_course_unique".to_string())
                    .build(),
            )
            .build();
        let course_index = IndexModel::builder().keys(doc! { "course_id": 1 }).build();

        self.collection.create_index(id_index).await?;
        self.collection.create_index(pair_index).await?;
        self.collection.create_index(course_index).await?;

        log::info!("Successfully created indexes for enrollments collection");
        Ok(())
    }
}

#[async_trait]
impl EnrollmentRepository for MongoEnrollmentRepository {
    async fn create(&self, enrollment: Enrollment) -> AppResult<Enrollment> {
        match self.collection.insert_one(&enrollment).await {
            Ok(_) => Ok(enrollment),
            Err(e) if is_duplicate_key(&e) => Err(AppError::AlreadyExists(
                "Already enrolled in this course".to_string(),
            )),
            Err(e) => Err(e.into()),
        }
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<Enrollment>> {
        let enrollment = self.collection.find_one(doc! { "id": id }).await?;
        Ok(enrollment)
    }

    async fn find_by_user_and_course(
        &self,
        user_id: &str,
        course_id: &str,
    ) -> AppResult<Option<Enrollment>> {
        let enrollment = self
            .collection
            .find_one(doc! { "user_id": user_id, "course_id": course_id })
            .await?;
        Ok(enrollment)
    }

    async fn list(
        &self,
        filter: EnrollmentFilter,
        offset: i64,
        limit: i64,
    ) -> AppResult<(Vec<Enrollment>, i64)> {
        let filter = filter.to_query()?.into_document();
        let total = self.collection.count_documents(filter.clone()).await? as i64;

        let options = ListOptions::paged(offset, limit).sort_by("enrolled_at", SortOrder::Desc);
        let cursor = self
            .collection
            .find(filter)
            .with_options(options.to_find_options())
            .await?;
        let enrollments: Vec<Enrollment> = cursor.try_collect().await?;

        Ok((enrollments, total))
    }

    async fn count(&self, filter: EnrollmentFilter) -> AppResult<i64> {
        let filter = filter.to_query()?.into_document();
        Ok(self.collection.count_documents(filter).await? as i64)
    }

    async fn update(&self, enrollment: Enrollment) -> AppResult<Enrollment> {
        let update = doc! {
            "$set": {
                "progress": enrollment.progress,
                "completed_lessons": to_bson(&enrollment.completed_lessons)?,
                "completed": enrollment.completed,
                "certificate_status": to_bson(&enrollment.certificate_status)?,
                "certificate_note": to_bson(&enrollment.certificate_note)?,
                "certificate_url": to_bson(&enrollment.certificate_url)?,
                "completed_at": to_bson(&enrollment.completed_at)?,
                "certificate_requested_at": to_bson(&enrollment.certificate_requested_at)?,
                "certificate_decided_at": to_bson(&enrollment.certificate_decided_at)?,
            }
        };

        let result = self
            .collection
            .update_one(doc! { "id": &enrollment.id }, update)
            .await?;

        if result.matched_count == 0 {
            return Err(AppError::NotFound(format!(
                "Enrollment with id '{}' not found",
                enrollment.id
            )));
        }

        Ok(enrollment)
    }

    async fn set_rating(&self, id: &str, rating: i32) -> AppResult<Option<i32>> {
        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::Before)
            .build();

        let before = self
            .collection
            .find_one_and_update(doc! { "id": id }, doc! { "$set": { "rating": rating } })
            .with_options(options)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Enrollment with id '{}' not found", id)))?;

        Ok(before.rating)
    }

    async fn delete(&self, id: &str) -> AppResult<()> {
        let result = self.collection.delete_one(doc! { "id": id }).await?;
        if result.deleted_count == 0 {
            return Err(AppError::NotFound(format!(
                "Enrollment with id '{}' not found",
                id
            )));
        }
        Ok(())
    }

    async fn delete_by_course(&self, course_id: &str) -> AppResult<u64> {
        let result = self
            .collection
            .delete_many(doc! { "course_id": course_id })
            .await?;
        Ok(result.deleted_count)
    }
}
