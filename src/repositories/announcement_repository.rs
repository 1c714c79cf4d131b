use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::doc,
    options::{IndexOptions, ReplaceOptions},
    Collection, IndexModel,
};

use crate::{
    db::{collections, Database, ListOptions, QueryFilter, SortOrder},
    errors::{AppError, AppResult},
    models::domain::Announcement,
};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnnouncementFilter {
    pub course_id: Option<String>,
    pub published: Option<bool>,
}

impl AnnouncementFilter {
    pub fn matches(&self, announcement: &Announcement) -> bool {
        self.course_id
            .as_ref()
            .map_or(true, |id| announcement.course_id.as_ref() == Some(id))
            && self.published.map_or(true, |p| announcement.published == p)
    }

    fn to_query(&self) -> QueryFilter {
        QueryFilter::new()
            .eq_opt("course_id", self.course_id.clone())
            .eq_opt("published", self.published)
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AnnouncementRepository: Send + Sync {
    async fn create(&self, announcement: Announcement) -> AppResult<Announcement>;
    async fn find_by_id(&self, id: &str) -> AppResult<Option<Announcement>>;
    /// Pinned first, then newest first.
    async fn list(
        &self,
        filter: AnnouncementFilter,
        offset: i64,
        limit: i64,
    ) -> AppResult<(Vec<Announcement>, i64)>;
    async fn update(&self, announcement: Announcement) -> AppResult<Announcement>;
    async fn delete(&self, id: &str) -> AppResult<()>;
    async fn delete_by_course(&self, course_id: &str) -> AppResult<u64>;
}

pub struct MongoAnnouncementRepository {
    collection: Collection<Announcement>,
}

impl MongoAnnouncementRepository {
    pub fn new(db: &Database) -> Self {
        let collection = db.get_collection(collections::ANNOUNCEMENTS);
        Self { collection }
    }

    pub async fn ensure_indexes(&self) -> AppResult<()> {
        let id_index = IndexModel::builder()
            .keys(doc! { "id": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        self.collection.create_index(id_index).await?;
        log::info!("Created unique index on announcements.id");
        Ok(())
    }
}

#[async_trait]
impl AnnouncementRepository for MongoAnnouncementRepository {
    async fn create(&self, announcement: Announcement) -> AppResult<Announcement> {
        self.collection.insert_one(&announcement).await?;
        Ok(announcement)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<Announcement>> {
        let announcement = self.collection.find_one(doc! { "id": id }).await?;
        Ok(announcement)
    }

    async fn list(
        &self,
        filter: AnnouncementFilter,
        offset: i64,
        limit: i64,
    ) -> AppResult<(Vec<Announcement>, i64)> {
        let filter = filter.to_query().into_document();
        let total = self.collection.count_documents(filter.clone()).await? as i64;

        let options = ListOptions::paged(offset, limit)
            .sort_by("pinned", SortOrder::Desc)
            .sort_by("created_at", SortOrder::Desc);
        let cursor = self
            .collection
            .find(filter)
            .with_options(options.to_find_options())
            .await?;
        let items: Vec<Announcement> = cursor.try_collect().await?;

        Ok((items, total))
    }

    async fn update(&self, announcement: Announcement) -> AppResult<Announcement> {
        let options = ReplaceOptions::builder().upsert(false).build();

        let result = self
            .collection
            .replace_one(doc! { "id": &announcement.id }, &announcement)
            .with_options(options)
            .await?;

        if result.matched_count == 0 {
            return Err(AppError::NotFound(format!(
                "Announcement with id '{}' not found",
                announcement.id
            )));
        }

        Ok(announcement)
    }

    async fn delete(&self, id: &str) -> AppResult<()> {
        let result = self.collection.delete_one(doc! { "id": id }).await?;
        if result.deleted_count == 0 {
            return Err(AppError::NotFound(format!(
                "Announcement with id '{}' not found",
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
