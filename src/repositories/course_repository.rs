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
    models::{domain::Course, dto::request::CourseSort},
};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CourseFilter {
    pub published: Option<bool>,
    pub category: Option<String>,
    pub instructor_id: Option<String>,
    /// Substring of the title.
    pub search: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
}

impl CourseFilter {
    pub fn matches(&self, course: &Course) -> bool {
        self.published.map_or(true, |p| course.published == p)
            && self.category.as_ref().map_or(true, |c| course.category.as_ref() == Some(c))
            && self
                .instructor_id
                .as_ref()
                .map_or(true, |id| &course.instructor.id == id)
            && self.search.as_deref().map_or(true, |needle| {
                course
                    .title
                    .to_lowercase()
                    .contains(&needle.trim().to_lowercase())
            })
            && self.min_price.map_or(true, |min| course.price >= min)
            && self.max_price.map_or(true, |max| course.price <= max)
    }

    fn to_query(&self) -> QueryFilter {
        let mut filter = QueryFilter::new()
            .eq_opt("published", self.published)
            .eq_opt("category", self.category.clone())
            .eq_opt("instructor.id", self.instructor_id.clone())
            .between("price", self.min_price, self.max_price);
        if let Some(search) = &self.search {
            filter = filter.contains("title", search);
        }
        filter
    }
}

pub(crate) fn course_sort_options(sort: CourseSort, offset: i64, limit: i64) -> ListOptions {
    let options = ListOptions::paged(offset, limit);
    match sort {
        CourseSort::Newest => options.sort_by("created_at", SortOrder::Desc),
        CourseSort::PriceAsc => options.sort_by("price", SortOrder::Asc),
        CourseSort::PriceDesc => options.sort_by("price", SortOrder::Desc),
        CourseSort::Rating => options
            .sort_by("rating_average", SortOrder::Desc)
            .sort_by("rating_count", SortOrder::Desc),
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CourseRepository: Send + Sync {
    async fn create(&self, course: Course) -> AppResult<Course>;
    async fn find_by_id(&self, id: &str) -> AppResult<Option<Course>>;
    async fn find_by_slug(&self, slug: &str) -> AppResult<Option<Course>>;
    async fn list(
        &self,
        filter: CourseFilter,
        sort: CourseSort,
        offset: i64,
        limit: i64,
    ) -> AppResult<(Vec<Course>, i64)>;
    async fn count(&self, filter: CourseFilter) -> AppResult<i64>;
    /// Writes the editable fields of `course` and returns the stored document. The
    /// counters and the rating aggregate are left to their own atomic updates.
    async fn update(&self, course: Course) -> AppResult<Course>;
    async fn delete(&self, id: &str) -> AppResult<()>;
    /// Folds one student's rating into the aggregate, replacing `previous` if they had rated before.
    async fn apply_rating(&self, id: &str, previous: Option<i32>, rating: i32) -> AppResult<Course>;
    /// Adds `delta` to the student counter. Decrements never take it below zero.
    async fn increment_student_count(&self, id: &str, delta: i64) -> AppResult<()>;
    async fn set_lesson_count(&self, id: &str, count: i64) -> AppResult<()>;
}

pub struct MongoCourseRepository {
    collection: Collection<Course>,
}

impl MongoCourseRepository {
    pub fn new(db: &Database) -> Self {
        let collection = db.get_collection(collections::COURSES);
        Self { collection }
    }

    pub async fn ensure_indexes(&self) -> AppResult<()> {
        log::info!("Creating indexes for courses collection");

        let id_index = IndexModel::builder()
            .keys(doc! { "id": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("id_unique".to_string())
                    .build(),
            )
            .build();
        let slug_index = IndexModel::builder()
            .keys(doc! { "slug": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("slug_unique".to_string())
                    .build(),
            )
            .build();
        let instructor_index = IndexModel::builder()
            .keys(doc! { "instructor.id": 1 })
            .build();

        self.collection.create_index(id_index).await?;
        self.collection.create_index(slug_index).await?;
        self.collection.create_index(instructor_index).await?;

        log::info!("Successfully created indexes for courses collection");
        Ok(())
    }
}

#[async_trait]
impl CourseRepository for MongoCourseRepository {
    async fn create(&self, course: Course) -> AppResult<Course> {
        match self.collection.insert_one(&course).await {
            Ok(_) => Ok(course),
            Err(e) if is_duplicate_key(&e) => Err(AppError::AlreadyExists(format!(
                "Course with slug '{}' already exists",
                course.slug
            ))),
            Err(e) => Err(e.into()),
        }
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<Course>> {
        let course = self.collection.find_one(doc! { "id": id }).await?;
        Ok(course)
    }

    async fn find_by_slug(&self, slug: &str) -> AppResult<Option<Course>> {
        let course = self.collection.find_one(doc! { "slug": slug }).await?;
        Ok(course)
    }

    async fn list(
        &self,
        filter: CourseFilter,
        sort: CourseSort,
        offset: i64,
        limit: i64,
    ) -> AppResult<(Vec<Course>, i64)> {
        let filter = filter.to_query().into_document();
        let total = self.collection.count_documents(filter.clone()).await? as i64;

        let options = course_sort_options(sort, offset, limit);
        let cursor = self
            .collection
            .find(filter)
            .with_options(options.to_find_options())
            .await?;
        let courses: Vec<Course> = cursor.try_collect().await?;

        Ok((courses, total))
    }

    async fn count(&self, filter: CourseFilter) -> AppResult<i64> {
        let total = self
            .collection
            .count_documents(filter.to_query().into_document())
            .await?;
        Ok(total as i64)
    }

    async fn update(&self, course: Course) -> AppResult<Course> {
        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();

        let update = doc! {
            "$set": {
                "title": &course.title,
                "slug": &course.slug,
                "description": &course.description,
                "course_type": to_bson(&course.course_type)?,
                "price": course.price,
                "discount_price": to_bson(&course.discount_price)?,
                "category": to_bson(&course.category)?,
                "level": to_bson(&course.level)?,
                "thumbnail_url": to_bson(&course.thumbnail_url)?,
                "published": course.published,
                "modified_at": to_bson(&course.modified_at)?,
            }
        };

        let updated = match self
            .collection
            .find_one_and_update(doc! { "id": &course.id }, update)
            .with_options(options)
            .await
        {
            Ok(updated) => updated,
            Err(e) if is_duplicate_key(&e) => {
                return Err(AppError::AlreadyExists(format!(
                    "Course with slug '{}' already exists",
                    course.slug
                )))
            }
            Err(e) => return Err(e.into()),
        };

        updated.ok_or_else(|| AppError::NotFound(format!("Course with id '{}' not found", course.id)))
    }

    async fn delete(&self, id: &str) -> AppResult<()> {
        let result = self.collection.delete_one(doc! { "id": id }).await?;
        if result.deleted_count == 0 {
            return Err(AppError::NotFound(format!("Course with id '{}' not found", id)));
        }
        Ok(())
    }

    async fn apply_rating(&self, id: &str, previous: Option<i32>, rating: i32) -> AppResult<Course> {
        let (added, new_ratings) = match previous {
            Some(old) => (rating - old, 0),
            None => (rating, 1),
        };
        let count = doc! { "$add": ["$rating_count", new_ratings] };

        // Both fields read the pre-update document inside one stage.
        let pipeline = vec![doc! {
            "$set": {
                "rating_average": {
                    "$divide": [
                        { "$add": [{ "$multiply": ["$rating_average", "$rating_count"] }, added] },
                        { "$max": [count.clone(), 1] },
                    ]
                },
                "rating_count": count,
            }
        }];

        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();
        self.collection
            .find_one_and_update(doc! { "id": id }, pipeline)
            .with_options(options)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Course with id '{}' not found", id)))
    }

    async fn increment_student_count(&self, id: &str, delta: i64) -> AppResult<()> {
        let filter = if delta < 0 {
            doc! { "id": id, "student_count": { "$gte": -delta } }
        } else {
            doc! { "id": id }
        };

        let result = self
            .collection
            .update_one(filter, doc! { "$inc": { "student_count": delta } })
            .await?;

        if result.matched_count == 0 {
            log::warn!("Student count for course {} left unchanged (delta {})", id, delta);
        }
        Ok(())
    }

    async fn set_lesson_count(&self, id: &str, count: i64) -> AppResult<()> {
        self.collection
            .update_one(doc! { "id": id }, doc! { "$set": { "lesson_count": count } })
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::domain::InstructorRef;

    fn course(title: &str, price: f64) -> Course {
        let mut course = Course::new(
            title,
            "slug",
            "",
            InstructorRef {
                id: "inst-1".into(),
                name: "Ada".into(),
            },
        );
        course.price = price;
        course
    }

    #[test]
    fn filter_price_range_is_inclusive() {
        let filter = CourseFilter {
            min_price: Some(10.0),
            max_price: Some(50.0),
            ..Default::default()
        };

        assert!(filter.matches(&course("A", 10.0)));
        assert!(filter.matches(&course("B", 50.0)));
        assert!(!filter.matches(&course("C", 50.5)));
    }

    #[test]
    fn filter_query_targets_nested_instructor_id() {
        let filter = CourseFilter {
            published: Some(true),
            instructor_id: Some("inst-1".into()),
            ..Default::default()
        };

        assert_eq!(
            filter.to_query().into_document(),
            doc! { "published": true, "instructor.id": "inst-1" }
        );
    }

    #[test]
    fn rating_sort_breaks_ties_on_count() {
        let options = course_sort_options(CourseSort::Rating, 0, 10);
        assert_eq!(
            options.sort_document(),
            Some(doc! { "rating_average": -1, "rating_count": -1 })
        );
    }
}
