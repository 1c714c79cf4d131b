use std::{collections::HashSet, sync::Arc};

use validator::Validate;

use crate::{
    auth::Claims,
    errors::{AppError, AppResult},
    models::{
        domain::{Course, Lesson},
        dto::request::{CreateLessonRequest, ReorderLessonsRequest, UpdateLessonRequest},
    },
    repositories::{CourseRepository, LessonRepository},
    services::guards::{can_view_course, ensure_course_manager},
};

pub struct LessonService {
    lesson_repository: Arc<dyn LessonRepository>,
    course_repository: Arc<dyn CourseRepository>,
}

impl LessonService {
    pub fn new(
        lesson_repository: Arc<dyn LessonRepository>,
        course_repository: Arc<dyn CourseRepository>,
    ) -> Self {
        Self {
            lesson_repository,
            course_repository,
        }
    }

    async fn get_course(&self, course_id: &str) -> AppResult<Course> {
        self.course_repository
            .find_by_id(course_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Course with id '{}' not found", course_id)))
    }

    pub async fn get_lesson(&self, id: &str) -> AppResult<Lesson> {
        self.lesson_repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Lesson with id '{}' not found", id)))
    }

    pub async fn list_lessons(&self, course_id: &str, viewer: Option<&Claims>) -> AppResult<Vec<Lesson>> {
        let course = self.get_course(course_id).await?;
        if !can_view_course(viewer, &course) {
            return Err(AppError::NotFound(format!(
                "Course with id '{}' not found",
                course_id
            )));
        }
        self.lesson_repository.list_by_course(course_id).await
    }

    pub async fn create_lesson(
        &self,
        claims: &Claims,
        course_id: &str,
        request: CreateLessonRequest,
    ) -> AppResult<Lesson> {
        request.validate()?;
        let course = self.get_course(course_id).await?;
        ensure_course_manager(claims, &course)?;

        let siblings = self.lesson_repository.list_by_course(&course.id).await?;

        if let Some(parent_id) = &request.parent_id {
            let parent = siblings
                .iter()
                .find(|l| &l.id == parent_id)
                .ok_or_else(|| {
                    AppError::BadRequest(format!(
                        "Parent lesson '{}' does not belong to this course",
                        parent_id
                    ))
                })?;
            if !parent.is_top_level() {
                return Err(AppError::BadRequest(
                    "Sub-lessons cannot have sub-lessons of their own".to_string(),
                ));
            }
        }

        let order_number = request.order_number.unwrap_or_else(|| {
            next_order_number(&siblings, request.parent_id.as_deref())
        });

        let mut lesson = Lesson::new(&course.id, &request.title, request.lesson_type, order_number);
        lesson.parent_id = request.parent_id;
        lesson.content = request.content;
        lesson.media_url = request.media_url;
        lesson.duration_minutes = request.duration_minutes;
        lesson.is_preview = request.is_preview;

        let lesson = self.lesson_repository.create(lesson).await?;
        self.refresh_lesson_count(&course.id).await;
        Ok(lesson)
    }

    pub async fn update_lesson(
        &self,
        claims: &Claims,
        id: &str,
        request: UpdateLessonRequest,
    ) -> AppResult<Lesson> {
        request.validate()?;
        let mut lesson = self.get_lesson(id).await?;
        let course = self.get_course(&lesson.course_id).await?;
        ensure_course_manager(claims, &course)?;

        if let Some(title) = request.title {
            lesson.title = title.trim().to_string();
        }
        if let Some(content) = request.content {
            lesson.content = Some(content);
        }
        if let Some(lesson_type) = request.lesson_type {
            lesson.lesson_type = lesson_type;
        }
        if let Some(media_url) = request.media_url {
            lesson.media_url = Some(media_url);
        }
        if let Some(duration) = request.duration_minutes {
            lesson.duration_minutes = Some(duration);
        }
        if let Some(order_number) = request.order_number {
            lesson.order_number = order_number;
        }
        if let Some(is_preview) = request.is_preview {
            lesson.is_preview = is_preview;
        }

        lesson.touch();
        self.lesson_repository.update(lesson).await
    }

    /// Assigns order numbers 1..n following `lesson_ids`.
    pub async fn reorder_lessons(
        &self,
        claims: &Claims,
        course_id: &str,
        request: ReorderLessonsRequest,
    ) -> AppResult<Vec<Lesson>> {
        request.validate()?;
        let course = self.get_course(course_id).await?;
        ensure_course_manager(claims, &course)?;

        let mut seen = HashSet::new();
        if let Some(duplicate) = request.lesson_ids.iter().find(|id| !seen.insert(id.as_str())) {
            return Err(AppError::BadRequest(format!(
                "Lesson '{}' appears more than once",
                duplicate
            )));
        }

        let lessons = self.lesson_repository.list_by_course(&course.id).await?;
        let mut ordered = Vec::with_capacity(request.lesson_ids.len());
        for (index, id) in request.lesson_ids.iter().enumerate() {
            let mut lesson = lessons
                .iter()
                .find(|l| &l.id == id)
                .cloned()
                .ok_or_else(|| {
                    AppError::BadRequest(format!("Lesson '{}' does not belong to this course", id))
                })?;
            let order_number = index as i32 + 1;
            if lesson.order_number != order_number {
                lesson.order_number = order_number;
                lesson.touch();
                lesson = self.lesson_repository.update(lesson).await?;
            }
            ordered.push(lesson);
        }

        log::info!("Reordered {} lesson(s) of course {}", ordered.len(), course.id);
        Ok(ordered)
    }

    /// Deletes the lesson together with its sub-lessons.
    pub async fn delete_lesson(&self, claims: &Claims, id: &str) -> AppResult<()> {
        let lesson = self.get_lesson(id).await?;
        let course = self.get_course(&lesson.course_id).await?;
        ensure_course_manager(claims, &course)?;

        let children = self.lesson_repository.delete_by_parent(&lesson.id).await?;
        self.lesson_repository.delete(&lesson.id).await?;
        if children > 0 {
            log::info!("Deleted lesson {} and {} sub-lesson(s)", lesson.id, children);
        }

        self.refresh_lesson_count(&course.id).await;
        Ok(())
    }

    /// Rewrites the course's `lesson_count` from a count query. A failure leaves the
    /// previous count in place.
    pub async fn refresh_lesson_count(&self, course_id: &str) -> Option<i64> {
        let result = async {
            let count = self.lesson_repository.count_by_course(course_id).await?;
            self.course_repository.set_lesson_count(course_id, count).await?;
            Ok::<_, AppError>(count)
        }
        .await;

        match result {
            Ok(count) => Some(count),
            Err(e) => {
                log::warn!("Failed to refresh lesson count of course {}: {}", course_id, e);
                None
            }
        }
    }
}

/// One past the highest order number among lessons sharing `parent_id`.
fn next_order_number(lessons: &[Lesson], parent_id: Option<&str>) -> i32 {
    lessons
        .iter()
        .filter(|l| l.parent_id.as_deref() == parent_id)
        .map(|l| l.order_number)
        .max()
        .unwrap_or(0)
        + 1
}
