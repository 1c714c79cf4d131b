use std::sync::Arc;

use chrono::Utc;
use validator::Validate;

use crate::{
    auth::{require_staff, Claims},
    errors::{AppError, AppResult},
    models::{
        domain::Announcement,
        dto::{
            request::{AnnouncementListParams, CreateAnnouncementRequest, UpdateAnnouncementRequest},
            response::PaginatedResponse,
        },
    },
    repositories::{AnnouncementFilter, AnnouncementRepository, CourseRepository},
    services::guards::ensure_course_manager,
};

pub struct AnnouncementService {
    announcement_repository: Arc<dyn AnnouncementRepository>,
    course_repository: Arc<dyn CourseRepository>,
}

impl AnnouncementService {
    pub fn new(
        announcement_repository: Arc<dyn AnnouncementRepository>,
        course_repository: Arc<dyn CourseRepository>,
    ) -> Self {
        Self {
            announcement_repository,
            course_repository,
        }
    }

    /// Site-wide announcements are admin-only; course announcements belong to the
    /// course's managers.
    async fn ensure_can_post(&self, claims: &Claims, course_id: Option<&str>) -> AppResult<()> {
        require_staff(claims)?;
        match course_id {
            None if claims.is_admin() => Ok(()),
            None => Err(AppError::Forbidden(
                "Only admins can post site-wide announcements".to_string(),
            )),
            Some(id) => {
                let course = self
                    .course_repository
                    .find_by_id(id)
                    .await?
                    .ok_or_else(|| AppError::NotFound(format!("Course with id '{}' not found", id)))?;
                ensure_course_manager(claims, &course)
            }
        }
    }

    async fn get_announcement(&self, id: &str) -> AppResult<Announcement> {
        self.announcement_repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Announcement with id '{}' not found", id)))
    }

    pub async fn create_announcement(
        &self,
        claims: &Claims,
        request: CreateAnnouncementRequest,
    ) -> AppResult<Announcement> {
        request.validate()?;
        self.ensure_can_post(claims, request.course_id.as_deref()).await?;

        let mut announcement = Announcement::new(&request.title, &request.content, &claims.sub);
        announcement.course_id = request.course_id;
        announcement.pinned = request.pinned;
        announcement.published = request.published.unwrap_or(true);

        self.announcement_repository.create(announcement).await
    }

    pub async fn update_announcement(
        &self,
        claims: &Claims,
        id: &str,
        request: UpdateAnnouncementRequest,
    ) -> AppResult<Announcement> {
        request.validate()?;
        let mut announcement = self.get_announcement(id).await?;
        self.ensure_can_post(claims, announcement.course_id.as_deref()).await?;

        if let Some(title) = request.title {
            announcement.title = title.trim().to_string();
        }
        if let Some(content) = request.content {
            announcement.content = content;
        }
        if let Some(pinned) = request.pinned {
            announcement.pinned = pinned;
        }
        if let Some(published) = request.published {
            announcement.published = published;
        }
        announcement.modified_at = Some(Utc::now());

        self.announcement_repository.update(announcement).await
    }

    pub async fn delete_announcement(&self, claims: &Claims, id: &str) -> AppResult<()> {
        let announcement = self.get_announcement(id).await?;
        self.ensure_can_post(claims, announcement.course_id.as_deref()).await?;
        self.announcement_repository.delete(&announcement.id).await
    }

    /// Published announcements, pinned first. Admins may ask for drafts too.
    pub async fn list_announcements(
        &self,
        params: AnnouncementListParams,
        viewer: Option<&Claims>,
    ) -> AppResult<PaginatedResponse<Announcement>> {
        params.validate()?;
        let offset = params.offset.unwrap_or(0);
        let limit = params.limit.unwrap_or(20);

        let include_unpublished =
            params.include_unpublished.unwrap_or(false) && viewer.is_some_and(Claims::is_admin);
        let filter = AnnouncementFilter {
            course_id: params.course_id,
            published: (!include_unpublished).then_some(true),
        };

        let (items, total) = self
            .announcement_repository
            .list(filter, offset, limit)
            .await?;
        Ok(PaginatedResponse::new(items, total, offset, limit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::domain::{User, UserRole, UserStatus},
        repositories::{
            announcement_repository::MockAnnouncementRepository,
            course_repository::MockCourseRepository,
        },
    };

    fn request(course_id: Option<&str>) -> CreateAnnouncementRequest {
        CreateAnnouncementRequest {
            title: "Intake open".to_string(),
            content: "Applications for the autumn intake are open.".to_string(),
            course_id: course_id.map(str::to_string),
            pinned: true,
            published: None,
        }
    }

    #[tokio::test]
    async fn instructor_cannot_post_site_wide() {
        let instructor = User::test_user("Ada", UserRole::Instructor, UserStatus::Approved);
        let mut announcements = MockAnnouncementRepository::new();
        announcements.expect_create().never();

        let service = AnnouncementService::new(
            Arc::new(announcements),
            Arc::new(MockCourseRepository::new()),
        );
        let result = service
            .create_announcement(&Claims::new(&instructor, 1), request(None))
            .await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn admin_posts_published_site_wide_announcement() {
        let admin = User::test_user("Root", UserRole::Admin, UserStatus::Approved);
        let mut announcements = MockAnnouncementRepository::new();
        announcements.expect_create().returning(|a| Ok(a));

        let service = AnnouncementService::new(
            Arc::new(announcements),
            Arc::new(MockCourseRepository::new()),
        );
        let announcement = service
            .create_announcement(&Claims::new(&admin, 1), request(None))
            .await
            .unwrap();
        assert!(announcement.published);
        assert!(announcement.pinned);
        assert_eq!(announcement.author_id, admin.id);
    }

    #[tokio::test]
    async fn public_listing_only_shows_published() {
        let mut announcements = MockAnnouncementRepository::new();
        announcements
            .expect_list()
            .withf(|filter, _, _| filter.published == Some(true))
            .times(1)
            .returning(|_, _, _| Ok((Vec::new(), 0)));

        let service = AnnouncementService::new(
            Arc::new(announcements),
            Arc::new(MockCourseRepository::new()),
        );
        let page = service
            .list_announcements(
                AnnouncementListParams {
                    include_unpublished: Some(true),
                    ..Default::default()
                },
                None,
            )
            .await
            .unwrap();
        assert_eq!(page.total, 0);
    }
}
