use std::sync::Arc;

use chrono::Utc;
use validator::Validate;

use crate::{
    errors::{AppError, AppResult},
    models::{
        domain::{ContactSubmission, ResumeSubmission},
        dto::{
            request::{
                ContactListParams, ContactRequest, ResumeListParams, ResumeRequest,
                UpdateContactStatusRequest, UpdateResumeStatusRequest,
            },
            response::PaginatedResponse,
        },
    },
    repositories::{ContactSubmissionRepository, ResumeSubmissionRepository},
    services::{email_templates, NotificationService},
};

/// Public contact and resume forms plus their admin inbox.
pub struct SubmissionService {
    contact_repository: Arc<dyn ContactSubmissionRepository>,
    resume_repository: Arc<dyn ResumeSubmissionRepository>,
    notifications: NotificationService,
}

impl SubmissionService {
    pub fn new(
        contact_repository: Arc<dyn ContactSubmissionRepository>,
        resume_repository: Arc<dyn ResumeSubmissionRepository>,
        notifications: NotificationService,
    ) -> Self {
        Self {
            contact_repository,
            resume_repository,
            notifications,
        }
    }

    pub async fn submit_contact(&self, request: ContactRequest) -> AppResult<ContactSubmission> {
        request.validate()?;

        let mut submission = ContactSubmission::new(
            &request.name,
            &request.email,
            &request.subject,
            &request.message,
        );
        submission.phone = request.phone;

        let submission = self.contact_repository.create(submission).await?;
        log::info!("Contact submission {} received", submission.id);

        let (subject, body) = email_templates::contact_submission(&submission);
        self.notifications.dispatch_to_admin(subject, body);
        Ok(submission)
    }

    pub async fn submit_resume(&self, request: ResumeRequest) -> AppResult<ResumeSubmission> {
        request.validate()?;

        let mut submission = ResumeSubmission::new(&request.name, &request.email, &request.resume_url);
        submission.phone = request.phone;
        submission.desired_program = request.desired_program;
        submission.destination_country = request.destination_country;
        submission.cover_letter = request.cover_letter;

        let submission = self.resume_repository.create(submission).await?;
        log::info!("Resume submission {} received", submission.id);

        let (subject, body) = email_templates::resume_submission(&submission);
        self.notifications.dispatch_to_admin(subject, body);
        Ok(submission)
    }

    pub async fn list_contacts(&self, params: ContactListParams) -> AppResult<PaginatedResponse<ContactSubmission>> {
        params.validate()?;
        let offset = params.offset.unwrap_or(0);
        let limit = params.limit.unwrap_or(20);
        let (items, total) = self
            .contact_repository
            .list(params.status, offset, limit)
            .await?;
        Ok(PaginatedResponse::new(items, total, offset, limit))
    }

    pub async fn get_contact(&self, id: &str) -> AppResult<ContactSubmission> {
        self.contact_repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Contact submission '{}' not found", id)))
    }

    pub async fn update_contact(
        &self,
        id: &str,
        request: UpdateContactStatusRequest,
    ) -> AppResult<ContactSubmission> {
        request.validate()?;
        let mut submission = self.get_contact(id).await?;
        submission.status = request.status;
        if let Some(notes) = request.admin_notes {
            submission.admin_notes = Some(notes);
        }
        submission.modified_at = Some(Utc::now());
        self.contact_repository.update(submission).await
    }

    pub async fn delete_contact(&self, id: &str) -> AppResult<()> {
        self.contact_repository.delete(id).await
    }


    pub async fn list_resumes(&self, params: ResumeListParams) -> AppResult<PaginatedResponse<ResumeSubmission>> {
        params.validate()?;
        let offset = params.offset.unwrap_or(0);
        let limit = params.limit.unwrap_or(20);
        let (items, total) = self
            .resume_repository
            .list(params.status, offset, limit)
            .await?;
        Ok(PaginatedResponse::new(items, total, offset, limit))
    }

    pub async fn get_resume(&self, id: &str) -> AppResult<ResumeSubmission> {
        self.resume_repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Resume submission '{}' not found", id)))
    }

    pub async fn update_resume(
        &self,
        id: &str,
        request: UpdateResumeStatusRequest,
    ) -> AppResult<ResumeSubmission> {
        request.validate()?;
        let mut submission = self.get_resume(id).await?;
        submission.status = request.status;
        if let Some(notes) = request.admin_notes {
            submission.admin_notes = Some(notes);
        }
        submission.modified_at = Some(Utc::now());
        self.resume_repository.update(submission).await
    }

    pub async fn delete_resume(&self, id: &str) -> AppResult<()> {
        self.resume_repository.delete(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::domain::{ContactStatus, ResumeStatus},
        repositories::{
            contact_submission_repository::MockContactSubmissionRepository,
            resume_submission_repository::MockResumeSubmissionRepository,
        },
    };

    fn service(
        contacts: MockContactSubmissionRepository,
        resumes: MockResumeSubmissionRepository,
    ) -> SubmissionService {
        SubmissionService::new(
            Arc::new(contacts),
            Arc::new(resumes),
            NotificationService::disabled(),
        )
    }

    fn contact_request(email: &str) -> ContactRequest {
        ContactRequest {
            name: "Sam".to_string(),
            email: email.to_string(),
            phone: Some("+44 20 7946 0958".to_string()),
            subject: "Student visa".to_string(),
            message: "Which documents do I need?".to_string(),
        }
    }

    #[tokio::test]
    async fn contact_form_is_stored_as_new() {
        let mut contacts = MockContactSubmissionRepository::new();
        contacts.expect_create().times(1).returning(|s| Ok(s));

        let submission = service(contacts, MockResumeSubmissionRepository::new())
            .submit_contact(contact_request("Sam@Example.com"))
            .await
            .unwrap();
        assert_eq!(submission.status, ContactStatus::New);
        assert_eq!(submission.email, "sam@example.com");
    }

    #[tokio::test]
    async fn contact_form_with_bad_email_is_rejected() {
        let mut contacts = MockContactSubmissionRepository::new();
        contacts.expect_create().never();

        let result = service(contacts, MockResumeSubmissionRepository::new())
            .submit_contact(contact_request("not-an-email"))
            .await;
        assert!(matches!(result, Err(AppError::ValidationError(_))));
    }

    #[tokio::test]
    async fn resume_status_update_keeps_existing_notes() {
        let mut existing = ResumeSubmission::new("Sam", "sam@example.com", "https://cdn.example.com/cv.pdf");
        existing.admin_notes = Some("Strong profile".to_string());

        let mut resumes = MockResumeSubmissionRepository::new();
        resumes
            .expect_find_by_id()
            .returning(move |_| Ok(Some(existing.clone())));
        resumes.expect_update().returning(|s| Ok(s));

        let updated = service(MockContactSubmissionRepository::new(), resumes)
            .update_resume(
                "resume-1",
                UpdateResumeStatusRequest {
                    status: ResumeStatus::Shortlisted,
                    admin_notes: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.status, ResumeStatus::Shortlisted);
        assert_eq!(updated.admin_notes.as_deref(), Some("Strong profile"));
    }
}
