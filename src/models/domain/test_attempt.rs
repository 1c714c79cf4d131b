use async_graphql::{Enum, SimpleObject};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, SimpleObject)]
pub struct TestAttempt {
    pub id: String,
    pub user_id: String,
    pub test_id: String,
    pub attempt_number: i32,
    pub answers: Vec<Option<i32>>,
    pub score: i32,
    pub total_questions: i32,
    pub percentage: i32,
    pub passed: bool,
    pub status: AttemptStatus,
    pub reviewed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review_notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviewed_by: Option<String>,
    pub started_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize, Enum)]
#[serde(rename_all = "snake_case")]
pub enum AttemptStatus {
    InProgress,
    Completed,
}

impl TestAttempt {
    pub fn start(user_id: &str, test_id: &str, attempt_number: i32) -> Self {
        TestAttempt {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            test_id: test_id.to_string(),
            attempt_number,
            answers: Vec::new(),
            score: 0,
            total_questions: 0,
            percentage: 0,
            passed: false,
            status: AttemptStatus::InProgress,
            reviewed: false,
            review_notes: None,
            reviewed_by: None,
            started_at: Utc::now(),
            completed_at: None,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == AttemptStatus::Completed
    }
}
