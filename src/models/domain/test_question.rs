use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct TestQuestion {
    pub id: String,
    pub test_id: String,
    pub question_text: String,
    pub options: Vec<String>,
    pub correct_answer: i32, // index into options
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    pub order_number: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified_at: Option<DateTime<Utc>>,
}

impl TestQuestion {
    pub fn new(
        test_id: &str,
        question_text: &str,
        options: Vec<String>,
        correct_answer: i32,
        order_number: i32,
    ) -> Self {
        let now = Utc::now();
        TestQuestion {
            id: Uuid::new_v4().to_string(),
            test_id: test_id.to_string(),
            question_text: question_text.trim().to_string(),
            options,
            correct_answer,
            explanation: None,
            order_number,
            created_at: Some(now),
            modified_at: Some(now),
        }
    }

    pub fn has_valid_answer(&self) -> bool {
        self.correct_answer >= 0 && (self.correct_answer as usize) < self.options.len()
    }
}
