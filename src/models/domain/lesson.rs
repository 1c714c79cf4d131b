use async_graphql::{Enum, SimpleObject};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, SimpleObject)]
pub struct Lesson {
    pub id: String,
    pub course_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>, // set for sub-lessons
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    pub lesson_type: LessonType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<i32>,
    pub order_number: i32,
    pub is_preview: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified_at: Option<DateTime<Utc>>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize, Enum)]
#[serde(rename_all = "snake_case")]
pub enum LessonType {
    #[default]
    Text,
    Video,
    Audio,
    Document,
    Quiz,
    Assignment,
}

impl Lesson {
    pub fn new(course_id: &str, title: &str, lesson_type: LessonType, order_number: i32) -> Self {
        let now = Utc::now();
        Lesson {
            id: Uuid::new_v4().to_string(),
            course_id: course_id.to_string(),
            parent_id: None,
            title: title.trim().to_string(),
            content: None,
            lesson_type,
            media_url: None,
            duration_minutes: None,
            order_number,
            is_preview: false,
            created_at: Some(now),
            modified_at: Some(now),
        }
    }

    pub fn is_top_level(&self) -> bool {
        self.parent_id.is_none()
    }

    pub fn touch(&mut self) {
        self.modified_at = Some(Utc::now());
    }
}
