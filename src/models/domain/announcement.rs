use async_graphql::SimpleObject;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, SimpleObject)]
pub struct Announcement {
    pub id: String,
    pub title: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub course_id: Option<String>, // None = site-wide
    pub author_id: String,
    pub pinned: bool,
    pub published: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified_at: Option<DateTime<Utc>>,
}

impl Announcement {
    pub fn new(title: &str, content: &str, author_id: &str) -> Self {
        let now = Utc::now();
        Announcement {
            id: Uuid::new_v4().to_string(),
            title: title.trim().to_string(),
            content: content.to_string(),
            course_id: None,
            author_id: author_id.to_string(),
            pinned: false,
            published: true,
            created_at: Some(now),
            modified_at: Some(now),
        }
    }
}
