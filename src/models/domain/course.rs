use async_graphql::{Enum, SimpleObject};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize, SimpleObject)]
pub struct Course {
    pub id: String,
    pub title: String,
    pub slug: String,
    pub description: String,
    pub instructor: InstructorRef, // denormalized at create time
    pub course_type: CourseType,
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    pub published: bool,
    pub student_count: i64,
    pub lesson_count: i64,
    pub rating_average: f64,
    pub rating_count: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified_at: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, SimpleObject)]
pub struct InstructorRef {
    pub id: String,
    pub name: String,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize, Enum)]
#[serde(rename_all = "snake_case")]
pub enum CourseType {
    Free,
    #[default]
    Paid,
}

/// Pricing after the free-course rule: free courses always cost nothing.
pub fn normalize_pricing(
    course_type: CourseType,
    price: f64,
    discount_price: Option<f64>,
) -> (f64, Option<f64>) {
    match course_type {
        CourseType::Free => (0.0, None),
        CourseType::Paid => (price, discount_price),
    }
}

/// Lower-case, dash-separated slug derived from free text.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    for c in text.trim().chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

impl Course {
    pub fn new(title: &str, slug: &str, description: &str, instructor: InstructorRef) -> Self {
        let now = Utc::now();
        Course {
            id: Uuid::new_v4().to_string(),
            title: title.trim().to_string(),
            slug: slug.to_string(),
            description: description.to_string(),
            instructor,
            course_type: CourseType::Free,
            price: 0.0,
            discount_price: None,
            category: None,
            level: None,
            thumbnail_url: None,
            published: false,
            student_count: 0,
            lesson_count: 0,
            rating_average: 0.0,
            rating_count: 0,
            created_at: Some(now),
            modified_at: Some(now),
        }
    }

    /// Folds a student's rating into the running average. `previous` is the value
    /// that student gave before, which is swapped out rather than counted again.
    pub fn apply_rating(&mut self, previous: Option<i32>, rating: i32) {
        let mut total = self.rating_average * self.rating_count as f64;
        match previous {
            Some(old) => total += (rating - old) as f64,
            None => {
                total += rating as f64;
                self.rating_count += 1;
            }
        }
        self.rating_average = total / self.rating_count.max(1) as f64;
    }

    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.instructor.id == user_id
    }

    pub fn touch(&mut self) {
        self.modified_at = Some(Utc::now());
    }
}
