use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::{doc, to_bson},
    options::{IndexOptions, ReplaceOptions},
    Collection, IndexModel,
};

use crate::{
    db::{collections, is_duplicate_key, Database, ListOptions, QueryFilter, SortOrder},
    errors::{AppError, AppResult},
    models::domain::{User, UserRole, UserStatus},
};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserFilter {
    pub role: Option<UserRole>,
    pub status: Option<UserStatus>,
    /// Substring of name or email.
    pub search: Option<String>,
}

impl UserFilter {
    pub fn matches(&self, user: &User) -> bool {
        self.role.map_or(true, |r| user.role == r)
            && self.status.map_or(true, |s| user.status == s)
            && self.search.as_deref().map_or(true, |needle| {
                let needle = needle.trim().to_lowercase();
                user.name.to_lowercase().contains(&needle)
                    || user.email.to_lowercase().contains(&needle)
            })
    }

    fn to_query(&self) -> AppResult<QueryFilter> {
        let mut filter = QueryFilter::new();
        if let Some(role) = self.role {
            filter = filter.eq("role", to_bson(&role)?);
        }
        if let Some(status) = self.status {
            filter = filter.eq("status", to_bson(&status)?);
        }
        if let Some(search) = &self.search {
            filter = filter.contains_any(&["name", "email"], search);
        }
        Ok(filter)
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, user: User) -> AppResult<User>;
    async fn find_by_id(&self, id: &str) -> AppResult<Option<User>>;
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;
    async fn list(&self, filter: UserFilter, offset: i64, limit: i64) -> AppResult<(Vec<User>, i64)>;
    async fn count(&self, filter: UserFilter) -> AppResult<i64>;
    async fn update(&self, user: User) -> AppResult<User>;
}

pub struct MongoUserRepository {
    collection: Collection<User>,
}

impl MongoUserRepository {
    pub fn new(db: &Database) -> Self {
        let collection = db.get_collection(collections::USERS);
        Self { collection }
    }

    pub async fn ensure_indexes(&self) -> AppResult<()> {
        let id_index = IndexModel::builder()
            .keys(doc! { "id": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        let email_index = IndexModel::builder()
            .keys(doc! { "email": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();

        self.collection.create_index(id_index).await?;
        self.collection.create_index(email_index).await?;
        log::info!("Created unique indexes on users.id and users.email");

        Ok(())
    }
}

#[async_trait]
impl UserRepository for MongoUserRepository {
    async fn create(&self, user: User) -> AppResult<User> {
        match self.collection.insert_one(&user).await {
            Ok(_) => Ok(user),
            Err(e) if is_duplicate_key(&e) => Err(AppError::AlreadyExists(format!(
                "User with email '{}' already exists",
                user.email
            ))),
            Err(e) => Err(e.into()),
        }
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<User>> {
        let user = self.collection.find_one(doc! { "id": id }).await?;
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let user = self
            .collection
            .find_one(doc! { "email": email.trim().to_lowercase() })
            .await?;
        Ok(user)
    }

    async fn list(&self, filter: UserFilter, offset: i64, limit: i64) -> AppResult<(Vec<User>, i64)> {
        let filter = filter.to_query()?.into_document();
        let total = self.collection.count_documents(filter.clone()).await? as i64;

        let options = ListOptions::paged(offset, limit).sort_by("created_at", SortOrder::Desc);
        let cursor = self
            .collection
            .find(filter)
            .with_options(options.to_find_options())
            .await?;
        let users: Vec<User> = cursor.try_collect().await?;

        Ok((users, total))
    }

    async fn count(&self, filter: UserFilter) -> AppResult<i64> {
        let filter = filter.to_query()?.into_document();
        Ok(self.collection.count_documents(filter).await? as i64)
    }

    async fn update(&self, user: User) -> AppResult<User> {
        let options = ReplaceOptions::builder().upsert(false).build();

        let result = self
            .collection
            .replace_one(doc! { "id": &user.id }, &user)
            .with_options(options)
            .await?;

        if result.matched_count == 0 {
            return Err(AppError::NotFound(format!(
                "User with id '{}' not found",
                user.id
            )));
        }

        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_matches_role_status_and_search() {
        let user = User::test_user("Alice Smith", UserRole::Student, UserStatus::Pending);

        assert!(UserFilter::default().matches(&user));
        assert!(UserFilter {
            status: Some(UserStatus::Pending),
            search: Some("SMITH".into()),
            ..Default::default()
        }
        .matches(&user));
        assert!(!UserFilter {
            role: Some(UserRole::Admin),
            ..Default::default()
        }
        .matches(&user));
    }

    #[test]
    fn filter_query_uses_snake_case_enum_values() {
        let filter = UserFilter {
            role: Some(UserRole::Instructor),
            status: Some(UserStatus::Approved),
            search: None,
        };

        let query = filter.to_query().unwrap().into_document();
        assert_eq!(query, doc! { "role": "instructor", "status": "approved" });
    }
}
