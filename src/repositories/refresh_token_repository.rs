use async_trait::async_trait;
use mongodb::{bson::doc, options::IndexOptions, Collection, IndexModel};

use crate::{
    db::{collections, Database},
    errors::AppResult,
    models::domain::RefreshToken,
};

/// Hashes of issued refresh tokens. A token is usable while its record is unrevoked
/// and unexpired.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RefreshTokenRepository: Send + Sync {
    async fn create(&self, token: RefreshToken) -> AppResult<RefreshToken>;
    async fn find_by_token_hash(&self, hash: &str) -> AppResult<Option<RefreshToken>>;
    /// Revokes a still-active token. Returns false when it was already revoked or unknown,
    /// so two concurrent rotations of the same token cannot both succeed.
    async fn revoke_active(&self, hash: &str) -> AppResult<bool>;
    async fn revoke_all_for_user(&self, user_id: &str) -> AppResult<u64>;
}

pub struct MongoRefreshTokenRepository {
    collection: Collection<RefreshToken>,
}

impl MongoRefreshTokenRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.get_collection(collections::REFRESH_TOKENS),
        }
    }

    pub async fn ensure_indexes(&self) -> AppResult<()> {
        let hash_index = IndexModel::builder()
            .keys(doc! { "token_hash": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        let user_index = IndexModel::builder()
            .keys(doc! { "user_id": 1, "revoked": 1 })
            .build();

        self.collection
            .create_indexes([hash_index, user_index])
            .await?;
        log::info!("Created indexes on refresh_tokens (token_hash, user_id)");

        Ok(())
    }
}

#[async_trait]
impl RefreshTokenRepository for MongoRefreshTokenRepository {
    async fn create(&self, token: RefreshToken) -> AppResult<RefreshToken> {
        self.collection.insert_one(&token).await?;
        Ok(token)
    }

    async fn find_by_token_hash(&self, hash: &str) -> AppResult<Option<RefreshToken>> {
        let token = self
            .collection
            .find_one(doc! { "token_hash": hash })
            .await?;
        Ok(token)
    }

    async fn revoke_active(&self, hash: &str) -> AppResult<bool> {
        let result = self
            .collection
            .update_one(
                doc! { "token_hash": hash, "revoked": false },
                doc! { "$set": { "revoked": true } },
            )
            .await?;

        Ok(result.modified_count == 1)
    }

    async fn revoke_all_for_user(&self, user_id: &str) -> AppResult<u64> {
        let result = self
            .collection
            .update_many(
                doc! { "user_id": user_id, "revoked": false },
                doc! { "$set": { "revoked": true } },
            )
            .await?;

        Ok(result.modified_count)
    }
}
