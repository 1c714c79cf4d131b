use async_graphql::{Context, ID};
use uuid::Uuid;

use crate::{
    auth::Claims,
    errors::{AppError, AppResult},
    models::dto::request::PaginationParams,
};

/// Checks that a GraphQL ID is a UUID and returns it as the stored string key.
pub fn parse_id(id: &ID) -> AppResult<String> {
    Uuid::parse_str(id.as_str())
        .map(|uuid| uuid.to_string())
        .map_err(|_| AppError::ValidationError("Invalid UUID format".to_string()))
}

/// Claims of the caller when the request carried a valid token.
pub fn viewer<'a>(ctx: &'a Context<'_>) -> Option<&'a Claims> {
    ctx.data_opt::<Claims>()
}

pub fn pagination(offset: Option<i64>, limit: Option<i64>) -> PaginationParams {
    let params = PaginationParams::new(offset, limit);
    PaginationParams::new(Some(params.offset()), Some(params.limit()))
}
