use std::future::{ready, Ready};

use actix_web::{dev::Payload, http::header::Header, web, FromRequest, HttpRequest};
use actix_web_httpauth::headers::authorization::{Authorization, Bearer};

use crate::{
    auth::{Claims, JwtService},
    errors::AppError,
};

/// Claims of the caller, taken from a valid `Authorization: Bearer <jwt>` header.
pub struct AuthenticatedUser(pub Claims);

/// Like [`AuthenticatedUser`] but `None` for anonymous callers. A header that is
/// present but invalid is still rejected.
pub struct MaybeAuthenticatedUser(pub Option<Claims>);

fn jwt_service(req: &HttpRequest) -> Result<&JwtService, AppError> {
    req.app_data::<web::Data<JwtService>>()
        .map(|data| data.get_ref())
        .ok_or_else(|| AppError::InternalError("JWT service not configured".to_string()))
}

pub(crate) fn claims_from_request(req: &HttpRequest) -> Result<Option<Claims>, AppError> {
    if !req.headers().contains_key(actix_web::http::header::AUTHORIZATION) {
        return Ok(None);
    }

    let auth = Authorization::<Bearer>::parse(req).map_err(|_| {
        AppError::Unauthorized("Invalid Authorization format. Expected: Bearer <token>".to_string())
    })?;

    let claims = jwt_service(req)?.validate_token(auth.as_ref().token())?;
    Ok(Some(claims))
}

impl FromRequest for AuthenticatedUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let result = claims_from_request(req).and_then(|claims| {
            claims
                .map(AuthenticatedUser)
                .ok_or_else(|| AppError::Unauthorized("Missing authorization header".to_string()))
        });
        ready(result)
    }
}

impl FromRequest for MaybeAuthenticatedUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(claims_from_request(req).map(MaybeAuthenticatedUser))
    }
}
