pub mod claims;
pub mod jwt;
pub mod middleware;
pub mod password;
pub mod utils;

pub use claims::Claims;
pub use jwt::JwtService;
pub use middleware::{AuthenticatedUser, MaybeAuthenticatedUser};
pub use utils::{
    extract_claims_from_context, require_admin, require_approved, require_owner_or_admin,
    require_staff,
};
