pub mod auth;
pub mod cors;

pub use auth::{SessionMiddleware, SessionState, require_admin, require_session};
pub use cors::create_cors;
