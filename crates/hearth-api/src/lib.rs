pub mod auth;
pub mod error;
pub mod messages;
pub mod middleware;
pub mod routes;

pub use auth::{AppState, AppStateInner, AuthConfig};
pub use error::ApiError;
pub use routes::router;
