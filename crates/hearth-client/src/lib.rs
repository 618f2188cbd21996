//! Client side of Hearth: HTTP API and relay clients, the logged-in
//! session, and the calendar and game state that never touches the server.

pub mod api;
pub mod calendar;
pub mod error;
pub mod games;
pub mod relay;
pub mod session;

pub use api::ApiClient;
pub use error::ClientError;
pub use relay::RelayClient;
pub use session::Session;
