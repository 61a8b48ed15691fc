pub mod auth;
pub mod telemetry;

pub use auth::{require_auth, AuthUser};
pub use telemetry::track_requests;
