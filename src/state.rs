use std::sync::Arc;

use crate::database::repository::{NoteStore, UserStore};
use crate::services::identity::IdentityProvider;
use crate::services::storage::ObjectStorage;
use crate::services::telemetry::Telemetry;

/// Shared handles injected into every handler.
///
/// The stores and the three external collaborators sit behind trait objects
/// so the router can be exercised end-to-end with in-memory substitutes.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserStore>,
    pub notes: Arc<dyn NoteStore>,
    pub identity: Arc<dyn IdentityProvider>,
    pub storage: Arc<dyn ObjectStorage>,
    pub telemetry: Arc<dyn Telemetry>,
}
