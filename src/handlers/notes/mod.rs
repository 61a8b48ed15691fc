pub mod create;
pub mod delete;
pub mod get;
pub mod list;
pub mod update;

// Re-export handler functions for use in routing
pub use create::note_create;
pub use delete::note_delete;
pub use get::note_get;
pub use list::note_list;
pub use update::note_update;

use uuid::Uuid;

use crate::error::ApiError;

/// Parse a note id from the path. A malformed id is indistinguishable from
/// a missing note to the caller.
fn parse_note_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::not_found("Note not found"))
}
