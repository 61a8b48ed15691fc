pub mod delete;
pub mod list;
pub mod upload;

// Re-export handler functions for use in routing
pub use delete::file_delete;
pub use list::file_list;
pub use upload::file_upload;

use std::path::Path;

use uuid::Uuid;

/// Key prefix owned by a user. Everything under it belongs to them; nothing
/// outside it is reachable through the file routes.
fn user_prefix(user_id: Uuid) -> String {
    format!("users/{}/", user_id)
}

/// Fresh opaque key under the caller's namespace, preserving the original
/// extension.
fn object_key(user_id: Uuid, original_name: &str) -> String {
    let extension = Path::new(original_name)
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default();
    format!("users/{}/{}{}", user_id, Uuid::new_v4(), extension)
}
