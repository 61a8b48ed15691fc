use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use super::models::{Note, User};

/// Errors surfaced by the persistence layer
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("unique value already taken: {0}")]
    UniqueViolation(&'static str),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Attributes for a user row created at registration or on first sight.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub external_id: Option<String>,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NoteDraft {
    pub title: String,
    pub content: String,
}

/// Partial note update; `None` leaves the stored field untouched.
#[derive(Debug, Clone, Default)]
pub struct NoteChanges {
    pub title: Option<String>,
    pub content: Option<String>,
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
    async fn create(&self, new_user: NewUser) -> Result<User, StoreError>;
    /// Liveness probe against the backing store.
    async fn ping(&self) -> Result<(), StoreError>;
}

/// Note access, always scoped to the owning user. A note owned by someone
/// else is indistinguishable from a missing one at this seam.
#[async_trait]
pub trait NoteStore: Send + Sync {
    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Note>, StoreError>;
    async fn create(&self, user_id: Uuid, draft: NoteDraft) -> Result<Note, StoreError>;
    async fn find_for_user(&self, id: Uuid, user_id: Uuid) -> Result<Option<Note>, StoreError>;
    async fn update_for_user(
        &self,
        id: Uuid,
        user_id: Uuid,
        changes: NoteChanges,
    ) -> Result<Option<Note>, StoreError>;
    /// Returns whether a row was actually removed.
    async fn delete_for_user(&self, id: Uuid, user_id: Uuid) -> Result<bool, StoreError>;
}
