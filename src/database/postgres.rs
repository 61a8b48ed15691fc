use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::models::{Note, User};
use super::repository::{NewUser, NoteChanges, NoteDraft, NoteStore, StoreError, UserStore};

const USER_COLUMNS: &str = "id, external_id, email, first_name, last_name, created_at, updated_at";
const NOTE_COLUMNS: &str = "id, title, content, user_id, created_at, updated_at";

fn unique_violation(err: sqlx::Error, what: &'static str) -> StoreError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => StoreError::UniqueViolation(what),
        _ => StoreError::Sqlx(err),
    }
}

pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn create(&self, new_user: NewUser) -> Result<User, StoreError> {
        sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (id, external_id, email, first_name, last_name) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(&new_user.external_id)
        .bind(&new_user.email)
        .bind(&new_user.first_name)
        .bind(&new_user.last_name)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| unique_violation(e, "email"))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

pub struct PgNoteStore {
    pool: PgPool,
}

impl PgNoteStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NoteStore for PgNoteStore {
    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Note>, StoreError> {
        let notes = sqlx::query_as::<_, Note>(&format!(
            "SELECT {NOTE_COLUMNS} FROM notes WHERE user_id = $1 ORDER BY created_at"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(notes)
    }

    async fn create(&self, user_id: Uuid, draft: NoteDraft) -> Result<Note, StoreError> {
        let note = sqlx::query_as::<_, Note>(&format!(
            "INSERT INTO notes (id, title, content, user_id) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {NOTE_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(&draft.title)
        .bind(&draft.content)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(note)
    }

    async fn find_for_user(&self, id: Uuid, user_id: Uuid) -> Result<Option<Note>, StoreError> {
        let note = sqlx::query_as::<_, Note>(&format!(
            "SELECT {NOTE_COLUMNS} FROM notes WHERE id = $1 AND user_id = $2"
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(note)
    }

    async fn update_for_user(
        &self,
        id: Uuid,
        user_id: Uuid,
        changes: NoteChanges,
    ) -> Result<Option<Note>, StoreError> {
        let note = sqlx::query_as::<_, Note>(&format!(
            "UPDATE notes \
             SET title = COALESCE($3, title), \
                 content = COALESCE($4, content), \
                 updated_at = now() \
             WHERE id = $1 AND user_id = $2 \
             RETURNING {NOTE_COLUMNS}"
        ))
        .bind(id)
        .bind(user_id)
        .bind(&changes.title)
        .bind(&changes.content)
        .fetch_optional(&self.pool)
        .await?;
        Ok(note)
    }

    async fn delete_for_user(&self, id: Uuid, user_id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM notes WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
