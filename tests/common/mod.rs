#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::{DateTime, Utc};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use scribe_api::app::app;
use scribe_api::database::models::{Note, User};
use scribe_api::database::repository::{
    NewUser, NoteChanges, NoteDraft, NoteStore, StoreError, UserStore,
};
use scribe_api::services::identity::{
    AccountProfile, IdentityError, IdentityProvider, IssuedTokens,
};
use scribe_api::services::storage::{ObjectStorage, StorageError, StoredObject};
use scribe_api::services::telemetry::{LogEvent, MetricUnit, Telemetry};
use scribe_api::state::AppState;

/// The stub provider accepts exactly this confirmation code.
pub const CONFIRMATION_CODE: &str = "000000";

// ---------------------------------------------------------------------------
// In-memory stores

#[derive(Default)]
pub struct InMemoryUserStore {
    rows: Mutex<Vec<User>>,
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|user| user.id == id)
            .cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|user| user.email == email)
            .cloned())
    }

    async fn create(&self, new_user: NewUser) -> Result<User, StoreError> {
        let mut rows = self.rows.lock().unwrap();
        if rows.iter().any(|user| user.email == new_user.email) {
            return Err(StoreError::UniqueViolation("email"));
        }
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            external_id: new_user.external_id,
            email: new_user.email,
            first_name: new_user.first_name,
            last_name: new_user.last_name,
            created_at: now,
            updated_at: now,
        };
        rows.push(user.clone());
        Ok(user)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryNoteStore {
    rows: Mutex<Vec<Note>>,
}

impl InMemoryNoteStore {
    pub fn count(&self) -> usize {
        self.rows.lock().unwrap().len()
    }
}

#[async_trait]
impl NoteStore for InMemoryNoteStore {
    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Note>, StoreError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|note| note.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn create(&self, user_id: Uuid, draft: NoteDraft) -> Result<Note, StoreError> {
        let now = Utc::now();
        let note = Note {
            id: Uuid::new_v4(),
            title: draft.title,
            content: draft.content,
            user_id,
            created_at: now,
            updated_at: now,
        };
        self.rows.lock().unwrap().push(note.clone());
        Ok(note)
    }

    async fn find_for_user(&self, id: Uuid, user_id: Uuid) -> Result<Option<Note>, StoreError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|note| note.id == id && note.user_id == user_id)
            .cloned())
    }

    async fn update_for_user(
        &self,
        id: Uuid,
        user_id: Uuid,
        changes: NoteChanges,
    ) -> Result<Option<Note>, StoreError> {
        let mut rows = self.rows.lock().unwrap();
        let note = rows
            .iter_mut()
            .find(|note| note.id == id && note.user_id == user_id);
        Ok(note.map(|note| {
            if let Some(title) = changes.title {
                note.title = title;
            }
            if let Some(content) = changes.content {
                note.content = content;
            }
            note.updated_at = Utc::now();
            note.clone()
        }))
    }

    async fn delete_for_user(&self, id: Uuid, user_id: Uuid) -> Result<bool, StoreError> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|note| !(note.id == id && note.user_id == user_id));
        Ok(rows.len() < before)
    }
}

// ---------------------------------------------------------------------------
// Stub identity provider

#[derive(Clone)]
struct StubAccount {
    external_id: String,
    password: String,
    confirmed: bool,
    first_name: String,
    last_name: String,
}

/// In-memory stand-in for the hosted identity service. Confirmation codes
/// are fixed to [`CONFIRMATION_CODE`].
#[derive(Default)]
pub struct StubIdentity {
    accounts: Mutex<HashMap<String, StubAccount>>,
    sessions: Mutex<HashMap<String, String>>,
}

impl StubIdentity {
    /// Mint a valid session for tests that do not exercise the login flow.
    pub fn issue_session(&self, email: &str) -> String {
        self.accounts
            .lock()
            .unwrap()
            .entry(email.to_string())
            .or_insert_with(|| StubAccount {
                external_id: Uuid::new_v4().to_string(),
                password: "password".into(),
                confirmed: true,
                first_name: "Test".into(),
                last_name: "User".into(),
            });

        let token = format!("access-{}", Uuid::new_v4());
        self.sessions
            .lock()
            .unwrap()
            .insert(token.clone(), email.to_string());
        token
    }
}

#[async_trait]
impl IdentityProvider for StubIdentity {
    async fn register(
        &self,
        email: &str,
        password: &str,
        first_name: &str,
        last_name: &str,
    ) -> Result<String, IdentityError> {
        let mut accounts = self.accounts.lock().unwrap();
        if accounts.contains_key(email) {
            return Err(IdentityError::Rejected(
                "An account with the given email already exists".into(),
            ));
        }
        let external_id = Uuid::new_v4().to_string();
        accounts.insert(
            email.to_string(),
            StubAccount {
                external_id: external_id.clone(),
                password: password.to_string(),
                confirmed: false,
                first_name: first_name.to_string(),
                last_name: last_name.to_string(),
            },
        );
        Ok(external_id)
    }

    async fn confirm(&self, email: &str, code: &str) -> Result<(), IdentityError> {
        let mut accounts = self.accounts.lock().unwrap();
        let account = accounts
            .get_mut(email)
            .ok_or_else(|| IdentityError::Rejected("Unknown account".into()))?;
        if code != CONFIRMATION_CODE {
            return Err(IdentityError::Rejected("Invalid verification code".into()));
        }
        account.confirmed = true;
        Ok(())
    }

    async fn login(&self, email: &str, password: &str) -> Result<IssuedTokens, IdentityError> {
        let account = self
            .accounts
            .lock()
            .unwrap()
            .get(email)
            .cloned()
            .ok_or(IdentityError::InvalidCredentials)?;
        if !account.confirmed || account.password != password {
            return Err(IdentityError::InvalidCredentials);
        }

        let access_token = format!("access-{}", Uuid::new_v4());
        self.sessions
            .lock()
            .unwrap()
            .insert(access_token.clone(), email.to_string());

        Ok(IssuedTokens {
            id_token: format!("id-{}", Uuid::new_v4()),
            access_token,
            refresh_token: Some(format!("refresh-{}", Uuid::new_v4())),
            expires_in: 3600,
        })
    }

    async fn resolve_token(&self, access_token: &str) -> Result<AccountProfile, IdentityError> {
        let email = self
            .sessions
            .lock()
            .unwrap()
            .get(access_token)
            .cloned()
            .ok_or(IdentityError::InvalidToken)?;
        let account = self
            .accounts
            .lock()
            .unwrap()
            .get(&email)
            .cloned()
            .ok_or(IdentityError::InvalidToken)?;

        Ok(AccountProfile {
            external_id: account.external_id,
            email,
            given_name: Some(account.first_name).filter(|s| !s.is_empty()),
            family_name: Some(account.last_name).filter(|s| !s.is_empty()),
        })
    }

    async fn forgot_password(&self, email: &str) -> Result<(), IdentityError> {
        if self.accounts.lock().unwrap().contains_key(email) {
            Ok(())
        } else {
            Err(IdentityError::Rejected("Unknown account".into()))
        }
    }

    async fn reset_password(
        &self,
        email: &str,
        code: &str,
        new_password: &str,
    ) -> Result<(), IdentityError> {
        if code != CONFIRMATION_CODE {
            return Err(IdentityError::Rejected("Invalid verification code".into()));
        }
        let mut accounts = self.accounts.lock().unwrap();
        let account = accounts
            .get_mut(email)
            .ok_or_else(|| IdentityError::Rejected("Unknown account".into()))?;
        account.password = new_password.to_string();
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// In-memory object storage

#[derive(Clone)]
struct StoredBlob {
    bytes: Vec<u8>,
    content_type: String,
    original_name: String,
    stored_at: DateTime<Utc>,
}

#[derive(Default)]
pub struct InMemoryStorage {
    objects: Mutex<HashMap<String, StoredBlob>>,
    delete_calls: Mutex<Vec<String>>,
}

impl InMemoryStorage {
    pub fn contains(&self, key: &str) -> bool {
        self.objects.lock().unwrap().contains_key(key)
    }

    /// Keys that reached the delete operation, owned or not.
    pub fn delete_calls(&self) -> Vec<String> {
        self.delete_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ObjectStorage for InMemoryStorage {
    async fn put(
        &self,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
        original_name: &str,
    ) -> Result<(), StorageError> {
        self.objects.lock().unwrap().insert(
            key.to_string(),
            StoredBlob {
                bytes: body,
                content_type: content_type.to_string(),
                original_name: original_name.to_string(),
                stored_at: Utc::now(),
            },
        );
        Ok(())
    }

    async fn list(&self, prefix: &str, max_keys: i32) -> Result<Vec<StoredObject>, StorageError> {
        let objects = self.objects.lock().unwrap();
        let mut entries: Vec<StoredObject> = objects
            .iter()
            .filter(|(key, _)| key.starts_with(prefix))
            .map(|(key, blob)| StoredObject {
                key: key.clone(),
                size: blob.bytes.len() as i64,
                last_modified: Some(blob.stored_at),
            })
            .collect();
        entries.sort_by(|a, b| a.key.cmp(&b.key));
        entries.truncate(max_keys.max(0) as usize);
        Ok(entries)
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.delete_calls.lock().unwrap().push(key.to_string());
        self.objects.lock().unwrap().remove(key);
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        format!("https://test-bucket.s3.eu-west-1.amazonaws.com/{}", key)
    }
}

// ---------------------------------------------------------------------------
// Telemetry sink that drops everything

pub struct NoopTelemetry;

#[async_trait]
impl Telemetry for NoopTelemetry {
    async fn initialize(&self) {}

    async fn emit_log(&self, _event: LogEvent) {}

    async fn emit_metric(
        &self,
        _name: &str,
        _value: f64,
        _unit: MetricUnit,
        _dimensions: &[(&str, String)],
    ) {
    }
}

// ---------------------------------------------------------------------------
// Harness

pub struct TestEnv {
    pub app: Router,
    pub identity: Arc<StubIdentity>,
    pub storage: Arc<InMemoryStorage>,
    pub users: Arc<InMemoryUserStore>,
    pub notes: Arc<InMemoryNoteStore>,
}

/// Full router over in-memory stores and collaborators.
pub fn test_env() -> TestEnv {
    let users = Arc::new(InMemoryUserStore::default());
    let notes = Arc::new(InMemoryNoteStore::default());
    let identity = Arc::new(StubIdentity::default());
    let storage = Arc::new(InMemoryStorage::default());

    let state = AppState {
        users: users.clone(),
        notes: notes.clone(),
        identity: identity.clone(),
        storage: storage.clone(),
        telemetry: Arc::new(NoopTelemetry),
    };

    TestEnv {
        app: app(state),
        identity,
        storage,
        users,
        notes,
    }
}

pub async fn send_json(
    app: &Router,
    method: &str,
    path: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(path);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }

    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

pub async fn send_multipart(
    app: &Router,
    path: &str,
    token: &str,
    field_name: &str,
    file_name: &str,
    content_type: &str,
    bytes: &[u8],
) -> (StatusCode, Value) {
    let boundary = "test-boundary-7MA4YWxkTrZu0gW";
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
            field_name, file_name
        )
        .as_bytes(),
    );
    body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", content_type).as_bytes());
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{}--\r\n", boundary).as_bytes());

    let request = Request::builder()
        .method("POST")
        .uri(path)
        .header("authorization", format!("Bearer {}", token))
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", boundary),
        )
        .body(Body::from(body))
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

/// Percent-encode an object key so it travels as one path segment.
pub fn encode_key(key: &str) -> String {
    percent_encoding::utf8_percent_encode(key, percent_encoding::NON_ALPHANUMERIC).to_string()
}

/// The caller's local user id, as reported by the profile endpoint.
pub async fn profile_id(app: &Router, token: &str) -> Uuid {
    let (status, body) = send_json(app, "GET", "/auth/profile", Some(token), None).await;
    assert_eq!(status, StatusCode::OK, "profile lookup failed: {}", body);
    body["id"]
        .as_str()
        .and_then(|id| Uuid::parse_str(id).ok())
        .expect("profile returns a uuid id")
}
