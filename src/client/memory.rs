use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::sync::Mutex;

use async_trait::async_trait;
use bytes::Bytes;
use serde_json::Value;
use uuid::Uuid;

use super::{Backend, Query};
use crate::error::ApiError;
use crate::session::User;

#[derive(Debug, Clone)]
struct Account {
    id: String,
    password: String,
    name: String,
}

#[derive(Debug, Clone)]
struct StoredFile {
    file_name: String,
    content_type: String,
    len: usize,
}

#[derive(Default)]
struct Inner {
    accounts: HashMap<String, Account>,
    /// Email of the signed-in account, if any. One session per process,
    /// like the real platform's cookie session.
    session: Option<String>,
    collections: HashMap<String, Vec<Value>>,
    files: HashMap<String, StoredFile>,
}

/// In-memory stand-in for the hosted platform, used by `AppState::fake()`
/// and the integration tests. Honors the same contract as
/// [`AppwriteBackend`](super::AppwriteBackend), including query clauses,
/// and can simulate a full outage via [`set_offline`](Self::set_offline).
#[derive(Default)]
pub struct MemoryBackend {
    inner: Mutex<Inner>,
    offline: AtomicBool,
    reject_sessions: AtomicBool,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail as if the backend were down.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, AtomicOrdering::SeqCst);
    }

    /// Reject session creation while everything else keeps working.
    /// Lets tests open the register-succeeded-but-login-failed window.
    pub fn set_reject_sessions(&self, reject: bool) {
        self.reject_sessions.store(reject, AtomicOrdering::SeqCst);
    }

    /// Pre-provision an account without going through `register`.
    pub fn seed_account(&self, email: &str, password: &str, name: &str) {
        let mut inner = self.inner.lock().expect("memory backend lock");
        inner.accounts.insert(
            email.to_string(),
            Account {
                id: Uuid::new_v4().to_string(),
                password: password.to_string(),
                name: name.to_string(),
            },
        );
    }

    /// Number of live documents in a collection, for test assertions.
    pub fn document_count(&self, collection_id: &str) -> usize {
        let inner = self.inner.lock().expect("memory backend lock");
        inner
            .collections
            .get(collection_id)
            .map_or(0, |docs| docs.len())
    }

    pub fn file_count(&self) -> usize {
        let inner = self.inner.lock().expect("memory backend lock");
        inner.files.len()
    }

    /// `(file_name, content_type, byte length)` of a stored file.
    pub fn file_meta(&self, file_id: &str) -> Option<(String, String, usize)> {
        let inner = self.inner.lock().expect("memory backend lock");
        inner
            .files
            .get(file_id)
            .map(|f| (f.file_name.clone(), f.content_type.clone(), f.len))
    }

    fn check_online(&self) -> Result<(), ApiError> {
        if self.offline.load(AtomicOrdering::SeqCst) {
            return Err(ApiError::unavailable());
        }
        Ok(())
    }
}

/// Order two JSON attribute values the way the platform sorts them.
fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        _ => Ordering::Equal,
    }
}

fn apply_queries(mut docs: Vec<Value>, queries: &[Query]) -> Vec<Value> {
    for query in queries {
        if let Query::Equal { attribute, values } = query {
            docs.retain(|doc| {
                doc.get(attribute)
                    .map_or(false, |v| values.contains(v))
            });
        }
    }
    // First order clause wins; the services never send more than one.
    for query in queries {
        match query {
            Query::OrderAsc { attribute } => {
                docs.sort_by(|a, b| {
                    compare_values(
                        a.get(attribute).unwrap_or(&Value::Null),
                        b.get(attribute).unwrap_or(&Value::Null),
                    )
                });
                break;
            }
            Query::OrderDesc { attribute } => {
                docs.sort_by(|a, b| {
                    compare_values(
                        b.get(attribute).unwrap_or(&Value::Null),
                        a.get(attribute).unwrap_or(&Value::Null),
                    )
                });
                break;
            }
            Query::Equal { .. } => {}
        }
    }
    docs
}

#[async_trait]
impl Backend for MemoryBackend {
    async fn create_session(&self, email: &str, password: &str) -> Result<(), ApiError> {
        self.check_online()?;
        if self.reject_sessions.load(AtomicOrdering::SeqCst) {
            return Err(ApiError::backend(
                401,
                "user_session_blocked",
                "Session creation is blocked.",
            ));
        }
        let mut inner = self.inner.lock().expect("memory backend lock");
        match inner.accounts.get(email) {
            Some(account) if account.password == password => {
                inner.session = Some(email.to_string());
                Ok(())
            }
            _ => Err(ApiError::backend(
                401,
                "user_invalid_credentials",
                "Invalid credentials. Please check the email and password.",
            )),
        }
    }

    async fn get_account(&self) -> Result<User, ApiError> {
        self.check_online()?;
        let inner = self.inner.lock().expect("memory backend lock");
        let email = inner.session.as_deref().ok_or_else(|| {
            ApiError::backend(401, "general_unauthorized_scope", "User is not signed in.")
        })?;
        let account = inner.accounts.get(email).ok_or_else(|| {
            ApiError::backend(401, "user_not_found", "Account no longer exists.")
        })?;
        Ok(User {
            id: account.id.clone(),
            email: email.to_string(),
            name: account.name.clone(),
        })
    }

    async fn delete_session(&self) -> Result<(), ApiError> {
        self.check_online()?;
        let mut inner = self.inner.lock().expect("memory backend lock");
        inner.session = None;
        Ok(())
    }

    async fn create_account(
        &self,
        email: &str,
        password: &str,
        name: &str,
    ) -> Result<(), ApiError> {
        self.check_online()?;
        let mut inner = self.inner.lock().expect("memory backend lock");
        if inner.accounts.contains_key(email) {
            return Err(ApiError::backend(
                409,
                "user_already_exists",
                "A user with the same email already exists.",
            ));
        }
        inner.accounts.insert(
            email.to_string(),
            Account {
                id: Uuid::new_v4().to_string(),
                password: password.to_string(),
                name: name.to_string(),
            },
        );
        Ok(())
    }

    async fn list_documents(
        &self,
        collection_id: &str,
        queries: &[Query],
    ) -> Result<Vec<Value>, ApiError> {
        self.check_online()?;
        let inner = self.inner.lock().expect("memory backend lock");
        let docs = inner
            .collections
            .get(collection_id)
            .cloned()
            .unwrap_or_default();
        Ok(apply_queries(docs, queries))
    }

    async fn get_document(
        &self,
        collection_id: &str,
        document_id: &str,
    ) -> Result<Value, ApiError> {
        self.check_online()?;
        let inner = self.inner.lock().expect("memory backend lock");
        inner
            .collections
            .get(collection_id)
            .and_then(|docs| {
                docs.iter()
                    .find(|doc| doc.get("$id").and_then(Value::as_str) == Some(document_id))
            })
            .cloned()
            .ok_or_else(|| {
                ApiError::backend(
                    404,
                    "document_not_found",
                    "Document with the requested ID could not be found.",
                )
            })
    }

    async fn create_document(&self, collection_id: &str, data: Value) -> Result<Value, ApiError> {
        self.check_online()?;
        let Value::Object(mut map) = data else {
            return Err(ApiError::backend(
                400,
                "general_argument_invalid",
                "Document data must be an object.",
            ));
        };
        map.insert(
            "$id".to_string(),
            Value::String(Uuid::new_v4().to_string()),
        );
        let doc = Value::Object(map);
        let mut inner = self.inner.lock().expect("memory backend lock");
        inner
            .collections
            .entry(collection_id.to_string())
            .or_default()
            .push(doc.clone());
        Ok(doc)
    }

    async fn update_document(
        &self,
        collection_id: &str,
        document_id: &str,
        data: Value,
    ) -> Result<Value, ApiError> {
        self.check_online()?;
        let Value::Object(patch) = data else {
            return Err(ApiError::backend(
                400,
                "general_argument_invalid",
                "Document data must be an object.",
            ));
        };
        let mut inner = self.inner.lock().expect("memory backend lock");
        let doc = inner
            .collections
            .get_mut(collection_id)
            .and_then(|docs| {
                docs.iter_mut()
                    .find(|doc| doc.get("$id").and_then(Value::as_str) == Some(document_id))
            })
            .ok_or_else(|| {
                ApiError::backend(
                    404,
                    "document_not_found",
                    "Document with the requested ID could not be found.",
                )
            })?;
        if let Value::Object(map) = doc {
            for (key, value) in patch {
                map.insert(key, value);
            }
        }
        Ok(doc.clone())
    }

    async fn delete_document(
        &self,
        collection_id: &str,
        document_id: &str,
    ) -> Result<(), ApiError> {
        self.check_online()?;
        let mut inner = self.inner.lock().expect("memory backend lock");
        let docs = inner.collections.entry(collection_id.to_string()).or_default();
        let before = docs.len();
        docs.retain(|doc| doc.get("$id").and_then(Value::as_str) != Some(document_id));
        if docs.len() == before {
            return Err(ApiError::backend(
                404,
                "document_not_found",
                "Document with the requested ID could not be found.",
            ));
        }
        Ok(())
    }

    async fn create_file(
        &self,
        body: Bytes,
        file_name: &str,
        content_type: &str,
    ) -> Result<String, ApiError> {
        self.check_online()?;
        let id = Uuid::new_v4().to_string();
        let mut inner = self.inner.lock().expect("memory backend lock");
        inner.files.insert(
            id.clone(),
            StoredFile {
                file_name: file_name.to_string(),
                content_type: content_type.to_string(),
                len: body.len(),
            },
        );
        Ok(id)
    }

    fn file_view_url(&self, file_id: &str) -> String {
        format!("memory://storage/files/{}/view", file_id)
    }

    async fn delete_file(&self, file_id: &str) -> Result<(), ApiError> {
        self.check_online()?;
        let mut inner = self.inner.lock().expect("memory backend lock");
        inner.files.remove(file_id).ok_or_else(|| {
            ApiError::backend(
                404,
                "storage_file_not_found",
                "File with the requested ID could not be found.",
            )
        })?;
        Ok(())
    }
}
