pub mod appwrite;
pub mod memory;

use async_trait::async_trait;
use bytes::Bytes;
use serde::Serialize;
use serde_json::Value;

use crate::error::ApiError;
use crate::session::User;

pub use appwrite::AppwriteBackend;
pub use memory::MemoryBackend;

/// Ordering / equality clause attached to a document listing, serialized
/// to the platform's JSON query form.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "method")]
pub enum Query {
    #[serde(rename = "orderAsc")]
    OrderAsc { attribute: String },
    #[serde(rename = "orderDesc")]
    OrderDesc { attribute: String },
    #[serde(rename = "equal")]
    Equal { attribute: String, values: Vec<Value> },
}

impl Query {
    pub fn order_asc(attribute: &str) -> Self {
        Self::OrderAsc {
            attribute: attribute.into(),
        }
    }

    pub fn order_desc(attribute: &str) -> Self {
        Self::OrderDesc {
            attribute: attribute.into(),
        }
    }

    pub fn equal(attribute: &str, value: impl Into<Value>) -> Self {
        Self::Equal {
            attribute: attribute.into(),
            values: vec![value.into()],
        }
    }

    /// Wire form, one `queries[]` parameter per clause.
    pub(crate) fn to_param(&self) -> String {
        serde_json::to_string(self).expect("query clause serializes")
    }
}

/// Seam to the hosted platform: account/session management, document
/// collections, and file storage, all bound to one endpoint + project.
///
/// [`AppwriteBackend`] is the real thing; [`MemoryBackend`] backs
/// `AppState::fake()` and the integration tests. Documents cross this
/// boundary as raw JSON; typed mapping belongs to the services.
#[async_trait]
pub trait Backend: Send + Sync {
    // Account / session.
    async fn create_session(&self, email: &str, password: &str) -> Result<(), ApiError>;
    async fn get_account(&self) -> Result<User, ApiError>;
    async fn delete_session(&self) -> Result<(), ApiError>;
    async fn create_account(&self, email: &str, password: &str, name: &str)
        -> Result<(), ApiError>;

    // Document collections.
    async fn list_documents(
        &self,
        collection_id: &str,
        queries: &[Query],
    ) -> Result<Vec<Value>, ApiError>;
    async fn get_document(&self, collection_id: &str, document_id: &str)
        -> Result<Value, ApiError>;
    async fn create_document(&self, collection_id: &str, data: Value) -> Result<Value, ApiError>;
    async fn update_document(
        &self,
        collection_id: &str,
        document_id: &str,
        data: Value,
    ) -> Result<Value, ApiError>;
    async fn delete_document(&self, collection_id: &str, document_id: &str)
        -> Result<(), ApiError>;

    // File storage.
    async fn create_file(
        &self,
        body: Bytes,
        file_name: &str,
        content_type: &str,
    ) -> Result<String, ApiError>;
    fn file_view_url(&self, file_id: &str) -> String;
    async fn delete_file(&self, file_id: &str) -> Result<(), ApiError>;
}

/// Serialize an entity into a document payload, dropping `$`-prefixed
/// metadata keys — the platform rejects them inside `data`.
pub(crate) fn document_payload<T: Serialize>(entity: &T) -> Result<Value, ApiError> {
    let mut value =
        serde_json::to_value(entity).map_err(|e| ApiError::InvalidResponse(e.to_string()))?;
    if let Value::Object(ref mut map) = value {
        map.retain(|key, _| !key.starts_with('$'));
    }
    Ok(value)
}

#[cfg(test)]
mod query_tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn order_clauses_serialize_to_platform_form() {
        assert_eq!(
            serde_json::to_value(Query::order_asc("order")).unwrap(),
            json!({"method": "orderAsc", "attribute": "order"})
        );
        assert_eq!(
            serde_json::to_value(Query::order_desc("createdAt")).unwrap(),
            json!({"method": "orderDesc", "attribute": "createdAt"})
        );
    }

    #[test]
    fn equal_clause_wraps_value_in_values_array() {
        assert_eq!(
            serde_json::to_value(Query::equal("featured", true)).unwrap(),
            json!({"method": "equal", "attribute": "featured", "values": [true]})
        );
    }

    #[test]
    fn document_payload_strips_metadata_keys() {
        let doc = json!({"$id": "abc", "$createdAt": "now", "title": "hi"});
        let cleaned = document_payload(&doc).unwrap();
        assert_eq!(cleaned, json!({"title": "hi"}));
    }
}
