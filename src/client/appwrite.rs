use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{multipart, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;
use uuid::Uuid;

use super::{Backend, Query};
use crate::config::AppConfig;
use crate::error::ApiError;
use crate::session::User;

/// Error envelope returned by the platform on any non-2xx response.
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    message: String,
    #[serde(rename = "type", default)]
    kind: String,
}

/// Remote client handle: one configured HTTP client per process, bound to
/// an endpoint URL and project id. The session token lives in the cookie
/// store, so account, database and storage calls share one logical
/// connection. No retry, pooling beyond reqwest's own, or caching.
pub struct AppwriteBackend {
    http: reqwest::Client,
    endpoint: String,
    project_id: String,
    database_id: String,
    bucket_id: String,
}

impl AppwriteBackend {
    pub fn new(config: &AppConfig) -> anyhow::Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "X-Appwrite-Project",
            HeaderValue::from_str(&config.project_id)?,
        );

        let http = reqwest::Client::builder()
            .cookie_store(true)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            http,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            project_id: config.project_id.clone(),
            database_id: config.database_id.clone(),
            bucket_id: config.bucket_id.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.endpoint, path)
    }

    fn documents_url(&self, collection_id: &str) -> String {
        self.url(&format!(
            "/databases/{}/collections/{}/documents",
            self.database_id, collection_id
        ))
    }

    fn file_url(&self, file_id: &str) -> String {
        self.url(&format!(
            "/storage/buckets/{}/files/{}",
            self.bucket_id, file_id
        ))
    }

    /// Issue a request and translate a non-2xx response into
    /// [`ApiError::Backend`] using the platform error envelope.
    async fn send(&self, request: RequestBuilder) -> Result<Response, ApiError> {
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let envelope = response.json::<ErrorEnvelope>().await.unwrap_or_else(|_| {
            ErrorEnvelope {
                message: status
                    .canonical_reason()
                    .unwrap_or("backend error")
                    .to_string(),
                kind: String::new(),
            }
        });
        debug!(status = %status, kind = %envelope.kind, "backend rejected request");
        Err(ApiError::backend(
            status.as_u16(),
            envelope.kind,
            envelope.message,
        ))
    }

    async fn json<T: serde::de::DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| ApiError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl Backend for AppwriteBackend {
    async fn create_session(&self, email: &str, password: &str) -> Result<(), ApiError> {
        let request = self
            .http
            .post(self.url("/account/sessions/email"))
            .json(&json!({ "email": email, "password": password }));
        self.send(request).await?;
        Ok(())
    }

    async fn get_account(&self) -> Result<User, ApiError> {
        let response = self.send(self.http.get(self.url("/account"))).await?;
        Self::json(response).await
    }

    async fn delete_session(&self) -> Result<(), ApiError> {
        let request = self.http.delete(self.url("/account/sessions/current"));
        self.send(request).await?;
        Ok(())
    }

    async fn create_account(
        &self,
        email: &str,
        password: &str,
        name: &str,
    ) -> Result<(), ApiError> {
        let request = self.http.post(self.url("/account")).json(&json!({
            "userId": Uuid::new_v4().to_string(),
            "email": email,
            "password": password,
            "name": name,
        }));
        self.send(request).await?;
        Ok(())
    }

    async fn list_documents(
        &self,
        collection_id: &str,
        queries: &[Query],
    ) -> Result<Vec<Value>, ApiError> {
        #[derive(Deserialize)]
        struct DocumentList {
            documents: Vec<Value>,
        }

        let params: Vec<(&str, String)> = queries
            .iter()
            .map(|q| ("queries[]", q.to_param()))
            .collect();
        let request = self.http.get(self.documents_url(collection_id)).query(&params);
        let response = self.send(request).await?;
        let list: DocumentList = Self::json(response).await?;
        Ok(list.documents)
    }

    async fn get_document(
        &self,
        collection_id: &str,
        document_id: &str,
    ) -> Result<Value, ApiError> {
        let url = format!("{}/{}", self.documents_url(collection_id), document_id);
        let response = self.send(self.http.get(url)).await?;
        Self::json(response).await
    }

    async fn create_document(&self, collection_id: &str, data: Value) -> Result<Value, ApiError> {
        let request = self.http.post(self.documents_url(collection_id)).json(&json!({
            "documentId": Uuid::new_v4().to_string(),
            "data": data,
        }));
        let response = self.send(request).await?;
        Self::json(response).await
    }

    async fn update_document(
        &self,
        collection_id: &str,
        document_id: &str,
        data: Value,
    ) -> Result<Value, ApiError> {
        let url = format!("{}/{}", self.documents_url(collection_id), document_id);
        let request = self.http.patch(url).json(&json!({ "data": data }));
        let response = self.send(request).await?;
        Self::json(response).await
    }

    async fn delete_document(
        &self,
        collection_id: &str,
        document_id: &str,
    ) -> Result<(), ApiError> {
        let url = format!("{}/{}", self.documents_url(collection_id), document_id);
        // 204 on success; nothing to decode.
        self.send(self.http.delete(url)).await?;
        Ok(())
    }

    async fn create_file(
        &self,
        body: Bytes,
        file_name: &str,
        content_type: &str,
    ) -> Result<String, ApiError> {
        #[derive(Deserialize)]
        struct CreatedFile {
            #[serde(rename = "$id")]
            id: String,
        }

        let part = multipart::Part::bytes(body.to_vec())
            .file_name(file_name.to_string())
            .mime_str(content_type)?;
        let form = multipart::Form::new()
            .text("fileId", Uuid::new_v4().to_string())
            .part("file", part);

        let url = self.url(&format!("/storage/buckets/{}/files", self.bucket_id));
        let response = self.send(self.http.post(url).multipart(form)).await?;
        let created: CreatedFile = Self::json(response).await?;
        Ok(created.id)
    }

    fn file_view_url(&self, file_id: &str) -> String {
        format!("{}/view?project={}", self.file_url(file_id), self.project_id)
    }

    async fn delete_file(&self, file_id: &str) -> Result<(), ApiError> {
        self.send(self.http.delete(self.file_url(file_id))).await?;
        Ok(())
    }
}
