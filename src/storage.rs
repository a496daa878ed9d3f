use std::sync::Arc;

use bytes::Bytes;
use tracing::{info, instrument};

use crate::client::Backend;
use crate::error::ApiError;

/// Upload and delete helpers for the portfolio media bucket.
///
/// Unlike the content reads, both paths always propagate errors: a failed
/// upload must surface so the caller never embeds a dead URL.
pub struct StorageService {
    backend: Arc<dyn Backend>,
}

impl StorageService {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self { backend }
    }

    /// Store a blob under a fresh id and return its public view URL.
    #[instrument(skip(self, body), fields(len = body.len()))]
    pub async fn upload(
        &self,
        body: Bytes,
        file_name: &str,
        content_type: &str,
    ) -> Result<String, ApiError> {
        if body.is_empty() {
            return Err(ApiError::Invalid("empty upload".into()));
        }
        let file_id = self
            .backend
            .create_file(body, file_name, content_type)
            .await?;
        info!(file_id = %file_id, file_name, "file uploaded");
        Ok(self.backend.file_view_url(&file_id))
    }

    pub async fn delete(&self, file_id: &str) -> Result<(), ApiError> {
        self.backend.delete_file(file_id).await
    }
}
