use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{error, instrument};

use crate::client::{document_payload, Backend, Query};
use crate::config::Collections;
use crate::error::{ApiError, Fetched};

use super::types::{
    BlogPost, BlogPostPatch, Certification, CertificationPatch, Contact, ContactPatch, Experience,
    ExperiencePatch, Hero, HeroPatch, Project, ProjectPatch, Skill, SkillPatch,
};

/// Typed CRUD access to the portfolio content collections.
///
/// Reads soft-fail: any backend error is logged and degraded to the empty
/// default (see [`Fetched`]). Writes propagate [`ApiError`] to the caller.
pub struct PortfolioService {
    backend: Arc<dyn Backend>,
    collections: Collections,
    // Serialize in-process find-or-create on the singleton collections so
    // concurrent writers cannot double-create the document.
    hero_lock: Mutex<()>,
    contact_lock: Mutex<()>,
}

impl PortfolioService {
    pub fn new(backend: Arc<dyn Backend>, collections: Collections) -> Self {
        Self {
            backend,
            collections,
            hero_lock: Mutex::new(()),
            contact_lock: Mutex::new(()),
        }
    }

    // ---- generic helpers -------------------------------------------------

    async fn list<T: DeserializeOwned>(
        &self,
        collection_id: &str,
        queries: &[Query],
        entity: &'static str,
    ) -> Fetched<Vec<T>> {
        let docs = match self.backend.list_documents(collection_id, queries).await {
            Ok(docs) => docs,
            Err(e) => {
                error!(entity, error = %e, "list failed; degrading to empty");
                return Fetched::Degraded(Vec::new(), e);
            }
        };

        let mut out = Vec::with_capacity(docs.len());
        for doc in docs {
            match serde_json::from_value(doc) {
                Ok(item) => out.push(item),
                Err(e) => {
                    error!(entity, error = %e, "undecodable document; degrading to empty");
                    return Fetched::Degraded(Vec::new(), ApiError::InvalidResponse(e.to_string()));
                }
            }
        }
        Fetched::Fresh(out)
    }

    /// First document of an unfiltered listing — the singleton pattern.
    async fn first<T: DeserializeOwned>(
        &self,
        collection_id: &str,
        entity: &'static str,
    ) -> Fetched<Option<T>> {
        match self.list::<T>(collection_id, &[], entity).await {
            Fetched::Fresh(items) => Fetched::Fresh(items.into_iter().next()),
            Fetched::Degraded(_, e) => Fetched::Degraded(None, e),
        }
    }

    async fn get<T: DeserializeOwned>(
        &self,
        collection_id: &str,
        id: &str,
        entity: &'static str,
    ) -> Fetched<Option<T>> {
        match self.backend.get_document(collection_id, id).await {
            Ok(doc) => match serde_json::from_value(doc) {
                Ok(item) => Fetched::Fresh(Some(item)),
                Err(e) => {
                    error!(entity, id, error = %e, "undecodable document");
                    Fetched::Degraded(None, ApiError::InvalidResponse(e.to_string()))
                }
            },
            // A missing document is data, not degradation.
            Err(e) if e.status() == Some(404) => Fetched::Fresh(None),
            Err(e) => {
                error!(entity, id, error = %e, "get failed; degrading to none");
                Fetched::Degraded(None, e)
            }
        }
    }

    async fn create<T>(&self, collection_id: &str, data: &T) -> Result<T, ApiError>
    where
        T: Serialize + DeserializeOwned,
    {
        let payload = document_payload(data)?;
        let doc = self.backend.create_document(collection_id, payload).await?;
        serde_json::from_value(doc).map_err(|e| ApiError::InvalidResponse(e.to_string()))
    }

    async fn update<T, P>(&self, collection_id: &str, id: &str, patch: &P) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        P: Serialize,
    {
        let payload = document_payload(patch)?;
        let doc = self
            .backend
            .update_document(collection_id, id, payload)
            .await?;
        serde_json::from_value(doc).map_err(|e| ApiError::InvalidResponse(e.to_string()))
    }

    async fn remove(&self, collection_id: &str, id: &str) -> Result<(), ApiError> {
        self.backend.delete_document(collection_id, id).await
    }

    /// Find-or-create for the singleton collections: patch the first
    /// document when one exists, create from the patch otherwise. Callers
    /// never juggle identifiers; the race window is closed in-process by
    /// the per-singleton lock.
    async fn upsert_first<T, P>(
        &self,
        collection_id: &str,
        lock: &Mutex<()>,
        patch: &P,
    ) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        P: Serialize,
    {
        let _guard = lock.lock().await;
        let existing = self.backend.list_documents(collection_id, &[]).await?;
        let current_id = existing
            .first()
            .and_then(|doc| doc.get("$id").and_then(Value::as_str))
            .map(str::to_owned);

        match current_id {
            Some(id) => self.update(collection_id, &id, patch).await,
            None => {
                let payload = document_payload(patch)?;
                let doc = self.backend.create_document(collection_id, payload).await?;
                serde_json::from_value(doc).map_err(|e| ApiError::InvalidResponse(e.to_string()))
            }
        }
    }

    // ---- hero ------------------------------------------------------------

    pub async fn hero(&self) -> Fetched<Option<Hero>> {
        self.first(&self.collections.hero, "hero").await
    }

    #[instrument(skip(self, patch))]
    pub async fn set_hero(&self, patch: &HeroPatch) -> Result<Hero, ApiError> {
        self.upsert_first(&self.collections.hero, &self.hero_lock, patch)
            .await
    }

    // ---- skills ----------------------------------------------------------

    /// Skills in display order (ascending `order`).
    pub async fn skills(&self) -> Fetched<Vec<Skill>> {
        self.list(
            &self.collections.skills,
            &[Query::order_asc("order")],
            "skill",
        )
        .await
    }

    pub async fn create_skill(&self, skill: &Skill) -> Result<Skill, ApiError> {
        check_proficiency(skill.proficiency)?;
        self.create(&self.collections.skills, skill).await
    }

    pub async fn update_skill(&self, id: &str, patch: &SkillPatch) -> Result<Skill, ApiError> {
        if let Some(p) = patch.proficiency {
            check_proficiency(p)?;
        }
        self.update(&self.collections.skills, id, patch).await
    }

    pub async fn delete_skill(&self, id: &str) -> Result<(), ApiError> {
        self.remove(&self.collections.skills, id).await
    }

    // ---- projects --------------------------------------------------------

    /// Projects in display order (descending `order`), optionally filtered
    /// on the `featured` flag.
    pub async fn projects(&self, featured: Option<bool>) -> Fetched<Vec<Project>> {
        let mut queries = vec![Query::order_desc("order")];
        if let Some(featured) = featured {
            queries.push(Query::equal("featured", featured));
        }
        self.list(&self.collections.projects, &queries, "project")
            .await
    }

    pub async fn project(&self, id: &str) -> Fetched<Option<Project>> {
        self.get(&self.collections.projects, id, "project").await
    }

    pub async fn create_project(&self, project: &Project) -> Result<Project, ApiError> {
        self.create(&self.collections.projects, project).await
    }

    pub async fn update_project(
        &self,
        id: &str,
        patch: &ProjectPatch,
    ) -> Result<Project, ApiError> {
        self.update(&self.collections.projects, id, patch).await
    }

    pub async fn delete_project(&self, id: &str) -> Result<(), ApiError> {
        self.remove(&self.collections.projects, id).await
    }

    // ---- experience ------------------------------------------------------

    pub async fn experience(&self) -> Fetched<Vec<Experience>> {
        self.list(
            &self.collections.experience,
            &[Query::order_desc("order")],
            "experience",
        )
        .await
    }

    pub async fn create_experience(&self, entry: &Experience) -> Result<Experience, ApiError> {
        self.create(&self.collections.experience, entry).await
    }

    pub async fn update_experience(
        &self,
        id: &str,
        patch: &ExperiencePatch,
    ) -> Result<Experience, ApiError> {
        self.update(&self.collections.experience, id, patch).await
    }

    pub async fn delete_experience(&self, id: &str) -> Result<(), ApiError> {
        self.remove(&self.collections.experience, id).await
    }

    // ---- certifications --------------------------------------------------

    pub async fn certifications(&self) -> Fetched<Vec<Certification>> {
        self.list(
            &self.collections.certifications,
            &[Query::order_desc("order")],
            "certification",
        )
        .await
    }

    pub async fn create_certification(
        &self,
        cert: &Certification,
    ) -> Result<Certification, ApiError> {
        self.create(&self.collections.certifications, cert).await
    }

    pub async fn update_certification(
        &self,
        id: &str,
        patch: &CertificationPatch,
    ) -> Result<Certification, ApiError> {
        self.update(&self.collections.certifications, id, patch)
            .await
    }

    pub async fn delete_certification(&self, id: &str) -> Result<(), ApiError> {
        self.remove(&self.collections.certifications, id).await
    }

    // ---- contact ---------------------------------------------------------

    pub async fn contact(&self) -> Fetched<Option<Contact>> {
        self.first(&self.collections.contact, "contact").await
    }

    #[instrument(skip(self, patch))]
    pub async fn set_contact(&self, patch: &ContactPatch) -> Result<Contact, ApiError> {
        self.upsert_first(&self.collections.contact, &self.contact_lock, patch)
            .await
    }

    // ---- blog ------------------------------------------------------------

    /// Posts by recency (descending `createdAt`). `published_only` filters
    /// to published posts; pass `false` for the admin view of everything.
    pub async fn blog_posts(&self, published_only: bool) -> Fetched<Vec<BlogPost>> {
        let mut queries = vec![Query::order_desc("createdAt")];
        if published_only {
            queries.push(Query::equal("published", true));
        }
        self.list(&self.collections.blog, &queries, "blog post")
            .await
    }

    pub async fn blog_post(&self, id: &str) -> Fetched<Option<BlogPost>> {
        self.get(&self.collections.blog, id, "blog post").await
    }

    pub async fn create_blog_post(&self, post: &BlogPost) -> Result<BlogPost, ApiError> {
        self.create(&self.collections.blog, post).await
    }

    pub async fn update_blog_post(
        &self,
        id: &str,
        patch: &BlogPostPatch,
    ) -> Result<BlogPost, ApiError> {
        self.update(&self.collections.blog, id, patch).await
    }

    pub async fn delete_blog_post(&self, id: &str) -> Result<(), ApiError> {
        self.remove(&self.collections.blog, id).await
    }
}

fn check_proficiency(value: u8) -> Result<(), ApiError> {
    if value > 100 {
        return Err(ApiError::Invalid(format!(
            "proficiency must be within 0..=100, got {value}"
        )));
    }
    Ok(())
}
