use std::sync::Arc;

use crate::auth::AuthService;
use crate::client::{AppwriteBackend, Backend, MemoryBackend};
use crate::config::{AppConfig, Collections};
use crate::portfolio::PortfolioService;
use crate::session::SessionStore;
use crate::storage::StorageService;

/// Composition root: one backend handle and one session store per
/// process, shared by every service the UI asks for.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub backend: Arc<dyn Backend>,
    pub session: Arc<SessionStore>,
    // Built once: the singleton upsert lock must be process-wide.
    portfolio: Arc<PortfolioService>,
}

impl AppState {
    pub fn init() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let config = Arc::new(AppConfig::from_env()?);
        let backend = Arc::new(AppwriteBackend::new(&config)?) as Arc<dyn Backend>;
        Ok(Self::from_parts(
            config,
            backend,
            Arc::new(SessionStore::new()),
        ))
    }

    pub fn from_parts(
        config: Arc<AppConfig>,
        backend: Arc<dyn Backend>,
        session: Arc<SessionStore>,
    ) -> Self {
        let portfolio = Arc::new(PortfolioService::new(
            backend.clone(),
            config.collections.clone(),
        ));
        Self {
            config,
            backend,
            session,
            portfolio,
        }
    }

    /// State wired to an in-memory backend with canned configuration.
    pub fn fake() -> Self {
        let config = Arc::new(AppConfig {
            endpoint: "memory://".into(),
            project_id: "test-project".into(),
            database_id: "test-db".into(),
            bucket_id: "test-bucket".into(),
            collections: Collections {
                hero: "hero".into(),
                skills: "skills".into(),
                projects: "projects".into(),
                experience: "experience".into(),
                certifications: "certifications".into(),
                contact: "contact".into(),
                blog: "blog".into(),
            },
        });
        let backend = Arc::new(MemoryBackend::new()) as Arc<dyn Backend>;
        Self::from_parts(config, backend, Arc::new(SessionStore::new()))
    }

    pub fn auth(&self) -> AuthService {
        AuthService::new(self.backend.clone(), self.session.clone())
    }

    pub fn portfolio(&self) -> Arc<PortfolioService> {
        self.portfolio.clone()
    }

    pub fn storage(&self) -> StorageService {
        StorageService::new(self.backend.clone())
    }
}
