// Not every test binary uses every helper.
#![allow(dead_code)]

use std::sync::Arc;

use folio::client::MemoryBackend;
use folio::config::{AppConfig, Collections};
use folio::portfolio::types::{
    BlogPost, Project, ProjectCategory, Skill, SkillCategory,
};
use folio::session::SessionStore;
use folio::state::AppState;
use time::macros::datetime;
use time::OffsetDateTime;

pub fn test_config() -> Arc<AppConfig> {
    Arc::new(AppConfig {
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
    })
}

/// App state wired to an in-memory backend, with the concrete backend
/// handle kept around for outage switches and assertions.
pub fn memory_state() -> (AppState, Arc<MemoryBackend>) {
    // RUST_LOG=folio=debug makes failures readable.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();

    let backend = Arc::new(MemoryBackend::new());
    let state = AppState::from_parts(
        test_config(),
        backend.clone(),
        Arc::new(SessionStore::new()),
    );
    (state, backend)
}

pub fn sample_skill(name: &str, order: i64) -> Skill {
    Skill {
        id: None,
        name: name.into(),
        category: SkillCategory::Language,
        proficiency: 80,
        icon: None,
        order,
    }
}

pub fn sample_project(title: &str, order: i64, featured: bool) -> Project {
    Project {
        id: None,
        title: title.into(),
        description: format!("{title} description"),
        long_description: None,
        image_url: None,
        demo_url: None,
        github_url: Some(format!("https://github.com/me/{title}")),
        technologies: vec!["rust".into(), "tokio".into()],
        category: ProjectCategory::Fullstack,
        featured,
        order,
        created_at: datetime!(2024-01-15 09:00 UTC),
    }
}

pub fn sample_post(slug: &str, published: bool, created_at: OffsetDateTime) -> BlogPost {
    BlogPost {
        id: None,
        title: format!("Post {slug}"),
        slug: slug.into(),
        excerpt: "tl;dr".into(),
        content: "# heading\n\nbody".into(),
        image_url: None,
        tags: vec!["notes".into()],
        published,
        published_at: published.then_some(created_at),
        created_at,
        updated_at: created_at,
    }
}
