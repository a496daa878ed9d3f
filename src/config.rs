use serde::Deserialize;

/// Per-entity document collection identifiers, provisioned on the platform.
#[derive(Debug, Clone, Deserialize)]
pub struct Collections {
    pub hero: String,
    pub skills: String,
    pub projects: String,
    pub experience: String,
    pub certifications: String,
    pub contact: String,
    pub blog: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub endpoint: String,
    pub project_id: String,
    pub database_id: String,
    pub bucket_id: String,
    pub collections: Collections,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let collections = Collections {
            hero: std::env::var("APPWRITE_HERO_COLLECTION_ID")?,
            skills: std::env::var("APPWRITE_SKILLS_COLLECTION_ID")?,
            projects: std::env::var("APPWRITE_PROJECTS_COLLECTION_ID")?,
            experience: std::env::var("APPWRITE_EXPERIENCE_COLLECTION_ID")?,
            certifications: std::env::var("APPWRITE_CERTIFICATIONS_COLLECTION_ID")?,
            contact: std::env::var("APPWRITE_CONTACT_COLLECTION_ID")?,
            blog: std::env::var("APPWRITE_BLOG_COLLECTION_ID")?,
        };
        Ok(Self {
            endpoint: std::env::var("APPWRITE_ENDPOINT")
                .unwrap_or_else(|_| "https://cloud.appwrite.io/v1".into()),
            project_id: std::env::var("APPWRITE_PROJECT_ID")?,
            database_id: std::env::var("APPWRITE_DATABASE_ID")?,
            bucket_id: std::env::var("APPWRITE_BUCKET_ID")?,
            collections,
        })
    }
}

#[cfg(test)]
mod config_tests {
    use super::AppConfig;

    #[test]
    fn from_env_reads_all_identifiers() {
        for (key, value) in [
            ("APPWRITE_PROJECT_ID", "proj"),
            ("APPWRITE_DATABASE_ID", "db"),
            ("APPWRITE_BUCKET_ID", "bucket"),
            ("APPWRITE_HERO_COLLECTION_ID", "hero"),
            ("APPWRITE_SKILLS_COLLECTION_ID", "skills"),
            ("APPWRITE_PROJECTS_COLLECTION_ID", "projects"),
            ("APPWRITE_EXPERIENCE_COLLECTION_ID", "experience"),
            ("APPWRITE_CERTIFICATIONS_COLLECTION_ID", "certifications"),
            ("APPWRITE_CONTACT_COLLECTION_ID", "contact"),
            ("APPWRITE_BLOG_COLLECTION_ID", "blog"),
        ] {
            std::env::set_var(key, value);
        }

        let config = AppConfig::from_env().unwrap();
        assert_eq!(config.project_id, "proj");
        // Endpoint falls back to the hosted default when unset.
        assert!(config.endpoint.starts_with("https://"));
        assert_eq!(config.collections.blog, "blog");
    }
}
