use async_trait::async_trait;
use snafu::ResultExt;
use sqlx::PgPool;

use super::error::{self, Result};

/// One stored template triple, addressed by its dotted name.
#[derive(Clone, Debug, sqlx::FromRow)]
pub struct TemplateRow {
    pub name: String,
    pub subject: String,
    pub text: String,
    pub html: String,
}

#[async_trait]
pub trait TemplateStore: Send + Sync {
    async fn find_by_name(&self, name: &str) -> Result<Option<TemplateRow>>;
}

/// Template store backed by Postgres. The global defaults are seeded by a
/// migration, so a fresh database already resolves every suffix.
#[derive(Clone)]
pub struct PgTemplateStore {
    db: PgPool,
}

impl PgTemplateStore {
    #[inline]
    #[must_use]
    pub const fn new(db: PgPool) -> Self { Self { db } }
}

#[async_trait]
impl TemplateStore for PgTemplateStore {
    async fn find_by_name(&self, name: &str) -> Result<Option<TemplateRow>> {
        sqlx::query_as::<_, TemplateRow>(
            "SELECT name, subject, text, html FROM templates WHERE name = $1",
        )
        .bind(name)
        .fetch_optional(&self.db)
        .await
        .context(error::FindTemplateSnafu)
    }
}
