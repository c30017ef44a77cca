use async_trait::async_trait;
use snafu::ResultExt;
use sqlx::PgPool;

use super::error::{self, Result};

/// Append-only audit log of attempted sends. One row per (client, kind,
/// recipient) per dispatch; repeats are new rows, not upserts.
#[async_trait]
pub trait ReceiptsRepo: Send + Sync {
    /// Records one receipt per guid, all tagged with the same client and
    /// kind.
    async fn create(&self, client_id: &str, kind_id: &str, user_guids: &[String]) -> Result<()>;
}

/// Receipt repository backed by Postgres.
#[derive(Clone)]
pub struct PgReceiptsRepo {
    db: PgPool,
}

impl PgReceiptsRepo {
    #[inline]
    #[must_use]
    pub const fn new(db: PgPool) -> Self { Self { db } }
}

#[async_trait]
impl ReceiptsRepo for PgReceiptsRepo {
    async fn create(&self, client_id: &str, kind_id: &str, user_guids: &[String]) -> Result<()> {
        if user_guids.is_empty() {
            return Ok(());
        }

        let _result = sqlx::query(
            "INSERT INTO receipts (client_id, kind_id, user_guid) \
             SELECT $1, $2, unnest($3::text[])",
        )
        .bind(client_id)
        .bind(kind_id)
        .bind(user_guids)
        .execute(&self.db)
        .await
        .context(error::CreateReceiptsSnafu)?;

        Ok(())
    }
}
