//! PostgreSQL implementation of the alias repository.

use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;
use tracing::error;

use crate::domain::entities::{AliasKind, AliasRecord};
use crate::domain::repositories::{AliasRepository, StoreError};
use crate::utils::db_error::is_unique_violation_on_alias;

/// PostgreSQL repository for alias records.
///
/// The `aliases.alias` primary key is what arbitrates concurrent inserts of the
/// same alias; no locking happens here.
pub struct PgAliasRepository {
    pool: Arc<PgPool>,
}

impl PgAliasRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct AliasRow {
    alias: String,
    kind: String,
    redirect_to: Option<String>,
    filename: Option<String>,
    storage_key: Option<String>,
}

impl TryFrom<AliasRow> for AliasRecord {
    type Error = StoreError;

    fn try_from(row: AliasRow) -> Result<Self, Self::Error> {
        let kind: AliasKind = row
            .kind
            .parse()
            .map_err(|e: crate::domain::entities::UnknownKind| StoreError::Fault(e.to_string()))?;

        Ok(AliasRecord {
            alias: row.alias,
            kind,
            redirect_to: row.redirect_to,
            filename: row.filename,
            storage_key: row.storage_key,
        })
    }
}

fn fault(op: &str, e: sqlx::Error) -> StoreError {
    error!(op, error = %e, "Database error");
    StoreError::Fault(e.to_string())
}

#[async_trait]
impl AliasRepository for PgAliasRepository {
    async fn insert(&self, record: &AliasRecord) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            INSERT INTO aliases (alias, kind, redirect_to, filename, storage_key)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(&record.alias)
        .bind(record.kind.as_str())
        .bind(&record.redirect_to)
        .bind(&record.filename)
        .bind(&record.storage_key)
        .execute(self.pool.as_ref())
        .await;

        match result {
            Ok(done) if done.rows_affected() == 0 => {
                Err(StoreError::Fault("no rows affected".to_string()))
            }
            Ok(_) => Ok(()),
            Err(e) if is_unique_violation_on_alias(&e) => Err(StoreError::UniqueViolation),
            Err(e) => Err(fault("PgAliasRepository::insert", e)),
        }
    }

    async fn get(&self, alias: &str) -> Result<AliasRecord, StoreError> {
        let row = sqlx::query_as::<_, AliasRow>(
            r#"
            SELECT alias, kind, redirect_to, filename, storage_key
            FROM aliases
            WHERE alias = $1
            "#,
        )
        .bind(alias)
        .fetch_optional(self.pool.as_ref())
        .await
        .map_err(|e| fault("PgAliasRepository::get", e))?;

        row.ok_or(StoreError::NotFound)?.try_into()
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1")
            .execute(self.pool.as_ref())
            .await
            .map(|_| ())
            .map_err(|e| fault("PgAliasRepository::ping", e))
    }
}
