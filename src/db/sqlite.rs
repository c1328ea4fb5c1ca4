use crate::config::Provider;
use crate::db::models::{ApiKeyRecord, QaPairRecord};
use crate::db::schema::SQLITE_INIT;
use crate::error::SibylError;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Pool, Row, Sqlite};

pub type SqlitePool = Pool<Sqlite>;

/// Initialize the schema by executing the bundled DDL.
pub async fn init_schema(pool: &SqlitePool) -> Result<(), SibylError> {
    // execute multiple statements safely (SQLite supports multi-commands but sqlx::query doesn't)
    for stmt in SQLITE_INIT.split(';') {
        let s = stmt.trim();
        if s.is_empty() {
            continue;
        }
        sqlx::query(s).execute(pool).await?;
    }
    Ok(())
}

#[derive(Clone)]
pub struct CredentialStore {
    pool: SqlitePool,
}

impl CredentialStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Fetch the single valid credential for an exact (provider, user-scope)
    /// pair. `user_id IS ?` keeps the NULL scope separate from every
    /// concrete user id.
    pub async fn find_valid(
        &self,
        provider: Provider,
        user_id: Option<&str>,
    ) -> Result<Option<ApiKeyRecord>, SibylError> {
        let row = sqlx::query(
            r#"SELECT id, key, provider, model, user_id, is_valid, created_at, updated_at
               FROM api_keys
               WHERE provider = ? AND user_id IS ? AND is_valid = 1
               ORDER BY id DESC LIMIT 1"#,
        )
        .bind(provider.as_str())
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Self::row_to_model).transpose()
    }

    /// Replace the credential for a scope: within one transaction, mark every
    /// existing row matching (provider, user-scope) invalid, then insert the
    /// new valid row. Superseded rows stay behind for audit.
    pub async fn upsert_invalidating_prior(
        &self,
        provider: Provider,
        user_id: Option<&str>,
        key: &str,
        model: &str,
    ) -> Result<ApiKeyRecord, SibylError> {
        let now = Utc::now();
        let now_str = now.to_rfc3339();

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "UPDATE api_keys SET is_valid = 0, updated_at = ? WHERE provider = ? AND user_id IS ?",
        )
        .bind(&now_str)
        .bind(provider.as_str())
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

        let inserted = sqlx::query(
            r#"INSERT INTO api_keys (key, provider, model, user_id, is_valid, created_at, updated_at)
               VALUES (?, ?, ?, ?, 1, ?, ?)"#,
        )
        .bind(key)
        .bind(provider.as_str())
        .bind(model)
        .bind(user_id)
        .bind(&now_str)
        .bind(&now_str)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(ApiKeyRecord {
            id: inserted.last_insert_rowid(),
            key: key.to_string(),
            provider,
            model: model.to_string(),
            user_id: user_id.map(str::to_string),
            is_valid: true,
            created_at: now,
            updated_at: now,
        })
    }

    fn row_to_model(row: SqliteRow) -> Result<ApiKeyRecord, SibylError> {
        let id: i64 = row.try_get("id")?;
        let key: String = row.try_get("key")?;
        let provider_str: String = row.try_get("provider")?;
        let model: String = row.try_get("model")?;
        let user_id: Option<String> = row.try_get("user_id")?;
        let is_valid_i: i64 = row.try_get("is_valid")?;
        let created_at: String = row.try_get("created_at")?;
        let updated_at: String = row.try_get("updated_at")?;

        let provider = Provider::parse(&provider_str).ok_or_else(|| {
            sqlx::Error::Decode(format!("unknown provider in api_keys row: {provider_str}").into())
        })?;

        Ok(ApiKeyRecord {
            id,
            key,
            provider,
            model,
            user_id,
            is_valid: is_valid_i != 0,
            created_at: parse_rfc3339(&created_at)?,
            updated_at: parse_rfc3339(&updated_at)?,
        })
    }
}

#[derive(Clone)]
pub struct QaStore {
    pool: SqlitePool,
}

impl QaStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a new Q&A pair and return its row id.
    pub async fn insert(
        &self,
        webpage_url: &str,
        question: &str,
        answer: &str,
        context: Option<&str>,
        created_by: Option<&str>,
    ) -> Result<i64, SibylError> {
        let now = Utc::now().to_rfc3339();
        let inserted = sqlx::query(
            r#"INSERT INTO qa_pairs (webpage_url, question, answer, context, created_by, created_at, updated_at)
               VALUES (?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(webpage_url)
        .bind(question)
        .bind(answer)
        .bind(context)
        .bind(created_by)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;
        Ok(inserted.last_insert_rowid())
    }

    pub async fn list_by_url(&self, webpage_url: &str) -> Result<Vec<QaPairRecord>, SibylError> {
        let rows = sqlx::query(
            r#"SELECT id, webpage_url, question, answer, context, created_by, created_at, updated_at
               FROM qa_pairs WHERE webpage_url = ? ORDER BY id"#,
        )
        .bind(webpage_url)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(Self::row_to_model).collect()
    }

    /// Delete by id. Deleting an id that does not exist is `NotFound` and
    /// mutates nothing, so retries are idempotent.
    pub async fn delete(&self, id: i64) -> Result<(), SibylError> {
        let result = sqlx::query("DELETE FROM qa_pairs WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(SibylError::NotFound("QA pair not found".to_string()));
        }
        Ok(())
    }

    fn row_to_model(row: SqliteRow) -> Result<QaPairRecord, SibylError> {
        let id: i64 = row.try_get("id")?;
        let webpage_url: String = row.try_get("webpage_url")?;
        let question: String = row.try_get("question")?;
        let answer: String = row.try_get("answer")?;
        let context: Option<String> = row.try_get("context")?;
        let created_by: Option<String> = row.try_get("created_by")?;
        let created_at: String = row.try_get("created_at")?;
        let updated_at: String = row.try_get("updated_at")?;

        Ok(QaPairRecord {
            id,
            webpage_url,
            question,
            answer,
            context,
            created_by,
            created_at: parse_rfc3339(&created_at)?,
            updated_at: parse_rfc3339(&updated_at)?,
        })
    }
}

fn parse_rfc3339(raw: &str) -> Result<DateTime<Utc>, SibylError> {
    Ok(DateTime::parse_from_rfc3339(raw)
        .map_err(|e| sqlx::Error::Decode(Box::new(e)))?
        .with_timezone(&Utc))
}
