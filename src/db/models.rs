use chrono::{DateTime, Utc};

use crate::config::Provider;

/// One stored provider credential. `user_id = None` is the shared/global
/// scope, tracked independently of every per-user scope.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiKeyRecord {
    pub id: i64,
    pub key: String,
    pub provider: Provider,
    pub model: String,
    pub user_id: Option<String>,
    pub is_valid: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One recorded question/answer exchange for a webpage.
#[derive(Debug, Clone, PartialEq)]
pub struct QaPairRecord {
    pub id: i64,
    pub webpage_url: String,
    pub question: String,
    pub answer: String,
    pub context: Option<String>,
    pub created_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
