pub mod api_keys;
pub mod ask;
pub mod qa_pairs;

use crate::error::SibylError;

/// Required body/query fields: absent and blank both count as missing.
pub(crate) fn require(value: Option<String>, field: &'static str) -> Result<String, SibylError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(SibylError::MissingField(field)),
    }
}

/// Optional body/query fields: blank counts as absent, so an explicit
/// `""` user id still means the shared/global scope and an explicit `""`
/// model still falls through to the credential's default.
pub(crate) fn optional(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
