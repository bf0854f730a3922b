use thiserror::Error;

use super::BoxFuture;
use crate::lpa::Lpa;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("lpa store unavailable: {0}")]
    Unavailable(String),
    #[error("lpa serialization error: {0}")]
    Serialization(String),
    #[error("lpa version conflict: expected {expected}, found {found}")]
    Conflict { expected: u64, found: u64 },
    #[error("lpa store error: {0}")]
    Operation(String),
}

/// Whole-aggregate persistence keyed by session id.
///
/// `put` succeeds only when `lpa.version` equals the stored version (zero for
/// a key that has never been written) and returns the new version.
pub trait LpaStore: Send + Sync {
    fn get(&self, session_id: &str) -> BoxFuture<'_, Result<Option<Lpa>, StoreError>>;

    fn put(&self, session_id: &str, lpa: &Lpa) -> BoxFuture<'_, Result<u64, StoreError>>;
}
