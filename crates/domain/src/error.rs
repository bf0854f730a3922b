use thiserror::Error;

use crate::ports::address::LookupError;
use crate::ports::store::StoreError;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("lpa not found")]
    NotFound,
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Lookup(#[from] LookupError),
}

impl DomainError {
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Store(StoreError::Conflict { .. }))
    }
}
