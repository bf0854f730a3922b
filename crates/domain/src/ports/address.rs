use thiserror::Error;

use super::BoxFuture;
use crate::actor::Address;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum LookupError {
    #[error("postcode rejected by lookup service: {0}")]
    BadRequest(String),
    #[error("address lookup unavailable: {0}")]
    Unavailable(String),
    #[error("address lookup response invalid: {0}")]
    InvalidResponse(String),
}

pub trait AddressLookup: Send + Sync {
    fn lookup_postcode(&self, postcode: &str) -> BoxFuture<'_, Result<Vec<Address>, LookupError>>;
}
