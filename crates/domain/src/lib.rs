pub mod actor;
pub mod date;
pub mod error;
pub mod forms;
pub mod lpa;
pub mod matching;
pub mod ports;
pub mod routing;
pub mod store;
pub mod tasks;
pub mod util;
pub mod validation;
pub mod wizard;

pub type DomainResult<T> = Result<T, error::DomainError>;
