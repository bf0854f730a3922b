pub mod config;
pub mod logging;
pub mod places;
pub mod random;
pub mod store;
