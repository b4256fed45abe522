//! Customer module: domain, validation, credentials, repository and service layers.
//!
//! Registration and login business rules live here, independent of the web framework.

pub mod domain;
pub mod errors;
pub mod validation;
pub mod password;
pub mod token;
pub mod repository;
pub mod service;
pub mod repo;

pub use errors::CustomerError;
pub use service::CustomerService;
