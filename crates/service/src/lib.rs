//! Service layer for customer accounts.
//! - Keeps registration/login rules out of the HTTP layer.
//! - Persists through a repository trait with in-memory and SeaORM backends.
//! - Provides clear error types and documented interfaces.

pub mod customer;
#[cfg(test)]
pub mod test_support;
