use async_trait::async_trait;

use super::domain::{Customer, NewCustomer};
use super::errors::CustomerError;

/// Repository abstraction for customer persistence.
///
/// `save` must report a phone that is already stored as `CustomerError::DuplicatePhone`,
/// even when an earlier `exists_by_phone` said otherwise.
#[async_trait]
pub trait CustomerRepository: Send + Sync {
    async fn exists_by_phone(&self, phone: &str) -> Result<bool, CustomerError>;
    async fn save(&self, customer: NewCustomer) -> Result<Customer, CustomerError>;
    async fn find_by_phone(&self, phone: &str) -> Result<Option<Customer>, CustomerError>;
}

/// In-memory repository for tests and database-less local runs
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::RwLock;
    use uuid::Uuid;

    #[derive(Default)]
    pub struct InMemoryCustomerRepository {
        customers: RwLock<HashMap<String, Customer>>, // key: phone
    }

    fn poisoned<T>(_: T) -> CustomerError {
        CustomerError::Repository("customer store lock poisoned".into())
    }

    impl InMemoryCustomerRepository {
        pub fn len(&self) -> usize {
            self.customers.read().map(|m| m.len()).unwrap_or(0)
        }

        pub fn is_empty(&self) -> bool { self.len() == 0 }
    }

    #[async_trait]
    impl CustomerRepository for InMemoryCustomerRepository {
        async fn exists_by_phone(&self, phone: &str) -> Result<bool, CustomerError> {
            Ok(self.customers.read().map_err(poisoned)?.contains_key(phone))
        }

        async fn save(&self, new: NewCustomer) -> Result<Customer, CustomerError> {
            let mut customers = self.customers.write().map_err(poisoned)?;
            if customers.contains_key(&new.phone) {
                return Err(CustomerError::DuplicatePhone);
            }
            let customer = Customer {
                id: Uuid::new_v4(),
                phone: new.phone,
                nickname: new.nickname,
                password_hash: new.password_hash,
                phone_verified: new.phone_verified,
            };
            customers.insert(customer.phone.clone(), customer.clone());
            Ok(customer)
        }

        async fn find_by_phone(&self, phone: &str) -> Result<Option<Customer>, CustomerError> {
            Ok(self.customers.read().map_err(poisoned)?.get(phone).cloned())
        }
    }

}
