use commerce_resilience::transaction::{Persistable, UidPk};
use thiserror::Error;

/// Order entity whose key is assigned by the store on insert
#[derive(Debug, Clone)]
pub struct TestOrder {
    pub uid_pk: UidPk,
    pub order_number: String,
}

impl TestOrder {
    pub fn transient(order_number: &str) -> Self {
        Self {
            uid_pk: UidPk::transient(),
            order_number: order_number.to_string(),
        }
    }

    pub fn persisted(order_number: &str, uid_pk: i64) -> Self {
        Self {
            uid_pk: UidPk::new(uid_pk),
            order_number: order_number.to_string(),
        }
    }
}

impl Persistable for TestOrder {
    fn uid_pk(&self) -> i64 {
        self.uid_pk.get()
    }

    fn set_uid_pk(&self, uid_pk: i64) {
        self.uid_pk.set(uid_pk);
    }
}

/// Errors raised by service operations under test
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Deadlock found when trying to get lock; try restarting transaction")]
    Deadlock,

    #[error("Unique constraint violated: {0}")]
    Constraint(String),

    #[error("Failed to save order {order_number}")]
    SaveFailed {
        order_number: String,
        #[source]
        source: Box<ServiceError>,
    },
}

/// Errors raised by a protected remote dependency
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DependencyError {
    #[error("Tax service unavailable")]
    Unavailable,
}
