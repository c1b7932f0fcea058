//! Persistable entities and identity snapshots.
//!
//! A failed insert can assign a generated key to an in-memory entity before the
//! transaction rolls back. Retrying with that key would turn the insert into an
//! update, so the interceptor snapshots every argument's `uid_pk` before each
//! attempt and puts it back before the next one.

use std::fmt;
use std::sync::atomic::{AtomicI64, Ordering};

/// Identity value of a transient (never persisted) entity
pub const TRANSIENT_UID_PK: i64 = 0;

/// An entity whose primary key can be read and restored
///
/// Setters take `&self` so the unit of work and the interceptor can share the
/// same entity; implementors typically hold a [`UidPk`] cell.
pub trait Persistable: Send + Sync {
    fn uid_pk(&self) -> i64;

    fn set_uid_pk(&self, uid_pk: i64);

    fn is_persisted(&self) -> bool {
        self.uid_pk() != TRANSIENT_UID_PK
    }
}

/// Atomic primary-key cell for entities implementing [`Persistable`]
#[derive(Default)]
pub struct UidPk(AtomicI64);

impl UidPk {
    pub fn new(value: i64) -> Self {
        Self(AtomicI64::new(value))
    }

    pub fn transient() -> Self {
        Self::new(TRANSIENT_UID_PK)
    }

    pub fn get(&self) -> i64 {
        self.0.load(Ordering::Acquire)
    }

    pub fn set(&self, value: i64) {
        self.0.store(value, Ordering::Release);
    }
}

impl fmt::Debug for UidPk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UidPk({})", self.get())
    }
}

impl Clone for UidPk {
    fn clone(&self) -> Self {
        Self::new(self.get())
    }
}

/// Pre-attempt identity values of an invocation's arguments
pub(crate) struct IdentitySnapshot<'a> {
    entries: Vec<(&'a dyn Persistable, i64)>,
}

impl<'a> IdentitySnapshot<'a> {
    pub(crate) fn capture(args: &[&'a dyn Persistable]) -> Self {
        Self {
            entries: args.iter().map(|entity| (*entity, entity.uid_pk())).collect(),
        }
    }

    /// Put every captured identity back, returning how many had changed
    pub(crate) fn restore(&self) -> usize {
        let mut restored = 0;
        for (entity, uid_pk) in &self.entries {
            if entity.uid_pk() != *uid_pk {
                entity.set_uid_pk(*uid_pk);
                restored += 1;
            }
        }
        restored
    }
}
