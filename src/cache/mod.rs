//! Local caches of paginated server listings.
//!
//! This module is independent of CloudFormation:
//! - `PaginatedCache` holds one list with reload / load-more semantics
//! - `KeyedIndex` holds one such list per owning key, fetched lazily
//! - Both notify registered listeners after every state change
//! - Failures are absorbed into cache state, never returned to the caller

mod keyed;
mod listeners;
mod paginated;
mod state;

pub use keyed::KeyedIndex;
pub use listeners::{ListenerId, ListenerRegistry};
pub use paginated::{PageFuture, PaginatedCache};
pub use state::{LoadMode, Outcome, Page, ResourceState};

use std::sync::{Mutex, MutexGuard, PoisonError};

/// Lock a mutex. State is only ever replaced whole while locked, so a
/// poisoned guard still holds a consistent value.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
  mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
