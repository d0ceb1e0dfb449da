//! Multi-subscriber change notification.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use super::lock;

/// Handle returned by [`ListenerRegistry::add`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Callback<A> = Arc<dyn Fn(&A) + Send + Sync>;

/// Ordered list of callbacks invoked after every state change.
///
/// Callbacks run on the notifying thread, in registration order. The list is
/// snapshotted before dispatch, so a callback may add or remove listeners.
pub struct ListenerRegistry<A: ?Sized> {
  listeners: Mutex<Vec<(ListenerId, Callback<A>)>>,
  next_id: AtomicU64,
}

impl<A: ?Sized> Default for ListenerRegistry<A> {
  fn default() -> Self {
    Self {
      listeners: Mutex::new(Vec::new()),
      next_id: AtomicU64::new(0),
    }
  }
}

impl<A: ?Sized> ListenerRegistry<A> {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn add<F>(&self, listener: F) -> ListenerId
  where
    F: Fn(&A) + Send + Sync + 'static,
  {
    let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
    lock(&self.listeners).push((id, Arc::new(listener)));
    id
  }

  /// Returns `false` if `id` was not registered.
  pub fn remove(&self, id: ListenerId) -> bool {
    let mut listeners = lock(&self.listeners);
    let before = listeners.len();
    listeners.retain(|(existing, _)| *existing != id);
    listeners.len() != before
  }

  pub fn notify(&self, value: &A) {
    let snapshot: Vec<Callback<A>> = lock(&self.listeners)
      .iter()
      .map(|(_, callback)| Arc::clone(callback))
      .collect();

    for callback in snapshot {
      callback(value);
    }
  }

  pub fn clear(&self) {
    lock(&self.listeners).clear();
  }

  pub fn len(&self) -> usize {
    lock(&self.listeners).len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }
}
