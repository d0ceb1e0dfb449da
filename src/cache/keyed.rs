//! Paginated lists partitioned by an owning key.

use color_eyre::Result;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::runtime::Handle;
use tracing::{debug, info, warn};

use super::listeners::{ListenerId, ListenerRegistry};
use super::lock;
use super::paginated::PageFuture;
use super::state::{Entry, LoadMode, Outcome, Page, Ticket};

/// Issues the request for one page of `key`, given the continuation token.
/// Returns `None` when the server is unavailable.
type KeyedFetcher<T> = Box<dyn Fn(&str, Option<&str>) -> Option<PageFuture<T>> + Send + Sync>;

/// One independent paginated list per key.
///
/// Entries are created on the first fetch of a key and fetched at most once
/// until cleared. Reads of an unknown key see the empty baseline. Listeners
/// take no arguments; they only learn that some key changed.
pub struct KeyedIndex<T> {
  shared: Arc<Shared<T>>,
}

struct Shared<T> {
  name: &'static str,
  runtime: Handle,
  entries: Mutex<HashMap<String, Entry<T>>>,
  listeners: ListenerRegistry<()>,
  fetcher: KeyedFetcher<T>,
}

impl<T> Clone for KeyedIndex<T> {
  fn clone(&self) -> Self {
    Self {
      shared: Arc::clone(&self.shared),
    }
  }
}

impl<T: Clone + Send + Sync + 'static> KeyedIndex<T> {
  /// Create an empty index. Responses are awaited on `runtime`.
  pub fn new<F>(name: &'static str, runtime: Handle, fetcher: F) -> Self
  where
    F: Fn(&str, Option<&str>) -> Option<PageFuture<T>> + Send + Sync + 'static,
  {
    Self {
      shared: Arc::new(Shared {
        name,
        runtime,
        entries: Mutex::new(HashMap::new()),
        listeners: ListenerRegistry::new(),
        fetcher: Box::new(fetcher),
      }),
    }
  }

  pub fn get(&self, key: &str) -> Vec<T> {
    self.read(key, |entry| entry.state.items()).unwrap_or_default()
  }

  pub fn has_more(&self, key: &str) -> bool {
    self
      .read(key, |entry| entry.state.has_more())
      .unwrap_or(false)
  }

  pub fn is_loaded(&self, key: &str) -> bool {
    self
      .read(key, |entry| entry.state.is_loaded())
      .unwrap_or(false)
  }

  /// Load the first page for `key` unless it is already loaded or loading.
  pub fn fetch(&self, key: &str) {
    self.load(key, LoadMode::Reload);
  }

  /// Load the next page for `key`. No-op for unknown keys, keys without a
  /// continuation token, and keys with a request in flight.
  pub fn load_more(&self, key: &str) {
    self.load(key, LoadMode::Continue);
  }

  /// Forget `key` so the next `fetch` goes to the server again.
  pub fn clear(&self, key: &str) {
    lock(&self.shared.entries).remove(key);
    self.shared.listeners.notify(&());
  }

  /// Forget every key.
  pub fn clear_all(&self) {
    lock(&self.shared.entries).clear();
    self.shared.listeners.notify(&());
  }

  pub fn add_listener<F>(&self, listener: F) -> ListenerId
  where
    F: Fn() + Send + Sync + 'static,
  {
    self.shared.listeners.add(move |_: &()| listener())
  }

  pub fn remove_listener(&self, id: ListenerId) -> bool {
    self.shared.listeners.remove(id)
  }

  /// Drop all listeners and ignore whatever is still in flight.
  pub fn dispose(&self) {
    self.shared.listeners.clear();
    for entry in lock(&self.shared.entries).values_mut() {
      entry.abandon();
    }
  }

  fn read<R>(&self, key: &str, f: impl FnOnce(&Entry<T>) -> R) -> Option<R> {
    lock(&self.shared.entries).get(key).map(f)
  }

  fn load(&self, key: &str, mode: LoadMode) {
    let name = self.shared.name;

    let token = {
      let entries = lock(&self.shared.entries);
      let entry = entries.get(key);
      if entry.is_some_and(Entry::is_pending) {
        debug!(index = name, key, "Request in flight, skipping");
        return;
      }
      match mode {
        LoadMode::Reload => {
          if entry.is_some_and(|entry| entry.state.is_loaded()) {
            return;
          }
          None
        }
        LoadMode::Continue => match entry.and_then(|entry| entry.state.next_token()) {
          Some(token) => Some(token.to_string()),
          None => return,
        },
      }
    };

    let Some(future) = (self.shared.fetcher)(key, token.as_deref()) else {
      warn!(index = name, key, "No language server available for loading");
      return;
    };

    let ticket = {
      let mut entries = lock(&self.shared.entries);
      let entry = entries.entry(key.to_string()).or_default();
      let stale = entry.is_pending()
        || match mode {
          LoadMode::Reload => entry.state.is_loaded(),
          LoadMode::Continue => entry.state.next_token() != token.as_deref(),
        };
      if stale {
        debug!(index = name, key, "State changed while issuing request, dropping it");
        return;
      }
      entry.begin(mode)
    };

    info!(index = name, key, ?mode, "Loading");
    let shared = Arc::clone(&self.shared);
    let key = key.to_string();
    self.shared.runtime.spawn(async move {
      let response = future.await;
      shared.complete(&key, ticket, response);
    });
  }
}

impl<T: Clone> Shared<T> {
  fn complete(&self, key: &str, ticket: Ticket, response: Result<Option<Page<T>>>) {
    match &response {
      Ok(Some(page)) => info!(index = self.name, key, "Loaded {} items", page.items.len()),
      Ok(None) => warn!(index = self.name, key, "Load returned no result"),
      Err(e) => warn!(index = self.name, key, "Failed to load: {:#}", e),
    }

    let committed = lock(&self.entries)
      .get_mut(key)
      .is_some_and(|entry| entry.settle(ticket, Outcome::from_response(response)));

    if committed {
      self.listeners.notify(&());
    } else {
      debug!(index = self.name, key, "Discarding superseded response");
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::connection::{Connection, ResponseFuture};
  use crate::testing::{listener_channel, StubConnection};
  use color_eyre::eyre::eyre;
  use futures::FutureExt;
  use serde_json::{json, Value};
  use std::sync::atomic::{AtomicBool, Ordering};
  use std::time::Duration;
  use tokio::sync::mpsc::UnboundedReceiver;

  struct Harness {
    conn: Arc<StubConnection>,
    available: Arc<AtomicBool>,
    index: KeyedIndex<String>,
    changes: UnboundedReceiver<()>,
  }

  fn harness() -> Harness {
    harness_on(Handle::current())
  }

  fn harness_on(runtime: Handle) -> Harness {
    let conn = StubConnection::new();
    let available = Arc::new(AtomicBool::new(true));

    let stub = Arc::clone(&conn);
    let up = Arc::clone(&available);
    let index = KeyedIndex::new("test", runtime, move |key, token| {
      if !up.load(Ordering::SeqCst) {
        return None;
      }
      let response = stub.request("list", json!({ "key": key, "token": token }));
      Some(decode(response).boxed())
    });

    let (listener, changes) = listener_channel();
    index.add_listener(move || listener(()));

    Harness {
      conn,
      available,
      index,
      changes,
    }
  }

  async fn decode(response: ResponseFuture) -> Result<Option<Page<String>>> {
    let value = response.await?;
    if value.is_null() {
      return Ok(None);
    }
    let items = serde_json::from_value(value["items"].clone())?;
    let next_token = value["next"].as_str().map(String::from);
    Ok(Some(Page { items, next_token }))
  }

  fn page(items: &[&str], next: Option<&str>) -> Value {
    json!({ "items": items, "next": next })
  }

  async fn assert_quiet(rx: &mut UnboundedReceiver<()>) {
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(rx.try_recv().is_err());
  }

  #[tokio::test]
  async fn test_unknown_key_reads_empty_baseline() {
    let h = harness();
    assert!(h.index.get("unknown-stack").is_empty());
    assert!(!h.index.has_more("unknown-stack"));
    assert!(!h.index.is_loaded("unknown-stack"));
  }

  #[tokio::test]
  async fn test_fetch_then_load_more() {
    let mut h = harness();

    h.conn.respond(Ok(page(&["CS1"], Some("tok"))));
    h.index.fetch("stack-1");
    h.changes.recv().await;
    assert_eq!(h.index.get("stack-1"), vec!["CS1"]);
    assert!(h.index.has_more("stack-1"));

    h.conn.respond(Ok(page(&["CS2"], None)));
    h.index.load_more("stack-1");
    h.changes.recv().await;
    assert_eq!(h.index.get("stack-1"), vec!["CS1", "CS2"]);
    assert!(!h.index.has_more("stack-1"));

    let requests = h.conn.requests();
    assert_eq!(requests[1].1, json!({ "key": "stack-1", "token": "tok" }));
  }

  #[tokio::test]
  async fn test_second_fetch_is_noop_once_loaded() {
    let mut h = harness();

    h.conn.respond(Ok(page(&["CS1"], None)));
    h.index.fetch("stack-1");
    h.changes.recv().await;

    h.index.fetch("stack-1");
    assert_eq!(h.conn.requests().len(), 1);
  }

  #[tokio::test]
  async fn test_concurrent_fetches_are_coalesced() {
    let mut h = harness();

    let pending = h.conn.respond_later();
    h.index.fetch("stack-1");
    h.index.fetch("stack-1");
    assert_eq!(h.conn.requests().len(), 1);

    pending.send(Ok(page(&["CS1"], None))).unwrap();
    h.changes.recv().await;
    assert_eq!(h.index.get("stack-1"), vec!["CS1"]);
  }

  #[tokio::test]
  async fn test_keys_are_independent() {
    let mut h = harness();

    h.conn.respond(Ok(page(&["A1"], None)));
    h.index.fetch("stack-a");
    h.changes.recv().await;

    h.conn.respond(Ok(page(&["B1"], Some("next"))));
    h.index.fetch("stack-b");
    h.changes.recv().await;

    assert_eq!(h.index.get("stack-a"), vec!["A1"]);
    assert!(!h.index.has_more("stack-a"));
    assert_eq!(h.index.get("stack-b"), vec!["B1"]);
    assert!(h.index.has_more("stack-b"));
  }

  #[tokio::test]
  async fn test_failed_fetch_marks_loaded() {
    let mut h = harness();

    h.conn.respond(Err(eyre!("access denied")));
    h.index.fetch("stack-1");
    h.changes.recv().await;

    assert!(h.index.is_loaded("stack-1"));
    assert!(h.index.get("stack-1").is_empty());

    h.index.fetch("stack-1");
    assert_eq!(h.conn.requests().len(), 1);
  }

  #[tokio::test]
  async fn test_failed_load_more_keeps_items() {
    let mut h = harness();

    h.conn.respond(Ok(page(&["CS1"], Some("tok"))));
    h.index.fetch("stack-1");
    h.changes.recv().await;

    h.conn.respond(Err(eyre!("throttled")));
    h.index.load_more("stack-1");
    h.changes.recv().await;

    assert_eq!(h.index.get("stack-1"), vec!["CS1"]);
    assert!(h.index.has_more("stack-1"));
  }

  #[tokio::test]
  async fn test_load_more_unknown_key_sends_nothing() {
    let h = harness();
    h.index.load_more("unknown-stack");
    assert!(h.conn.requests().is_empty());
  }

  #[tokio::test]
  async fn test_fetch_without_server_is_noop() {
    let mut h = harness();
    h.available.store(false, Ordering::SeqCst);

    h.index.fetch("my-stack");

    assert!(h.index.get("my-stack").is_empty());
    assert!(!h.index.is_loaded("my-stack"));
    assert_quiet(&mut h.changes).await;
  }

  #[test]
  fn test_fetch_works_outside_runtime() {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let mut h = harness_on(runtime.handle().clone());

    h.conn.respond(Ok(page(&["CS1"], None)));
    h.index.fetch("stack-1");
    runtime.block_on(h.changes.recv());

    assert_eq!(h.index.get("stack-1"), vec!["CS1"]);
  }

  #[tokio::test]
  async fn test_clear_allows_refetch() {
    let mut h = harness();

    h.conn.respond(Ok(page(&["CS1"], None)));
    h.index.fetch("stack-1");
    h.changes.recv().await;

    h.index.clear("stack-1");
    assert!(h.changes.try_recv().is_ok());
    assert!(!h.index.is_loaded("stack-1"));

    h.conn.respond(Ok(page(&["CS2"], None)));
    h.index.fetch("stack-1");
    h.changes.recv().await;
    assert_eq!(h.index.get("stack-1"), vec!["CS2"]);
  }

  #[tokio::test]
  async fn test_clear_all_discards_in_flight_response() {
    let mut h = harness();

    let pending = h.conn.respond_later();
    h.index.fetch("stack-1");
    h.index.clear_all();
    assert!(h.changes.try_recv().is_ok());

    pending.send(Ok(page(&["late"], None))).unwrap();
    assert_quiet(&mut h.changes).await;
    assert!(!h.index.is_loaded("stack-1"));
  }
}
