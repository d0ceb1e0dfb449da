//! A single paginated list kept fresh through asynchronous requests.

use color_eyre::Result;
use futures::future::BoxFuture;
use std::sync::{Arc, Mutex};
use tokio::runtime::Handle;
use tracing::{debug, info, warn};

use super::listeners::{ListenerId, ListenerRegistry};
use super::lock;
use super::state::{Entry, LoadMode, Outcome, Page, Ticket};

/// Future for one page. `Ok(None)` means the server answered without a payload.
pub type PageFuture<T> = BoxFuture<'static, Result<Option<Page<T>>>>;

/// Issues the request for one page, given the continuation token (if any).
/// Returns `None` when the server is unavailable.
type PageFetcher<T> = Box<dyn Fn(Option<&str>) -> Option<PageFuture<T>> + Send + Sync>;

/// Local, paginated copy of a remote list.
///
/// Reads never block and never hit the network. `reload` and `load_more`
/// return immediately; the outcome arrives later through the listeners,
/// which receive the full item list after every change.
///
/// Responses are awaited on the runtime behind the `Handle` given at
/// construction, so the mutators may be called from any thread.
pub struct PaginatedCache<T> {
  shared: Arc<Shared<T>>,
}

struct Shared<T> {
  name: &'static str,
  runtime: Handle,
  entry: Mutex<Entry<T>>,
  listeners: ListenerRegistry<[T]>,
  fetcher: PageFetcher<T>,
}

impl<T> Clone for PaginatedCache<T> {
  fn clone(&self) -> Self {
    Self {
      shared: Arc::clone(&self.shared),
    }
  }
}

impl<T: Clone + Send + Sync + 'static> PaginatedCache<T> {
  /// Create an empty, unloaded cache. `name` is only used in log output.
  pub fn new<F>(name: &'static str, runtime: Handle, fetcher: F) -> Self
  where
    F: Fn(Option<&str>) -> Option<PageFuture<T>> + Send + Sync + 'static,
  {
    Self {
      shared: Arc::new(Shared {
        name,
        runtime,
        entry: Mutex::new(Entry::default()),
        listeners: ListenerRegistry::new(),
        fetcher: Box::new(fetcher),
      }),
    }
  }

  /// Snapshot of the current items.
  pub fn get(&self) -> Vec<T> {
    lock(&self.shared.entry).state.items()
  }

  pub fn has_more(&self) -> bool {
    lock(&self.shared.entry).state.has_more()
  }

  pub fn is_loaded(&self) -> bool {
    lock(&self.shared.entry).state.is_loaded()
  }

  /// Fetch the first page again.
  ///
  /// The current items stay visible until the response arrives. Supersedes
  /// any request still in flight.
  pub fn reload(&self) {
    self.load(LoadMode::Reload);
  }

  /// Fetch the page after the stored continuation token.
  ///
  /// No-op when there is no token or another request is still in flight.
  pub fn load_more(&self) {
    self.load(LoadMode::Continue);
  }

  /// Reset to the unloaded baseline and notify listeners.
  pub fn clear(&self) {
    let items = {
      let mut entry = lock(&self.shared.entry);
      entry.clear();
      entry.state.items()
    };
    self.shared.listeners.notify(&items);
  }

  pub fn add_listener<F>(&self, listener: F) -> ListenerId
  where
    F: Fn(&[T]) + Send + Sync + 'static,
  {
    self.shared.listeners.add(listener)
  }

  pub fn remove_listener(&self, id: ListenerId) -> bool {
    self.shared.listeners.remove(id)
  }

  /// Drop all listeners and ignore whatever is still in flight.
  pub fn dispose(&self) {
    self.shared.listeners.clear();
    lock(&self.shared.entry).abandon();
  }

  fn load(&self, mode: LoadMode) {
    let name = self.shared.name;

    let token = {
      let entry = lock(&self.shared.entry);
      match mode {
        LoadMode::Reload => None,
        LoadMode::Continue => {
          let Some(token) = entry.state.next_token() else {
            return;
          };
          if entry.is_pending() {
            debug!(cache = name, "Request in flight, skipping load more");
            return;
          }
          Some(token.to_string())
        }
      }
    };

    // The fetcher runs outside the lock; it may look at the cache.
    let Some(future) = (self.shared.fetcher)(token.as_deref()) else {
      warn!(cache = name, "No language server available for loading");
      return;
    };

    let ticket = {
      let mut entry = lock(&self.shared.entry);
      let stale = mode == LoadMode::Continue
        && (entry.is_pending() || entry.state.next_token() != token.as_deref());
      if stale {
        debug!(cache = name, "State changed while issuing load more, dropping it");
        return;
      }
      entry.begin(mode)
    };

    info!(cache = name, ?mode, "Loading");
    let shared = Arc::clone(&self.shared);
    self.shared.runtime.spawn(async move {
      let response = future.await;
      shared.complete(ticket, response);
    });
  }
}

impl<T: Clone> Shared<T> {
  fn complete(&self, ticket: Ticket, response: Result<Option<Page<T>>>) {
    match &response {
      Ok(Some(page)) => info!(cache = self.name, "Loaded {} items", page.items.len()),
      Ok(None) => warn!(cache = self.name, "Load returned no result"),
      Err(e) => warn!(cache = self.name, "Failed to load: {:#}", e),
    }

    let items = {
      let mut entry = lock(&self.entry);
      if !entry.settle(ticket, Outcome::from_response(response)) {
        debug!(cache = self.name, "Discarding superseded response");
        return;
      }
      entry.state.items()
    };
    self.listeners.notify(&items);
  }
}
