//! Pagination state and the transitions applied when a request settles.

use color_eyre::Result;
use std::sync::atomic::{AtomicU64, Ordering};

/// One page of results from the server.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
  pub items: Vec<T>,
  /// Present when more pages exist
  pub next_token: Option<String>,
}

/// Whether a request replaces the list or extends it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadMode {
  /// Full load from the first page
  Reload,
  /// Next page after the stored continuation token
  Continue,
}

/// How a request settled.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
  /// The server returned a page
  Loaded(Page<T>),
  /// The call completed without a payload
  Empty,
  /// Transport or server-side error
  Failed,
}

impl<T> Outcome<T> {
  pub fn from_response(response: Result<Option<Page<T>>>) -> Self {
    match response {
      Ok(Some(page)) => Outcome::Loaded(page),
      Ok(None) => Outcome::Empty,
      Err(_) => Outcome::Failed,
    }
  }
}

/// Local copy of one paginated list.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceState<T> {
  items: Vec<T>,
  next_token: Option<String>,
  loaded: bool,
}

impl<T> Default for ResourceState<T> {
  fn default() -> Self {
    Self {
      items: Vec::new(),
      next_token: None,
      loaded: false,
    }
  }
}

impl<T: Clone> ResourceState<T> {
  /// Copy of the current items.
  pub fn items(&self) -> Vec<T> {
    self.items.clone()
  }

  pub fn next_token(&self) -> Option<&str> {
    self.next_token.as_deref()
  }

  pub fn has_more(&self) -> bool {
    self.next_token.is_some()
  }

  pub fn is_loaded(&self) -> bool {
    self.loaded
  }

  /// Back to the unloaded baseline.
  pub fn reset(&mut self) {
    *self = Self::default();
  }

  /// Commit the result of a settled request.
  ///
  /// A reload that fails or comes back empty still marks the state loaded, so
  /// a caller that reloads whenever it sees `!is_loaded()` does not loop. A
  /// failed continuation keeps the pages already fetched.
  pub fn apply(&mut self, mode: LoadMode, outcome: Outcome<T>) {
    match (mode, outcome) {
      (LoadMode::Reload, Outcome::Loaded(page)) => {
        self.items = page.items;
        self.next_token = page.next_token;
        self.loaded = true;
      }
      (LoadMode::Reload, Outcome::Empty | Outcome::Failed) => {
        self.items.clear();
        self.next_token = None;
        self.loaded = true;
      }
      (LoadMode::Continue, Outcome::Loaded(page)) => {
        self.items.extend(page.items);
        self.next_token = page.next_token;
        self.loaded = true;
      }
      (LoadMode::Continue, Outcome::Empty | Outcome::Failed) => {}
    }
  }
}

/// Identifies one issued request. Unique for the life of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Ticket(u64);

impl Ticket {
  fn next() -> Self {
    static NEXT: AtomicU64 = AtomicU64::new(1);
    Ticket(NEXT.fetch_add(1, Ordering::Relaxed))
  }
}

/// A resource state plus the request currently allowed to commit into it.
#[derive(Debug)]
pub(crate) struct Entry<T> {
  pub state: ResourceState<T>,
  pending: Option<(Ticket, LoadMode)>,
}

impl<T> Default for Entry<T> {
  fn default() -> Self {
    Self {
      state: ResourceState::default(),
      pending: None,
    }
  }
}

impl<T: Clone> Entry<T> {
  pub fn is_pending(&self) -> bool {
    self.pending.is_some()
  }

  /// Register a new request. Any earlier pending request loses its right to commit.
  pub fn begin(&mut self, mode: LoadMode) -> Ticket {
    let ticket = Ticket::next();
    self.pending = Some((ticket, mode));
    ticket
  }

  /// Apply `outcome` if `ticket` is still the pending request.
  ///
  /// Returns `false` when the result was superseded and dropped.
  pub fn settle(&mut self, ticket: Ticket, outcome: Outcome<T>) -> bool {
    match self.pending {
      Some((pending, mode)) if pending == ticket => {
        self.pending = None;
        self.state.apply(mode, outcome);
        true
      }
      _ => false,
    }
  }

  /// Forget the pending request; its response will be dropped.
  pub fn abandon(&mut self) {
    self.pending = None;
  }

  /// Reset to the baseline and abandon the pending request.
  pub fn clear(&mut self) {
    self.abandon();
    self.state.reset();
  }
}
