//! Untyped request/notification transport to the language server.
//!
//! The wire encoding and connection lifecycle belong to the host. This crate
//! only needs something that can send a request and hand back a future, or
//! fire a notification and forget about it.

use color_eyre::Result;
use futures::future::BoxFuture;
use serde_json::Value;
use std::sync::Arc;

/// Future yielding the raw JSON payload of a response.
///
/// `Value::Null` means the call round-tripped but produced no payload.
pub type ResponseFuture = BoxFuture<'static, Result<Value>>;

/// A live connection to the language server.
pub trait Connection: Send + Sync {
  /// Send a request and return a future for its response.
  fn request(&self, method: &str, params: Value) -> ResponseFuture;

  /// Send a notification. No response is tracked.
  fn notify(&self, method: &str, params: Value);
}

/// Source of the current connection, if one has been established.
///
/// Returning `None` means the server is not reachable right now. Callers
/// treat that as a transient state, not an error.
pub trait ConnectionProvider: Send + Sync {
  fn current_connection(&self) -> Option<Arc<dyn Connection>>;
}

impl<F> ConnectionProvider for F
where
  F: Fn() -> Option<Arc<dyn Connection>> + Send + Sync,
{
  fn current_connection(&self) -> Option<Arc<dyn Connection>> {
    self()
  }
}
