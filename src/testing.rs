//! Scripted connection used in place of a real language server in tests.

use color_eyre::{eyre::eyre, Result};
use futures::future::{self, FutureExt};
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::{mpsc, oneshot};

use crate::cfn::CfnClient;
use crate::connection::{Connection, ConnectionProvider, ResponseFuture};

enum Scripted {
  Ready(Result<Value>),
  Deferred(oneshot::Receiver<Result<Value>>),
}

/// Connection that answers requests from a queue of scripted responses.
#[derive(Default)]
pub struct StubConnection {
  requests: Mutex<Vec<(String, Value)>>,
  notifications: Mutex<Vec<(String, Value)>>,
  responses: Mutex<VecDeque<Scripted>>,
}

impl StubConnection {
  pub fn new() -> Arc<Self> {
    Arc::new(Self::default())
  }

  /// Queue a response that resolves as soon as it is requested.
  pub fn respond(&self, response: Result<Value>) {
    self
      .responses
      .lock()
      .unwrap()
      .push_back(Scripted::Ready(response));
  }

  /// Queue a response the test resolves later through the returned sender.
  pub fn respond_later(&self) -> oneshot::Sender<Result<Value>> {
    let (tx, rx) = oneshot::channel();
    self
      .responses
      .lock()
      .unwrap()
      .push_back(Scripted::Deferred(rx));
    tx
  }

  pub fn requests(&self) -> Vec<(String, Value)> {
    self.requests.lock().unwrap().clone()
  }

  pub fn notifications(&self) -> Vec<(String, Value)> {
    self.notifications.lock().unwrap().clone()
  }
}

impl Connection for StubConnection {
  fn request(&self, method: &str, params: Value) -> ResponseFuture {
    self
      .requests
      .lock()
      .unwrap()
      .push((method.to_string(), params));

    match self.responses.lock().unwrap().pop_front() {
      Some(Scripted::Ready(response)) => future::ready(response).boxed(),
      Some(Scripted::Deferred(rx)) => async move {
        rx.await
          .map_err(|_| eyre!("Scripted response was dropped"))?
      }
      .boxed(),
      None => future::ready(Err(eyre!("No scripted response for {}", method))).boxed(),
    }
  }

  fn notify(&self, method: &str, params: Value) {
    self
      .notifications
      .lock()
      .unwrap()
      .push((method.to_string(), params));
  }
}

/// Client whose connection is always `conn`.
pub fn connected_client(conn: &Arc<StubConnection>) -> CfnClient {
  let conn = Arc::clone(conn);
  let provider: Arc<dyn ConnectionProvider> =
    Arc::new(move || Some(Arc::clone(&conn) as Arc<dyn Connection>));
  CfnClient::new(provider)
}

/// Client whose server never comes up.
pub fn disconnected_client() -> CfnClient {
  let provider: Arc<dyn ConnectionProvider> = Arc::new(|| None::<Arc<dyn Connection>>);
  CfnClient::new(provider)
}

/// Listener listener_channel: every notification is forwarded to the returned receiver.
pub fn listener_channel<T: Send + 'static>() -> (
  impl Fn(T) + Send + Sync + 'static,
  mpsc::UnboundedReceiver<T>,
) {
  let (tx, rx) = mpsc::unbounded_channel();
  (
    move |value: T| {
      let _ = tx.send(value);
    },
    rx,
  )
}
