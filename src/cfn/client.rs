use crate::cfn::protocol::{
  DeleteIamCredentials, DidChangeConfiguration, DidChangeConfigurationParams, ListChangeSets,
  ListChangeSetsParams, ListChangeSetsResult, ListStacks, ListStacksParams, ListStacksResult,
  Notification, Request, UpdateCredentialsParams, UpdateCredentialsResult, UpdateIamCredentials,
};
use crate::connection::{Connection, ConnectionProvider};
use color_eyre::{eyre::eyre, Result};
use futures::future::{self, BoxFuture, FutureExt};
use std::sync::Arc;
use tracing::{info, warn};

/// Future for a typed response. `Ok(None)` is a null payload.
pub type ResultFuture<T> = BoxFuture<'static, Result<Option<T>>>;

/// CloudFormation language server client.
///
/// Every call looks up the current connection first. When the server is not
/// up yet the call returns `None` immediately instead of queuing.
#[derive(Clone)]
pub struct CfnClient {
  provider: Arc<dyn ConnectionProvider>,
}

impl CfnClient {
  pub fn new(provider: Arc<dyn ConnectionProvider>) -> Self {
    Self { provider }
  }

  /// Current typed connection, if the server is reachable.
  pub fn connection(&self) -> Option<CfnConnection> {
    self
      .provider
      .current_connection()
      .map(|inner| CfnConnection { inner })
  }

  /// List stacks
  pub fn list_stacks(&self, params: ListStacksParams) -> Option<ResultFuture<ListStacksResult>> {
    self.send::<ListStacks>("Requesting CloudFormation stacks", &params)
  }

  /// List change sets for one stack
  pub fn list_change_sets(
    &self,
    params: ListChangeSetsParams,
  ) -> Option<ResultFuture<ListChangeSetsResult>> {
    let action = format!("Requesting change sets for stack: {}", params.stack_name);
    self.send::<ListChangeSets>(&action, &params)
  }

  /// Push new IAM credentials to the server
  pub fn update_iam_credentials(
    &self,
    params: UpdateCredentialsParams,
  ) -> Option<ResultFuture<UpdateCredentialsResult>> {
    self.send::<UpdateIamCredentials>("Updating IAM credentials", &params)
  }

  pub fn delete_iam_credentials(&self) {
    self.send_notification::<DeleteIamCredentials>("Deleting IAM credentials", &());
  }

  pub fn notify_configuration_changed(&self) {
    self.send_notification::<DidChangeConfiguration>(
      "Sending configuration change notification",
      &DidChangeConfigurationParams::default(),
    );
  }

  fn send<R: Request>(&self, action: &str, params: &R::Params) -> Option<ResultFuture<R::Result>> {
    match self.connection() {
      Some(conn) => {
        info!("{}", action);
        Some(conn.request::<R>(params))
      }
      None => {
        warn!("Language server not available for request: {}", action);
        None
      }
    }
  }

  fn send_notification<N: Notification>(&self, action: &str, params: &N::Params) {
    match self.connection() {
      Some(conn) => {
        info!("{}", action);
        conn.notify::<N>(params);
      }
      None => warn!("Language server not available for notification: {}", action),
    }
  }
}

/// A connection narrowed to the CloudFormation request kinds.
#[derive(Clone)]
pub struct CfnConnection {
  inner: Arc<dyn Connection>,
}

impl CfnConnection {
  /// Send a typed request.
  ///
  /// A response that does not decode into `R::Result` resolves to an error.
  pub fn request<R: Request>(&self, params: &R::Params) -> ResultFuture<R::Result> {
    let params = match serde_json::to_value(params) {
      Ok(params) => params,
      Err(e) => {
        let error = eyre!("Failed to serialize {} params: {}", R::METHOD, e);
        return future::ready(Err(error)).boxed();
      }
    };

    let response = self.inner.request(R::METHOD, params);
    async move {
      let value = response.await?;
      serde_json::from_value::<Option<R::Result>>(value)
        .map_err(|e| eyre!("Failed to parse {} response: {}", R::METHOD, e))
    }
    .boxed()
  }

  /// Send a typed notification.
  pub fn notify<N: Notification>(&self, params: &N::Params) {
    match serde_json::to_value(params) {
      Ok(params) => self.inner.notify(N::METHOD, params),
      Err(e) => warn!("Failed to serialize {} params: {}", N::METHOD, e),
    }
  }
}
