//! Root object a presentation layer owns: one client and the caches built on it.

use color_eyre::Result;
use futures::future::{BoxFuture, FutureExt};
use std::sync::Arc;
use tokio::runtime::Handle;
use tracing::{info, warn};

use crate::cfn::client::ResultFuture;
use crate::cfn::protocol::{UpdateCredentialsParams, UpdateCredentialsResult};
use crate::cfn::{change_sets, stacks, CfnClient, ChangeSetsManager, StacksManager};
use crate::config::Config;
use crate::connection::ConnectionProvider;

/// CloudFormation explorer state for one workspace.
///
/// Construct one per workspace and hand it to the UI; nothing here is global.
/// Cloning is cheap and clones share the same caches. Requests complete on
/// `runtime`, so the UI may drive the explorer from its own thread.
#[derive(Clone)]
pub struct Explorer {
  client: CfnClient,
  stacks: StacksManager,
  change_sets: ChangeSetsManager,
}

impl Explorer {
  pub fn new(provider: Arc<dyn ConnectionProvider>, config: &Config, runtime: Handle) -> Self {
    let client = CfnClient::new(provider);
    let stacks = stacks::manager(
      client.clone(),
      config.stacks.status_to_exclude.clone(),
      runtime.clone(),
    );
    let change_sets = change_sets::manager(client.clone(), runtime);

    Self {
      client,
      stacks,
      change_sets,
    }
  }

  pub fn client(&self) -> &CfnClient {
    &self.client
  }

  pub fn stacks(&self) -> &StacksManager {
    &self.stacks
  }

  pub fn change_sets(&self) -> &ChangeSetsManager {
    &self.change_sets
  }

  /// Push new credentials to the server.
  ///
  /// Returns `None` when the server is unavailable. Otherwise resolves to
  /// whether the server accepted them; on acceptance every cache is dropped
  /// and stacks are listed again under the new identity.
  pub fn update_credentials(
    &self,
    params: UpdateCredentialsParams,
  ) -> Option<BoxFuture<'static, Result<bool>>> {
    let response = self.client.update_iam_credentials(params)?;
    Some(apply_credentials(self.clone(), response).boxed())
  }

  /// Tell the server to forget its credentials and drop everything cached.
  pub fn delete_credentials(&self) {
    self.client.delete_iam_credentials();
    self.clear();
  }

  /// Tell the server its configuration changed (e.g. a new region) and refresh.
  pub fn configuration_changed(&self) {
    self.client.notify_configuration_changed();
    self.refresh();
  }

  pub fn dispose(&self) {
    self.stacks.dispose();
    self.change_sets.dispose();
  }

  fn clear(&self) {
    self.stacks.clear();
    self.change_sets.clear_all();
  }

  fn refresh(&self) {
    self.clear();
    self.stacks.reload();
  }
}

async fn apply_credentials(
  explorer: Explorer,
  response: ResultFuture<UpdateCredentialsResult>,
) -> Result<bool> {
  let accepted = response.await?.is_some_and(|result| result.success);
  if accepted {
    info!("Credentials updated, refreshing stacks");
    explorer.refresh();
  } else {
    warn!("Language server did not accept the credential update");
  }
  Ok(accepted)
}
