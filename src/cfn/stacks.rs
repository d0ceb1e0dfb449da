//! Stack list, paginated through the server-side cursor.

use futures::FutureExt;
use tokio::runtime::Handle;

use crate::cache::{Page, PaginatedCache};

use super::client::CfnClient;
use super::protocol::{ListStacksParams, ListStacksResult, StackSummary};

pub type StacksManager = PaginatedCache<StackSummary>;

impl From<ListStacksResult> for Page<StackSummary> {
  fn from(result: ListStacksResult) -> Self {
    Page {
      items: result.stacks,
      next_token: result.next_token,
    }
  }
}

/// Build the stacks manager. Stacks whose status is in `status_to_exclude`
/// are filtered out by the server.
///
/// The server keeps the cursor itself, so a continuation only sets
/// `loadMore` instead of echoing the token back.
pub fn manager(
  client: CfnClient,
  status_to_exclude: Vec<String>,
  runtime: Handle,
) -> StacksManager {
  PaginatedCache::new("stacks", runtime, move |token| {
    let params = ListStacksParams {
      status_to_exclude: (!status_to_exclude.is_empty()).then(|| status_to_exclude.clone()),
      load_more: token.is_some(),
    };
    let response = client.list_stacks(params)?;
    Some(
      response
        .map(|result| result.map(|page| page.map(Page::from)))
        .boxed(),
    )
  })
}
