//! Change sets, listed per stack.

use futures::FutureExt;
use tokio::runtime::Handle;

use crate::cache::{KeyedIndex, Page};

use super::client::CfnClient;
use super::protocol::{ChangeSetInfo, ListChangeSetsParams, ListChangeSetsResult};

pub type ChangeSetsManager = KeyedIndex<ChangeSetInfo>;

impl From<ListChangeSetsResult> for Page<ChangeSetInfo> {
  fn from(result: ListChangeSetsResult) -> Self {
    Page {
      items: result.change_sets,
      next_token: result.next_token,
    }
  }
}

/// Build the change sets manager, keyed by stack name.
pub fn manager(client: CfnClient, runtime: Handle) -> ChangeSetsManager {
  KeyedIndex::new("change_sets", runtime, move |stack_name, token| {
    let params = ListChangeSetsParams {
      stack_name: stack_name.to_string(),
      next_token: token.map(String::from),
    };
    let response = client.list_change_sets(params)?;
    Some(
      response
        .map(|result| result.map(|page| page.map(Page::from)))
        .boxed(),
    )
  })
}
