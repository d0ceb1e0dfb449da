//! Request and notification kinds spoken by the CloudFormation language server.

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;

/// A request kind: method name plus its params and result shapes.
pub trait Request: 'static {
  type Params: Serialize;
  type Result: DeserializeOwned + Send + 'static;
  const METHOD: &'static str;
}

/// A fire-and-forget notification kind.
pub trait Notification: 'static {
  type Params: Serialize;
  const METHOD: &'static str;
}

// ============================================================================
// Stacks
// ============================================================================

/// Summary of a deployed stack, as reported by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StackSummary {
  pub stack_name: String,
  #[serde(default)]
  pub stack_id: Option<String>,
  #[serde(default)]
  pub stack_status: Option<String>,
  #[serde(default)]
  pub creation_time: Option<DateTime<Utc>>,
  #[serde(default)]
  pub last_updated_time: Option<DateTime<Utc>>,
  #[serde(default)]
  pub template_description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListStacksParams {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub status_to_exclude: Option<Vec<String>>,
  /// Continue from the server-side cursor of the previous listing
  pub load_more: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListStacksResult {
  pub stacks: Vec<StackSummary>,
  #[serde(default)]
  pub next_token: Option<String>,
}

pub enum ListStacks {}

impl Request for ListStacks {
  type Params = ListStacksParams;
  type Result = ListStacksResult;
  const METHOD: &'static str = "aws/cfn/stacks";
}

// ============================================================================
// Change sets
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeSetInfo {
  pub change_set_name: String,
  #[serde(default)]
  pub status: Option<String>,
  #[serde(default)]
  pub creation_time: Option<DateTime<Utc>>,
  #[serde(default)]
  pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListChangeSetsParams {
  pub stack_name: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub next_token: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListChangeSetsResult {
  pub change_sets: Vec<ChangeSetInfo>,
  #[serde(default)]
  pub next_token: Option<String>,
}

pub enum ListChangeSets {}

impl Request for ListChangeSets {
  type Params = ListChangeSetsParams;
  type Result = ListChangeSetsResult;
  const METHOD: &'static str = "aws/cfn/stack/changeSet/list";
}

// ============================================================================
// Credentials and configuration
// ============================================================================

/// Opaque credential payload. `data` is passed through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCredentialsParams {
  pub data: String,
  pub encrypted: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateCredentialsResult {
  pub success: bool,
}

pub enum UpdateIamCredentials {}

impl Request for UpdateIamCredentials {
  type Params = UpdateCredentialsParams;
  type Result = UpdateCredentialsResult;
  const METHOD: &'static str = "aws/credentials/iam/update";
}

pub enum DeleteIamCredentials {}

impl Notification for DeleteIamCredentials {
  type Params = ();
  const METHOD: &'static str = "aws/credentials/iam/delete";
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DidChangeConfigurationParams {
  pub settings: Value,
}

impl Default for DidChangeConfigurationParams {
  fn default() -> Self {
    Self {
      settings: Value::Object(Default::default()),
    }
  }
}

pub enum DidChangeConfiguration {}

impl Notification for DidChangeConfiguration {
  type Params = DidChangeConfigurationParams;
  const METHOD: &'static str = "workspace/didChangeConfiguration";
}
