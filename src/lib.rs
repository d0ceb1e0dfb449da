//! Client-side cache of CloudFormation stacks and change sets.
//!
//! The data lives behind a long-running language server. This crate keeps a
//! paginated local copy of what the server reports, refreshes it through
//! asynchronous requests, and tells subscribers whenever it changes. The
//! transport itself is supplied by the host through [`ConnectionProvider`].

pub mod cache;
pub mod cfn;
pub mod config;
pub mod connection;
pub mod explorer;
pub mod logging;

#[cfg(test)]
mod testing;

pub use config::Config;
pub use connection::{Connection, ConnectionProvider};
pub use explorer::Explorer;
