//! Minimal Notion API transport used by the ntx generator and runtime client.
//!
//! This crate wraps the three remote calls the rest of the workspace needs:
//! retrieving a database schema, querying a database page-by-page, and
//! creating a page. Everything else about the remote API is out of scope.

mod client;
mod error;
mod poll;
mod types;

pub use client::NotionClient;
pub use error::SdkError;
pub use poll::{PollConfig, PollError, poll_until};
pub use types::{
    CreatePageRequest, Database, Icon, PageParent, QueryRequest, QueryResponse, RemoteProperty,
    RichTextRun, SelectMeta, SelectOption, Sort, SortDirection,
};
