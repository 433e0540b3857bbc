//! rolodex-server: HTTP layer and Postgres store
//!
//! Exposes the contact-record operations over HTTP: CRUD with
//! search/sort/pagination, bulk spreadsheet import, and export.

pub mod db;
pub mod http;

pub use db::{bootstrap, create_pool};
pub use http::{run_server, ApiError, ServerConfig};
