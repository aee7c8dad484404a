//! Address book of clients with their phones and emails, kept in PostgreSQL.
//!
//! Format rules and referential integrity are enforced by the store's constraints;
//! this crate creates the schema, runs the writes and builds the filtered lookup.

pub mod config;
pub mod db;
pub mod error;
pub mod models;

pub use db::{ChangeReport, ClientFilter, CommitPolicy, CreatedClient, Database, DeletedClient};
pub use error::{BookError, BookResult};
