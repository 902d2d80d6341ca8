//! Parents and their minions over SQLite.
//!
//! A parent owns zero or more minions; a minion belongs to exactly one parent,
//! which it references by name on the wire. Layers, leaves first:
//!
//! - [`db`]: the store, request-scoped [`db::Session`]s with their units of
//!   work, and the generic [`db::Repository`].
//! - [`convert`]: element ↔ entity conversion.
//! - [`service`]: create/read/update/delete per kind.
//! - [`api`]: the HTTP routes.

pub mod api;
pub mod config;
pub mod convert;
pub mod db;
pub mod error;
pub mod models;
pub mod service;

pub use error::{Error, ErrorKind, Result};
