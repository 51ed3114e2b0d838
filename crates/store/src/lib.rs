//! Read-only access to the manifest database.
//!
//! The manifest is an SQLite file with one table per entity kind. Every
//! table has the same shape, an integer `id` (the entity hash, stored
//! signed) and a `json` column holding the entity, so tables are treated as
//! opaque hash-to-record maps and decoding is left to the caller:
//!
//! - [`Store`] owns the read-only connection pool for one database file.
//! - [`Accessor`] borrows a store and answers `get::<T>(table, hash)` and
//!   `get_all::<T>(table)`, decoding records into any
//!   [`DeserializeOwned`](serde::de::DeserializeOwned) type.
//!
//! Absent records ([`ErrorKind::NotFound`](error::ErrorKind::NotFound)) are
//! reported separately from records that don't fit the requested type
//! ([`ErrorKind::Decode`](error::ErrorKind::Decode)).

mod accessor;
mod db;
pub mod error;
#[cfg(test)]
mod fixture;
mod models;
mod table;

pub use crate::accessor::{Accessor, row_id};
pub use crate::db::Store;
pub use crate::table::Table;
