//! Database module: the actor that owns the SQLite pool, row models and schema.
//!
//! Layout:
//! - `actor.rs`: `DbActor` and its cloneable `DbActorHandle`
//! - `models.rs`: Rust structs mirroring DB rows
//! - `schema.rs`: SQL DDL for initializing the database (SQLite-first)

pub mod actor;
pub mod models;
pub mod schema;

pub use models::{DbArtwork, NewArtwork};

pub use actor::{DbActorHandle, spawn};
