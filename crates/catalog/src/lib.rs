//! SQLite catalog of academic materials.
//!
//! This crate is the persistent core of the project. It owns three tables,
//! created and seeded by an embedded migration:
//!
//! - **materials**: one row per contributed note, question paper or video
//!   link. Rows are append-only; only the view and download counters change.
//! - **analytics**: a single row counting site visits. The number of uploads
//!   is never stored, it is counted from `materials` whenever it is read.
//! - **admins**: administrator usernames with Argon2id password hashes.
//!
//! A [`Database`] is connected once at startup and handed to [`Repository`]
//! (search, create, counters, analytics) and [`Admins`] (credentials); both
//! share the underlying connection pool.

mod admin;
mod db;
pub mod error;
mod models;
mod repo;

pub use crate::admin::{AdminSeed, Admins};
pub use crate::db::Database;
pub use crate::models::{
    Analytics, Contributor, Filters, Material, MaterialDetails, MaterialId, MaterialType, NewMaterial, Resource,
};
pub use crate::repo::Repository;
