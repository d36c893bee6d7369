//! # leadscore-storage
//!
//! SQLite persistence layer for the lead scoring engine.
//! WAL mode, a serialized writer connection, `BEGIN IMMEDIATE` units of
//! work, schema migrations, and one query module per table.

pub mod connection;
pub mod migrations;
pub mod queries;

pub use connection::DatabaseManager;
