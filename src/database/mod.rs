//! # Database Operations
//!
//! Connection management for the record store. Workers never share a pool:
//! each one opens its own [`DatabaseConnection`] so a slow write in one batch
//! cannot queue behind another worker's statements.

pub mod connection;

pub use connection::DatabaseConnection;
