//! # TaskTrack Shared Library
//!
//! Types, persistence and authentication logic used by the TaskTrack API.
//!
//! ## Module Organization
//!
//! - `db`: Read/write connection pools and migrations
//! - `models`: Users, sessions and tasks with their queries
//! - `auth`: Password hashing, access tokens and the authentication gate

pub mod auth;
pub mod db;
pub mod models;

/// Current version of the TaskTrack shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
