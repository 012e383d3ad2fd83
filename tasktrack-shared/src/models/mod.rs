/// Database models for TaskTrack
///
/// # Models
///
/// - `user`: User accounts, activation and lockout state
/// - `session`: Opaque access tokens with expiry
/// - `task`: The validated task record and its owner-scoped queries

pub mod session;
pub mod task;
pub mod user;
