/// Database layer for TaskTrack
///
/// # Modules
///
/// - `pool`: PostgreSQL pools, split into a read endpoint and a write endpoint
/// - `migrations`: Schema migration runner
///
/// Models and their queries live in the `models` module at crate root level.

pub mod migrations;
pub mod pool;
