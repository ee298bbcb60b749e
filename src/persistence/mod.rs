//! SQLite-backed persistence: connection setup, schema bootstrap, and
//! repositories over the ERP tables.

pub mod db;
pub mod equipment_repo;
pub mod execution_repo;
pub mod schema;
pub mod user_repo;

pub use db::{connect, connect_memory, Database};
pub use equipment_repo::EquipmentRepo;
pub use execution_repo::{ExecutionRepo, ExecutionSummary};
pub use user_repo::UserRepo;
