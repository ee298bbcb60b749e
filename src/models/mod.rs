//! Domain model modules.

pub mod equipment;
pub mod session;
pub mod user;
pub mod verdict;
