//! Telegram bot front end for NR12 machine-safety inspections.
//!
//! Operators run equipment checklists from a Telegram chat; completed
//! inspections are written into the ERP `SQLite` database as execution
//! records with per-item responses and non-conformity photos.

#![forbid(unsafe_code)]

pub mod access;
pub mod config;
pub mod errors;
pub mod models;
pub mod orchestrator;
pub mod persistence;
pub mod telegram;

pub use config::Config;
pub use errors::{AppError, Result};
