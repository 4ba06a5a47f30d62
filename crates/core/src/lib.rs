//! Domain core for the todolist service.
//!
//! Holds everything that carries a business rule: validation, the storage
//! port and its in-memory adapter, the project/task service, and the overdue
//! maintenance job. Presentation layers (HTTP, worker commands) and the
//! PostgreSQL adapter live in their own crates and depend on this one.

pub mod clock;
pub mod config;
pub mod error;
pub mod models;
pub mod overdue;
pub mod service;
pub mod storage;
pub mod types;
pub mod validation;
