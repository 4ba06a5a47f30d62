//! Maintenance worker for todolist.
//!
//! Hosts the periodic overdue auto-close loop ([`scheduler`]) and the
//! plain-text rendering of job reports ([`report`]). The `todolist-worker`
//! binary wires both to a PostgreSQL-backed storage; the API crate reuses the
//! scheduler to run the loop in-process.

pub mod report;
pub mod scheduler;
