//! Shared response envelope types for API handlers.
//!
//! List and report responses use a `{ "data": ... }` envelope; single
//! entities are returned bare.

use serde::Serialize;

/// Standard `{ "data": T }` response envelope.
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}
