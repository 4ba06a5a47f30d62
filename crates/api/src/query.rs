//! Shared query parameter types for API handlers.

use serde::Deserialize;
use todolist_core::models::Page;
use todolist_core::types::Date;
use todolist_core::validation::parse_deadline;

use crate::error::AppError;

/// Pagination parameters (`?skip=&limit=`).
///
/// Negative values clamp to zero; a missing or non-positive `limit` returns
/// everything after `skip`.
#[derive(Debug, Default, Deserialize)]
pub struct PaginationParams {
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}

impl PaginationParams {
    pub fn page(&self) -> Page {
        Page::new(self.skip, self.limit)
    }
}

/// Query parameters for the overdue maintenance endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct OverdueParams {
    /// `YYYY-MM-DD`; defaults to today.
    pub as_of: Option<String>,
    #[serde(default)]
    pub dry_run: bool,
}

impl OverdueParams {
    /// The requested date, or `None` when the caller left it out.
    pub fn as_of(&self) -> Result<Option<Date>, AppError> {
        match self.as_of.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(raw) => parse_deadline(raw)
                .map(Some)
                .map_err(|_| AppError::BadRequest(format!("as_of must be YYYY-MM-DD, got '{raw}'"))),
        }
    }
}
