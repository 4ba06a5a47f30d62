//! Repository layer: one zero-sized struct per table, taking `&PgPool`.

pub mod project_repo;
pub mod task_repo;

pub use project_repo::ProjectRepo;
pub use task_repo::TaskRepo;

use todolist_core::models::Page;

/// `OFFSET` and `LIMIT` bind values for a page. A `NULL` limit means no limit.
fn page_bounds(page: Page) -> (i64, Option<i64>) {
    (page.skip as i64, page.limit.map(|l| l as i64))
}
