pub mod maintenance;
pub mod project;
pub mod task;
