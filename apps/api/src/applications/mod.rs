// Saved applications: the per-user history of completed analyses.
// Rows are insert-only; the dashboard lists them newest first.

pub mod handlers;
pub mod store;
