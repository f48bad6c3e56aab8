//! Pipeline entry points for tracker operations.
//!
//! - `run_tracker`: Collect changes for a date window and reconcile the table
//! - `run_self_test`: Check the resolver against a known entity

pub mod run;
pub mod window;

pub use run::{RunReport, RunRequest, run_tracker};
pub use self_test::run_self_test;
pub use window::RunWindow;
