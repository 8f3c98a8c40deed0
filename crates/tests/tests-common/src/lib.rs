//! Helpers shared by the test suites of every crate in the workspace.

pub mod deployment;
pub mod logging;
pub mod mock;

pub use logging::init_logging;
