pub mod progress_reporter;

pub use progress_reporter::{ProgressReporter, RunSummary};
