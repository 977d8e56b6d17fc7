mod dispatcher;
mod pipeline;
mod progress;

pub mod extractors;

pub use dispatcher::{classify, Dispatcher};
pub use pipeline::SubmissionPipeline;
pub use progress::ProgressReporter;
