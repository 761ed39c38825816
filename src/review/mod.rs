//! Review selection and tagging

mod cancel;
mod partition;
mod progress;
mod tagger;

pub use cancel::CancellationToken;
pub use partition::{ClusterPartitioner, ReviewSet, StatusBuckets};
pub use progress::{NoopProgress, ProgressSink, TracingProgress};
pub use tagger::{ClusterOutcome, ClusterTagger, RunStatus, TagReport};
