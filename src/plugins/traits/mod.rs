pub mod classifier;
pub mod reporter;

pub use classifier::{Classification, Classifier, Decision};
pub use reporter::{LogLine, ReportEvent, Reporter, TransitionAlert};
