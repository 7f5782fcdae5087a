pub mod classifiers;
pub mod manager;
pub mod reporters;
pub mod traits;

pub use manager::ReporterManager;
pub use traits::{Classifier, Reporter};
