pub mod clock;
pub mod config;
pub mod fetcher;
pub mod models;
pub mod plugins;
pub mod poller;
pub mod state;
pub mod utils;
pub mod watcher;

// Re-export commonly used types
pub use config::AppConfig;
pub use fetcher::{Fetcher, HttpFetcher};
pub use models::{Catalog, Product, Status};
pub use plugins::classifiers::{StorefrontClassifier, classify};
pub use poller::{CycleSummary, PollLoop};
pub use state::StateTracker;
pub use utils::error::AppError;
pub use watcher::Watcher;

pub type Result<T> = std::result::Result<T, AppError>;
