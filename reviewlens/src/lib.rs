// Library interface for reviewlens modules
// This allows tests and the binary to import modules

pub mod classifier;
pub mod error;
pub mod filter;
pub mod loader;
pub mod model;
pub mod report;
pub mod server;
pub mod stats;

pub use error::{DashboardError, Result};
pub use model::{Dataset, ReviewRecord, Sentiment};
