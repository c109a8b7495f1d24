pub mod batch;
pub mod config;
pub mod engine;
pub mod error;
pub mod hasher;
pub mod progress;
pub mod record;
pub mod scanner;
pub mod session;
pub mod storage;
pub mod transmit;
pub mod utils;

pub use config::AppConfig;
pub use engine::{InventoryEngine, RunResult};
pub use error::Error;
pub use progress::{ProgressReporter, SilentReporter};
pub use record::FileRecord;
pub use session::Session;

pub type Result<T, E = Error> = std::result::Result<T, E>;
