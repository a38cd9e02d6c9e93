pub mod error;
pub use error::{ConfigError, QueueError};

pub mod config;
pub use config::{MAX_CONCURRENT_LIMIT, QueueConfig};

pub mod queue;
pub use queue::CommandQueue;

mod system;
pub use system::{host_info, mark_started};
