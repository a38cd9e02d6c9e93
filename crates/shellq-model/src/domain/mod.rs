mod command_id;
pub use command_id::{CommandId, CommandIdGen};

mod command_status;
pub use command_status::CommandStatus;

mod host_info;
pub use host_info::HostInfo;

mod queue_status;
pub use queue_status::QueueStatus;

/// Default number of commands allowed to run at the same time.
pub const DEFAULT_MAX_CONCURRENT: usize = 5;
