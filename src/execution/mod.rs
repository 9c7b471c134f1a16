//! Execution layer: HTTP plumbing, bounded queues and the lane pair.

pub mod http;
pub mod lanes;
pub mod queue;

pub use lanes::{IMAGE_LANE_CONCURRENCY, Lanes, TEXT_LANE_CONCURRENCY, Workload};
pub use queue::{QueueStats, TaskHandle, TaskQueue};
