//! The two dispatch lanes.
//!
//! Image generation is fully serialized because the upstream image models
//! degrade or reject concurrent load; text/analysis calls may overlap.

use super::queue::{QueueStats, TaskQueue};

pub const IMAGE_LANE_CONCURRENCY: usize = 1;
pub const TEXT_LANE_CONCURRENCY: usize = 10;

/// Workload class of an outbound request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Workload {
    Image,
    Text,
}

impl Workload {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Text => "text",
        }
    }
}

impl std::fmt::Display for Workload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Process-wide pair of independent queues.
///
/// Build once at startup and share (it is cheap to clone); the queues have no
/// shared counters and no ordering relationship with each other.
#[derive(Debug, Clone)]
pub struct Lanes {
    image: TaskQueue,
    text: TaskQueue,
}

impl Default for Lanes {
    fn default() -> Self {
        Self::new(IMAGE_LANE_CONCURRENCY, TEXT_LANE_CONCURRENCY)
    }
}

impl Lanes {
    pub fn new(image_concurrency: usize, text_concurrency: usize) -> Self {
        Self {
            image: TaskQueue::new(Workload::Image.as_str(), image_concurrency),
            text: TaskQueue::new(Workload::Text.as_str(), text_concurrency),
        }
    }

    pub fn lane(&self, workload: Workload) -> &TaskQueue {
        match workload {
            Workload::Image => &self.image,
            Workload::Text => &self.text,
        }
    }

    pub fn image(&self) -> &TaskQueue {
        &self.image
    }

    pub fn text(&self) -> &TaskQueue {
        &self.text
    }

    pub fn stats(&self) -> [QueueStats; 2] {
        [self.image.stats(), self.text.stats()]
    }
}
