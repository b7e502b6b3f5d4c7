//! 基础设施层：持有共享的排队状态，只暴露队列能力

pub mod pending_queue;

pub use pending_queue::{Claim, MergeOutcome, PendingQueue};
