pub mod claim_ctx;
pub mod claim_flow;

pub use claim_ctx::ClaimCtx;
pub use claim_flow::{ClaimFlow, SlotOutcome};
