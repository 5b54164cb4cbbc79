//! Data models for Tapflow

pub mod business;
pub mod business_type;
pub mod contact;
pub mod feedback;
pub mod flow;
pub mod loyalty;
pub mod redemption;
pub mod reward;

// Re-export commonly used types
pub use business::{BusinessProfile, FlowSettings};
pub use business_type::BusinessType;
pub use contact::Contact;
pub use flow::{CustomerFlowState, FlowAction, FlowStep};
pub use redemption::{RedemptionRequest, RedemptionStatus};
pub use reward::Reward;
