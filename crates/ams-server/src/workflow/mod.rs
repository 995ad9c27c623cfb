//! Workflow state machines and the completion coordinator
//!
//! `transitions` holds the pure state machines and effect planning;
//! `coordinator` commits a completion's status write, cascade, and linked
//! audit entry as one unit of work.

pub mod coordinator;
pub mod transitions;

pub use coordinator::{
    complete_auction, complete_disposal, complete_transfer, CompletionError, CompletionOutcome,
};
pub use transitions::{
    transition_allowed, AuctionStatus, CascadeEffect, CompletionPlan, DisposalStatus,
    TransferStatus, UnknownStatus, COMPLETED,
};
