//! Workflow state machines and completion planning
//!
//! Pure functions only. The status enums are closed; `completed` is the
//! one state that carries cascading behavior and the one state nothing
//! transitions out of. [`plan_transfer_completion`] and
//! [`plan_retirement`] derive the pending side effects of a completion as
//! data; the coordinator commits them in one transaction together with
//! the status write.

use serde::{Deserialize, Serialize};

/// The status value every workflow shares as its cascading terminal state.
pub const COMPLETED: &str = "completed";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferStatus {
    Pending,
    Approved,
    Rejected,
    Completed,
    Cancelled,
}

impl TransferStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl std::str::FromStr for TransferStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuctionStatus {
    Draft,
    Published,
    Scheduled,
    Active,
    BiddingOpen,
    BiddingClosed,
    Completed,
    Cancelled,
}

impl AuctionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Published => "published",
            Self::Scheduled => "scheduled",
            Self::Active => "active",
            Self::BiddingOpen => "bidding_open",
            Self::BiddingClosed => "bidding_closed",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl std::str::FromStr for AuctionStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(Self::Draft),
            "published" => Ok(Self::Published),
            "scheduled" => Ok(Self::Scheduled),
            "active" => Ok(Self::Active),
            "bidding_open" => Ok(Self::BiddingOpen),
            "bidding_closed" => Ok(Self::BiddingClosed),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisposalStatus {
    Draft,
    Pending,
    Approved,
    InProgress,
    Completed,
    Cancelled,
}

impl DisposalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl std::str::FromStr for DisposalStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(Self::Draft),
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "in_progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown workflow status: {0}")]
pub struct UnknownStatus(pub String);

/// Once a record reaches `completed` it never transitions out; every
/// other movement is permitted.
pub fn transition_allowed(current: &str, next: &str) -> bool {
    current != COMPLETED || next == COMPLETED
}

/// Side effect a completion must commit alongside the status write.
#[derive(Debug, Clone, PartialEq)]
pub enum CascadeEffect {
    /// Move the asset to the workflow's destination; optionally hand
    /// custody to the approver.
    RelocateAsset {
        asset_id: i64,
        to_location: String,
        new_custodian: Option<String>,
    },
    /// Remove the asset entirely (auction sale / disposal). Dependent
    /// child rows are removed by the storage layer, not the coordinator.
    RetireAsset { asset_id: i64 },
}

/// The effects pending for one completion. Empty when the linked asset is
/// already gone; the cascade then no-ops while the status write stands.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompletionPlan {
    pub effects: Vec<CascadeEffect>,
}

impl CompletionPlan {
    pub fn is_noop(&self) -> bool {
        self.effects.is_empty()
    }
}

/// Plan the cascade for a transfer entering `completed`.
pub fn plan_transfer_completion(
    asset_id: Option<i64>,
    to_location: &str,
    approver_name: Option<&str>,
) -> CompletionPlan {
    match asset_id {
        Some(asset_id) => CompletionPlan {
            effects: vec![CascadeEffect::RelocateAsset {
                asset_id,
                to_location: to_location.to_string(),
                new_custodian: approver_name.map(|s| s.to_string()),
            }],
        },
        None => CompletionPlan::default(),
    }
}

/// Plan the cascade for an auction or disposal entering `completed`.
pub fn plan_retirement(asset_id: Option<i64>) -> CompletionPlan {
    match asset_id {
        Some(asset_id) => CompletionPlan {
            effects: vec![CascadeEffect::RetireAsset { asset_id }],
        },
        None => CompletionPlan::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trips() {
        for status in [
            TransferStatus::Pending,
            TransferStatus::Approved,
            TransferStatus::Rejected,
            TransferStatus::Completed,
            TransferStatus::Cancelled,
        ] {
            assert_eq!(status.as_str().parse::<TransferStatus>().unwrap(), status);
        }
        for status in [
            AuctionStatus::Draft,
            AuctionStatus::Published,
            AuctionStatus::Scheduled,
            AuctionStatus::Active,
            AuctionStatus::BiddingOpen,
            AuctionStatus::BiddingClosed,
            AuctionStatus::Completed,
            AuctionStatus::Cancelled,
        ] {
            assert_eq!(status.as_str().parse::<AuctionStatus>().unwrap(), status);
        }
        for status in [
            DisposalStatus::Draft,
            DisposalStatus::Pending,
            DisposalStatus::Approved,
            DisposalStatus::InProgress,
            DisposalStatus::Completed,
            DisposalStatus::Cancelled,
        ] {
            assert_eq!(status.as_str().parse::<DisposalStatus>().unwrap(), status);
        }
        assert!("shredded".parse::<DisposalStatus>().is_err());
    }

    #[test]
    fn test_nothing_leaves_completed() {
        assert!(!transition_allowed("completed", "pending"));
        assert!(!transition_allowed("completed", "cancelled"));
        // Re-asserting completion is allowed; the coordinator makes it a no-op
        assert!(transition_allowed("completed", "completed"));
        assert!(transition_allowed("pending", "approved"));
        assert!(transition_allowed("approved", "completed"));
        assert!(transition_allowed("cancelled", "pending"));
    }

    #[test]
    fn test_transfer_plan_relocates() {
        let plan = plan_transfer_completion(Some(7), "WH-2", Some("Ada Obi"));
        assert_eq!(
            plan.effects,
            vec![CascadeEffect::RelocateAsset {
                asset_id: 7,
                to_location: "WH-2".to_string(),
                new_custodian: Some("Ada Obi".to_string()),
            }]
        );
    }

    #[test]
    fn test_transfer_plan_without_approver_keeps_custodian() {
        let plan = plan_transfer_completion(Some(7), "WH-2", None);
        match &plan.effects[0] {
            CascadeEffect::RelocateAsset { new_custodian, .. } => assert!(new_custodian.is_none()),
            other => panic!("unexpected effect {:?}", other),
        }
    }

    #[test]
    fn test_missing_asset_plans_noop() {
        assert!(plan_transfer_completion(None, "WH-2", None).is_noop());
        assert!(plan_retirement(None).is_noop());
    }

    #[test]
    fn test_retirement_plan() {
        let plan = plan_retirement(Some(42));
        assert_eq!(plan.effects, vec![CascadeEffect::RetireAsset { asset_id: 42 }]);
    }
}
