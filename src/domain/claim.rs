//! Claim review state machine.

use crate::entities::claims::ClaimStatus;
use std::str::FromStr;

/// Outcome an administrator can put on a claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimDecision {
    Approve,
    Reject,
    Collect,
}

impl ClaimDecision {
    /// Status the claim ends up in.
    #[must_use]
    pub const fn target(self) -> ClaimStatus {
        match self {
            Self::Approve => ClaimStatus::Approved,
            Self::Reject => ClaimStatus::Rejected,
            Self::Collect => ClaimStatus::Collected,
        }
    }

    /// Status the claim must currently be in.
    #[must_use]
    pub const fn required_current(self) -> ClaimStatus {
        match self {
            Self::Approve | Self::Reject => ClaimStatus::Pending,
            Self::Collect => ClaimStatus::Approved,
        }
    }

    #[must_use]
    pub fn allowed_from(self, current: ClaimStatus) -> bool {
        current == self.required_current()
    }
}

impl FromStr for ClaimDecision {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "approved" => Ok(Self::Approve),
            "rejected" => Ok(Self::Reject),
            "collected" => Ok(Self::Collect),
            _ => Err(()),
        }
    }
}
