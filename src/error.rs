//! Unified error type for merge operations.
//!
//! Defines [`MergeError`], the error surface of the engine's non-recoverable
//! conditions. Messages are written for the dispatcher fixing the input:
//! each variant names the offending order or field and says what to do
//! next. Recoverable conditions (geocoding failures, road-distance
//! unavailability) never appear here — they degrade into flags on the
//! result instead.

use std::fmt;

use rust_decimal::Decimal;

use crate::model::participation::DraftError;
use crate::model::route::PointKind;
use crate::model::types::OrderId;
use crate::store::StoreError;

// ---------------------------------------------------------------------------
// MergeError
// ---------------------------------------------------------------------------

/// Non-recoverable merge/unmerge failures.
///
/// Every variant prevents persistence: no partial merge record is ever
/// written when one of these is returned.
#[derive(Debug)]
pub enum MergeError {
    /// A donor was selected with neither loading nor unloading.
    InvalidParticipation {
        /// The misconfigured donor.
        order: OrderId,
        /// What exactly is wrong.
        detail: String,
    },

    /// Two points resolved to the same rank for the same kind and owner.
    /// The rank-reassignment design makes a true collision a configuration
    /// bug, never a normal outcome; this check catches that bug before
    /// anything persists.
    RankCollision {
        rank: u32,
        kind: PointKind,
        owner: String,
    },

    /// Assigned donor costs exceed the total price.
    OverAllocated {
        total_price: Decimal,
        assigned: Decimal,
    },

    /// A donor was answered or merged by someone else between selection
    /// and commit.
    DonorNotAvailable {
        /// The stale donor.
        order: OrderId,
        /// Its current state, e.g. `"merged-donor"` or `"already answered"`.
        status: String,
    },

    /// Unmerge was requested for an order that carries no merge.
    NotMerged {
        order: OrderId,
    },

    /// The primary order cannot anchor a merge in its current state.
    InvalidOrder {
        order: OrderId,
        reason: String,
    },

    /// A route sequence failed its structural invariants at commit time.
    InvalidSequence {
        detail: String,
    },

    /// The draft itself is unusable.
    Draft(DraftError),

    /// The order store rejected or failed an operation.
    Store(StoreError),
}

// ---------------------------------------------------------------------------
// Display — dispatcher-facing messages
// ---------------------------------------------------------------------------

impl fmt::Display for MergeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidParticipation { order, detail } => {
                write!(
                    f,
                    "invalid participation for donor '{order}': {detail}\n  To fix: enable loading and/or unloading for the donor, or remove it from the merge."
                )
            }
            Self::RankCollision { rank, kind, owner } => {
                write!(
                    f,
                    "rank collision: two {kind} points for '{owner}' requested rank {rank}.\n  To fix: give each selected event of an order a distinct rank."
                )
            }
            Self::OverAllocated {
                total_price,
                assigned,
            } => {
                write!(
                    f,
                    "assigned donor costs ({assigned}) exceed the total price ({total_price}).\n  To fix: lower the per-donor costs or raise the total price before committing."
                )
            }
            Self::DonorNotAvailable { order, status } => {
                write!(
                    f,
                    "donor '{order}' is no longer available to merge ({status}).\n  To fix: refresh the order list and rebuild the draft without it."
                )
            }
            Self::NotMerged { order } => {
                write!(
                    f,
                    "order '{order}' carries no merge.\n  To fix: check the order id; only a merged primary order can be unmerged."
                )
            }
            Self::InvalidOrder { order, reason } => {
                write!(
                    f,
                    "order '{order}' cannot anchor a merge: {reason}\n  To fix: pick a primary order that is still new and unanswered."
                )
            }
            Self::InvalidSequence { detail } => {
                write!(f, "route sequence is invalid: {detail}")
            }
            Self::Draft(err) => write!(f, "{err}"),
            Self::Store(err) => write!(f, "order store error: {err}"),
        }
    }
}

// ---------------------------------------------------------------------------
// std::error::Error
// ---------------------------------------------------------------------------

impl std::error::Error for MergeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Draft(err) => Some(err),
            Self::Store(err) => Some(err),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// From impls
// ---------------------------------------------------------------------------

impl From<DraftError> for MergeError {
    fn from(err: DraftError) -> Self {
        Self::Draft(err)
    }
}

impl From<StoreError> for MergeError {
    fn from(err: StoreError) -> Self {
        Self::Store(err)
    }
}

impl From<crate::model::route::SequenceError> for MergeError {
    fn from(err: crate::model::route::SequenceError) -> Self {
        Self::InvalidSequence {
            detail: err.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn order(id: &str) -> OrderId {
        OrderId::new(id).unwrap()
    }

    // -- Display: every variant names the problem and a fix --

    #[test]
    fn display_invalid_participation() {
        let err = MergeError::InvalidParticipation {
            order: order("TR-1002"),
            detail: "neither loading nor unloading selected".to_owned(),
        };
        let msg = format!("{err}");
        assert!(msg.contains("TR-1002"));
        assert!(msg.contains("neither loading nor unloading"));
        assert!(msg.contains("To fix:"));
    }

    #[test]
    fn display_rank_collision() {
        let err = MergeError::RankCollision {
            rank: 2,
            kind: PointKind::Unloading,
            owner: "TR-1002".to_owned(),
        };
        let msg = format!("{err}");
        assert!(msg.contains("rank 2"));
        assert!(msg.contains("unloading"));
        assert!(msg.contains("distinct rank"));
    }

    #[test]
    fn display_over_allocated() {
        let err = MergeError::OverAllocated {
            total_price: dec!(900.00),
            assigned: dec!(950.00),
        };
        let msg = format!("{err}");
        assert!(msg.contains("950.00"));
        assert!(msg.contains("900.00"));
        assert!(msg.contains("lower the per-donor costs"));
    }

    #[test]
    fn display_donor_not_available() {
        let err = MergeError::DonorNotAvailable {
            order: order("TR-1003"),
            status: "merged-donor".to_owned(),
        };
        let msg = format!("{err}");
        assert!(msg.contains("TR-1003"));
        assert!(msg.contains("merged-donor"));
        assert!(msg.contains("refresh the order list"));
    }

    #[test]
    fn display_not_merged() {
        let err = MergeError::NotMerged {
            order: order("TR-1001"),
        };
        let msg = format!("{err}");
        assert!(msg.contains("TR-1001"));
        assert!(msg.contains("no merge"));
    }

    // -- source chaining --

    #[test]
    fn store_error_is_source() {
        let err = MergeError::Store(StoreError::OrderNotFound {
            order: order("TR-9999"),
        });
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn leaf_variants_have_no_source() {
        let err = MergeError::NotMerged {
            order: order("TR-1001"),
        };
        assert!(std::error::Error::source(&err).is_none());
    }
}
