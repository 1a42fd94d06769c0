//! Route points and the composed route sequence.
//!
//! A [`RouteSequence`] is the fully ordered stop list for one physical
//! vehicle run. Ordering is held as an explicit 1-based `rank` reassigned
//! on every composition (stable re-sort of an arena of points) — there are
//! no reserved numeric bands. The dispatcher's requested ranks only decide
//! the sort; the final ranks are always contiguous.
//!
//! # Ordering semantics
//!
//! Points are totally ordered by `rank`. During composition, ties on the
//! *requested* rank are broken by emission order (primary loading first,
//! then donor loadings, donor unloadings, primary unloading last), after
//! which ranks are reassigned `1..=n` so the final sequence has no
//! duplicates by construction.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::types::{Coordinates, Location, OrderId};

// ---------------------------------------------------------------------------
// PointKind
// ---------------------------------------------------------------------------

/// Whether a stop loads or unloads goods.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointKind {
    Loading,
    Unloading,
}

impl fmt::Display for PointKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Loading => write!(f, "loading"),
            Self::Unloading => write!(f, "unloading"),
        }
    }
}

// ---------------------------------------------------------------------------
// PointOwner
// ---------------------------------------------------------------------------

/// The order a stop originates from.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PointOwner {
    /// The surviving order that carries the merge.
    Primary,
    /// An absorbed donor order.
    Donor(OrderId),
}

impl PointOwner {
    /// The donor's order id, if this is a donor-owned point.
    #[must_use]
    pub const fn donor_id(&self) -> Option<&OrderId> {
        match self {
            Self::Primary => None,
            Self::Donor(id) => Some(id),
        }
    }
}

impl fmt::Display for PointOwner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primary => write!(f, "primary"),
            Self::Donor(id) => write!(f, "{id}"),
        }
    }
}

// ---------------------------------------------------------------------------
// RoutePoint
// ---------------------------------------------------------------------------

/// One stop in a composed route.
///
/// `coordinates` stays `None` until the point has been resolved (depot
/// table hit or geocoder success). An unresolved point remains part of the
/// sequence — it is only excluded from distance measurement.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutePoint {
    pub kind: PointKind,
    pub owner: PointOwner,
    /// Final 1-based position in the sequence; contiguous after compose.
    pub rank: u32,
    /// Resolvable address or named-depot token.
    pub location: Location,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinates>,
    /// Human-readable stop label, e.g. `"Loading — depot Białystok"`.
    pub description: String,
}

impl RoutePoint {
    /// Whether coordinates have been resolved for this point.
    #[must_use]
    pub const fn is_resolved(&self) -> bool {
        self.coordinates.is_some()
    }
}

// ---------------------------------------------------------------------------
// RouteSequence
// ---------------------------------------------------------------------------

/// The ordered list of stops for one merged run.
///
/// Invariants (checked by [`RouteSequence::validate`]):
/// - exactly one primary loading point and exactly one primary unloading
///   point;
/// - the primary loading point is first (the run always starts at the
///   primary pickup);
/// - ranks are exactly `1..=len`, ascending.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RouteSequence {
    points: Vec<RoutePoint>,
}

impl RouteSequence {
    /// Wrap an already-ordered list of points.
    ///
    /// # Errors
    /// Returns [`SequenceError`] if the list violates any sequence
    /// invariant.
    pub fn new(points: Vec<RoutePoint>) -> Result<Self, SequenceError> {
        let sequence = Self { points };
        sequence.validate()?;
        Ok(sequence)
    }

    /// The stops in rank order.
    #[must_use]
    pub fn points(&self) -> &[RoutePoint] {
        &self.points
    }

    /// Mutable access for coordinate resolution; ordering must not change.
    pub(crate) fn points_mut(&mut self) -> &mut [RoutePoint] {
        &mut self.points
    }

    /// Number of stops.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the sequence has no stops (never true for a composed one).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Coordinates of all resolved points, in rank order.
    #[must_use]
    pub fn resolved_waypoints(&self) -> Vec<Coordinates> {
        self.points.iter().filter_map(|p| p.coordinates).collect()
    }

    /// Ids of points that are still unresolved, in rank order.
    #[must_use]
    pub fn unresolved(&self) -> Vec<&RoutePoint> {
        self.points.iter().filter(|p| !p.is_resolved()).collect()
    }

    /// Re-check every sequence invariant.
    ///
    /// # Errors
    /// Returns the first violated invariant.
    pub fn validate(&self) -> Result<(), SequenceError> {
        if self.points.is_empty() {
            return Err(SequenceError::Empty);
        }

        let primary_loadings = self
            .points
            .iter()
            .filter(|p| p.owner == PointOwner::Primary && p.kind == PointKind::Loading)
            .count();
        if primary_loadings != 1 {
            return Err(SequenceError::PrimaryLoadingCount {
                count: primary_loadings,
            });
        }

        let primary_unloadings = self
            .points
            .iter()
            .filter(|p| p.owner == PointOwner::Primary && p.kind == PointKind::Unloading)
            .count();
        if primary_unloadings != 1 {
            return Err(SequenceError::PrimaryUnloadingCount {
                count: primary_unloadings,
            });
        }

        let first = &self.points[0];
        if first.owner != PointOwner::Primary || first.kind != PointKind::Loading {
            return Err(SequenceError::PrimaryLoadingNotFirst);
        }

        for (idx, point) in self.points.iter().enumerate() {
            let expected = u32::try_from(idx + 1).map_err(|_| SequenceError::Empty)?;
            if point.rank != expected {
                return Err(SequenceError::NonContiguousRanks {
                    position: idx,
                    rank: point.rank,
                });
            }
        }

        Ok(())
    }
}

impl<'a> IntoIterator for &'a RouteSequence {
    type Item = &'a RoutePoint;
    type IntoIter = std::slice::Iter<'a, RoutePoint>;
    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}

// ---------------------------------------------------------------------------
// SequenceError
// ---------------------------------------------------------------------------

/// A route sequence violated one of its structural invariants.
///
/// These indicate a composition bug or hand-built input, never normal
/// dispatcher error — the composer cannot produce an invalid sequence.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SequenceError {
    /// The sequence has no points.
    Empty,
    /// Not exactly one primary loading point.
    PrimaryLoadingCount { count: usize },
    /// Not exactly one primary unloading point.
    PrimaryUnloadingCount { count: usize },
    /// The first point is not the primary loading point.
    PrimaryLoadingNotFirst,
    /// Ranks are not exactly `1..=len` ascending.
    NonContiguousRanks { position: usize, rank: u32 },
}

impl fmt::Display for SequenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "route sequence has no points"),
            Self::PrimaryLoadingCount { count } => {
                write!(f, "expected exactly one primary loading point, found {count}")
            }
            Self::PrimaryUnloadingCount { count } => {
                write!(
                    f,
                    "expected exactly one primary unloading point, found {count}"
                )
            }
            Self::PrimaryLoadingNotFirst => {
                write!(f, "the primary loading point must be the first stop")
            }
            Self::NonContiguousRanks { position, rank } => write!(
                f,
                "rank {rank} at position {position} breaks the contiguous 1..=n ordering"
            ),
        }
    }
}

impl std::error::Error for SequenceError {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
