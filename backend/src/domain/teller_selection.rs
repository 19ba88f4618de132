//! Strategies for picking an idle teller during auto-assignment.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use rand::seq::SliceRandom;

use super::teller::Teller;

/// Chooses one teller from the currently available set.
///
/// Implementations receive only idle tellers and return `None` when the
/// slice is empty.
pub trait TellerSelectionPolicy: Send + Sync {
    /// Pick a teller from `available`.
    fn select<'a>(&self, available: &'a [Teller]) -> Option<&'a Teller>;
}

/// Uniformly random choice.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomTellerSelection;

impl TellerSelectionPolicy for RandomTellerSelection {
    fn select<'a>(&self, available: &'a [Teller]) -> Option<&'a Teller> {
        available.choose(&mut rand::thread_rng())
    }
}

/// Deterministic choice of the teller idle for longest.
///
/// Tellers that were never assigned come first; ties break on name.
#[derive(Debug, Default, Clone, Copy)]
pub struct LeastRecentlyAssignedSelection;

impl TellerSelectionPolicy for LeastRecentlyAssignedSelection {
    fn select<'a>(&self, available: &'a [Teller]) -> Option<&'a Teller> {
        available
            .iter()
            .min_by(|left, right| {
                left.last_assigned_at
                    .cmp(&right.last_assigned_at)
                    .then_with(|| left.name.cmp(&right.name))
            })
    }
}

/// Configurable selection policy name.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum AssignmentPolicy {
    /// Pick uniformly among idle tellers.
    #[default]
    Random,
    /// Pick the idle teller that has waited longest since its last ticket.
    LeastRecentlyAssigned,
}

/// Error returned when parsing an unknown policy name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown assignment policy '{0}'; expected 'random' or 'least-recently-assigned'")]
pub struct UnknownAssignmentPolicy(pub String);

impl AssignmentPolicy {
    /// Instantiate the strategy behind this name.
    #[must_use]
    pub fn into_policy(self) -> Arc<dyn TellerSelectionPolicy> {
        match self {
            Self::Random => Arc::new(RandomTellerSelection),
            Self::LeastRecentlyAssigned => Arc::new(LeastRecentlyAssignedSelection),
        }
    }
}

impl FromStr for AssignmentPolicy {
    type Err = UnknownAssignmentPolicy;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "random" => Ok(Self::Random),
            "least-recently-assigned" | "lra" => Ok(Self::LeastRecentlyAssigned),
            _ => Err(UnknownAssignmentPolicy(raw.to_owned())),
        }
    }
}

impl fmt::Display for AssignmentPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Random => f.write_str("random"),
            Self::LeastRecentlyAssigned => f.write_str("least-recently-assigned"),
        }
    }
}
