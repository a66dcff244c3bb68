//! Waste-handling lifecycle of a mattress record.

use core::str::FromStr;

use wastetrack_core::{DomainError, DomainResult};

use crate::wire::wire_enum;

wire_enum! {
    /// Lifecycle stage of a tracked mattress.
    ///
    /// `Received` is where every new record starts. `Stored` and `Processing`
    /// are intermediate and may be revisited; the four disposal outcomes are
    /// terminal. `Eol` predates collection and is kept for records written
    /// before registration always started at `Received`.
    pub enum MattressStatus("status") {
        Eol => "EoL",
        Received => "received",
        Stored => "stored",
        Processing => "processing",
        Landfill => "landfill",
        Incinerated => "incinerated",
        Downcycled => "downcycled",
        Upcycled => "upcycled",
    }
}

impl MattressStatus {
    /// Status assigned to every newly created record.
    pub const INITIAL: MattressStatus = MattressStatus::Received;

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            MattressStatus::Landfill
                | MattressStatus::Incinerated
                | MattressStatus::Downcycled
                | MattressStatus::Upcycled
        )
    }

    /// Whether the lifecycle table allows moving from `self` to `next`.
    pub fn can_transition_to(&self, next: MattressStatus) -> bool {
        use MattressStatus::*;

        match (self, next) {
            (Eol, Received) => true,
            (Eol, _) => false,
            (_, Eol | Received) => false,
            (from, _) if from.is_terminal() => false,
            (from, to) => from != &to,
        }
    }
}

/// How strictly status updates are checked.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum TransitionPolicy {
    /// Only moves allowed by [`MattressStatus::can_transition_to`].
    #[default]
    Strict,
    /// Any status may follow any other.
    Permissive,
}

impl TransitionPolicy {
    pub fn check(&self, from: MattressStatus, to: MattressStatus) -> DomainResult<()> {
        match self {
            TransitionPolicy::Permissive => Ok(()),
            TransitionPolicy::Strict if from.can_transition_to(to) => Ok(()),
            TransitionPolicy::Strict => Err(DomainError::invalid_transition(from, to)),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TransitionPolicy::Strict => "strict",
            TransitionPolicy::Permissive => "permissive",
        }
    }
}

impl FromStr for TransitionPolicy {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(TransitionPolicy::Strict),
            "permissive" => Ok(TransitionPolicy::Permissive),
            other => Err(DomainError::validation(format!(
                "unknown transition policy: {other:?} (expected `strict` or `permissive`)"
            ))),
        }
    }
}
