//! Learned rules and the actions they apply.

use std::fmt;

use sa_core::RuleId;

// ── Action ────────────────────────────────────────────────────────────────────

/// What a rule does to its traffic light when applied.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Action {
    /// Switch to the phase at this index of the light's phase program.
    Phase(u32),
    /// Leave the current phase running.  Never issues a simulator command.
    DoNothing,
}

impl Action {
    /// Phase index for `Phase`, `None` for `DoNothing`.
    #[inline]
    pub fn phase(self) -> Option<u32> {
        match self {
            Action::Phase(p) => Some(p),
            Action::DoNothing => None,
        }
    }

    #[inline]
    pub fn is_do_nothing(self) -> bool {
        matches!(self, Action::DoNothing)
    }
}

impl fmt::Display for Action {
    /// Phase index, or `-1` for do-nothing, matching the peer-intent key
    /// format `<peer>_<action>`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Phase(p) => write!(f, "{p}"),
            Action::DoNothing => f.write_str("-1"),
        }
    }
}

// ── RuleKind ──────────────────────────────────────────────────────────────────

/// Which catalog a rule belongs to; decides how its conditions are evaluated.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RuleKind {
    /// RS: evaluated against the agent's own intersection state.
    Individual = 0,
    /// RSint: evaluated against every intention received from partners.
    Cooperative = 1,
}

// ── Rule ──────────────────────────────────────────────────────────────────────

/// A condition list, an action, and a learned weight.
///
/// Rules are created by the genome layer when a generation is bred and live
/// in an individual's RS or RSint catalog.  Only the reinforcement update
/// changes `weight`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rule {
    pub id:         RuleId,
    pub kind:       RuleKind,
    /// Predicate identifiers; the rule applies when all of them hold.
    pub conditions: Vec<String>,
    pub action:     Action,
    pub weight:     f64,
}

impl Rule {
    pub fn new(
        id:         RuleId,
        kind:       RuleKind,
        conditions: Vec<String>,
        action:     Action,
        weight:     f64,
    ) -> Self {
        Self { id, kind, conditions, action, weight }
    }

    /// An RS rule.
    pub fn individual<S: Into<String>>(
        id:         RuleId,
        conditions: impl IntoIterator<Item = S>,
        action:     Action,
        weight:     f64,
    ) -> Self {
        let conditions = conditions.into_iter().map(Into::into).collect();
        Self::new(id, RuleKind::Individual, conditions, action, weight)
    }

    /// An RSint rule.
    pub fn cooperative<S: Into<String>>(
        id:         RuleId,
        conditions: impl IntoIterator<Item = S>,
        action:     Action,
        weight:     f64,
    ) -> Self {
        let conditions = conditions.into_iter().map(Into::into).collect();
        Self::new(id, RuleKind::Cooperative, conditions, action, weight)
    }

    #[inline]
    pub fn has_do_nothing_action(&self) -> bool {
        self.action.is_do_nothing()
    }

    #[inline]
    pub fn is_cooperative(&self) -> bool {
        self.kind == RuleKind::Cooperative
    }
}

// ── RuleRef ───────────────────────────────────────────────────────────────────

/// Handle to a rule inside an individual's catalogs: `kind` selects RS or
/// RSint, `index` the position in that catalog.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RuleRef {
    pub kind:  RuleKind,
    pub index: usize,
}

impl RuleRef {
    #[inline]
    pub fn individual(index: usize) -> Self {
        Self { kind: RuleKind::Individual, index }
    }

    #[inline]
    pub fn cooperative(index: usize) -> Self {
        Self { kind: RuleKind::Cooperative, index }
    }
}
