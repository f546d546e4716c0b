//! Received intentions, keyed by turn.

use std::collections::{BTreeMap, VecDeque};

use sa_core::{AgentId, IntentionRetention, Turn};
use sa_rules::Intention;

/// Inbound intention table: turn → intentions in arrival order.
///
/// Under [`IntentionRetention::Unbounded`] lists only grow within a run and
/// there is no de-duplication: the same intention delivered twice is stored
/// twice.  `Latest` keeps one entry per sending partner and `Capped(n)` keeps
/// the `n` newest entries, so both stay bounded however many turns pass.
#[derive(Clone, Debug, Default)]
pub struct IntentionInbox {
    retention: IntentionRetention,
    by_turn:   BTreeMap<Turn, VecDeque<Intention>>,
    total:     usize,
}

impl IntentionInbox {
    pub fn new(retention: IntentionRetention) -> Self {
        Self { retention, by_turn: BTreeMap::new(), total: 0 }
    }

    pub fn retention(&self) -> IntentionRetention {
        self.retention
    }

    pub fn set_retention(&mut self, retention: IntentionRetention) {
        self.retention = retention;
    }

    /// Append `intention` under its turn key, then apply the retention
    /// policy.
    pub fn push(&mut self, intention: Intention) {
        if self.retention == IntentionRetention::Latest {
            self.forget_sender(intention.agent());
        }
        self.by_turn.entry(intention.turn()).or_default().push_back(intention);
        self.total += 1;
        if let Some(cap) = self.retention.cap() {
            while self.total > cap && self.pop_oldest() {}
        }
    }

    fn forget_sender(&mut self, agent: AgentId) {
        for list in self.by_turn.values_mut() {
            let before = list.len();
            list.retain(|i| i.agent() != agent);
            self.total -= before - list.len();
        }
        self.by_turn.retain(|_, list| !list.is_empty());
    }

    /// Drop the earliest arrival of the oldest turn.  `false` when empty.
    fn pop_oldest(&mut self) -> bool {
        let Some(mut oldest) = self.by_turn.first_entry() else {
            return false;
        };
        oldest.get_mut().pop_front();
        if oldest.get().is_empty() {
            oldest.remove();
        }
        self.total -= 1;
        true
    }

    /// Every stored intention, in ascending turn order and arrival order
    /// within a turn.
    pub fn iter(&self) -> impl Iterator<Item = &Intention> + '_ {
        self.by_turn.values().flat_map(|list| list.iter())
    }

    /// Intentions received for one turn.
    pub fn turn(&self, turn: Turn) -> impl Iterator<Item = &Intention> + '_ {
        self.by_turn.get(&turn).into_iter().flat_map(|list| list.iter())
    }

    /// Turn keys with at least one intention.
    pub fn turns(&self) -> impl Iterator<Item = Turn> + '_ {
        self.by_turn.keys().copied()
    }

    /// Total stored intentions across all turns.
    pub fn len(&self) -> usize {
        self.total
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    pub fn clear(&mut self) {
        self.by_turn.clear();
        self.total = 0;
    }
}
