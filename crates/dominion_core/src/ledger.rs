//! Append-only transaction history.

use serde::{Deserialize, Serialize};

use crate::players::PlayerId;
use crate::resources::Resources;

/// Kind of pool change recorded in the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LedgerAction {
    /// Resources paid out.
    Spend,
    /// Production collected.
    Collect,
    /// Resources granted by an event.
    Grant,
}

/// One immutable ledger record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Turn number when recorded.
    pub turn: u32,
    /// Logical tick when recorded.
    pub tick: u64,
    /// Pool owner.
    pub player: PlayerId,
    /// What happened.
    pub action: LedgerAction,
    /// Amounts moved (costs for spends, full production for collects).
    pub amounts: Resources,
    /// Pool before.
    pub before: Resources,
    /// Pool after.
    pub after: Resources,
}

/// Ledger of every transaction in recording order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ledger {
    entries: Vec<LedgerEntry>,
}

impl Ledger {
    /// Empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record(&mut self, entry: LedgerEntry) {
        debug_assert!(
            self.entries.last().map_or(true, |last| last.tick <= entry.tick),
            "ledger entries must be recorded in tick order"
        );
        self.entries.push(entry);
    }

    pub(crate) fn pop(&mut self) -> Option<LedgerEntry> {
        self.entries.pop()
    }

    /// Every entry, oldest first.
    #[must_use]
    pub fn entries(&self) -> &[LedgerEntry] {
        &self.entries
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries of `player` from the last `turns` turns up to `current_turn`, oldest first.
    #[must_use]
    pub fn history(&self, player: PlayerId, current_turn: u32, turns: u32) -> Vec<&LedgerEntry> {
        if turns == 0 {
            return Vec::new();
        }
        let first_turn = current_turn.saturating_sub(turns - 1);
        self.entries
            .iter()
            .filter(|e| e.player == player && e.turn >= first_turn && e.turn <= current_turn)
            .collect()
    }

    /// Sum of the amounts of every `action` entry in `entries`.
    #[must_use]
    pub fn totals<'a>(
        entries: impl IntoIterator<Item = &'a LedgerEntry>,
        action: LedgerAction,
    ) -> Resources {
        let mut total = Resources::new();
        for entry in entries.into_iter().filter(|e| e.action == action) {
            total.add_all(&entry.amounts);
        }
        total
    }
}
