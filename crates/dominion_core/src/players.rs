//! Party identifiers and turn order.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Minimum number of parties in a game.
pub const MIN_PLAYERS: u8 = 2;

/// Maximum number of parties in a game.
pub const MAX_PLAYERS: u8 = 4;

/// Unique identifier for a party, or the absence of one.
///
/// Ordering is `Neutral < Human < Opponent(1) < Opponent(2) < ...`, which is
/// also the turn order for the active parties.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub enum PlayerId {
    /// Unowned land. Never takes a turn and never transacts.
    #[default]
    Neutral,
    /// The human player. Always moves first.
    Human,
    /// A computer-controlled opponent, numbered from 1.
    Opponent(u8),
}

impl PlayerId {
    /// Whether this is a real party (not [`PlayerId::Neutral`]).
    #[must_use]
    pub const fn is_party(self) -> bool {
        !matches!(self, Self::Neutral)
    }

    /// Whether this party is driven by player input rather than an opponent strategy.
    #[must_use]
    pub const fn is_human(self) -> bool {
        matches!(self, Self::Human)
    }

    /// Get the display name for this party.
    #[must_use]
    pub fn display_name(self) -> String {
        match self {
            Self::Neutral => "Neutral".to_string(),
            Self::Human => "Player".to_string(),
            Self::Opponent(n) => format!("Opponent {n}"),
        }
    }

    /// The parties of a game with `count` players, in turn order.
    ///
    /// `count` is clamped to [`MIN_PLAYERS`]..=[`MAX_PLAYERS`].
    #[must_use]
    pub fn turn_order(count: u8) -> Vec<Self> {
        let count = count.clamp(MIN_PLAYERS, MAX_PLAYERS);
        std::iter::once(Self::Human)
            .chain((1..count).map(Self::Opponent))
            .collect()
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_turn_order() {
        assert_eq!(
            PlayerId::turn_order(3),
            vec![PlayerId::Human, PlayerId::Opponent(1), PlayerId::Opponent(2)]
        );
        assert_eq!(PlayerId::turn_order(0).len(), 2);
        assert_eq!(PlayerId::turn_order(9).len(), 4);
    }

    #[test]
    fn test_party_flags() {
        assert!(!PlayerId::Neutral.is_party());
        assert!(PlayerId::Human.is_party());
        assert!(PlayerId::Human.is_human());
        assert!(!PlayerId::Opponent(1).is_human());
    }

    #[test]
    fn test_ordering() {
        assert!(PlayerId::Neutral < PlayerId::Human);
        assert!(PlayerId::Human < PlayerId::Opponent(1));
        assert!(PlayerId::Opponent(1) < PlayerId::Opponent(2));
    }
}
