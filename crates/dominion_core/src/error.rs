//! Error types for the game core.
//!
//! Business-rule failures are ordinary values: callers branch on them to
//! update their presentation. Every variant a caller is expected to branch on
//! carries a machine-readable [`code`](TransactionError::code).

use thiserror::Error;

use crate::hex::HexCoord;
use crate::players::PlayerId;
use crate::resources::Resources;
use crate::territory::TerritoryId;

/// Result type alias using [`GameError`].
pub type Result<T> = std::result::Result<T, GameError>;

/// Failures of [`TerritoryStore`](crate::store::TerritoryStore) operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// No territory with this id.
    #[error("Territory not found: {0}")]
    NotFound(TerritoryId),

    /// Coordinate lies outside the grid.
    #[error("Coordinate {0} is outside the grid")]
    InvalidCoordinate(HexCoord),

    /// Claim target already belongs to the new owner.
    #[error("Territory {id} is already owned by {owner}")]
    SameOwner {
        /// Territory.
        id: TerritoryId,
        /// Current and requested owner.
        owner: PlayerId,
    },

    /// A patch tried to change ownership after setup.
    #[error("Ownership of {0} can only change through a claim")]
    OwnershipRequiresClaim(TerritoryId),

    /// A production value outside `1..=MAX_RESOURCE_VALUE`.
    #[error("Territory {0} must have a resource value between 1 and {max}", max = crate::territory::MAX_RESOURCE_VALUE)]
    InvalidValue(TerritoryId),
}

impl StoreError {
    /// Machine-readable reason code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not_found",
            Self::InvalidCoordinate(_) => "invalid_coordinate",
            Self::SameOwner { .. } => "same_owner",
            Self::OwnershipRequiresClaim(_) => "ownership_requires_claim",
            Self::InvalidValue(_) => "invalid_value",
        }
    }
}

/// Failures of a resource spend. Nothing is mutated when one is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransactionError {
    /// The neutral party cannot transact.
    #[error("Invalid player: {0}")]
    InvalidPlayer(PlayerId),

    /// The cost bundle is malformed.
    #[error("Invalid cost: {0}")]
    InvalidCost(String),

    /// The player has no resource pool.
    #[error("Player not found: {0}")]
    PlayerNotFound(PlayerId),

    /// The pool does not cover the cost.
    #[error("Insufficient resources for {player}: need {cost}, have {available}")]
    InsufficientResources {
        /// Spending player.
        player: PlayerId,
        /// Requested cost.
        cost: Resources,
        /// Pool at the time of the request.
        available: Resources,
    },
}

impl TransactionError {
    /// Machine-readable reason code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidPlayer(_) => "invalid_player",
            Self::InvalidCost(_) => "invalid_cost",
            Self::PlayerNotFound(_) => "player_not_found",
            Self::InsufficientResources { .. } => "insufficient_resources",
        }
    }
}

/// Failures of the claim transaction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClaimError {
    /// No territory with this id.
    #[error("Territory not found: {0}")]
    NotFound(TerritoryId),

    /// The territory already belongs to a party.
    #[error("Territory {id} is already owned by {owner}")]
    AlreadyOwned {
        /// Territory.
        id: TerritoryId,
        /// Current owner.
        owner: PlayerId,
    },

    /// Paying the claim cost failed.
    #[error(transparent)]
    Transaction(#[from] TransactionError),

    /// The ownership change was rejected after payment.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ClaimError {
    /// Machine-readable reason code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not_found",
            Self::AlreadyOwned { .. } => "already_owned",
            Self::Transaction(e) => e.code(),
            Self::Store(e) => e.code(),
        }
    }
}

/// Failures of turn-phase transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TurnError {
    /// Auto-advancing was stopped (game over).
    #[error("Turn engine is halted")]
    Halted,

    /// `start` has not been called.
    #[error("Turn engine has not been started")]
    NotStarted,
}

impl TurnError {
    /// Machine-readable reason code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Halted => "halted",
            Self::NotStarted => "not_started",
        }
    }
}

/// Configuration loading and validation failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// RON text could not be parsed.
    #[error("Failed to parse config: {0}")]
    Parse(String),

    /// A value is out of range.
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Top-level error type for all game core errors.
#[derive(Debug, Error)]
pub enum GameError {
    /// Territory store failure.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Resource transaction failure.
    #[error(transparent)]
    Transaction(#[from] TransactionError),

    /// Claim failure.
    #[error(transparent)]
    Claim(#[from] ClaimError),

    /// Turn transition failure.
    #[error(transparent)]
    Turn(#[from] TurnError),

    /// Configuration failure.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Save data could not be encoded or decoded.
    #[error("Serialization failed: {0}")]
    Serialization(String),

    /// Save data was written by an incompatible version.
    #[error("Save version mismatch: expected {expected}, got {found}")]
    VersionMismatch {
        /// Version this build reads.
        expected: u32,
        /// Version found in the data.
        found: u32,
    },

    /// Invalid game state.
    #[error("Invalid game state: {0}")]
    InvalidState(String),
}

impl GameError {
    /// Machine-readable reason code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Store(e) => e.code(),
            Self::Transaction(e) => e.code(),
            Self::Claim(e) => e.code(),
            Self::Turn(e) => e.code(),
            Self::Config(_) => "invalid_config",
            Self::Serialization(_) => "serialization",
            Self::VersionMismatch { .. } => "version_mismatch",
            Self::InvalidState(_) => "invalid_state",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes() {
        let err = ClaimError::from(TransactionError::InvalidPlayer(PlayerId::Neutral));
        assert_eq!(err.code(), "invalid_player");
        assert_eq!(
            ClaimError::AlreadyOwned {
                id: TerritoryId::at(0, 0),
                owner: PlayerId::Human
            }
            .code(),
            "already_owned"
        );
        assert_eq!(StoreError::NotFound(TerritoryId::at(1, 2)).code(), "not_found");
        assert_eq!(GameError::from(TurnError::Halted).code(), "halted");
    }

    #[test]
    fn test_messages_carry_context() {
        let err = TransactionError::InsufficientResources {
            player: PlayerId::Human,
            cost: Resources::from([(crate::resources::ResourceType::Gold, 4)]),
            available: Resources::from([(crate::resources::ResourceType::Gold, 1)]),
        };
        let msg = err.to_string();
        assert!(msg.contains("gold: 4"));
        assert!(msg.contains("gold: 1"));
    }
}
