use crate::map::Position;

/// Per-frame diagnostics and progress events.
///
/// Phase-local validation failures surface here instead of aborting the
/// frame, so a caller can tell a skipped action from an aborted phase.
/// The only fatal condition (life exhausted) is `Defeat`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TdEvent {
    // Build phase.
    TowerBuilt {
        id: String,
        position: Position,
    },
    /// Build rejected: the tower id is already in use.
    DuplicateTowerId {
        id: String,
    },
    /// Build rejected: position outside the map.
    TowerOutOfBounds {
        id: String,
        position: Position,
    },
    /// Another tower already stands here. Diagnostic only; the build
    /// still goes through.
    TowerPositionOccupied {
        id: String,
        position: Position,
    },
    /// Build rejected: not enough money.
    InsufficientFunds {
        id: String,
        cost: u32,
        have: u32,
    },

    // Shoot phase.
    /// The tower already fired this frame. Diagnostic only; the shot
    /// still lands.
    TowerAlreadyFired {
        tower: String,
    },
    /// Target outside the tower's range (or not yet spawned). Diagnostic
    /// only; the shot still lands.
    ShotOutOfRange {
        tower: String,
        bug: String,
    },
    /// Shot dropped: no such tower.
    UnknownTower {
        tower: String,
    },
    /// Shot dropped: no such bug.
    UnknownBug {
        bug: String,
    },

    // Movement and lifecycle.
    BugSpawned {
        id: String,
        position: Position,
    },
    /// The bug reached the exit while still alive.
    BugFinished {
        id: String,
    },
    BugKilled {
        id: String,
    },
    /// Breakthrough plus collateral damage charged this frame.
    LifeLost {
        amount: i64,
        remaining: i64,
    },
    /// Every tracked bug is dead.
    Victory,
    /// Life exhausted; the run stops here.
    Defeat {
        frame: i64,
    },
}
