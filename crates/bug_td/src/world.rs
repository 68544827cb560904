use crate::config::Settings;
use crate::map::{BugMap, Position};
use std::collections::BTreeMap;

/// A bug walking the road. Channel values are remaining health per damage
/// channel and may go transiently negative when a shot overshoots; the
/// damage phase records the overshoot against the player's life and clamps
/// the channel back to zero.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Bug {
    pub id: String,
    pub channels: BTreeMap<String, i64>,
    pub spawn_frame: i64,
    /// None until the bug spawns at the map entry.
    pub position: Option<Position>,
    pub dead: bool,
    /// Reached the exit while still alive.
    pub finished: bool,
}

impl Bug {
    pub fn new(id: impl Into<String>, spawn_frame: i64) -> Self {
        Self {
            id: id.into(),
            channels: BTreeMap::new(),
            spawn_frame,
            position: None,
            dead: false,
            finished: false,
        }
    }

    pub fn set_channel(&mut self, name: impl Into<String>, value: i64) {
        self.channels.insert(name.into(), value);
    }

    /// A bug is dead iff every one of its channels is exhausted.
    pub fn recompute_dead(&mut self) {
        self.dead = self.channels.values().all(|&v| v <= 0);
    }
}

/// A placed tower. Towers are never removed once built.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tower {
    pub id: String,
    /// Damage dealt per channel on each shot.
    pub channels: BTreeMap<String, i64>,
    pub position: Position,
}

pub type BugTable = BTreeMap<String, Bug>;
pub type TowerTable = BTreeMap<String, Tower>;

/// Mutable simulation state owned by the game wrapper.
#[derive(Clone, Debug)]
pub struct TdState {
    pub settings: Settings,
    pub map: BugMap,
    pub frame: i64,
    pub life: i64,
    pub money: u32,
    pub bugs: BugTable,
    pub towers: TowerTable,
}

impl TdState {
    pub fn new(settings: Settings, map: BugMap, roster: Vec<Bug>) -> Self {
        let mut bugs = BugTable::new();
        for bug in roster {
            bugs.insert(bug.id.clone(), bug);
        }
        Self {
            frame: -1,
            life: settings.starting_life as i64,
            money: settings.starting_money,
            bugs,
            towers: TowerTable::new(),
            settings,
            map,
        }
    }

    pub fn tower_at(&self, pos: Position) -> Option<&Tower> {
        self.towers.values().find(|t| t.position == pos)
    }
}
