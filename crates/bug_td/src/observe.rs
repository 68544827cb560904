//! Serializable snapshot of a running game for drivers and tooling.

use crate::game::TdGame;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct PositionInfo {
    pub x: i32,
    pub y: i32,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct BugInfo {
    pub id: String,
    pub spawn_frame: i64,
    pub position: Option<PositionInfo>,
    pub channels: BTreeMap<String, i64>,
    pub finished: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct TowerInfo {
    pub id: String,
    pub position: PositionInfo,
    pub channels: BTreeMap<String, i64>,
}

/// Full per-frame observation.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct TdObservation {
    pub frame: i64,
    pub life: i64,
    pub money: u32,
    pub status: String,
    pub bugs: Vec<BugInfo>,
    pub towers: Vec<TowerInfo>,
}

pub fn build_observation(game: &TdGame) -> TdObservation {
    TdObservation {
        frame: game.frame(),
        life: game.life(),
        money: game.money(),
        status: game.status().to_string(),
        bugs: game
            .bugs()
            .values()
            .map(|b| BugInfo {
                id: b.id.clone(),
                spawn_frame: b.spawn_frame,
                position: b.position.map(|p| PositionInfo { x: p.x, y: p.y }),
                channels: b.channels.clone(),
                finished: b.finished,
            })
            .collect(),
        towers: game
            .towers()
            .values()
            .map(|t| TowerInfo {
                id: t.id.clone(),
                position: PositionInfo {
                    x: t.position.x,
                    y: t.position.y,
                },
                channels: t.channels.clone(),
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::map::{BugMap, Cell};
    use crate::world::Bug;

    #[test]
    fn observation_serializes_to_json() {
        let map = BugMap::new(vec![vec![Cell::Entry, Cell::Road, Cell::Exit]]).unwrap();
        let mut bug = Bug::new("B1", 0);
        bug.set_channel("red", 5);
        let mut game = TdGame::new(Settings::default(), map, vec![bug]);
        game.start_simulation();
        let mut events = Vec::new();
        game.next_step(&mut events);

        let json = serde_json::to_value(build_observation(&game)).unwrap();
        assert_eq!(json["frame"], 0);
        assert_eq!(json["life"], 10);
        assert_eq!(json["status"], "running");
        assert_eq!(json["bugs"][0]["id"], "B1");
        assert_eq!(json["bugs"][0]["position"]["x"], 0);
        assert_eq!(json["bugs"][0]["channels"]["red"], 5);
        assert_eq!(json["towers"], serde_json::json!([]));
    }
}
