use crate::map::Position;
use std::collections::BTreeMap;

/// A scheduled player action. `frame` is the frame the action executes on;
/// actions sharing a frame resolve in the order they were appended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Action {
    pub frame: i64,
    pub kind: ActionKind,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ActionKind {
    NewTower {
        name: String,
        position: Position,
        channels: BTreeMap<String, i64>,
    },
    Shoot {
        tower: String,
        bug: String,
    },
}

/// Group actions by frame, preserving insertion order within each frame.
pub fn group_by_frame(actions: &[Action]) -> BTreeMap<i64, Vec<Action>> {
    let mut frames: BTreeMap<i64, Vec<Action>> = BTreeMap::new();
    for action in actions {
        frames.entry(action.frame).or_default().push(action.clone());
    }
    frames
}
