use crate::actions::{Action, ActionKind};
use crate::events::TdEvent;
use crate::world::{TdState, Tower};
use std::collections::HashSet;

/// Build phase. Rejections skip only the offending action; the rest of
/// the frame's builds still execute. An occupied position is reported but
/// does not block the build.
pub fn build_towers(state: &mut TdState, actions: &[Action], events: &mut Vec<TdEvent>) {
    for action in actions {
        let (name, position, channels) = match &action.kind {
            ActionKind::NewTower {
                name,
                position,
                channels,
            } => (name, *position, channels),
            _ => continue,
        };

        if state.towers.contains_key(name) {
            tracing::warn!(tower = %name, "build rejected: tower id already in use");
            events.push(TdEvent::DuplicateTowerId { id: name.clone() });
            continue;
        }
        if !state.map.can_build(position) {
            tracing::warn!(tower = %name, %position, "build rejected: position out of bounds");
            events.push(TdEvent::TowerOutOfBounds {
                id: name.clone(),
                position,
            });
            continue;
        }
        if state.tower_at(position).is_some() {
            tracing::warn!(tower = %name, %position, "another tower already stands here");
            events.push(TdEvent::TowerPositionOccupied {
                id: name.clone(),
                position,
            });
        }
        let cost = state.settings.tower_cost;
        if state.money < cost {
            tracing::warn!(tower = %name, cost, have = state.money, "build rejected: insufficient funds");
            events.push(TdEvent::InsufficientFunds {
                id: name.clone(),
                cost,
                have: state.money,
            });
            continue;
        }

        state.money -= cost;
        state.towers.insert(
            name.clone(),
            Tower {
                id: name.clone(),
                channels: channels.clone(),
                position,
            },
        );
        events.push(TdEvent::TowerBuilt {
            id: name.clone(),
            position,
        });
    }
}

/// Move phase. Every spawned bug advances one step along the road; a bug
/// already on the final road position stays put. A bug standing on the
/// exit is marked finished.
pub fn move_bugs(state: &mut TdState, events: &mut Vec<TdEvent>) {
    let map = &state.map;
    let road = map.road();
    for bug in state.bugs.values_mut() {
        let pos = match bug.position {
            Some(pos) => pos,
            None => continue,
        };
        if let Some(i) = road.iter().position(|&p| p == pos) {
            if i + 1 < road.len() {
                bug.position = Some(road[i + 1]);
            }
        }
        if bug.position == Some(map.exit()) && !bug.finished {
            bug.finished = true;
            events.push(TdEvent::BugFinished { id: bug.id.clone() });
        }
    }
}

/// Spawn phase. Bugs whose spawn frame is the current frame enter at the
/// map entry.
pub fn spawn_bugs(state: &mut TdState, events: &mut Vec<TdEvent>) {
    let frame = state.frame;
    let entry = state.map.entry();
    for bug in state.bugs.values_mut() {
        if bug.spawn_frame == frame && bug.position.is_none() {
            bug.position = Some(entry);
            events.push(TdEvent::BugSpawned {
                id: bug.id.clone(),
                position: entry,
            });
        }
    }
}

/// Shoot phase. Out-of-range targets and repeat fire are reported but do
/// not block the shot; only an unresolved tower or bug id drops it. Every
/// tower channel is subtracted from the bug's matching channel, creating
/// the channel at zero when absent, and the result may go negative.
pub fn resolve_shots(state: &mut TdState, actions: &[Action], events: &mut Vec<TdEvent>) {
    let TdState {
        settings,
        towers,
        bugs,
        ..
    } = state;
    let range = settings.tower_range as i64;
    let mut already_fired: HashSet<String> = HashSet::new();

    for action in actions {
        let (tower_id, bug_id) = match &action.kind {
            ActionKind::Shoot { tower, bug } => (tower, bug),
            _ => continue,
        };

        if already_fired.contains(tower_id) {
            tracing::warn!(tower = %tower_id, "tower already fired this frame");
            events.push(TdEvent::TowerAlreadyFired {
                tower: tower_id.clone(),
            });
        }

        let tower = match towers.get(tower_id) {
            Some(tower) => tower,
            None => {
                tracing::warn!(tower = %tower_id, "shot dropped: no such tower");
                events.push(TdEvent::UnknownTower {
                    tower: tower_id.clone(),
                });
                continue;
            }
        };
        let bug = match bugs.get_mut(bug_id) {
            Some(bug) => bug,
            None => {
                tracing::warn!(bug = %bug_id, "shot dropped: no such bug");
                events.push(TdEvent::UnknownBug { bug: bug_id.clone() });
                continue;
            }
        };

        let in_range = match bug.position {
            Some(pos) => tower.position.chebyshev(pos) <= range,
            None => false,
        };
        if !in_range {
            tracing::warn!(tower = %tower_id, bug = %bug_id, "target out of range");
            events.push(TdEvent::ShotOutOfRange {
                tower: tower_id.clone(),
                bug: bug_id.clone(),
            });
        }

        for (channel, damage) in &tower.channels {
            *bug.channels.entry(channel.clone()).or_insert(0) -= damage;
        }
        already_fired.insert(tower_id.clone());
    }
}

/// Death recompute. Flags every bug whose channels are all exhausted.
pub fn mark_dead(state: &mut TdState, events: &mut Vec<TdEvent>) {
    for bug in state.bugs.values_mut() {
        let was_dead = bug.dead;
        bug.recompute_dead();
        if bug.dead && !was_dead {
            events.push(TdEvent::BugKilled { id: bug.id.clone() });
        }
    }
}

/// Damage resolution. Breakthrough damage is every positive channel of a
/// finished bug; collateral damage is the overshoot below zero, clamped
/// back to zero once recorded. The total comes off the player's life.
pub fn apply_damage(state: &mut TdState, events: &mut Vec<TdEvent>) {
    let mut total: i64 = 0;
    for bug in state.bugs.values_mut() {
        if bug.finished {
            total += bug.channels.values().filter(|&&v| v > 0).sum::<i64>();
        }
        for value in bug.channels.values_mut() {
            if *value < 0 {
                total += -*value;
                *value = 0;
            }
        }
    }
    state.life -= total;
    if total > 0 {
        events.push(TdEvent::LifeLost {
            amount: total,
            remaining: state.life,
        });
    }
}

/// Reward phase. Every dead bug pays out once; dead bugs are removed the
/// same frame by `clear_dead`.
pub fn pay_rewards(state: &mut TdState) {
    let reward = state.settings.reward_per_bug;
    for bug in state.bugs.values() {
        if bug.dead {
            state.money += reward;
        }
    }
}

/// Completion check across every tracked bug, spawned or not.
pub fn all_bugs_dead(state: &TdState) -> bool {
    state.bugs.values().all(|bug| bug.dead)
}

/// Cleanup. Dead bugs leave the table and no longer participate in
/// future frames.
pub fn clear_dead(state: &mut TdState) {
    state.bugs.retain(|_, bug| !bug.dead);
}
