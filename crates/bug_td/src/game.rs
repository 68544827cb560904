use crate::actions::{self, Action, ActionKind};
use crate::config::Settings;
use crate::events::TdEvent;
use crate::map::{BugMap, Position};
use crate::parse;
use crate::systems;
use crate::world::{Bug, BugTable, TdState, TowerTable};
use std::collections::BTreeMap;
use std::fmt;

/// Lifecycle of a run. Construction requires settings, bugs and map, so
/// there is no representable uninitialized state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameStatus {
    /// Initialized, simulation not yet started.
    Ready,
    Running,
    /// Every tracked bug was killed.
    Won,
    /// Life ran out. Unrecoverable.
    Lost,
}

impl GameStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, GameStatus::Won | GameStatus::Lost)
    }
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            GameStatus::Ready => "ready",
            GameStatus::Running => "running",
            GameStatus::Won => "won",
            GameStatus::Lost => "lost",
        };
        f.write_str(s)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GameError {
    /// Action injection is only legal while the simulation is running.
    NotRunning,
    /// Replacing the action log is only legal before the simulation starts.
    AlreadyStarted,
}

impl fmt::Display for GameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameError::NotRunning => write!(f, "simulation is not running"),
            GameError::AlreadyStarted => write!(f, "simulation has already started"),
        }
    }
}

impl std::error::Error for GameError {}

/// The turn-based tower-defense game: settings, map, live entity tables,
/// the economy, and the scheduled action log.
#[derive(Clone, Debug)]
pub struct TdGame {
    state: TdState,
    actions: Vec<Action>,
    frames: BTreeMap<i64, Vec<Action>>,
    status: GameStatus,
}

impl TdGame {
    pub fn new(settings: Settings, map: BugMap, roster: Vec<Bug>) -> Self {
        Self {
            state: TdState::new(settings, map, roster),
            actions: Vec::new(),
            frames: BTreeMap::new(),
            status: GameStatus::Ready,
        }
    }

    /// Replace the scheduled action log, e.g. with a parsed replay.
    pub fn load_actions(&mut self, actions: Vec<Action>) -> Result<(), GameError> {
        if self.status != GameStatus::Ready {
            return Err(GameError::AlreadyStarted);
        }
        self.actions = actions;
        Ok(())
    }

    /// Start the run: clear towers, rewind the frame counter to -1 and
    /// group the scheduled actions by frame. A second call is a no-op.
    pub fn start_simulation(&mut self) {
        if self.status != GameStatus::Ready {
            return;
        }
        self.state.towers.clear();
        self.state.frame = -1;
        self.frames = actions::group_by_frame(&self.actions);
        self.status = GameStatus::Running;
        tracing::info!(
            bugs = self.state.bugs.len(),
            scheduled_actions = self.actions.len(),
            "simulation started"
        );
    }

    /// Advance exactly one frame through the fixed phase order. After a
    /// terminal status this is a no-op returning that status.
    pub fn next_step(&mut self, events: &mut Vec<TdEvent>) -> GameStatus {
        if self.status != GameStatus::Running {
            return self.status;
        }
        self.state.frame += 1;
        let frame_actions = self
            .frames
            .get(&self.state.frame)
            .cloned()
            .unwrap_or_default();

        // 1. Build towers scheduled for this frame.
        systems::build_towers(&mut self.state, &frame_actions, events);
        // 2. Move spawned bugs one road step.
        systems::move_bugs(&mut self.state, events);
        // 3. Place bugs whose spawn frame has come.
        systems::spawn_bugs(&mut self.state, events);
        // 4. Resolve this frame's shots.
        systems::resolve_shots(&mut self.state, &frame_actions, events);
        // 5. Recompute dead flags.
        systems::mark_dead(&mut self.state, events);
        // 6. Charge breakthrough and collateral damage to life.
        systems::apply_damage(&mut self.state, events);
        // 7. Life check: the single fatal condition. Later phases do not
        //    run for this frame.
        if self.state.life <= 0 {
            self.status = GameStatus::Lost;
            events.push(TdEvent::Defeat {
                frame: self.state.frame,
            });
            tracing::info!(frame = self.state.frame, "life exhausted, run failed");
            return self.status;
        }
        // 8. Pay rewards for this frame's kills.
        systems::pay_rewards(&mut self.state);
        // 9. Completion check across all tracked bugs.
        if systems::all_bugs_dead(&self.state) {
            self.status = GameStatus::Won;
            events.push(TdEvent::Victory);
            tracing::info!(frame = self.state.frame, "all bugs dead, run complete");
        }
        // 10. Drop dead bugs from the table.
        systems::clear_dead(&mut self.state);

        self.status
    }

    /// Schedule a tower build for the next frame.
    pub fn action_new_tower(
        &mut self,
        name: impl Into<String>,
        position: Position,
        channels: BTreeMap<String, i64>,
    ) -> Result<(), GameError> {
        self.inject(ActionKind::NewTower {
            name: name.into(),
            position,
            channels,
        })
    }

    /// Schedule a shot for the next frame.
    pub fn action_shoot(
        &mut self,
        tower: impl Into<String>,
        bug: impl Into<String>,
    ) -> Result<(), GameError> {
        self.inject(ActionKind::Shoot {
            tower: tower.into(),
            bug: bug.into(),
        })
    }

    fn inject(&mut self, kind: ActionKind) -> Result<(), GameError> {
        if self.status != GameStatus::Running {
            return Err(GameError::NotRunning);
        }
        let action = Action {
            frame: self.state.frame + 1,
            kind,
        };
        self.frames
            .entry(action.frame)
            .or_default()
            .push(action.clone());
        self.actions.push(action);
        Ok(())
    }

    /// Serialize the full action log to the line-oriented replay format.
    pub fn dump_actions(&self) -> String {
        parse::dump_actions(&self.actions)
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn frame(&self) -> i64 {
        self.state.frame
    }

    pub fn life(&self) -> i64 {
        self.state.life
    }

    pub fn money(&self) -> u32 {
        self.state.money
    }

    pub fn settings(&self) -> &Settings {
        &self.state.settings
    }

    pub fn map(&self) -> &BugMap {
        &self.state.map
    }

    pub fn bugs(&self) -> &BugTable {
        &self.state.bugs
    }

    pub fn towers(&self) -> &TowerTable {
        &self.state.towers
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::Cell;

    fn tiny_map() -> BugMap {
        let rows = vec![vec![Cell::Entry, Cell::Road, Cell::Exit]];
        BugMap::new(rows).unwrap()
    }

    fn one_bug() -> Vec<Bug> {
        let mut bug = Bug::new("B1", 0);
        bug.set_channel("red", 5);
        vec![bug]
    }

    #[test]
    fn injection_requires_running() {
        let mut game = TdGame::new(Settings::default(), tiny_map(), one_bug());
        let err = game.action_shoot("T1", "B1").unwrap_err();
        assert_eq!(err, GameError::NotRunning);

        game.start_simulation();
        assert!(game.action_shoot("T1", "B1").is_ok());
    }

    #[test]
    fn injected_actions_land_on_the_next_frame() {
        let mut game = TdGame::new(Settings::default(), tiny_map(), one_bug());
        game.start_simulation();
        assert_eq!(game.frame(), -1);
        game.action_new_tower("T1", Position::new(1, 0), BTreeMap::new())
            .unwrap();
        assert_eq!(game.actions()[0].frame, 0);

        let mut events = Vec::new();
        game.next_step(&mut events);
        assert!(game.towers().contains_key("T1"));
    }

    #[test]
    fn load_actions_rejected_after_start() {
        let mut game = TdGame::new(Settings::default(), tiny_map(), one_bug());
        game.start_simulation();
        assert_eq!(game.load_actions(Vec::new()), Err(GameError::AlreadyStarted));
    }

    #[test]
    fn start_twice_is_a_noop() {
        let mut game = TdGame::new(Settings::default(), tiny_map(), one_bug());
        game.start_simulation();
        game.action_shoot("T9", "B1").unwrap();
        game.start_simulation();
        assert_eq!(game.actions().len(), 1);
        assert_eq!(game.status(), GameStatus::Running);
    }

    #[test]
    fn terminal_step_is_a_noop() {
        let mut game = TdGame::new(Settings::default(), tiny_map(), Vec::new());
        game.start_simulation();
        let mut events = Vec::new();
        // Empty roster: completion holds on the first step.
        assert_eq!(game.next_step(&mut events), GameStatus::Won);
        let frame = game.frame();
        assert_eq!(game.next_step(&mut events), GameStatus::Won);
        assert_eq!(game.frame(), frame);
    }
}
