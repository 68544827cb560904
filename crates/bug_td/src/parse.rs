//! Line-oriented input parsing: settings, bug roster, map, and the
//! action replay format, plus the inverse `dump_actions`.

use crate::actions::{Action, ActionKind};
use crate::config::Settings;
use crate::map::{BugMap, Cell, MapError, Position};
use crate::world::Bug;
use std::collections::BTreeMap;
use std::fmt;

const SETTING_NAMES: [&str; 5] = [
    "starting_life",
    "starting_money",
    "tower_range",
    "tower_cost",
    "reward_per_bug",
];

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ParseError {
    MissingSetting { name: &'static str },
    BadNumber { value: String },
    BugMissingFrame { id: String },
    BadBugAttribute { token: String },
    BadCellCode { token: String },
    ExpectedKey { expected: &'static str, line: String },
    UnknownActionKind { value: String },
    MissingActionAttribute { kind: &'static str, name: &'static str },
    BadPosition { value: String },
    BadChannels { value: String },
    Map(MapError),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::MissingSetting { name } => write!(f, "missing setting '{}'", name),
            ParseError::BadNumber { value } => write!(f, "'{}' is not a valid number", value),
            ParseError::BugMissingFrame { id } => {
                write!(f, "bug '{}' has no frame attribute", id)
            }
            ParseError::BadBugAttribute { token } => {
                write!(f, "bug attribute '{}' is not key=value", token)
            }
            ParseError::BadCellCode { token } => {
                write!(f, "map cell '{}' is not a single character", token)
            }
            ParseError::ExpectedKey { expected, line } => {
                write!(f, "expected '{}=...' but found '{}'", expected, line)
            }
            ParseError::UnknownActionKind { value } => {
                write!(f, "unknown action kind '{}'", value)
            }
            ParseError::MissingActionAttribute { kind, name } => {
                write!(f, "{} action is missing attribute '{}'", kind, name)
            }
            ParseError::BadPosition { value } => {
                write!(f, "position '{}' is not 'x,y'", value)
            }
            ParseError::BadChannels { value } => {
                write!(f, "channel list '{}' is not 'name:amount,...'", value)
            }
            ParseError::Map(err) => write!(f, "invalid map: {}", err),
        }
    }
}

impl std::error::Error for ParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ParseError::Map(err) => Some(err),
            _ => None,
        }
    }
}

impl From<MapError> for ParseError {
    fn from(err: MapError) -> Self {
        ParseError::Map(err)
    }
}

/// Parse a full input file: a settings block, a bug roster terminated by a
/// blank line, then the map rows.
pub fn parse_input(text: &str) -> Result<(Settings, Vec<Bug>, BugMap), ParseError> {
    let lines: Vec<&str> = text.lines().collect();
    let mut at = 0;

    let settings = parse_settings(&lines, &mut at)?;
    while at < lines.len() && lines[at].trim().is_empty() {
        at += 1;
    }
    let bugs = parse_bugs(&lines, &mut at)?;
    let map = parse_map(&lines, &mut at)?;
    Ok((settings, bugs, map))
}

/// The settings block: leading `name=value` lines restricted to the known
/// setting names. Ends at the first line that is not one.
fn parse_settings(lines: &[&str], at: &mut usize) -> Result<Settings, ParseError> {
    let mut values: BTreeMap<&str, u32> = BTreeMap::new();
    while *at < lines.len() {
        let line = lines[*at].trim();
        let (name, value) = match line.split_once('=') {
            Some(pair) => pair,
            None => break,
        };
        let name = match SETTING_NAMES.iter().find(|&&n| n == name) {
            Some(&name) => name,
            None => break,
        };
        let value: u32 = value.parse().map_err(|_| ParseError::BadNumber {
            value: value.to_string(),
        })?;
        values.insert(name, value);
        *at += 1;
    }

    let get = |name: &'static str| {
        values
            .get(name)
            .copied()
            .ok_or(ParseError::MissingSetting { name })
    };
    Ok(Settings {
        starting_life: get("starting_life")?,
        starting_money: get("starting_money")?,
        tower_range: get("tower_range")?,
        tower_cost: get("tower_cost")?,
        reward_per_bug: get("reward_per_bug")?,
    })
}

/// The bug roster: `<id> <attr>=<value>...` per line, where `frame` is the
/// spawn frame and every other attribute is a damage channel. Ends at the
/// first blank line.
fn parse_bugs(lines: &[&str], at: &mut usize) -> Result<Vec<Bug>, ParseError> {
    let mut bugs = Vec::new();
    while *at < lines.len() && !lines[*at].trim().is_empty() {
        let mut tokens = lines[*at].split_whitespace();
        let id = match tokens.next() {
            Some(id) => id,
            None => break,
        };
        let mut spawn_frame = None;
        let mut channels = BTreeMap::new();
        for token in tokens {
            let (key, value) = token.split_once('=').ok_or(ParseError::BadBugAttribute {
                token: token.to_string(),
            })?;
            let value: i64 = value.parse().map_err(|_| ParseError::BadNumber {
                value: value.to_string(),
            })?;
            if key == "frame" {
                spawn_frame = Some(value);
            } else {
                channels.insert(key.to_string(), value);
            }
        }
        let mut bug = Bug::new(
            id,
            spawn_frame.ok_or(ParseError::BugMissingFrame { id: id.to_string() })?,
        );
        bug.channels = channels;
        bugs.push(bug);
        *at += 1;
    }
    Ok(bugs)
}

/// The map: remaining non-blank lines of whitespace-separated
/// single-character cell codes.
fn parse_map(lines: &[&str], at: &mut usize) -> Result<BugMap, ParseError> {
    let mut rows = Vec::new();
    while *at < lines.len() {
        let line = lines[*at].trim();
        *at += 1;
        if line.is_empty() {
            continue;
        }
        let mut row = Vec::new();
        for token in line.split_whitespace() {
            let mut chars = token.chars();
            let code = chars.next();
            match (code, chars.next()) {
                (Some(code), None) => row.push(Cell::from_code(code)),
                _ => {
                    return Err(ParseError::BadCellCode {
                        token: token.to_string(),
                    })
                }
            }
        }
        rows.push(row);
    }
    Ok(BugMap::new(rows)?)
}

/// Parse an action log: blank-line-separated blocks of
/// `action=<kind>`, `frame=<int>`, then attribute lines.
pub fn parse_actions(text: &str) -> Result<Vec<Action>, ParseError> {
    let lines: Vec<&str> = text.lines().collect();
    let mut actions = Vec::new();
    let mut at = 0;

    loop {
        while at < lines.len() && lines[at].trim().is_empty() {
            at += 1;
        }
        if at >= lines.len() {
            return Ok(actions);
        }

        let kind = expect_value(lines[at], "action")?;
        at += 1;
        let frame_value = expect_value(lines.get(at).copied().unwrap_or(""), "frame")?;
        let frame: i64 = frame_value.parse().map_err(|_| ParseError::BadNumber {
            value: frame_value.to_string(),
        })?;
        at += 1;

        let mut attrs: BTreeMap<&str, &str> = BTreeMap::new();
        while at < lines.len() && !lines[at].trim().is_empty() {
            if let Some((key, value)) = lines[at].trim().split_once('=') {
                attrs.insert(key, value);
            }
            at += 1;
        }

        let kind = match kind {
            "new_tower" => ActionKind::NewTower {
                name: require_attr(&attrs, "new_tower", "name")?.to_string(),
                position: parse_position(require_attr(&attrs, "new_tower", "position")?)?,
                channels: parse_channels(require_attr(&attrs, "new_tower", "colors")?)?,
            },
            "shoot" => ActionKind::Shoot {
                tower: require_attr(&attrs, "shoot", "tower_name")?.to_string(),
                bug: require_attr(&attrs, "shoot", "bug_name")?.to_string(),
            },
            other => {
                return Err(ParseError::UnknownActionKind {
                    value: other.to_string(),
                })
            }
        };
        actions.push(Action { frame, kind });
    }
}

fn expect_value<'a>(line: &'a str, key: &'static str) -> Result<&'a str, ParseError> {
    match line.trim().split_once('=') {
        Some((k, v)) if k == key => Ok(v),
        _ => Err(ParseError::ExpectedKey {
            expected: key,
            line: line.to_string(),
        }),
    }
}

fn require_attr<'a>(
    attrs: &BTreeMap<&str, &'a str>,
    kind: &'static str,
    name: &'static str,
) -> Result<&'a str, ParseError> {
    attrs
        .get(name)
        .copied()
        .ok_or(ParseError::MissingActionAttribute { kind, name })
}

fn parse_position(value: &str) -> Result<Position, ParseError> {
    let bad = || ParseError::BadPosition {
        value: value.to_string(),
    };
    let (x, y) = value.split_once(',').ok_or_else(bad)?;
    let x = x.trim().parse().map_err(|_| bad())?;
    let y = y.trim().parse().map_err(|_| bad())?;
    Ok(Position::new(x, y))
}

fn parse_channels(value: &str) -> Result<BTreeMap<String, i64>, ParseError> {
    let bad = || ParseError::BadChannels {
        value: value.to_string(),
    };
    let mut channels = BTreeMap::new();
    for part in value.split(',') {
        let (name, amount) = part.split_once(':').ok_or_else(bad)?;
        let amount: i64 = amount.trim().parse().map_err(|_| bad())?;
        channels.insert(name.trim().to_string(), amount);
    }
    Ok(channels)
}

/// Serialize actions back to the replay format. Attribute order is fixed
/// and channel lists are name-sorted, so dumps of the same log are
/// byte-identical.
pub fn dump_actions(actions: &[Action]) -> String {
    let blocks: Vec<String> = actions.iter().map(dump_action).collect();
    blocks.join("\n\n")
}

fn dump_action(action: &Action) -> String {
    let mut rows = Vec::new();
    match &action.kind {
        ActionKind::NewTower {
            name,
            position,
            channels,
        } => {
            rows.push("action=new_tower".to_string());
            rows.push(format!("frame={}", action.frame));
            rows.push(format!("name={}", name));
            rows.push(format!("position={},{}", position.x, position.y));
            let colors: Vec<String> = channels
                .iter()
                .map(|(name, amount)| format!("{}:{}", name, amount))
                .collect();
            rows.push(format!("colors={}", colors.join(",")));
        }
        ActionKind::Shoot { tower, bug } => {
            rows.push("action=shoot".to_string());
            rows.push(format!("frame={}", action.frame));
            rows.push(format!("tower_name={}", tower));
            rows.push(format!("bug_name={}", bug));
        }
    }
    rows.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    const INPUT: &str = "\
starting_life=20
starting_money=100
tower_range=2
tower_cost=10
reward_per_bug=5
B1 red=57 blue=39 frame=0
B2 red=12 frame=3

E 1 1 0
0 0 1 0
0 X 1 0
";

    #[test]
    fn parses_full_input() {
        let (settings, bugs, map) = parse_input(INPUT).unwrap();
        assert_eq!(settings.starting_life, 20);
        assert_eq!(settings.reward_per_bug, 5);

        assert_eq!(bugs.len(), 2);
        assert_eq!(bugs[0].id, "B1");
        assert_eq!(bugs[0].spawn_frame, 0);
        assert_eq!(bugs[0].channels["red"], 57);
        assert_eq!(bugs[0].channels["blue"], 39);
        assert_eq!(bugs[1].spawn_frame, 3);

        assert_eq!(map.width(), 4);
        assert_eq!(map.height(), 3);
        assert_eq!(map.entry(), Position::new(0, 0));
        assert_eq!(map.exit(), Position::new(1, 2));
        assert_eq!(map.road().len(), 6);
    }

    #[test]
    fn missing_setting_is_an_error() {
        let err = parse_input("starting_life=20\nB1 frame=0\n\nE 1 X\n").unwrap_err();
        assert_eq!(
            err,
            ParseError::MissingSetting {
                name: "starting_money"
            }
        );
    }

    #[test]
    fn bug_without_frame_is_an_error() {
        let text = "\
starting_life=20
starting_money=100
tower_range=2
tower_cost=10
reward_per_bug=5
B1 red=57

E 1 X
";
        let err = parse_input(text).unwrap_err();
        assert_eq!(
            err,
            ParseError::BugMissingFrame {
                id: "B1".to_string()
            }
        );
    }

    #[test]
    fn malformed_map_surfaces_map_error() {
        let text = "\
starting_life=20
starting_money=100
tower_range=2
tower_cost=10
reward_per_bug=5
B1 frame=0

E 1 1
";
        let err = parse_input(text).unwrap_err();
        assert!(matches!(err, ParseError::Map(MapError::MissingExit)));
    }

    const ACTIONS: &str = "\
action=new_tower
frame=1
name=T1
position=1,0
colors=blue:2,red:5

action=shoot
frame=2
tower_name=T1
bug_name=B1";

    #[test]
    fn parses_action_log() {
        let actions = parse_actions(ACTIONS).unwrap();
        assert_eq!(actions.len(), 2);
        assert_eq!(actions[0].frame, 1);
        match &actions[0].kind {
            ActionKind::NewTower {
                name,
                position,
                channels,
            } => {
                assert_eq!(name, "T1");
                assert_eq!(*position, Position::new(1, 0));
                assert_eq!(channels["red"], 5);
                assert_eq!(channels["blue"], 2);
            }
            other => panic!("expected NewTower, got {:?}", other),
        }
        match &actions[1].kind {
            ActionKind::Shoot { tower, bug } => {
                assert_eq!(tower, "T1");
                assert_eq!(bug, "B1");
            }
            other => panic!("expected Shoot, got {:?}", other),
        }
    }

    #[test]
    fn dump_is_the_inverse_of_parse() {
        let actions = parse_actions(ACTIONS).unwrap();
        assert_eq!(dump_actions(&actions), ACTIONS);
    }

    #[test]
    fn unknown_action_kind_is_an_error() {
        let err = parse_actions("action=upgrade\nframe=0\n").unwrap_err();
        assert_eq!(
            err,
            ParseError::UnknownActionKind {
                value: "upgrade".to_string()
            }
        );
    }

    #[test]
    fn shoot_missing_attribute_is_an_error() {
        let err = parse_actions("action=shoot\nframe=0\ntower_name=T1\n").unwrap_err();
        assert_eq!(
            err,
            ParseError::MissingActionAttribute {
                kind: "shoot",
                name: "bug_name"
            }
        );
    }
}
