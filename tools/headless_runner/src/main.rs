//! Headless driver: loads an input file, optionally replays an action
//! log, advances the simulation frame by frame and renders the board (or
//! JSON observations), then can dump the action log back out.

use bug_td::{board, build_observation, parse, GameStatus, TdEvent, TdGame};
use clap::Parser;
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "headless_runner")]
#[command(about = "Run a bug tower-defense match from input files")]
struct Args {
    /// Input file: settings, bug roster and map.
    input: PathBuf,

    /// Action log to replay.
    #[arg(long)]
    actions: Option<PathBuf>,

    /// Write the full action log here when the run ends.
    #[arg(long)]
    dump: Option<PathBuf>,

    /// Emit one JSON observation per frame instead of the board.
    #[arg(long)]
    json: bool,

    /// Stop after this many frames if the run is still going.
    #[arg(long, default_value = "1000")]
    max_frames: u64,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let input = fs::read_to_string(&args.input)?;
    let (settings, bugs, map) = parse::parse_input(&input)?;
    let mut game = TdGame::new(settings, map, bugs);

    if let Some(path) = &args.actions {
        let actions = parse::parse_actions(&fs::read_to_string(path)?)?;
        tracing::info!(count = actions.len(), "replaying action log");
        game.load_actions(actions)?;
    }

    game.start_simulation();
    if !args.json {
        println!("{}", board::render(&game));
        print_status(&game);
    }

    let mut events = Vec::new();
    for _ in 0..args.max_frames {
        events.clear();
        let status = game.next_step(&mut events);

        for event in &events {
            print_event(game.frame(), event);
        }
        if args.json {
            println!("{}", serde_json::to_string(&build_observation(&game))?);
        } else {
            println!("{}", board::render(&game));
            print_status(&game);
        }
        if status.is_terminal() {
            break;
        }
    }

    match game.status() {
        GameStatus::Won => println!("You killed all the bugs."),
        GameStatus::Lost => println!("You are dead."),
        _ => println!("Frame cap reached after {} frames", args.max_frames),
    }

    if let Some(path) = &args.dump {
        fs::write(path, game.dump_actions())?;
        println!("Action log written to {}", path.display());
    }

    Ok(())
}

fn print_status(game: &TdGame) {
    println!(
        "Frame: {}  Life: {}  Money: {}  Bugs: {}  Towers: {}\n",
        game.frame(),
        game.life(),
        game.money(),
        game.bugs().len(),
        game.towers().len()
    );
}

fn print_event(frame: i64, event: &TdEvent) {
    match event {
        TdEvent::TowerBuilt { id, position } => {
            println!("[{:>4}] Tower {} built at {}", frame, id, position)
        }
        TdEvent::DuplicateTowerId { id } => {
            println!("[{:>4}] ERROR: tower id {} already in use", frame, id)
        }
        TdEvent::TowerOutOfBounds { id, position } => {
            println!("[{:>4}] ERROR: cannot build {} at {}", frame, id, position)
        }
        TdEvent::TowerPositionOccupied { id, position } => {
            println!(
                "[{:>4}] ERROR: {} overlaps a tower at {}",
                frame, id, position
            )
        }
        TdEvent::InsufficientFunds { id, cost, have } => {
            println!(
                "[{:>4}] ERROR: cannot afford {} (cost {}, have {})",
                frame, id, cost, have
            )
        }
        TdEvent::TowerAlreadyFired { tower } => {
            println!("[{:>4}] ERROR: tower {} already fired", frame, tower)
        }
        TdEvent::ShotOutOfRange { tower, bug } => {
            println!("[{:>4}] ERROR: {} out of range of {}", frame, bug, tower)
        }
        TdEvent::UnknownTower { tower } => {
            println!("[{:>4}] ERROR: no tower named {}", frame, tower)
        }
        TdEvent::UnknownBug { bug } => {
            println!("[{:>4}] ERROR: no bug named {}", frame, bug)
        }
        TdEvent::BugSpawned { id, position } => {
            println!("[{:>4}] Bug {} entered at {}", frame, id, position)
        }
        TdEvent::BugFinished { id } => {
            println!("[{:>4}] Bug {} reached the exit!", frame, id)
        }
        TdEvent::BugKilled { id } => println!("[{:>4}] Bug {} killed", frame, id),
        TdEvent::LifeLost { amount, remaining } => {
            println!(
                "[{:>4}] Lost {} life ({} remaining)",
                frame, amount, remaining
            )
        }
        TdEvent::Victory => println!("[{:>4}] === All bugs dead, you win ===", frame),
        TdEvent::Defeat { frame: f } => {
            println!("[{:>4}] === Life exhausted at frame {} ===", frame, f)
        }
    }
}
