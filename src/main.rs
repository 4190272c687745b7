//! # SAR Mission Main Entry Point
//!
//! Parses the command line, sets up logging and configuration, and runs either
//! the macroquad window or a headless session.

use clap::Parser;
use log::{error, info};
use macroquad::prelude::Conf;
use sar_mission::assistant::CommandAdvisor;
use sar_mission::scenes::{run_script, SceneManager};
use sar_mission::{
    Advisor, BroadcastHandle, DisabledAdvisor, Difficulty, GameConfig, GameSession,
    HeuristicAdvisor, SarError, SarResult, ViewMode,
};
use std::path::PathBuf;

/// Command line arguments for the SAR mission game.
#[derive(Parser, Debug)]
#[command(name = "sar-mission")]
#[command(about = "A grid-based search-and-rescue game with an advisory assistant")]
#[command(version)]
struct Args {
    /// Random seed for level generation
    #[arg(short, long)]
    seed: Option<u64>,

    /// Difficulty preselected on the start screen (easy, medium, hard)
    #[arg(short, long, default_value = "medium")]
    difficulty: Difficulty,

    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Initial view mode (local, global)
    #[arg(long, default_value = "local")]
    view: String,

    /// Address to broadcast snapshots on, e.g. 127.0.0.1:8765
    #[arg(long)]
    broadcast: Option<String>,

    /// Run without a window: generate a level and print its matrix
    #[arg(long)]
    headless: bool,

    /// Command script to play in headless mode
    #[arg(long, requires = "headless")]
    script: Option<PathBuf>,

    /// Write the final full snapshot as JSON (headless mode)
    #[arg(long, requires = "headless")]
    export: Option<PathBuf>,

    /// Advisor to answer chat questions (heuristic, command, off)
    #[arg(long, default_value = "heuristic")]
    advisor: String,

    /// Command line for the command advisor; the prompt is piped to stdin
    #[arg(long)]
    advisor_command: Option<String>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() {
    let args = Args::parse();
    initialize_logging(&args.log_level);

    info!("Starting SAR Mission v{}", sar_mission::VERSION);

    if let Err(e) = run(args) {
        error!("{}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> SarResult<()> {
    let mut config = match &args.config {
        Some(path) => GameConfig::load(path)?,
        None => GameConfig::default(),
    };
    if let Some(seed) = args.seed {
        config = config.with_seed(seed);
    }

    let mut session = GameSession::new(config).with_advisor(build_advisor(&args)?);
    session.select_difficulty(args.difficulty);
    session.set_view_mode(parse_view(&args.view)?);

    let broadcast = match &args.broadcast {
        Some(addr) => {
            let handle = BroadcastHandle::start(addr)?;
            session.add_observer(Box::new(handle.observer()));
            Some(handle)
        }
        None => None,
    };

    if args.headless {
        return run_headless(&args, session);
    }

    info!("Opening game window");
    macroquad::Window::from_config(window_conf(), async move {
        let mut scenes = SceneManager::new(session, broadcast);
        if let Err(e) = scenes.run().await {
            error!("Game loop failed: {}", e);
        }
    });
    Ok(())
}

/// Initializes the logging system based on the specified log level.
fn initialize_logging(log_level: &str) {
    #[cfg(feature = "dev-tools")]
    {
        use tracing::Level;

        let level = match log_level.to_lowercase().as_str() {
            "error" => Level::ERROR,
            "warn" => Level::WARN,
            "info" => Level::INFO,
            "debug" => Level::DEBUG,
            "trace" => Level::TRACE,
            _ => Level::INFO,
        };

        tracing_subscriber::fmt()
            .with_max_level(level)
            .with_target(false)
            .init();
    }

    #[cfg(not(feature = "dev-tools"))]
    {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
            .format_timestamp_millis()
            .init();
    }
}

fn build_advisor(args: &Args) -> SarResult<Box<dyn Advisor>> {
    match args.advisor.to_lowercase().as_str() {
        "heuristic" => Ok(Box::new(HeuristicAdvisor::new())),
        "off" | "none" => Ok(Box::new(DisabledAdvisor)),
        "command" => {
            let command_line = args.advisor_command.as_deref().unwrap_or_default();
            CommandAdvisor::from_command_line(command_line)
                .map(|advisor| Box::new(advisor) as Box<dyn Advisor>)
                .ok_or_else(|| {
                    SarError::InvalidConfig("--advisor command needs --advisor-command".to_string())
                })
        }
        other => Err(SarError::InvalidConfig(format!("unknown advisor '{}'", other))),
    }
}

fn parse_view(view: &str) -> SarResult<ViewMode> {
    match view.to_lowercase().as_str() {
        "local" => Ok(ViewMode::Local),
        "global" => Ok(ViewMode::Global),
        other => Err(SarError::InvalidConfig(format!("unknown view '{}'", other))),
    }
}

fn window_conf() -> Conf {
    Conf {
        window_title: "SAR Mission".to_string(),
        window_width: 1280,
        window_height: 900,
        high_dpi: true,
        ..Default::default()
    }
}

/// Starts a mission, plays the optional script and prints the result.
fn run_headless(args: &Args, mut session: GameSession) -> SarResult<()> {
    session.start_mission();

    if let Some(path) = &args.script {
        let script = std::fs::read_to_string(path)?;
        let applied = run_script(&mut session, &script)?;
        info!("Applied {} scripted commands", applied);
    }

    let matrix = session
        .matrix()
        .ok_or_else(|| SarError::InvalidState("no level loaded".to_string()))?;
    for row in &matrix {
        let line: String = row.iter().map(|code| char::from(b'0' + code)).collect();
        println!("{}", line);
    }
    for line in session.hud().lines() {
        println!("{}", line);
    }
    for line in session.transcript().lines() {
        println!("{}", line);
    }

    if let Some(path) = &args.export {
        let snapshot = session
            .snapshot()
            .ok_or_else(|| SarError::InvalidState("no level loaded".to_string()))?;
        std::fs::write(path, snapshot.to_json()?)?;
        info!("Wrote snapshot to {}", path.display());
    }
    Ok(())
}
