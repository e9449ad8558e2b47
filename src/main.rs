mod ui;

use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, MouseButton, MouseEventKind,
};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use olympus::core::config::{ConfigManager, GameConfig};
use olympus::core::constants::FRAME_INTERVAL_MS;
use olympus::core::logging;
use olympus::game::{self, FallingGame, FallingInput, TapPolicy, TracingObserver, Viewport};
use rand::rngs::StdRng;
use rand::SeedableRng;
use ratatui::layout::Rect;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, Stdout};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::Level;
use ui::title_scene::{TitleOption, TitleScreen};
use ui::Screen;

const USAGE: &str = "Gates of Olympus - tap the falling targets before they hit the bottom

Usage: olympus [options]

Options:
  --seed <n>             Seed the spawn position RNG
  --config <path>        Load settings from a JSON file
  --log-level <level>    trace, debug, info, warn or error (default: info)
  --count-at-boundary    Tapped targets keep falling and count when they reach the bottom
  --write-config         Save the effective settings to the config file and exit
  --version              Show version information
  --help                 Show this help message";

/// Options for a normal run.
#[derive(Debug, Clone, PartialEq)]
struct RunOptions {
    seed: Option<u64>,
    config_path: Option<PathBuf>,
    log_level: Level,
    count_at_boundary: bool,
    write_config: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            seed: None,
            config_path: None,
            log_level: Level::INFO,
            count_at_boundary: false,
            write_config: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Command {
    Run(RunOptions),
    Help,
    Version,
}

fn parse_args(args: &[String]) -> Result<Command, String> {
    let mut options = RunOptions::default();
    let mut iter = args.iter().skip(1);

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--help" | "-h" => return Ok(Command::Help),
            "--version" | "-v" => return Ok(Command::Version),
            "--seed" => {
                let value = iter.next().ok_or("--seed needs a value")?;
                let seed = value
                    .parse::<u64>()
                    .map_err(|_| format!("Invalid seed: {}", value))?;
                options.seed = Some(seed);
            }
            "--config" => {
                let value = iter.next().ok_or("--config needs a path")?;
                options.config_path = Some(PathBuf::from(value));
            }
            "--log-level" => {
                let value = iter.next().ok_or("--log-level needs a value")?;
                options.log_level = logging::parse_level(value)
                    .ok_or_else(|| format!("Invalid log level: {}", value))?;
            }
            "--count-at-boundary" => options.count_at_boundary = true,
            "--write-config" => options.write_config = true,
            other => return Err(format!("Unknown option: {}", other)),
        }
    }

    Ok(Command::Run(options))
}

fn main() -> io::Result<()> {
    let args: Vec<String> = std::env::args().collect();

    let options = match parse_args(&args) {
        Ok(Command::Run(options)) => options,
        Ok(Command::Help) => {
            println!("{}", USAGE);
            return Ok(());
        }
        Ok(Command::Version) => {
            println!("olympus {}", env!("CARGO_PKG_VERSION"));
            return Ok(());
        }
        Err(message) => {
            eprintln!("{}", message);
            eprintln!("Run 'olympus --help' for usage.");
            std::process::exit(1);
        }
    };

    // Logging is best effort; the game runs without it
    match logging::default_log_path() {
        Ok(path) => {
            if let Err(e) = logging::init_logging(&path, options.log_level) {
                eprintln!("Warning: logging disabled ({})", e);
            }
        }
        Err(e) => eprintln!("Warning: logging disabled ({})", e),
    }

    let config_manager = match &options.config_path {
        Some(path) => ConfigManager::with_path(path),
        None => ConfigManager::new()?,
    };
    let mut config = config_manager.load()?;
    if options.count_at_boundary {
        config.tap_policy = TapPolicy::CountAtBoundary;
    }

    if options.write_config {
        config_manager.save(&config)?;
        tracing::info!(path = %config_manager.path().display(), "config written");
        println!("Wrote {}", config_manager.path().display());
        return Ok(());
    }

    tracing::info!(path = %config_manager.path().display(), ?config, "starting");

    let mut rng = match options.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    stdout.execute(EnterAlternateScreen)?;
    stdout.execute(EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run(&mut terminal, &config, &mut rng);

    // Restore terminal even when the loop failed
    disable_raw_mode()?;
    terminal.backend_mut().execute(DisableMouseCapture)?;
    terminal.backend_mut().execute(LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(e) = &result {
        tracing::error!(error = %e, "exited with error");
    }
    result
}

/// Map a key press on the game screen to a game input.
fn map_game_key(code: KeyCode) -> FallingInput {
    match code {
        KeyCode::Char(' ') | KeyCode::Enter | KeyCode::Down => FallingInput::TapLowest,
        KeyCode::Char('r') | KeyCode::Char('R') => FallingInput::Restart,
        _ => FallingInput::Other,
    }
}

/// Start a session that remembers the best score of earlier ones.
fn new_session(config: &GameConfig, best_score: u32) -> FallingGame {
    let mut game = FallingGame::new(config.clone(), Viewport::default());
    game.record_best_score(best_score);
    game.subscribe(Box::new(TracingObserver));
    game
}

/// Whole milliseconds elapsed since `last_tick`. Only the consumed
/// milliseconds move `last_tick`, so the remainder carries into the next frame.
fn take_elapsed_ms(last_tick: &mut Instant, now: Instant) -> u64 {
    let dt = now.saturating_duration_since(*last_tick).as_millis() as u64;
    *last_tick += Duration::from_millis(dt);
    dt
}

fn run(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    config: &GameConfig,
    rng: &mut StdRng,
) -> io::Result<()> {
    let mut screen = Screen::Title;
    let mut title = TitleScreen::new();
    let mut session: Option<FallingGame> = None;
    let mut play_area = Rect::default();
    let mut best_score = 0;
    let mut last_tick = Instant::now();

    loop {
        terminal.draw(|f| {
            if let Some(game) = session.as_mut() {
                play_area = ui::falling_scene::layout(f.area()).content;
                game.set_viewport(ui::falling_scene::viewport_for(play_area));
            }
            ui::draw_ui(f, screen, &title, session.as_ref());
        })?;

        if event::poll(Duration::from_millis(FRAME_INTERVAL_MS))? {
            match (screen, event::read()?) {
                (Screen::Title, Event::Key(key)) => match key.code {
                    KeyCode::Up => title.move_up(),
                    KeyCode::Down => title.move_down(),
                    KeyCode::Enter => match title.selected() {
                        TitleOption::StartGame => {
                            session = Some(new_session(config, best_score));
                            last_tick = Instant::now();
                            screen = Screen::Game;
                        }
                        TitleOption::GameRules => screen = Screen::Rules,
                        TitleOption::Quit => break,
                    },
                    KeyCode::Char('q') | KeyCode::Char('Q') => break,
                    _ => {}
                },
                (Screen::Rules, Event::Key(_)) => screen = Screen::Title,
                (Screen::Game, Event::Key(key)) => {
                    if key.code == KeyCode::Esc {
                        if let Some(game) = session.take() {
                            best_score = best_score.max(game.best_score());
                        }
                        screen = Screen::Title;
                    } else if let Some(game) = session.as_mut() {
                        game::process_input(game, map_game_key(key.code));
                    }
                }
                (Screen::Game, Event::Mouse(mouse)) => {
                    if let MouseEventKind::Down(MouseButton::Left) = mouse.kind {
                        let point =
                            ui::falling_scene::cell_to_world(play_area, mouse.column, mouse.row);
                        if let (Some(game), Some(point)) = (session.as_mut(), point) {
                            game::process_input(game, FallingInput::TapAt(point));
                        }
                    }
                }
                _ => {}
            }
        }

        let dt = take_elapsed_ms(&mut last_tick, Instant::now());
        if let (Screen::Game, Some(game)) = (screen, session.as_mut()) {
            game::advance(game, dt, rng);
        }
    }

    Ok(())
}
