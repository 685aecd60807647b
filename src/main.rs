mod terminal;

use std::env;
use std::fs::File;
use std::io::{self, Stdout};
use std::path::Path;
use std::str::FromStr;
use std::sync::Mutex;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use corridor_crawler::{CrawlerConfig, Dir, RoundController};
use crossterm::cursor::{Hide, Show};
use crossterm::event::{
    self, DisableFocusChange, EnableFocusChange, Event, KeyCode, KeyEventKind, KeyModifiers,
};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::terminal::{FlashEffects, Renderer};

const DEFAULT_RENDER_FPS: u64 = 60;
const INPUT_HOLD_MS: u64 = 160;

struct Settings {
    config: CrawlerConfig,
    render_fps: u64,
}

/// Terminals report presses and repeats but no releases, so a key counts as
/// held while its last repeat is recent.
#[derive(Default)]
struct HeldKeys {
    last_seen: [Option<Instant>; 4],
    last_pressed: Option<Dir>,
}

impl HeldKeys {
    fn press(&mut self, dir: Dir) {
        self.last_seen[idx_for_dir(dir)] = Some(Instant::now());
        self.last_pressed = Some(dir);
    }

    fn clear(&mut self) {
        *self = Self::default();
    }

    fn active_dir(&self) -> Option<Dir> {
        let now = Instant::now();
        let hold = Duration::from_millis(INPUT_HOLD_MS);
        if let Some(dir) = self.last_pressed {
            if let Some(t) = self.last_seen[idx_for_dir(dir)] {
                if now.duration_since(t) <= hold {
                    return Some(dir);
                }
            }
        }
        let mut best: Option<(Dir, Instant)> = None;
        for dir in Dir::ALL {
            if let Some(t) = self.last_seen[idx_for_dir(dir)] {
                if now.duration_since(t) <= hold {
                    match best {
                        None => best = Some((dir, t)),
                        Some((_, bt)) if t > bt => best = Some((dir, t)),
                        _ => {}
                    }
                }
            }
        }
        best.map(|(dir, _)| dir)
    }
}

fn main() -> Result<()> {
    init_logging()?;
    let settings = read_settings()?;

    let mut stdout = io::stdout();
    enable_raw_mode().context("enabling raw mode")?;
    stdout.execute(EnterAlternateScreen)?;
    stdout.execute(Hide)?;
    stdout.execute(EnableFocusChange)?;

    let result = run(&mut stdout, settings);

    stdout.execute(DisableFocusChange)?;
    stdout.execute(Show)?;
    stdout.execute(LeaveAlternateScreen)?;
    disable_raw_mode().context("restoring terminal mode")?;
    result
}

fn run(stdout: &mut Stdout, settings: Settings) -> Result<()> {
    let mut round = RoundController::new(settings.config, FlashEffects::default())
        .context("invalid crawler configuration")?;
    let mut renderer = Renderer::new();
    let mut held = HeldKeys::default();
    let frame_time = Duration::from_micros(1_000_000 / settings.render_fps.max(1));
    let mut last_frame = Instant::now();

    info!(seed = round.config().seed, "round started");

    loop {
        let frame_start = Instant::now();
        while event::poll(Duration::from_millis(0))? {
            match event::read()? {
                Event::Key(key) => {
                    if !matches!(key.kind, KeyEventKind::Press | KeyEventKind::Repeat) {
                        continue;
                    }
                    let quit = match key.code {
                        KeyCode::Char('q') | KeyCode::Esc => true,
                        KeyCode::Char('c') => key.modifiers.contains(KeyModifiers::CONTROL),
                        _ => false,
                    };
                    if quit {
                        info!(score = round.score().score, floor = round.floor(), "quit");
                        return Ok(());
                    }
                    if let Some(dir) = dir_for_key(key.code) {
                        held.press(dir);
                        let _ = round.press(dir);
                    }
                }
                Event::FocusLost => {
                    held.clear();
                    round.release_all();
                }
                Event::FocusGained | Event::Resize(_, _) => renderer.invalidate(),
                _ => {}
            }
        }

        let dt = last_frame.elapsed().as_secs_f32();
        last_frame = Instant::now();
        round.hold(held.active_dir());
        round.tick(dt);
        round.sink_mut().decay(dt);
        renderer.render(stdout, &round.snapshot(), round.sink())?;

        let elapsed = frame_start.elapsed();
        if elapsed < frame_time {
            thread::sleep(frame_time - elapsed);
        }
    }
}

fn dir_for_key(code: KeyCode) -> Option<Dir> {
    match code {
        KeyCode::Up | KeyCode::Char('w') | KeyCode::Char('k') => Some(Dir::Up),
        KeyCode::Down | KeyCode::Char('s') | KeyCode::Char('j') => Some(Dir::Down),
        KeyCode::Left | KeyCode::Char('a') | KeyCode::Char('h') => Some(Dir::Left),
        KeyCode::Right | KeyCode::Char('d') | KeyCode::Char('l') => Some(Dir::Right),
        _ => None,
    }
}

fn idx_for_dir(dir: Dir) -> usize {
    match dir {
        Dir::Up => 0,
        Dir::Down => 1,
        Dir::Left => 2,
        Dir::Right => 3,
    }
}

fn read_settings() -> Result<Settings> {
    let mut config = match env::var_os("CRAWLER_CONFIG") {
        Some(path) => {
            let path = Path::new(&path);
            CrawlerConfig::load(path)
                .with_context(|| format!("loading config from {}", path.display()))?
        }
        None => CrawlerConfig::default(),
    };
    if let Some(seed) = env_number::<u32>("CRAWLER_SEED") {
        config = config.with_seed(seed);
    }
    let render_fps = env_number::<u64>("CRAWLER_FPS")
        .filter(|v| *v > 0)
        .unwrap_or(DEFAULT_RENDER_FPS);
    Ok(Settings { config, render_fps })
}

fn env_number<T: FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.trim().parse::<T>().ok())
}

/// Logs go to a file because the terminal is in raw mode while playing.
fn init_logging() -> Result<()> {
    let Some(path) = env::var_os("CRAWLER_LOG") else {
        return Ok(());
    };
    let file = File::create(&path)
        .with_context(|| format!("creating log file {}", Path::new(&path).display()))?;
    let filter = EnvFilter::try_from_env("CRAWLER_LOG_LEVEL")
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}
