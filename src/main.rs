/// Entry point and game loop.

mod config;
mod domain;
mod sim;
mod ui;

use std::time::{Duration, Instant};

use crossterm::event::KeyCode;

use config::GameConfig;
use domain::entity::FrameInput;
use sim::event::GameEvent;
use sim::level::{self, LevelInfo, LevelSource};
use sim::save;
use sim::step;
use sim::world::{GameState, Phase, WorldState};
use ui::input::InputState;
use ui::renderer::{Renderer, View};
use ui::sound::SoundEngine;

const FRAME_SLEEP: Duration = Duration::from_millis(5);

/// Clamp runaway frame deltas (terminal stalls, suspended process) so
/// one bad frame can't teleport anything through a wall.
const MAX_DT: f32 = 0.05;

const KEYS_CONFIRM: &[KeyCode] = &[KeyCode::Enter, KeyCode::Char(' ')];
const KEYS_QUIT: &[KeyCode] = &[KeyCode::Char('q'), KeyCode::Char('Q')];

/// Everything outside the simulation: which screen is up, menu cursors,
/// and the transient HUD message.
struct App {
    phase: Phase,
    world: Option<WorldState>,
    levels: Vec<LevelInfo>,
    title_cursor: usize,
    pause_cursor: usize,
    has_save: bool,
    message: String,
    message_timer: f32,
    /// Title-screen notice, e.g. why a map refused to load.
    notice: String,
}

impl App {
    fn set_message(&mut self, text: &str, secs: f32) {
        self.message = text.to_string();
        self.message_timer = secs;
    }
}

fn main() {
    let config = GameConfig::load();

    let mut app = App {
        phase: Phase::Title,
        world: None,
        levels: level::list_levels(&config),
        title_cursor: 0,
        pause_cursor: 0,
        has_save: save::read_save().is_some(),
        message: String::new(),
        message_timer: 0.0,
        notice: String::new(),
    };

    let mut renderer = Renderer::new();
    if let Err(e) = renderer.init() {
        eprintln!("Terminal init failed: {e}");
        return;
    }

    let sound = SoundEngine::new();

    let result = run(&mut app, &mut renderer, sound.as_ref(), &config);

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }
    if let Err(e) = result {
        eprintln!("Game error: {e}");
    }

    println!();
    println!("Thanks for playing Mazebound!");
}

fn run(
    app: &mut App,
    renderer: &mut Renderer,
    sound: Option<&SoundEngine>,
    config: &GameConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut kb = InputState::new();
    let mut last_frame = Instant::now();

    loop {
        kb.drain_events();
        if kb.ctrl_c_pressed() {
            break;
        }

        let dt = last_frame.elapsed().as_secs_f32().min(MAX_DT);
        last_frame = Instant::now();

        let quit = match app.phase {
            Phase::Title => handle_title(app, &kb, config),
            Phase::Playing => {
                handle_playing(app, &kb, sound, dt);
                false
            }
            Phase::PauseMenu => handle_pause(app, &kb),
            Phase::GameWon | Phase::GameOver => {
                handle_session_end(app, &kb);
                false
            }
        };
        if quit {
            break;
        }

        if app.message_timer > 0.0 {
            app.message_timer -= dt;
            if app.message_timer <= 0.0 {
                app.message.clear();
            }
        }

        render_frame(app, renderer)?;
        std::thread::sleep(FRAME_SLEEP);
    }

    Ok(())
}

fn render_frame(app: &App, renderer: &mut Renderer) -> std::io::Result<()> {
    let view = match (&app.phase, &app.world) {
        (Phase::Playing, Some(world)) => View::Game { world, message: &app.message },
        (Phase::PauseMenu, Some(world)) => View::Pause { world, selected: app.pause_cursor },
        (Phase::GameWon, Some(world)) => View::Won { world },
        (Phase::GameOver, Some(world)) => View::Lost { world },
        _ => View::Title {
            levels: &app.levels,
            selected: app.title_cursor,
            has_save: app.has_save,
            notice: &app.notice,
        },
    };
    renderer.render(&view)
}

// ── Title screen ──

fn handle_title(app: &mut App, kb: &InputState, config: &GameConfig) -> bool {
    if kb.any_pressed(KEYS_QUIT) {
        return true;
    }

    // Continue (when a save exists) sits above the level list.
    let extra = if app.has_save { 1 } else { 0 };
    let item_count = app.levels.len() + extra;
    if item_count == 0 {
        return false;
    }

    if kb.was_pressed(KeyCode::Up) && app.title_cursor > 0 {
        app.title_cursor -= 1;
    }
    if kb.was_pressed(KeyCode::Down) && app.title_cursor + 1 < item_count {
        app.title_cursor += 1;
    }

    if kb.any_pressed(KEYS_CONFIRM) {
        app.notice.clear();
        if app.has_save && app.title_cursor == 0 {
            resume_saved_session(app, config);
        } else {
            let info = app.levels[app.title_cursor - extra].clone();
            start_session(app, info, config);
        }
    }

    false
}

fn start_session(app: &mut App, info: LevelInfo, config: &GameConfig) {
    let name = info.name.clone();
    let built = level::load_source(&info.source)
        .and_then(|parsed| WorldState::new(parsed, info, config.tuning.clone()));
    match built {
        Ok(world) => {
            let skipped = world.skipped_cells;
            app.world = Some(world);
            app.phase = Phase::Playing;
            if skipped > 0 {
                app.set_message(&format!("{skipped} unrecognized map cells ignored"), 3.0);
            }
        }
        Err(e) => {
            app.notice = format!("Cannot start '{}': {}", name, e);
        }
    }
}

fn resume_saved_session(app: &mut App, config: &GameConfig) {
    let snapshot = match save::read_save() {
        Some(s) => s,
        None => {
            app.has_save = false;
            return;
        }
    };

    let name = match &snapshot.source {
        LevelSource::BuiltIn(idx) => app
            .levels
            .iter()
            .find(|l| l.source == snapshot.source)
            .map(|l| l.name.clone())
            .unwrap_or_else(|| format!("Level {}", idx + 1)),
        LevelSource::Custom(path) => path
            .file_stem()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string(),
    };
    let info = LevelInfo { name, source: snapshot.source.clone() };

    let built = level::load_source(&info.source)
        .and_then(|parsed| WorldState::new(parsed, info, config.tuning.clone()));
    match built {
        Ok(mut world) => {
            save::apply(&snapshot, &mut world);
            app.world = Some(world);
            app.phase = Phase::Playing;
        }
        Err(e) => {
            app.notice = format!("Cannot resume: {}", e);
            app.has_save = false;
        }
    }
}

// ── Playing ──

fn handle_playing(app: &mut App, kb: &InputState, sound: Option<&SoundEngine>, dt: f32) {
    if kb.was_pressed(KeyCode::Esc) {
        // Pausing persists the snapshot immediately, so the session
        // survives even a hard quit from the pause menu.
        if let Some(world) = &app.world {
            match save::write_save(&save::capture(world)) {
                Ok(()) => app.has_save = true,
                Err(e) => app.notice = format!("Save failed: {}", e),
            }
        }
        app.pause_cursor = 0;
        app.phase = Phase::PauseMenu;
        return;
    }

    let world = match app.world.as_mut() {
        Some(w) => w,
        None => {
            app.phase = Phase::Title;
            return;
        }
    };

    let input = FrameInput { movement: kb.movement_intent() };
    let events = step::step(world, input, dt);
    play_sound_events(sound, &events);

    match world.state {
        GameState::Won => {
            app.phase = Phase::GameWon;
            save::delete_save();
            app.has_save = false;
        }
        GameState::Lost => {
            app.phase = Phase::GameOver;
            save::delete_save();
            app.has_save = false;
        }
        GameState::Playing => {}
    }
}

fn play_sound_events(sound: Option<&SoundEngine>, events: &[GameEvent]) {
    let sfx = match sound {
        Some(s) => s,
        None => return,
    };
    for event in events {
        match event {
            GameEvent::LifeLost => sfx.play_hit(),
            GameEvent::KeyCollected => sfx.play_key(),
            GameEvent::GameWon => sfx.play_victory(),
            GameEvent::GameLost => sfx.play_defeat(),
        }
    }
}

// ── Pause menu ──

fn handle_pause(app: &mut App, kb: &InputState) -> bool {
    const ITEM_COUNT: usize = 3; // Resume / Exit to title / Quit

    if kb.was_pressed(KeyCode::Esc) {
        app.phase = Phase::Playing;
        return false;
    }
    if kb.was_pressed(KeyCode::Up) && app.pause_cursor > 0 {
        app.pause_cursor -= 1;
    }
    if kb.was_pressed(KeyCode::Down) && app.pause_cursor + 1 < ITEM_COUNT {
        app.pause_cursor += 1;
    }

    if kb.any_pressed(KEYS_CONFIRM) {
        match app.pause_cursor {
            0 => app.phase = Phase::Playing,
            // The snapshot was written when the pause opened.
            1 => return_to_title(app),
            _ => return true,
        }
    }

    false
}

// ── Won / lost screens ──

fn handle_session_end(app: &mut App, kb: &InputState) {
    if kb.was_pressed(KeyCode::Esc) || kb.any_pressed(KEYS_CONFIRM) {
        return_to_title(app);
    }
}

fn return_to_title(app: &mut App) {
    app.world = None;
    app.phase = Phase::Title;
    app.title_cursor = 0;
    app.message.clear();
    app.message_timer = 0.0;
    app.has_save = save::read_save().is_some();
}
