/// Keyboard state tracker.
///
/// Terminal input is event-based, so held keys are reconstructed:
///   - Continuous movement while an arrow/WASD key is held
///   - Edge-triggered presses for menu navigation and pause
///
/// Uses crossterm's keyboard enhancement for Release events when the
/// terminal supports it, otherwise falls back to timeout-based expiry.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crossterm::event::{self, poll, Event, KeyCode, KeyEvent, KeyEventKind};

use crate::domain::entity::MoveDir;

/// Without a Press/Repeat event for this long, a key counts as released.
/// Only relevant when the terminal doesn't report Release events.
const HOLD_TIMEOUT: Duration = Duration::from_millis(160);

pub struct InputState {
    /// Timestamp of the last Press/Repeat event per key.
    last_active: HashMap<KeyCode, Instant>,

    /// Keys that went "not held" → "held" during the latest drain.
    fresh_presses: Vec<KeyCode>,

    /// Raw events from the latest drain, for modifier handling.
    pub raw_events: Vec<KeyEvent>,

    /// Honor Release events only once keyboard enhancement is confirmed.
    pub honor_release: bool,
}

impl InputState {
    pub fn new() -> Self {
        InputState {
            last_active: HashMap::with_capacity(16),
            fresh_presses: Vec::with_capacity(8),
            raw_events: Vec::with_capacity(8),
            honor_release: false,
        }
    }

    /// Drain all pending terminal events. Call once per frame, before
    /// the simulation tick.
    pub fn drain_events(&mut self) {
        self.fresh_presses.clear();
        self.raw_events.clear();

        while poll(Duration::ZERO).unwrap_or(false) {
            if let Ok(Event::Key(key)) = event::read() {
                self.raw_events.push(key);

                match key.kind {
                    KeyEventKind::Release if self.honor_release => {
                        self.last_active.remove(&key.code);
                    }
                    KeyEventKind::Release => {
                        // No enhancement: rely on timeout expiry instead.
                    }
                    _ => {
                        let was_held = self.is_held(key.code);
                        self.last_active.insert(key.code, Instant::now());
                        if !was_held {
                            self.fresh_presses.push(key.code);
                        }
                    }
                }
            }
        }

        let now = Instant::now();
        self.last_active
            .retain(|_, t| now.duration_since(*t) < HOLD_TIMEOUT);
    }

    pub fn is_held(&self, code: KeyCode) -> bool {
        self.last_active
            .get(&code)
            .map(|t| t.elapsed() < HOLD_TIMEOUT)
            .unwrap_or(false)
    }

    /// Edge trigger: fresh press this frame (menus, pause).
    pub fn was_pressed(&self, code: KeyCode) -> bool {
        self.fresh_presses.contains(&code)
    }

    pub fn any_pressed(&self, codes: &[KeyCode]) -> bool {
        codes.iter().any(|c| self.was_pressed(*c))
    }

    /// Current movement intent from held arrow/WASD keys. With several
    /// directions held the first in scan order wins; the simulation only
    /// takes one direction per tick.
    pub fn movement_intent(&self) -> Option<MoveDir> {
        const BINDINGS: [(MoveDir, [KeyCode; 2]); 4] = [
            (MoveDir::Up, [KeyCode::Up, KeyCode::Char('w')]),
            (MoveDir::Down, [KeyCode::Down, KeyCode::Char('s')]),
            (MoveDir::Left, [KeyCode::Left, KeyCode::Char('a')]),
            (MoveDir::Right, [KeyCode::Right, KeyCode::Char('d')]),
        ];
        for (dir, keys) in BINDINGS {
            if keys.iter().any(|k| self.is_held(*k)) {
                return Some(dir);
            }
        }
        None
    }

    pub fn ctrl_c_pressed(&self) -> bool {
        use crossterm::event::KeyModifiers;
        self.raw_events.iter().any(|k| {
            k.modifiers.contains(KeyModifiers::CONTROL)
                && (k.code == KeyCode::Char('c') || k.code == KeyCode::Char('C'))
        })
    }
}
