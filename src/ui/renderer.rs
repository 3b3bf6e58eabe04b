/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// Each frame is composed into the `front` buffer, diffed cell-by-cell
/// against the `back` buffer (the previous frame), and only changed
/// cells are emitted. Commands are batched with `queue!` and flushed
/// once, which keeps the maze flicker-free at 60 fps.
///
/// One maze tile is drawn as 2 terminal columns by 1 row.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::domain::entity::Facing;
use crate::domain::physics::TILE;
use crate::sim::level::LevelInfo;
use crate::sim::world::WorldState;

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Cell {
    /// Explicit dark background for every "empty" cell, and for
    /// Clear(ClearType::All), so inter-row gap pixels on VTE terminals
    /// match the cell color exactly.
    const BASE_BG: Color = Color::Rgb { r: 18, g: 18, b: 28 };

    const BLANK: Cell = Cell { ch: ' ', fg: Color::White, bg: Cell::BASE_BG };

    /// Sentinel that differs from any real cell, used to invalidate the
    /// back buffer and force a full repaint.
    const INVALID: Cell = Cell { ch: '?', fg: Color::Magenta, bg: Color::Magenta };

    fn new(ch: char, fg: Color, bg: Color) -> Self {
        let bg = match bg {
            Color::Reset => Self::BASE_BG,
            other => other,
        };
        Cell { ch, fg, bg }
    }
}

// ── FrameBuffer: a 2D grid of Cells ──

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer { width: w, height: h, cells: vec![Cell::BLANK; w * h] }
    }

    fn resize(&mut self, w: usize, h: usize) {
        if self.width != w || self.height != h {
            self.width = w;
            self.height = h;
            self.cells = vec![Cell::BLANK; w * h];
        }
    }

    fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }

    fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = cell;
        }
    }

    fn get(&self, x: usize, y: usize) -> Cell {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            Cell::BLANK
        }
    }

    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) {
        let mut cx = x;
        for ch in s.chars() {
            if cx >= self.width {
                break;
            }
            self.set(cx, y, Cell::new(ch, fg, bg));
            cx += 1;
        }
    }

    fn fill_row(&mut self, y: usize, bg: Color) {
        for x in 0..self.width {
            self.set(x, y, Cell::new(' ', Color::White, bg));
        }
    }
}

// ── View: what the frame shows ──

/// The UI loop picks the view; the renderer owns no game state.
pub enum View<'a> {
    Title { levels: &'a [LevelInfo], selected: usize, has_save: bool, notice: &'a str },
    Game { world: &'a WorldState, message: &'a str },
    Pause { world: &'a WorldState, selected: usize },
    Won { world: &'a WorldState },
    Lost { world: &'a WorldState },
}

impl View<'_> {
    fn tag(&self) -> u8 {
        match self {
            View::Title { .. } => 0,
            View::Game { .. } => 1,
            View::Pause { .. } => 2,
            View::Won { .. } => 3,
            View::Lost { .. } => 4,
        }
    }
}

// ── Renderer ──

/// Terminal columns per maze tile.
const CELL_W: usize = 2;

const HUD_ROW: usize = 0;
const MAP_ROW: usize = 2;

const HUD_BG: Color = Color::Rgb { r: 25, g: 25, b: 70 };
const MSG_BG: Color = Color::Rgb { r: 190, g: 170, b: 40 };

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    last_view: Option<u8>,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
            last_view: None,
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            SetBackgroundColor(Cell::BASE_BG),
            Clear(ClearType::All)
        )?;

        let (tw, th) = terminal::size().unwrap_or((80, 24));
        self.term_w = tw as usize;
        self.term_h = th as usize;
        self.front.resize(self.term_w, self.term_h);
        self.back.resize(self.term_w, self.term_h);
        self.back.cells.fill(Cell::INVALID);

        Ok(())
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        execute!(
            self.writer,
            ResetColor,
            cursor::Show,
            terminal::LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()
    }

    pub fn render(&mut self, view: &View) -> io::Result<()> {
        // Terminal resize forces a full repaint.
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.term_w = tw as usize;
            self.term_h = th as usize;
            self.front.resize(self.term_w, self.term_h);
            self.back.resize(self.term_w, self.term_h);
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
        }

        // So does a screen transition.
        if self.last_view != Some(view.tag()) {
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
            self.last_view = Some(view.tag());
        }

        self.front.clear();

        match view {
            View::Title { levels, selected, has_save, notice } => {
                self.compose_title(levels, *selected, *has_save, notice)
            }
            View::Game { world, message } => self.compose_game(world, message),
            View::Pause { world, selected } => {
                self.compose_game(world, "");
                self.compose_pause_overlay(*selected);
            }
            View::Won { world } => {
                self.compose_game(world, "");
                self.compose_end_overlay(
                    "YOU ESCAPED!",
                    &format!("Score: {}   Time: {}s", world.score(), world.completed_in),
                    Color::Rgb { r: 80, g: 220, b: 120 },
                );
            }
            View::Lost { world } => {
                self.compose_game(world, "");
                self.compose_end_overlay(
                    "OUT OF LIVES",
                    "Score: 0. The maze keeps its secrets.",
                    Color::Rgb { r: 220, g: 80, b: 80 },
                );
            }
        }

        self.flush_diff()?;
        std::mem::swap(&mut self.front, &mut self.back);
        Ok(())
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = Cell::BASE_BG;
        let mut need_move = true;
        let mut last_x: usize = 0;
        let mut last_y: usize = 0;

        // Explicit base colors at frame start. ResetColor would fall
        // back to the terminal default, which may differ from BASE_BG
        // and paint line artifacts.
        queue!(
            self.writer,
            SetForegroundColor(Color::White),
            SetBackgroundColor(Cell::BASE_BG),
        )?;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let cell = self.front.get(x, y);
                if cell == self.back.get(x, y) {
                    need_move = true;
                    continue;
                }

                if need_move || x != last_x + 1 || y != last_y {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                    need_move = false;
                }

                if cell.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = cell.fg;
                }
                if cell.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(cell.bg))?;
                    last_bg = cell.bg;
                }

                queue!(self.writer, Print(cell.ch))?;
                last_x = x;
                last_y = y;
            }
        }

        self.writer.flush()
    }

    // ── Game view ──

    fn compose_game(&mut self, w: &WorldState, message: &str) {
        // HUD
        let key = if w.player.key_collected { "KEY" } else { "---" };
        let hud = format!(
            " {}  Lives:{}  [{}]  Time {} ",
            w.level.name,
            w.player.lives,
            key,
            fmt_time(w.play_time),
        );
        self.front.fill_row(HUD_ROW, HUD_BG);
        self.front.put_str(0, HUD_ROW, &hud, Color::White, HUD_BG);

        // Maze, bottom tile row drawn last on screen.
        for wall in &w.walls {
            self.draw_tile(w, wall.x, wall.y, '▓', '▓',
                Color::Rgb { r: 130, g: 110, b: 90 }, Color::Rgb { r: 70, g: 58, b: 45 });
        }
        self.draw_tile(w, w.entry.x, w.entry.y, '=', '=',
            Color::Rgb { r: 90, g: 200, b: 110 }, Color::Rgb { r: 20, g: 60, b: 30 });
        for exit in &w.exits {
            let (fg, bg) = if w.player.key_collected {
                (Color::Rgb { r: 240, g: 210, b: 70 }, Color::Rgb { r: 90, g: 70, b: 10 })
            } else {
                (Color::Rgb { r: 150, g: 130, b: 60 }, Color::Rgb { r: 50, g: 42, b: 15 })
            };
            self.draw_tile(w, exit.x, exit.y, 'D', ' ', fg, bg);
        }
        for trap in &w.traps {
            self.draw_at(w, trap.x, trap.y, 'x', Color::Rgb { r: 200, g: 70, b: 50 });
        }
        if !w.player.key_collected {
            self.draw_at(w, w.key.x, w.key.y, 'k', Color::Rgb { r: 245, g: 215, b: 80 });
        }
        for enemy in &w.enemies {
            self.draw_at(w, enemy.x, enemy.y, 'M', Color::Rgb { r: 230, g: 100, b: 150 });
        }

        let player_ch = match w.player.facing {
            Facing::Up => '^',
            Facing::Down => 'v',
            Facing::Left => '<',
            Facing::Right => '>',
            Facing::Exiting => '*',
        };
        self.draw_at(w, w.player.x, w.player.y, player_ch, Color::Rgb { r: 120, g: 210, b: 255 });

        // Message bar
        let msg_row = MAP_ROW + w.grid_h as usize + 1;
        if !message.is_empty() && msg_row < self.front.height {
            self.front.fill_row(msg_row, MSG_BG);
            self.front.put_str(0, msg_row, &format!(" {} ", message), Color::Black, MSG_BG);
        }

        // Help bar
        let help_row = MAP_ROW + w.grid_h as usize + 3;
        if help_row < self.front.height {
            let help = " Arrows/WASD:Move  ESC:Pause";
            self.front.put_str(0, help_row, help, Color::DarkGrey, Color::Reset);
        }
    }

    /// Terminal position for a world-unit coordinate. World y grows up,
    /// terminal rows grow down.
    fn cell_pos(&self, w: &WorldState, x: f32, y: f32) -> Option<(usize, usize)> {
        let gx = (x / TILE).floor() as i64;
        let gy = (y / TILE).floor() as i64;
        if gx < 0 || gy < 0 || gx >= w.grid_w as i64 || gy >= w.grid_h as i64 {
            return None;
        }
        let col = gx as usize * CELL_W;
        let row = MAP_ROW + (w.grid_h as usize - 1 - gy as usize);
        Some((col, row))
    }

    /// Draw a full tile (both columns) at a tile-aligned position.
    fn draw_tile(&mut self, w: &WorldState, x: f32, y: f32, c0: char, c1: char, fg: Color, bg: Color) {
        if let Some((col, row)) = self.cell_pos(w, x, y) {
            self.front.set(col, row, Cell::new(c0, fg, bg));
            self.front.set(col + 1, row, Cell::new(c1, fg, bg));
        }
    }

    /// Draw a single glyph at the tile containing an entity's center.
    fn draw_at(&mut self, w: &WorldState, x: f32, y: f32, ch: char, fg: Color) {
        let cx = x + 12.0;
        let cy = y + 20.0;
        if let Some((col, row)) = self.cell_pos(w, cx, cy) {
            // Keep whatever background the tile underneath painted.
            let bg = self.front.get(col, row).bg;
            self.front.set(col, row, Cell::new(ch, fg, bg));
        }
    }

    // ── Title screen ──

    fn compose_title(&mut self, levels: &[LevelInfo], selected: usize, has_save: bool, notice: &str) {
        let cx = self.front.width / 2;

        let logo = "M A Z E B O U N D";
        let lx = cx.saturating_sub(logo.chars().count() / 2);
        self.front.put_str(lx, 2, logo, Color::Rgb { r: 240, g: 210, b: 70 }, Color::Reset);

        let sub = "grab the key, find the door";
        let sx = cx.saturating_sub(sub.chars().count() / 2);
        self.front.put_str(sx, 4, sub, Color::DarkGrey, Color::Reset);

        // Menu: optional Continue entry, then the level list.
        let mut row = 7;
        let mut idx = 0;

        if has_save {
            self.put_menu_item(cx, row, "Continue", idx == selected);
            row += 2;
            idx += 1;
        }

        for level in levels {
            if row >= self.front.height.saturating_sub(2) {
                break;
            }
            self.put_menu_item(cx, row, &level.name, idx == selected);
            row += 1;
            idx += 1;
        }

        if !notice.is_empty() {
            let nx = cx.saturating_sub(notice.chars().count() / 2);
            let ny = self.front.height.saturating_sub(4);
            self.front.put_str(nx, ny, notice, Color::Rgb { r: 220, g: 120, b: 80 }, Color::Reset);
        }

        let help = "Up/Down:Select  Enter:Play  Q:Quit";
        let hx = cx.saturating_sub(help.chars().count() / 2);
        let hy = self.front.height.saturating_sub(2);
        self.front.put_str(hx, hy, help, Color::DarkGrey, Color::Reset);
    }

    fn put_menu_item(&mut self, cx: usize, row: usize, label: &str, selected: bool) {
        let text = if selected {
            format!("> {} <", label)
        } else {
            format!("  {}  ", label)
        };
        let x = cx.saturating_sub(text.chars().count() / 2);
        let fg = if selected { Color::White } else { Color::Grey };
        let bg = if selected { Color::Rgb { r: 50, g: 50, b: 110 } } else { Color::Reset };
        self.front.put_str(x, row, &text, fg, bg);
    }

    // ── Overlays ──

    fn compose_pause_overlay(&mut self, selected: usize) {
        let items = ["Resume", "Exit to title", "Quit game"];
        let cx = self.front.width / 2;
        let top = (self.front.height / 2).saturating_sub(3);

        self.put_boxed_line(cx, top, "PAUSED", Color::White);
        for (i, item) in items.iter().enumerate() {
            self.put_menu_item(cx, top + 2 + i, item, i == selected);
        }
    }

    fn compose_end_overlay(&mut self, title: &str, detail: &str, color: Color) {
        let cx = self.front.width / 2;
        let top = (self.front.height / 2).saturating_sub(2);

        self.put_boxed_line(cx, top, title, color);
        let dx = cx.saturating_sub(detail.chars().count() / 2);
        self.front.put_str(dx, top + 2, detail, Color::White, Color::Reset);

        let help = "ESC: back to title";
        let hx = cx.saturating_sub(help.chars().count() / 2);
        self.front.put_str(hx, top + 4, help, Color::DarkGrey, Color::Reset);
    }

    fn put_boxed_line(&mut self, cx: usize, row: usize, text: &str, fg: Color) {
        let banner = format!("  {}  ", text);
        let x = cx.saturating_sub(banner.chars().count() / 2);
        self.front.put_str(x, row, &banner, fg, Color::Rgb { r: 35, g: 35, b: 55 });
    }
}

/// m:ss from accumulated seconds.
fn fmt_time(secs: f64) -> String {
    let total = secs as u64;
    format!("{}:{:02}", total / 60, total % 60)
}
