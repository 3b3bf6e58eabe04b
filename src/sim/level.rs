/// Level loader.
///
/// ## Sources:
///   1. Built-in embedded levels (ASCII grids compiled into the binary)
///   2. Custom `.properties` map files from the configured maps directory
///
/// ## Map file format (`.properties`):
///   One cell per line, `<col>,<row> = <code>`. Blank lines and lines
///   starting with `#` or `!` are comments. Object codes:
///     0 = Wall   1 = Entry   2 = Exit
///     3 = Trap   4 = Enemy   5 = Key
///   World position = grid coordinate × 64. Unknown codes produce no
///   entity (counted and surfaced as a warning, never fatal). A map with
///   no Entry or no Key is rejected; the session refuses to start.
///
/// ## Embedded ASCII legend:
///   '#' = Wall   'D' = Entry   'X' = Exit
///   'T' = Trap   'E' = Enemy   'K' = Key
///   ' ' = open floor
/// Rows are listed top-to-bottom; world y grows upward, so row 0 is the
/// highest grid row.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use crate::domain::entity::{
    Enemy, Entry, ExitDoor, KeyItem, LevelObject, Trap, Wall,
};
use crate::domain::physics::TILE;
use crate::config::GameConfig;

// ══════════════════════════════════════════════════════════════
// Public types
// ══════════════════════════════════════════════════════════════

/// Where a level's definition comes from.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum LevelSource {
    BuiltIn(usize),
    Custom(PathBuf),
}

/// One entry in the level list shown on the title screen.
#[derive(Clone, Debug)]
pub struct LevelInfo {
    pub name: String,
    pub source: LevelSource,
}

/// A successfully parsed level, ready to be partitioned into the
/// world's working sets.
#[derive(Debug)]
pub struct ParsedLevel {
    pub objects: Vec<LevelObject>,
    /// Cells whose object code was not recognized (non-fatal).
    pub skipped: usize,
}

/// Why a level failed to load. Any of these aborts session start.
#[derive(Debug)]
pub enum LoadError {
    Io(PathBuf, io::Error),
    MalformedLine { line_no: usize, line: String },
    BadCoordinate { line_no: usize, token: String },
    BadCode { line_no: usize, token: String },
    MissingEntry,
    MissingKey,
    NoSuchLevel(usize),
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::Io(path, e) => {
                write!(f, "could not read map {}: {}", path.display(), e)
            }
            LoadError::MalformedLine { line_no, line } => {
                write!(f, "line {}: expected `col,row = code`, got `{}`", line_no, line)
            }
            LoadError::BadCoordinate { line_no, token } => {
                write!(f, "line {}: bad grid coordinate `{}`", line_no, token)
            }
            LoadError::BadCode { line_no, token } => {
                write!(f, "line {}: object code `{}` is not an integer", line_no, token)
            }
            LoadError::MissingEntry => write!(f, "map has no entry tile"),
            LoadError::MissingKey => write!(f, "map has no key"),
            LoadError::NoSuchLevel(idx) => write!(f, "no built-in level {}", idx + 1),
        }
    }
}

impl std::error::Error for LoadError {}

// ══════════════════════════════════════════════════════════════
// Public API
// ══════════════════════════════════════════════════════════════

/// Load and validate a level from its source.
pub fn load_source(source: &LevelSource) -> Result<ParsedLevel, LoadError> {
    let parsed = match source {
        LevelSource::BuiltIn(idx) => {
            let levels = embedded_levels();
            let (_, rows) = levels.get(*idx).ok_or(LoadError::NoSuchLevel(*idx))?;
            parse_ascii(rows)
        }
        LevelSource::Custom(path) => {
            let text = std::fs::read_to_string(path)
                .map_err(|e| LoadError::Io(path.clone(), e))?;
            parse_properties(&text)?
        }
    };
    validate(parsed)
}

/// Full level list: built-ins first, then custom maps from the maps dir.
pub fn list_levels(config: &GameConfig) -> Vec<LevelInfo> {
    let mut list: Vec<LevelInfo> = embedded_levels()
        .iter()
        .enumerate()
        .map(|(i, (name, _))| LevelInfo {
            name: (*name).to_string(),
            source: LevelSource::BuiltIn(i),
        })
        .collect();

    let mut custom = scan_maps_dir(&config.maps_dir);
    custom.sort_by(|a, b| a.name.cmp(&b.name));
    list.extend(custom);
    list
}

/// Parse the `col,row = code` text format.
pub fn parse_properties(text: &str) -> Result<ParsedLevel, LoadError> {
    let mut objects = vec![];
    let mut skipped = 0usize;

    for (i, raw) in text.lines().enumerate() {
        let line_no = i + 1;
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
            continue;
        }

        let (coord, value) = line.split_once('=').ok_or_else(|| {
            LoadError::MalformedLine { line_no, line: line.to_string() }
        })?;

        let (col_tok, row_tok) = coord.trim().split_once(',').ok_or_else(|| {
            LoadError::BadCoordinate { line_no, token: coord.trim().to_string() }
        })?;
        let col: i32 = col_tok.trim().parse().map_err(|_| {
            LoadError::BadCoordinate { line_no, token: col_tok.trim().to_string() }
        })?;
        let row: i32 = row_tok.trim().parse().map_err(|_| {
            LoadError::BadCoordinate { line_no, token: row_tok.trim().to_string() }
        })?;

        let code: i32 = value.trim().parse().map_err(|_| {
            LoadError::BadCode { line_no, token: value.trim().to_string() }
        })?;

        let x = col as f32 * TILE;
        let y = row as f32 * TILE;
        match object_from_code(code, x, y) {
            Some(obj) => objects.push(obj),
            None => skipped += 1,
        }
    }

    Ok(ParsedLevel { objects, skipped })
}

// ══════════════════════════════════════════════════════════════
// Internal
// ══════════════════════════════════════════════════════════════

fn object_from_code(code: i32, x: f32, y: f32) -> Option<LevelObject> {
    match code {
        0 => Some(LevelObject::Wall(Wall::new(x, y))),
        1 => Some(LevelObject::Entry(Entry::new(x, y))),
        2 => Some(LevelObject::Exit(ExitDoor::new(x, y))),
        3 => Some(LevelObject::Trap(Trap::new(x, y))),
        4 => Some(LevelObject::Enemy(Enemy::new(x, y))),
        5 => Some(LevelObject::Key(KeyItem::new(x, y))),
        _ => None,
    }
}

/// Every map needs an entry to spawn at and a key to win with.
fn validate(parsed: ParsedLevel) -> Result<ParsedLevel, LoadError> {
    let has_entry = parsed.objects.iter().any(|o| matches!(o, LevelObject::Entry(_)));
    let has_key = parsed.objects.iter().any(|o| matches!(o, LevelObject::Key(_)));
    if !has_entry {
        return Err(LoadError::MissingEntry);
    }
    if !has_key {
        return Err(LoadError::MissingKey);
    }
    Ok(parsed)
}

fn parse_ascii(rows: &[&str]) -> ParsedLevel {
    let height = rows.len();
    let mut objects = vec![];

    for (row_idx, row) in rows.iter().enumerate() {
        // Row 0 is drawn at the top; world y grows upward.
        let grid_y = (height - 1 - row_idx) as f32;
        for (col_idx, ch) in row.chars().enumerate() {
            let code = match ch {
                '#' => 0,
                'D' => 1,
                'X' => 2,
                'T' => 3,
                'E' => 4,
                'K' => 5,
                _ => continue,
            };
            let x = col_idx as f32 * TILE;
            let y = grid_y * TILE;
            if let Some(obj) = object_from_code(code, x, y) {
                objects.push(obj);
            }
        }
    }

    ParsedLevel { objects, skipped: 0 }
}

fn scan_maps_dir(dir: &Path) -> Vec<LevelInfo> {
    let mut results = vec![];

    let entries = match std::fs::read_dir(dir) {
        Ok(e) => e,
        Err(_) => return results,
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if path.extension().map_or(false, |e| e == "properties") {
            let name = path
                .file_stem()
                .unwrap_or_default()
                .to_string_lossy()
                .to_string();
            results.push(LevelInfo {
                name,
                source: LevelSource::Custom(path),
            });
        }
    }

    results
}

// ══════════════════════════════════════════════════════════════
// Embedded built-in levels
// ══════════════════════════════════════════════════════════════

pub fn embedded_levels() -> Vec<(&'static str, &'static [&'static str])> {
    vec![
        ("The First Door", &[
            "############",
            "#      T   #",
            "# ## ## ## #",
            "D  E       #",
            "# ## ## ## #",
            "#    K   E #",
            "# ## ## ## X",
            "#          #",
            "############",
        ] as &[&str]),
        ("Crossways", &[
            "############",
            "#   #    E #",
            "# # # ## # #",
            "# #   ## # #",
            "D # #    # #",
            "# # # ## # #",
            "#   # #K   #",
            "# T   # ## X",
            "############",
        ]),
        ("Spiral Keep", &[
            "############",
            "#        E #",
            "# ######## #",
            "# #  T   # #",
            "D # #### # #",
            "# # #K # # #",
            "# # ## # # X",
            "#   E  #   #",
            "############",
        ]),
        ("The Gauntlet", &[
            "############",
            "D     T    #",
            "#### ### ###",
            "#  E     E #",
            "## ### ### #",
            "#  T     K #",
            "#### ### # #",
            "#        E X",
            "############",
        ]),
        ("Long Way Round", &[
            "############",
            "#K #     E #",
            "#  # ### # #",
            "## #   # # #",
            "D  ### # # #",
            "#      # # #",
            "#  # ### # #",
            "# T#     E X",
            "############",
        ]),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count<F: Fn(&LevelObject) -> bool>(objs: &[LevelObject], f: F) -> usize {
        objs.iter().filter(|o| f(o)).count()
    }

    #[test]
    fn parse_minimal_properties_map() {
        let text = "\
# test map
0,0 = 0
1,0 = 1
2,0 = 5
3,0 = 2
";
        let parsed = parse_properties(text).unwrap();
        assert_eq!(parsed.objects.len(), 4);
        assert_eq!(parsed.skipped, 0);
        // Grid coordinates scale by 64.
        match &parsed.objects[1] {
            LevelObject::Entry(e) => assert_eq!((e.x, e.y), (64.0, 0.0)),
            other => panic!("expected entry, got {:?}", other),
        }
        match &parsed.objects[3] {
            LevelObject::Exit(e) => assert_eq!((e.x, e.y), (192.0, 0.0)),
            other => panic!("expected exit, got {:?}", other),
        }
    }

    #[test]
    fn unknown_codes_are_skipped_not_fatal() {
        let text = "0,0 = 1\n1,0 = 5\n2,0 = 9\n3,0 = 42\n";
        let parsed = parse_properties(text).unwrap();
        assert_eq!(parsed.objects.len(), 2);
        assert_eq!(parsed.skipped, 2);
    }

    #[test]
    fn malformed_coordinate_is_an_error() {
        let err = parse_properties("a,b = 0\n").unwrap_err();
        assert!(matches!(err, LoadError::BadCoordinate { line_no: 1, .. }));
    }

    #[test]
    fn non_integer_code_is_an_error() {
        let err = parse_properties("0,0 = wall\n").unwrap_err();
        assert!(matches!(err, LoadError::BadCode { line_no: 1, .. }));
    }

    #[test]
    fn line_without_equals_is_an_error() {
        let err = parse_properties("0,0 0\n").unwrap_err();
        assert!(matches!(err, LoadError::MalformedLine { .. }));
    }

    #[test]
    fn map_without_entry_is_rejected() {
        let parsed = parse_properties("0,0 = 0\n1,0 = 5\n").unwrap();
        let err = validate(parsed).unwrap_err();
        assert!(matches!(err, LoadError::MissingEntry));
    }

    #[test]
    fn map_without_key_is_rejected() {
        let parsed = parse_properties("0,0 = 1\n1,0 = 2\n").unwrap();
        let err = validate(parsed).unwrap_err();
        assert!(matches!(err, LoadError::MissingKey));
    }

    #[test]
    fn all_builtins_validate() {
        for i in 0..embedded_levels().len() {
            let parsed = load_source(&LevelSource::BuiltIn(i)).unwrap();
            assert_eq!(count(&parsed.objects, |o| matches!(o, LevelObject::Entry(_))), 1);
            assert_eq!(count(&parsed.objects, |o| matches!(o, LevelObject::Key(_))), 1);
            assert!(count(&parsed.objects, |o| matches!(o, LevelObject::Exit(_))) >= 1);
            assert!(count(&parsed.objects, |o| matches!(o, LevelObject::Wall(_))) > 10);
        }
    }

    #[test]
    fn ascii_rows_map_to_world_top_down() {
        // Entry in the top-left of a 2-row grid sits at the higher y.
        let parsed = parse_ascii(&["DK", "##"]);
        let entry = parsed.objects.iter().find_map(|o| match o {
            LevelObject::Entry(e) => Some(*e),
            _ => None,
        });
        let e = entry.unwrap();
        assert_eq!((e.x, e.y), (0.0, 64.0));
    }
}
