/// Pause/resume snapshots.
///
/// A snapshot captures the minimum needed to put a session back where
/// it was: which level, where the player stands, the key flag, and the
/// lives left. Custom maps additionally record their source path so
/// resume can re-open the same file.
///
/// On-disk format is plain `key=value` lines, one file, overwritten on
/// every pause:
///
///   level=2
///   playerX=143.5
///   playerY=210
///   isKeyCollected=true
///   livesLeft=3
///   filePath=maps/mine.properties   (custom maps only; level=-1)

use std::io;
use std::path::PathBuf;

use crate::sim::level::LevelSource;
use crate::sim::world::WorldState;

const SAVE_FILE: &str = "mazebound.sav";

#[derive(Clone, PartialEq, Debug)]
pub struct Snapshot {
    pub source: LevelSource,
    pub player_x: f32,
    pub player_y: f32,
    pub key_collected: bool,
    pub lives_left: u32,
}

/// Capture the resumable state of a running session. Pure read of the
/// world: capturing twice without an intervening frame yields identical
/// snapshots.
pub fn capture(world: &WorldState) -> Snapshot {
    Snapshot {
        source: world.level.source.clone(),
        player_x: world.player.x,
        player_y: world.player.y,
        key_collected: world.player.key_collected,
        lives_left: world.player.lives,
    }
}

/// Re-seed a freshly loaded world from a snapshot. The level itself has
/// already been reloaded from `snapshot.source`; this restores only the
/// player's session facts.
pub fn apply(snapshot: &Snapshot, world: &mut WorldState) {
    world.player.x = snapshot.player_x;
    world.player.y = snapshot.player_y;
    world.player.prev_x = snapshot.player_x;
    world.player.prev_y = snapshot.player_y;
    world.player.key_collected = snapshot.key_collected;
    world.player.lives = snapshot.lives_left;
}

pub fn serialize(snapshot: &Snapshot) -> String {
    let mut out = String::new();
    match &snapshot.source {
        LevelSource::BuiltIn(idx) => {
            out.push_str(&format!("level={}\n", idx));
        }
        LevelSource::Custom(path) => {
            out.push_str("level=-1\n");
            out.push_str(&format!("filePath={}\n", path.display()));
        }
    }
    out.push_str(&format!("playerX={}\n", snapshot.player_x));
    out.push_str(&format!("playerY={}\n", snapshot.player_y));
    out.push_str(&format!("isKeyCollected={}\n", snapshot.key_collected));
    out.push_str(&format!("livesLeft={}\n", snapshot.lives_left));
    out
}

/// Parse a saved snapshot. Returns None on any missing or malformed
/// field; a broken save file is treated as no save at all.
pub fn parse(text: &str) -> Option<Snapshot> {
    let mut level: Option<i64> = None;
    let mut file_path: Option<String> = None;
    let mut player_x: Option<f32> = None;
    let mut player_y: Option<f32> = None;
    let mut key_collected: Option<bool> = None;
    let mut lives_left: Option<u32> = None;

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let (key, value) = line.split_once('=')?;
        match key.trim() {
            "level" => level = Some(value.trim().parse().ok()?),
            "filePath" => file_path = Some(value.trim().to_string()),
            "playerX" => player_x = Some(value.trim().parse().ok()?),
            "playerY" => player_y = Some(value.trim().parse().ok()?),
            "isKeyCollected" => key_collected = Some(value.trim().parse().ok()?),
            "livesLeft" => lives_left = Some(value.trim().parse().ok()?),
            _ => {} // unknown keys are ignored for forward compatibility
        }
    }

    let source = match level? {
        -1 => LevelSource::Custom(PathBuf::from(file_path?)),
        idx if idx >= 0 => LevelSource::BuiltIn(idx as usize),
        _ => return None,
    };

    Some(Snapshot {
        source,
        player_x: player_x?,
        player_y: player_y?,
        key_collected: key_collected?,
        lives_left: lives_left?,
    })
}

// ── Disk I/O ──

/// Save file candidates, in priority order: next to the executable,
/// then the current working directory.
fn candidate_paths() -> Vec<PathBuf> {
    let mut paths = vec![];
    if let Ok(exe) = std::env::current_exe() {
        if let Some(dir) = exe.parent() {
            paths.push(dir.join(SAVE_FILE));
        }
    }
    paths.push(PathBuf::from(SAVE_FILE));
    paths
}

pub fn write_save(snapshot: &Snapshot) -> io::Result<()> {
    let text = serialize(snapshot);
    let mut last_err = None;
    for path in candidate_paths() {
        match std::fs::write(&path, &text) {
            Ok(()) => return Ok(()),
            Err(e) => last_err = Some(e),
        }
    }
    Err(last_err.unwrap_or_else(|| io::Error::new(io::ErrorKind::Other, "no writable save location")))
}

pub fn read_save() -> Option<Snapshot> {
    for path in candidate_paths() {
        let text = match std::fs::read_to_string(&path) {
            Ok(t) => t,
            Err(_) => continue,
        };
        let snapshot = parse(&text)?;
        // A saved position is only resumable if its source still exists.
        if let LevelSource::Custom(source) = &snapshot.source {
            if !source.is_file() {
                return None;
            }
        }
        return Some(snapshot);
    }
    None
}

pub fn delete_save() {
    for path in candidate_paths() {
        let _ = std::fs::remove_file(path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TuningConfig;
    use crate::sim::level::{load_source, LevelInfo};

    fn test_world() -> WorldState {
        let source = LevelSource::BuiltIn(1);
        let parsed = load_source(&source).unwrap();
        let info = LevelInfo { name: "test".into(), source };
        WorldState::with_seed(parsed, info, TuningConfig::default(), 9).unwrap()
    }

    #[test]
    fn capture_is_idempotent() {
        let w = test_world();
        assert_eq!(capture(&w), capture(&w));
    }

    #[test]
    fn builtin_snapshot_round_trips() {
        let mut w = test_world();
        w.player.x = 123.5;
        w.player.y = 456.0;
        w.player.key_collected = true;
        w.player.lives = 2;

        let snap = capture(&w);
        let parsed = parse(&serialize(&snap)).unwrap();
        assert_eq!(parsed, snap);
        assert_eq!(parsed.source, LevelSource::BuiltIn(1));
    }

    #[test]
    fn custom_snapshot_keeps_its_file_path() {
        let snap = Snapshot {
            source: LevelSource::Custom(PathBuf::from("maps/mine.properties")),
            player_x: 64.0,
            player_y: 128.0,
            key_collected: false,
            lives_left: 5,
        };
        let text = serialize(&snap);
        assert!(text.contains("level=-1"));
        assert!(text.contains("filePath=maps/mine.properties"));
        assert_eq!(parse(&text).unwrap(), snap);
    }

    #[test]
    fn apply_restores_the_player() {
        let mut w = test_world();
        let snap = Snapshot {
            source: w.level.source.clone(),
            player_x: 200.0,
            player_y: 300.0,
            key_collected: true,
            lives_left: 1,
        };
        apply(&snap, &mut w);
        assert_eq!((w.player.x, w.player.y), (200.0, 300.0));
        assert_eq!((w.player.prev_x, w.player.prev_y), (200.0, 300.0));
        assert!(w.player.key_collected);
        assert_eq!(w.player.lives, 1);
    }

    #[test]
    fn broken_saves_parse_to_none() {
        assert!(parse("").is_none());
        assert!(parse("level=0\nplayerX=oops\n").is_none());
        assert!(parse("playerX=1\nplayerY=2\n").is_none()); // no level
        assert!(parse("level=-1\nplayerX=1\nplayerY=2\nisKeyCollected=false\nlivesLeft=5\n").is_none()); // custom without path
    }
}
