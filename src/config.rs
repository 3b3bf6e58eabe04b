/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Falls back to sensible defaults if the file is missing or incomplete.

use serde::Deserialize;
use std::path::PathBuf;

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub tuning: TuningConfig,
    pub maps_dir: PathBuf,
}

/// Simulation tunables. The defaults reproduce the classic feel:
/// player faster than enemies, short grace window before a hit counts,
/// a brief dwell on the exit before the level completes.
#[derive(Clone, Debug)]
pub struct TuningConfig {
    pub player_speed: f32,
    pub enemy_speed: f32,
    /// Continuous-overlap seconds before an enemy or trap costs a life.
    pub damage_overlap_secs: f32,
    /// Continuous-overlap seconds on the exit (with key) before winning.
    pub exit_dwell_secs: f32,
    pub wander_interval_min: f32,
    pub wander_interval_max: f32,
    pub starting_lives: u32,
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    tuning: TomlTuning,
    #[serde(default)]
    general: TomlGeneral,
}

#[derive(Deserialize, Debug)]
struct TomlTuning {
    #[serde(default = "default_player_speed")]
    player_speed: f32,
    #[serde(default = "default_enemy_speed")]
    enemy_speed: f32,
    #[serde(default = "default_damage_overlap")]
    damage_overlap_secs: f32,
    #[serde(default = "default_exit_dwell")]
    exit_dwell_secs: f32,
    #[serde(default = "default_wander_min")]
    wander_interval_min: f32,
    #[serde(default = "default_wander_max")]
    wander_interval_max: f32,
    #[serde(default = "default_lives")]
    starting_lives: u32,
}

#[derive(Deserialize, Debug)]
struct TomlGeneral {
    #[serde(default = "default_maps_dir")]
    maps_dir: String,
}

// ── Defaults ──

fn default_player_speed() -> f32 { 200.0 }
fn default_enemy_speed() -> f32 { 125.0 }
fn default_damage_overlap() -> f32 { 0.2 }
fn default_exit_dwell() -> f32 { 0.1 }
fn default_wander_min() -> f32 { crate::domain::wander::INTERVAL_MIN }
fn default_wander_max() -> f32 { crate::domain::wander::INTERVAL_MAX }
fn default_lives() -> u32 { 5 }
fn default_maps_dir() -> String { "maps".into() }

impl Default for TomlTuning {
    fn default() -> Self {
        TomlTuning {
            player_speed: default_player_speed(),
            enemy_speed: default_enemy_speed(),
            damage_overlap_secs: default_damage_overlap(),
            exit_dwell_secs: default_exit_dwell(),
            wander_interval_min: default_wander_min(),
            wander_interval_max: default_wander_max(),
            starting_lives: default_lives(),
        }
    }
}

impl Default for TomlGeneral {
    fn default() -> Self {
        TomlGeneral { maps_dir: default_maps_dir() }
    }
}

impl Default for TuningConfig {
    fn default() -> Self {
        let t = TomlTuning::default();
        TuningConfig {
            player_speed: t.player_speed,
            enemy_speed: t.enemy_speed,
            damage_overlap_secs: t.damage_overlap_secs,
            exit_dwell_secs: t.exit_dwell_secs,
            wander_interval_min: t.wander_interval_min,
            wander_interval_max: t.wander_interval_max,
            starting_lives: t.starting_lives,
        }
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory.
    /// Missing file or missing keys gracefully fall back to defaults.
    pub fn load() -> Self {
        let search_dirs = candidate_dirs();
        let toml_cfg = load_toml(&search_dirs);

        // Resolve maps directory
        let maps_dir_str = &toml_cfg.general.maps_dir;
        let maps_dir = if PathBuf::from(maps_dir_str).is_absolute() {
            PathBuf::from(maps_dir_str)
        } else {
            search_dirs
                .iter()
                .map(|d| d.join(maps_dir_str))
                .find(|p| p.is_dir())
                .unwrap_or_else(|| PathBuf::from(maps_dir_str))
        };

        GameConfig {
            tuning: TuningConfig {
                player_speed: toml_cfg.tuning.player_speed,
                enemy_speed: toml_cfg.tuning.enemy_speed,
                damage_overlap_secs: toml_cfg.tuning.damage_overlap_secs,
                exit_dwell_secs: toml_cfg.tuning.exit_dwell_secs,
                wander_interval_min: toml_cfg.tuning.wander_interval_min,
                wander_interval_max: toml_cfg.tuning.wander_interval_max,
                starting_lives: toml_cfg.tuning.starting_lives,
            },
            maps_dir,
        }
    }
}

/// Candidate directories to search: exe dir + CWD (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

/// Search for config.toml in candidate directories.
fn load_toml(search_dirs: &[PathBuf]) -> TomlConfig {
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(text) => match toml::from_str::<TomlConfig>(&text) {
                    Ok(cfg) => return cfg,
                    Err(e) => {
                        eprintln!("Warning: config.toml parse error: {e}");
                        eprintln!("Using default settings.");
                        return TomlConfig::default();
                    }
                },
                Err(e) => {
                    eprintln!("Warning: could not read {}: {e}", path.display());
                }
            }
        }
    }
    TomlConfig::default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_classic_tuning() {
        let t = TuningConfig::default();
        assert_eq!(t.player_speed, 200.0);
        assert_eq!(t.enemy_speed, 125.0);
        assert_eq!(t.damage_overlap_secs, 0.2);
        assert_eq!(t.exit_dwell_secs, 0.1);
        assert_eq!(t.starting_lives, 5);
    }

    #[test]
    fn partial_toml_fills_in_defaults() {
        let cfg: TomlConfig = toml::from_str("[tuning]\nplayer_speed = 150.0\n").unwrap();
        assert_eq!(cfg.tuning.player_speed, 150.0);
        assert_eq!(cfg.tuning.enemy_speed, 125.0);
        assert_eq!(cfg.general.maps_dir, "maps");
    }
}
