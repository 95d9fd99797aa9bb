/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Falls back to defaults if the file is missing or incomplete; a file that
/// does not parse is reported through the log and ignored.
///
/// The prefab catalog lives here too: lock flags and obstacle behaviour
/// belong to a prop prefab, stage files only reference prefab indices.

use serde::Deserialize;
use std::path::PathBuf;

use log::warn;

use crate::domain::catalog::{Catalog, Locks, PropBehavior, PropPrefab, TilePrefab};
use crate::domain::direction::Direction;
use crate::domain::physics::MotionParams;

pub const MAX_PLAYERS: usize = 4;

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub speed: SpeedConfig,
    pub motion: MotionParams,
    pub gamepad: GamepadConfig,
    pub stages_dir: PathBuf,
    /// Stage requested at start.
    pub stage: String,
    /// Contestants, clamped to `1..=MAX_PLAYERS`.
    pub players: usize,
    pub catalog: Catalog,
}

#[derive(Clone, Debug)]
pub struct SpeedConfig {
    pub tick_rate_ms: u64,
}

#[derive(Clone, Debug)]
pub struct GamepadConfig {
    pub reset: Vec<String>,
    pub quit: Vec<String>,
}

impl SpeedConfig {
    /// Fixed simulation step in seconds.
    pub fn dt(&self) -> f32 {
        self.tick_rate_ms.max(1) as f32 / 1000.0
    }
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    general: TomlGeneral,
    #[serde(default)]
    speed: TomlSpeed,
    #[serde(default)]
    motion: TomlMotion,
    #[serde(default)]
    gamepad: TomlGamepad,
    #[serde(default)]
    catalog: TomlCatalog,
}

#[derive(Deserialize, Debug)]
struct TomlGeneral {
    #[serde(default = "default_stages_dir")]
    stages_dir: String,
    #[serde(default = "default_stage")]
    stage: String,
    #[serde(default = "default_players")]
    players: usize,
}

#[derive(Deserialize, Debug)]
struct TomlSpeed {
    #[serde(default = "default_tick_rate")]
    tick_rate_ms: u64,
}

#[derive(Deserialize, Debug)]
struct TomlMotion {
    #[serde(default = "default_axis_min")]
    axis_min: f32,
    #[serde(default = "default_acceleration")]
    acceleration: f32,
    #[serde(default = "default_max_velocity")]
    max_velocity: f32,
    #[serde(default = "default_stun_time")]
    stun_time: f32,
    #[serde(default = "default_stun_invulnerable")]
    stun_invulnerable: f32,
    #[serde(default = "default_immovable_spawn")]
    immovable_spawn_time: f32,
}

#[derive(Deserialize, Debug)]
struct TomlGamepad {
    #[serde(default = "default_reset")]
    reset: Vec<String>,
    #[serde(default = "default_quit")]
    quit: Vec<String>,
}

/// Every list falls back to the built-in catalog independently.
#[derive(Deserialize, Debug, Default)]
struct TomlCatalog {
    #[serde(default)]
    tiles: Option<Vec<TomlTile>>,
    #[serde(default)]
    props: Option<Vec<TomlProp>>,
    #[serde(default)]
    characters: Option<Vec<String>>,
}

#[derive(Deserialize, Debug)]
struct TomlTile {
    name: String,
    #[serde(default = "default_variants")]
    variants: u32,
}

#[derive(Deserialize, Debug)]
struct TomlProp {
    name: String,
    #[serde(default = "default_variants")]
    variants: u32,
    #[serde(default)]
    behavior: TomlBehavior,
    #[serde(default)]
    locked: Vec<String>,
}

#[derive(Deserialize, Debug, Default, Clone, Copy)]
#[serde(rename_all = "lowercase")]
enum TomlBehavior {
    #[default]
    Block,
    Obstacle,
}

// ── Defaults ──

fn default_stages_dir() -> String { "stages".into() }
fn default_stage() -> String { "living_room".into() }
fn default_players() -> usize { 2 }
fn default_tick_rate() -> u64 { 16 }
fn default_variants() -> u32 { 1 }

fn default_axis_min() -> f32 { MotionParams::default().axis_min }
fn default_acceleration() -> f32 { MotionParams::default().acceleration }
fn default_max_velocity() -> f32 { MotionParams::default().max_velocity }
fn default_stun_time() -> f32 { MotionParams::default().stun_time }
fn default_stun_invulnerable() -> f32 { MotionParams::default().stun_invulnerable }
fn default_immovable_spawn() -> f32 { MotionParams::default().immovable_spawn_time }

fn default_reset() -> Vec<String> { vec!["Start".into()] }
fn default_quit() -> Vec<String> { vec!["Select".into()] }

impl Default for TomlGeneral {
    fn default() -> Self {
        TomlGeneral {
            stages_dir: default_stages_dir(),
            stage: default_stage(),
            players: default_players(),
        }
    }
}

impl Default for TomlSpeed {
    fn default() -> Self {
        TomlSpeed { tick_rate_ms: default_tick_rate() }
    }
}

impl Default for TomlMotion {
    fn default() -> Self {
        TomlMotion {
            axis_min: default_axis_min(),
            acceleration: default_acceleration(),
            max_velocity: default_max_velocity(),
            stun_time: default_stun_time(),
            stun_invulnerable: default_stun_invulnerable(),
            immovable_spawn_time: default_immovable_spawn(),
        }
    }
}

impl Default for TomlGamepad {
    fn default() -> Self {
        TomlGamepad { reset: default_reset(), quit: default_quit() }
    }
}

impl From<TomlBehavior> for PropBehavior {
    fn from(b: TomlBehavior) -> Self {
        match b {
            TomlBehavior::Block => PropBehavior::Block,
            TomlBehavior::Obstacle => PropBehavior::Obstacle,
        }
    }
}

impl TomlCatalog {
    fn build(self) -> Catalog {
        let defaults = Catalog::default();
        Catalog {
            tiles: match self.tiles {
                Some(tiles) => tiles
                    .into_iter()
                    .map(|t| TilePrefab { name: t.name, variants: t.variants.max(1) })
                    .collect(),
                None => defaults.tiles,
            },
            props: match self.props {
                Some(props) => props.into_iter().map(TomlProp::build).collect(),
                None => defaults.props,
            },
            characters: self.characters.unwrap_or(defaults.characters),
        }
    }
}

impl TomlProp {
    fn build(self) -> PropPrefab {
        let mut locks = Locks::NONE;
        for name in &self.locked {
            match parse_direction(name) {
                Some(d) => locks.lock(d),
                None => warn!("prop {}: unknown lock direction {name:?}", self.name),
            }
        }
        PropPrefab::new(&self.name, self.variants.max(1), self.behavior.into(), locks)
    }
}

fn parse_direction(name: &str) -> Option<Direction> {
    match name.to_ascii_lowercase().as_str() {
        "up" => Some(Direction::Up),
        "down" => Some(Direction::Down),
        "left" => Some(Direction::Left),
        "right" => Some(Direction::Right),
        _ => None,
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory,
    /// (3) `~/.local/share/roomies`, (4) `/usr/share/roomies`.
    /// Missing file or missing keys gracefully fall back to defaults.
    pub fn load() -> Self {
        let search_dirs = candidate_dirs();
        let toml_cfg = load_toml(&search_dirs);
        Self::build(toml_cfg, &search_dirs)
    }

    /// Parse a config document, resolving relative paths against the CWD.
    /// A document that does not parse yields the defaults.
    pub fn from_toml_str(text: &str) -> Self {
        let toml_cfg = toml::from_str::<TomlConfig>(text).unwrap_or_else(|e| {
            warn!("config parse error: {e}; using default settings");
            TomlConfig::default()
        });
        Self::build(toml_cfg, &[])
    }

    fn build(toml_cfg: TomlConfig, search_dirs: &[PathBuf]) -> Self {
        // Resolve stages directory
        let stages_dir_str = &toml_cfg.general.stages_dir;
        let stages_dir = if PathBuf::from(stages_dir_str).is_absolute() {
            PathBuf::from(stages_dir_str)
        } else {
            search_dirs.iter()
                .map(|d| d.join(stages_dir_str))
                .find(|p| p.is_dir())
                .unwrap_or_else(|| PathBuf::from(stages_dir_str))
        };

        let requested = toml_cfg.general.players;
        let players = requested.clamp(1, MAX_PLAYERS);
        if players != requested {
            warn!("players = {requested} is out of range; using {players}");
        }

        let m = toml_cfg.motion;
        GameConfig {
            speed: SpeedConfig { tick_rate_ms: toml_cfg.speed.tick_rate_ms },
            motion: MotionParams {
                axis_min: m.axis_min,
                acceleration: m.acceleration,
                max_velocity: m.max_velocity,
                stun_time: m.stun_time,
                stun_invulnerable: m.stun_invulnerable,
                immovable_spawn_time: m.immovable_spawn_time,
            },
            gamepad: GamepadConfig {
                reset: toml_cfg.gamepad.reset,
                quit: toml_cfg.gamepad.quit,
            },
            stages_dir,
            stage: toml_cfg.general.stage,
            players,
            catalog: toml_cfg.catalog.build(),
        }
    }
}

/// Candidate directories to search: exe dir + CWD + data paths (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    // 1. Directory of the running executable
    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    // 2. Current working directory
    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    // 3. XDG data home
    if let Ok(home) = std::env::var("HOME") {
        let xdg = PathBuf::from(&home).join(".local/share/roomies");
        if xdg.is_dir() && !dirs.iter().any(|d| d == &xdg) {
            dirs.push(xdg);
        }
    }

    // 4. System data directory
    let sys = PathBuf::from("/usr/share/roomies");
    if sys.is_dir() && !dirs.iter().any(|d| d == &sys) {
        dirs.push(sys);
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
                        warn!("{} parse error: {e}; using default settings", path.display());
                        return TomlConfig::default();
                    }
                },
                Err(e) => {
                    warn!("could not read {}: {e}", path.display());
                }
            }
        }
    }
    TomlConfig::default()
}
