use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use rand::seq::SliceRandom;
use serde::Deserialize;

pub const DEFAULT_CONFIG_FILE: &str = "scoreboard.toml";
pub const DEFAULT_CLOCK_SECS: i64 = 6000;
pub const DEFAULT_TICK_MS: u64 = 100;
/// One week either side of zero.
pub const MAX_CLOCK_SECS: i64 = 7 * 24 * 3600;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub clock_secs: i64,
    pub shuffle: bool,
    pub timer_step_secs: i64,
    pub tick_ms: u64,
    pub audit_log: Option<PathBuf>,
    pub contestants: Vec<String>,
    pub contestants_file: Option<PathBuf>,
    #[serde(skip)]
    pub warnings: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            clock_secs: DEFAULT_CLOCK_SECS,
            shuffle: false,
            timer_step_secs: crate::scoreboard::DEFAULT_TIMER_STEP_SECS,
            tick_ms: DEFAULT_TICK_MS,
            audit_log: None,
            contestants: Vec::new(),
            contestants_file: None,
            warnings: Vec::new(),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        let mut cfg = Self::parse(&raw, base)?;
        cfg.apply_overrides(|key| std::env::var(key).ok());
        Ok(cfg)
    }

    /// Parse TOML and resolve the contestant list. `base` anchors a relative
    /// `contestants_file`.
    pub fn parse(raw: &str, base: &Path) -> Result<Self> {
        let mut cfg: Config = toml::from_str(raw).context("parse scoreboard config")?;
        if cfg.contestants.is_empty() {
            if let Some(file) = cfg.contestants_file.clone() {
                let path = if file.is_absolute() {
                    file
                } else {
                    base.join(file)
                };
                let list = fs::read_to_string(&path)
                    .with_context(|| format!("read contestants file {}", path.display()))?;
                cfg.contestants = parse_name_lines(&list);
            }
        }
        let (names, duplicates) = normalize_names(&cfg.contestants);
        if names.len() < 2 {
            bail!(
                "need at least 2 contestants, found {} (set `contestants` or `contestants_file`)",
                names.len()
            );
        }
        for name in duplicates {
            cfg.warnings
                .push(format!("[WARN] Duplicate contestant name: {name}"));
        }
        cfg.contestants = names;
        Ok(cfg)
    }

    /// Environment overrides. Unparseable values keep the file value.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(secs) = lookup("KOTH_CLOCK_SECS").and_then(|v| v.trim().parse::<i64>().ok()) {
            self.clock_secs = secs;
        }
        if let Some(step) =
            lookup("KOTH_TIMER_STEP_SECS").and_then(|v| v.trim().parse::<i64>().ok())
        {
            self.timer_step_secs = step;
        }
        if let Some(ms) = lookup("KOTH_TICK_MS").and_then(|v| v.trim().parse::<u64>().ok()) {
            self.tick_ms = ms;
        }
        if let Some(path) = lookup("KOTH_AUDIT_LOG").filter(|v| !v.trim().is_empty()) {
            self.audit_log = Some(PathBuf::from(path));
        }
        self.clock_secs = self.clock_secs.clamp(-MAX_CLOCK_SECS, MAX_CLOCK_SECS);
        self.timer_step_secs = self.timer_step_secs.clamp(1, 3600);
        self.tick_ms = self.tick_ms.clamp(20, 500);
    }

    /// Contestant names in the order they enter the queue.
    pub fn seed_order(&self) -> Vec<String> {
        let mut names = self.contestants.clone();
        if self.shuffle {
            names.shuffle(&mut rand::thread_rng());
        }
        names
    }
}

/// CLI argument first, then `KOTH_CONFIG`, then `scoreboard.toml`.
pub fn config_path(arg: Option<String>) -> PathBuf {
    arg.filter(|a| !a.trim().is_empty())
        .or_else(|| {
            std::env::var("KOTH_CONFIG")
                .ok()
                .filter(|v| !v.trim().is_empty())
        })
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE))
}

fn parse_name_lines(raw: &str) -> Vec<String> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

fn normalize_names(raw: &[String]) -> (Vec<String>, Vec<String>) {
    let mut seen = HashSet::new();
    let mut duplicates = Vec::new();
    let mut names = Vec::with_capacity(raw.len());
    for name in raw.iter().map(|n| n.trim()).filter(|n| !n.is_empty()) {
        if !seen.insert(name.to_lowercase()) {
            duplicates.push(name.to_string());
        }
        names.push(name.to_string());
    }
    (names, duplicates)
}
