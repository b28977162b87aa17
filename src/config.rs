//! Configuration file support for ascension
//!
//! Reads from .ascension/config.toml

use crate::layout::ViewWindow;
use crate::model::Priority;
use crate::schedule::AgendaOptions;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Directory holding the config and state files
pub const ASCENSION_DIR: &str = ".ascension";

/// Configuration structure
#[derive(Debug, Deserialize, Serialize, Default, Clone, PartialEq)]
pub struct Config {
    /// Day view settings
    #[serde(default)]
    pub timeline: TimelineConfig,

    /// Agenda listing settings
    #[serde(default)]
    pub agenda: AgendaConfig,

    /// Defaults for new goals
    #[serde(default)]
    pub goals: GoalsConfig,
}

/// Visible hours of the day view
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct TimelineConfig {
    /// First visible hour. Default: 6
    #[serde(default = "default_hours_start")]
    pub hours_start: u32,

    /// Hour the view ends at (exclusive). Default: 24
    #[serde(default = "default_hours_end")]
    pub hours_end: u32,
}

fn default_hours_start() -> u32 {
    6
}

fn default_hours_end() -> u32 {
    24
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            hours_start: default_hours_start(),
            hours_end: default_hours_end(),
        }
    }
}

impl TimelineConfig {
    /// The configured window. A start at or past the end falls back to the
    /// whole day.
    pub fn window(&self) -> ViewWindow {
        let window = ViewWindow::from_hours(self.hours_start, self.hours_end);
        if window.start >= window.end {
            ViewWindow::FULL_DAY
        } else {
            window
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct AgendaConfig {
    /// Number of days listed. Default: 14
    #[serde(default = "default_agenda_days")]
    pub days: u32,

    /// Leave daily routines out of the listing. Default: false
    #[serde(default)]
    pub hide_daily: bool,
}

fn default_agenda_days() -> u32 {
    14
}

impl Default for AgendaConfig {
    fn default() -> Self {
        Self {
            days: default_agenda_days(),
            hide_daily: false,
        }
    }
}

impl AgendaConfig {
    pub fn options(&self) -> AgendaOptions {
        AgendaOptions {
            hide_daily: self.hide_daily,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Default, Clone, PartialEq)]
pub struct GoalsConfig {
    /// Priority of newly added goals. Default: P2
    #[serde(default)]
    pub default_priority: Priority,
}

impl Config {
    /// Load config from .ascension/config.toml
    /// Returns default config if file doesn't exist or doesn't parse
    pub fn load() -> Self {
        match find_in_ancestors("config.toml") {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    pub fn load_from(path: &Path) -> Self {
        let Ok(contents) = std::fs::read_to_string(path) else {
            return Self::default();
        };
        match toml::from_str(&contents) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable config");
                Self::default()
            }
        }
    }
}

/// Find `.ascension/<file>` by walking up the directory tree
pub fn find_in_ancestors(file: &str) -> Option<PathBuf> {
    let current_dir = std::env::current_dir().ok()?;
    let mut dir = current_dir.as_path();

    loop {
        let candidate = dir.join(ASCENSION_DIR).join(file);
        if candidate.exists() {
            return Some(candidate);
        }

        match dir.parent() {
            Some(parent) => dir = parent,
            None => break,
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.timeline.window(), ViewWindow::from_hours(6, 24));
        assert_eq!(config.agenda.days, 14);
        assert!(!config.agenda.hide_daily);
        assert_eq!(config.goals.default_priority, Priority::P2);
    }

    #[test]
    fn test_parse_config() {
        let toml = r#"
[timeline]
hours_start = 8

[agenda]
hide_daily = true

[goals]
default_priority = "P1"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.timeline.window(), ViewWindow::from_hours(8, 24));
        assert_eq!(config.agenda.days, 14);
        assert!(config.agenda.options().hide_daily);
        assert_eq!(config.goals.default_priority, Priority::P1);
    }

    #[test]
    fn test_inverted_window_falls_back() {
        let timeline = TimelineConfig {
            hours_start: 20,
            hours_end: 8,
        };
        assert_eq!(timeline.window(), ViewWindow::FULL_DAY);
    }

    #[test]
    fn test_bad_file_gives_default() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[timeline\nhours_start = ").unwrap();
        assert_eq!(Config::load_from(&path), Config::default());
        assert_eq!(Config::load_from(&dir.path().join("missing.toml")), Config::default());
    }
}
