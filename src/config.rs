use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::utils;

/// Current configuration version
pub const CURRENT_CONFIG_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub sidebar_width_percent: u16,
    /// Overrides the profile's database location when set.
    pub database_path: Option<String>,
    /// View shown after sign-in: tasks, today, calendar, notes or stats.
    pub default_view: String,
    pub key_bindings: KeyBindings,
    pub current_theme: String,
    pub themes: HashMap<String, Theme>,
    pub config_version: Option<u32>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sidebar_width_percent: 25,
            database_path: None,
            default_view: VIEW_NAMES[0].to_string(),
            key_bindings: KeyBindings::default(),
            current_theme: "default".to_string(),
            themes: HashMap::new(),
            config_version: Some(CURRENT_CONFIG_VERSION),
        }
    }
}

/// Key binding strings as accepted by [`utils::parse_key_binding`]. Missing
/// entries fall back to the defaults below.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyBindings {
    pub quit: String,
    pub toggle_sidebar: String,
    pub focus_next: String,
    pub new: String,
    pub edit: String,
    pub save: String,
    pub delete: String,
    pub search: String,
    pub select: String,
    pub list_up: String,
    pub list_down: String,
    pub tab_left: String,
    pub tab_right: String,
    pub filter_all: String,
    pub filter_today: String,
    pub filter_upcoming: String,
    pub filter_completed: String,
    pub toggle_complete: String,
    pub toggle_star: String,
    pub add_tag: String,
    pub copy: String,
    pub refresh: String,
    pub new_list: String,
    pub toggle_grouping: String,
    pub sign_out: String,
    pub help: String,
}

impl Default for KeyBindings {
    fn default() -> Self {
        let key = |s: &str| s.to_string();
        Self {
            quit: key("q"),
            toggle_sidebar: key("b"),
            focus_next: key("Tab"),
            new: key("n"),
            edit: key("e"),
            save: key("Ctrl+s"),
            delete: key("d"),
            search: key("/"),
            select: key("Enter"),
            list_up: key("k"),
            list_down: key("j"),
            tab_left: key("Left"),
            tab_right: key("Right"),
            filter_all: key("1"),
            filter_today: key("2"),
            filter_upcoming: key("3"),
            filter_completed: key("4"),
            toggle_complete: key("Space"),
            toggle_star: key("s"),
            add_tag: key("t"),
            copy: key("y"),
            refresh: key("r"),
            new_list: key("c"),
            toggle_grouping: key("g"),
            sign_out: key("Ctrl+o"),
            help: key("F1"),
        }
    }
}

impl KeyBindings {
    /// Every binding with its name, for validation and the help screen.
    pub fn entries(&self) -> Vec<(&'static str, &str)> {
        vec![
            ("quit", &self.quit),
            ("toggle_sidebar", &self.toggle_sidebar),
            ("focus_next", &self.focus_next),
            ("new", &self.new),
            ("edit", &self.edit),
            ("save", &self.save),
            ("delete", &self.delete),
            ("search", &self.search),
            ("select", &self.select),
            ("list_up", &self.list_up),
            ("list_down", &self.list_down),
            ("tab_left", &self.tab_left),
            ("tab_right", &self.tab_right),
            ("filter_all", &self.filter_all),
            ("filter_today", &self.filter_today),
            ("filter_upcoming", &self.filter_upcoming),
            ("filter_completed", &self.filter_completed),
            ("toggle_complete", &self.toggle_complete),
            ("toggle_star", &self.toggle_star),
            ("add_tag", &self.add_tag),
            ("copy", &self.copy),
            ("refresh", &self.refresh),
            ("new_list", &self.new_list),
            ("toggle_grouping", &self.toggle_grouping),
            ("sign_out", &self.sign_out),
            ("help", &self.help),
        ]
    }
}

/// Colors by name (`"blue"`) or hex (`"#1e1e2e"`). An empty `highlight_fg`
/// is derived from `highlight_bg`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Theme {
    pub fg: String,
    pub bg: String,
    pub highlight_bg: String,
    pub highlight_fg: String,
    pub tab_bg: String,
}

impl Theme {
    fn preset(fg: &str, bg: &str, highlight_bg: &str, highlight_fg: &str) -> Self {
        Self {
            fg: fg.to_string(),
            bg: bg.to_string(),
            highlight_bg: highlight_bg.to_string(),
            highlight_fg: highlight_fg.to_string(),
            tab_bg: "gray".to_string(),
        }
    }

    /// Built-in themes, selectable by name without a `[themes]` entry.
    pub fn presets() -> HashMap<String, Theme> {
        HashMap::from([
            ("default".to_string(), Theme::default()),
            ("dark".to_string(), Theme::preset("white", "black", "cyan", "black")),
            ("light".to_string(), Theme::preset("black", "white", "blue", "white")),
            ("paper".to_string(), Theme::preset("#3b3b3b", "#f5f1e8", "#d9c9a3", "")),
        ])
    }
}

impl Default for Theme {
    fn default() -> Self {
        Theme::preset("white", "black", "blue", "white")
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Could not determine the config directory")]
    NoConfigDir,
    #[error("Could not read {}: {source}", path.display())]
    Read { path: PathBuf, source: std::io::Error },
    #[error("Invalid config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Could not write config: {0}")]
    Write(String),
    #[error("Invalid key binding for {name}: {reason}")]
    KeyBinding { name: String, reason: String },
    #[error("Unknown default view: {0}")]
    UnknownView(String),
}

impl Config {
    /// Load configuration from the profile's config file, creating it with
    /// defaults if missing.
    pub fn load_with_profile(profile: utils::Profile) -> Result<Self, ConfigError> {
        let config_path = Self::get_config_path(profile)?;
        Self::load_from_path(&config_path)
    }

    /// Load configuration from an explicit file (the `--config` flag), creating
    /// it with defaults if missing.
    pub fn load_from_path(config_path: &Path) -> Result<Self, ConfigError> {
        if config_path.exists() {
            let contents = fs::read_to_string(config_path).map_err(|source| ConfigError::Read {
                path: config_path.to_path_buf(),
                source,
            })?;
            let config: Config = toml::from_str(&contents)?;
            config.validate()?;
            Ok(config)
        } else {
            let mut config = Config::default();
            config.save_to_path(config_path)?;
            tracing::info!(path = %config_path.display(), "wrote default config");
            Ok(config)
        }
    }

    /// Write the config as TOML, creating parent directories.
    pub fn save_to_path(&mut self, config_path: &Path) -> Result<(), ConfigError> {
        self.config_version = Some(CURRENT_CONFIG_VERSION);

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::Write(e.to_string()))?;
        }
        let contents = toml::to_string_pretty(self).map_err(|e| ConfigError::Write(e.to_string()))?;
        fs::write(config_path, contents).map_err(|e| ConfigError::Write(e.to_string()))
    }

    /// Check that every key binding parses and the default view exists.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, binding) in self.key_bindings.entries() {
            utils::parse_key_binding(binding).map_err(|reason| ConfigError::KeyBinding {
                name: name.to_string(),
                reason,
            })?;
        }
        if !VIEW_NAMES.contains(&self.default_view.as_str()) {
            return Err(ConfigError::UnknownView(self.default_view.clone()));
        }
        Ok(())
    }

    pub fn get_config_path(profile: utils::Profile) -> Result<PathBuf, ConfigError> {
        utils::get_config_dir(profile)
            .map(|dir| dir.join("config.toml"))
            .ok_or(ConfigError::NoConfigDir)
    }

    /// The database file: the configured override, or `app.db` in the
    /// profile's data directory.
    pub fn get_database_path(&self, profile: utils::Profile) -> PathBuf {
        match self.database_path.as_deref().filter(|p| !p.trim().is_empty()) {
            Some(path) => utils::expand_path(path),
            None => match utils::get_data_dir(profile) {
                Some(dir) => dir.join("app.db"),
                None => match profile {
                    utils::Profile::Dev => utils::expand_path("~/.local/share/chrononotes-dev/app.db"),
                    utils::Profile::Prod => utils::expand_path("~/.local/share/chrononotes/app.db"),
                },
            },
        }
    }

    /// Get the currently active theme. An empty `highlight_fg` is derived
    /// from `highlight_bg` for contrast.
    pub fn get_active_theme(&self) -> Theme {
        use crate::tui::widgets::color::{format_color_for_display, get_contrast_text_color, parse_color};

        let mut theme = self
            .themes
            .get(&self.current_theme)
            .cloned()
            .or_else(|| Theme::presets().remove(&self.current_theme))
            .unwrap_or_default();

        if theme.highlight_fg.is_empty() {
            let calculated_fg = get_contrast_text_color(parse_color(&theme.highlight_bg));
            theme.highlight_fg = format_color_for_display(&calculated_fg);
        }

        theme
    }
}

/// Names accepted by `default_view`.
pub const VIEW_NAMES: [&str; 5] = ["tasks", "today", "calendar", "notes", "stats"];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_created_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let config = Config::load_from_path(&path).unwrap();
        assert!(path.exists());
        assert_eq!(config.key_bindings.quit, "q");
        assert_eq!(config.default_view, "tasks");
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "default_view = \"notes\"\n[key_bindings]\nnew = \"a\"\n").unwrap();
        let config = Config::load_from_path(&path).unwrap();
        assert_eq!(config.default_view, "notes");
        assert_eq!(config.key_bindings.new, "a");
        assert_eq!(config.key_bindings.delete, "d");
        assert_eq!(config.sidebar_width_percent, 25);
    }

    #[test]
    fn bad_key_binding_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[key_bindings]\nquit = \"Hyper+q\"\n").unwrap();
        let err = Config::load_from_path(&path).unwrap_err();
        assert!(matches!(err, ConfigError::KeyBinding { ref name, .. } if name == "quit"));
    }

    #[test]
    fn database_override_wins() {
        let config = Config {
            database_path: Some("/tmp/x.db".into()),
            ..Config::default()
        };
        assert_eq!(config.get_database_path(utils::Profile::Dev), PathBuf::from("/tmp/x.db"));
    }

    #[test]
    fn unknown_theme_falls_back_to_default() {
        let config = Config {
            current_theme: "nope".into(),
            ..Config::default()
        };
        assert_eq!(config.get_active_theme(), Theme::default());
    }
}
