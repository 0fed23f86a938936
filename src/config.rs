use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Application configuration
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Config {
    pub theme: ThemeConfig,
    pub window: WindowConfig,
    pub ui: UiConfig,
    pub store: StoreConfig,
}

/// Theme configuration
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ThemeConfig {
    /// "dark" or "light"
    pub mode: String,
}

/// Initial window geometry
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct WindowConfig {
    pub width: f32,
    pub height: f32,
}

/// UI behavior configuration
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct UiConfig {
    /// How many breadcrumb segments the folder picker renders; earlier
    /// segments are hidden, not dropped
    pub max_crumbs_shown: usize,
    /// Label of the breadcrumb root segment
    pub root_folder_title: String,
}

/// Bookmark store location
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct StoreConfig {
    /// Override for the data directory; defaults to the platform one
    pub data_dir: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            theme: ThemeConfig {
                mode: "dark".to_string(),
            },
            window: WindowConfig {
                width: 480.0,
                height: 560.0,
            },
            ui: UiConfig {
                max_crumbs_shown: 2,
                root_folder_title: "Bookmarks".to_string(),
            },
            store: StoreConfig { data_dir: None },
        }
    }
}

impl Config {
    /// Get the path to the config file
    pub fn config_path() -> Option<PathBuf> {
        if let Some(proj_dirs) = directories::ProjectDirs::from("", "", "quickmark") {
            return Some(proj_dirs.config_dir().join("config.toml"));
        }
        None
    }

    /// Where the bookmark store and icon files live
    pub fn data_dir(&self) -> Option<PathBuf> {
        if let Some(dir) = &self.store.data_dir {
            return Some(PathBuf::from(dir));
        }
        directories::ProjectDirs::from("", "", "quickmark")
            .map(|proj_dirs| proj_dirs.data_dir().to_path_buf())
    }

    /// Load configuration from file, or return defaults if file doesn't exist
    pub fn load() -> Self {
        if let Some(path) = Self::config_path() {
            if path.exists() {
                match fs::read_to_string(&path) {
                    Ok(contents) => match toml::from_str::<Config>(&contents) {
                        Ok(config) => return config,
                        Err(e) => {
                            log::warn!("failed to parse config file, using defaults: {}", e);
                        }
                    },
                    Err(e) => {
                        log::warn!("failed to read config file, using defaults: {}", e);
                    }
                }
            }
        }
        Config::default()
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(path) = Self::config_path() {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            let contents = toml::to_string_pretty(self)?;
            fs::write(&path, contents)?;
            return Ok(());
        }
        Err("Could not determine config directory".into())
    }
}
