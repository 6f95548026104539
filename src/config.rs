// Copyright 2025 Chris Custine
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Application configuration management.
//!
//! Persistent configuration is stored as TOML through `confy`. It holds the
//! data and asset locations, map overlay preferences, the OpenWeatherMap key
//! and retry tuning for weather requests.

use std::time::Duration;

use log::{info, warn};
use serde::{Deserialize, Serialize};
use weather_client::RetryPolicy;

use crate::map::{OverlaySettings, WeatherLayer};

const APP_NAME: &str = "russia-weather-desktop";
const CONFIG_NAME: &str = "config";

/// Schema version written by this build
pub const CONFIG_VERSION: u32 = 1;

/// Environment variable that takes precedence over the configured API key.
pub const API_KEY_ENV: &str = "OPENWEATHERMAP_API_KEY";

/// Default location of `cities.json` and `emblems.json`
pub const DEFAULT_DATA_BASE: &str = "data/";

/// Default location of city photos
pub const DEFAULT_ASSETS_BASE: &str = "assets/";

/// Application configuration stored in TOML format
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AppConfig {
    /// Schema version the file was written with; 0 for files that predate it
    #[serde(default)]
    pub config_version: u32,

    /// Directory or base URL holding the city list and emblem map
    #[serde(default = "default_data_base")]
    pub data_base: String,

    /// Directory or base URL holding city photos
    #[serde(default = "default_assets_base")]
    pub assets_base: String,

    /// OpenWeatherMap API key (optional, env var takes precedence)
    #[serde(default)]
    pub openweathermap_api_key: Option<String>,

    /// Show precipitation overlay
    #[serde(default)]
    pub show_precipitation: bool,

    /// Show wind speed overlay
    #[serde(default)]
    pub show_wind: bool,

    /// Show temperature overlay
    #[serde(default)]
    pub show_temperature: bool,

    /// Overlay opacity (0.0 - 1.0)
    #[serde(default = "default_overlay_opacity")]
    pub overlay_opacity: f32,

    /// Attempts per weather request, including the first
    #[serde(default = "default_fetch_max_attempts")]
    pub fetch_max_attempts: u32,

    /// Backoff unit in milliseconds
    #[serde(default = "default_fetch_base_delay_ms")]
    pub fetch_base_delay_ms: u64,

    /// Link shown as "Открыть бота" in the top bar
    #[serde(default)]
    pub bot_url: Option<String>,
}

// Default value functions for serde
fn default_data_base() -> String {
    DEFAULT_DATA_BASE.to_string()
}

fn default_assets_base() -> String {
    DEFAULT_ASSETS_BASE.to_string()
}

fn default_overlay_opacity() -> f32 {
    0.6
}

fn default_fetch_max_attempts() -> u32 {
    3
}

fn default_fetch_base_delay_ms() -> u64 {
    500
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            config_version: CONFIG_VERSION,
            data_base: default_data_base(),
            assets_base: default_assets_base(),
            openweathermap_api_key: None,
            show_precipitation: false,
            show_wind: false,
            show_temperature: false,
            overlay_opacity: default_overlay_opacity(),
            fetch_max_attempts: default_fetch_max_attempts(),
            fetch_base_delay_ms: default_fetch_base_delay_ms(),
            bot_url: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from disk, upgrading older files in place
    pub fn load() -> Result<Self, confy::ConfyError> {
        let mut config: AppConfig = confy::load(APP_NAME, CONFIG_NAME)?;
        if config.migrate() {
            config.save()?;
            info!("Configuration migrated to version {}", CONFIG_VERSION);
        }
        Ok(config)
    }

    /// Bring an older schema up to [`CONFIG_VERSION`]. Returns true when
    /// anything changed and the file should be rewritten.
    fn migrate(&mut self) -> bool {
        if self.config_version > CONFIG_VERSION {
            warn!(
                "Configuration version {} is newer than {}, reading it as is",
                self.config_version, CONFIG_VERSION
            );
            return false;
        }
        if self.config_version == CONFIG_VERSION {
            return false;
        }

        // Hand-edited files may carry values the settings menu cannot produce
        if self.config_version == 0 {
            self.fetch_max_attempts = self.fetch_max_attempts.max(1);
            self.overlay_opacity = self.overlay_opacity.clamp(0.0, 1.0);
        }
        self.config_version = CONFIG_VERSION;
        true
    }

    /// Load configuration, falling back to defaults if the file is unreadable
    pub fn load_or_default() -> Self {
        match Self::load() {
            Ok(config) => {
                if let Ok(path) = Self::get_config_path() {
                    info!("Loaded configuration from {}", path.display());
                }
                config
            }
            Err(e) => {
                warn!("Failed to load configuration, using defaults: {}", e);
                Self::default()
            }
        }
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<(), confy::ConfyError> {
        confy::store(APP_NAME, CONFIG_NAME, self)
    }

    /// Get the config file path for display to user
    pub fn get_config_path() -> Result<std::path::PathBuf, confy::ConfyError> {
        confy::get_configuration_file_path(APP_NAME, CONFIG_NAME)
    }

    /// Retry policy for primary weather requests
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.fetch_max_attempts,
            base_delay: Duration::from_millis(self.fetch_base_delay_ms),
        }
    }

    /// Overlay toggles and opacity for map rendering
    pub fn overlay_settings(&self) -> OverlaySettings {
        OverlaySettings {
            precipitation: self.show_precipitation,
            wind: self.show_wind,
            temperature: self.show_temperature,
            opacity: self.overlay_opacity,
        }
    }

    pub fn overlay_flag_mut(&mut self, layer: WeatherLayer) -> &mut bool {
        match layer {
            WeatherLayer::Precipitation => &mut self.show_precipitation,
            WeatherLayer::Wind => &mut self.show_wind,
            WeatherLayer::Temperature => &mut self.show_temperature,
        }
    }
}

/// Resolve the OpenWeatherMap key: a non-empty env value wins over config.
pub fn resolve_api_key(env_key: Option<String>, config_key: Option<&str>) -> Option<String> {
    if let Some(key) = env_key.filter(|k| !k.trim().is_empty()) {
        return Some(key);
    }
    config_key
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(ToOwned::to_owned)
}

/// Where the resolved API key came from, for display in the overlay menu
pub fn api_key_source(env_key: Option<&str>, config_key: Option<&str>) -> Option<&'static str> {
    if env_key.is_some_and(|k| !k.trim().is_empty()) {
        Some("переменная окружения")
    } else if config_key.is_some_and(|k| !k.trim().is_empty()) {
        Some("файл настроек")
    } else {
        None
    }
}
