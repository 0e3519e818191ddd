//! Application configuration.
//!
//! Loads settings from config.json at startup. Provides the weather source,
//! the report-generation endpoint with its retry settings, and chart styling.
//! Missing or unreadable files fall back to defaults.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;

use crate::retry::RetryPolicy;

/// Global configuration instance, initialized once at startup.
static CONFIG: OnceLock<AppConfig> = OnceLock::new();

/// Environment variable that overrides `report.api_key`.
pub const API_KEY_ENV: &str = "WEATHER_KLINE_API_KEY";

/// Open-Meteo archive settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    /// Archive endpoint
    pub base_url: String,
    /// First day requested (inclusive, YYYY-MM-DD)
    pub start_date: String,
    /// Last day requested (inclusive, YYYY-MM-DD)
    pub end_date: String,
    /// Cities per sync batch when no count is given
    pub batch_size: usize,
    /// HTTP timeout (milliseconds)
    pub timeout_ms: u64,
    pub max_retries: u32,
    /// First retry delay (milliseconds), doubled per attempt
    pub base_delay_ms: u64,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            base_url: "https://archive-api.open-meteo.com/v1/archive".to_string(),
            start_date: "2025-01-01".to_string(),
            end_date: "2026-01-06".to_string(),
            batch_size: 3,
            timeout_ms: 30000,
            max_retries: 3,
            base_delay_ms: 2000,
        }
    }
}

impl WeatherConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_retries,
            base_delay: Duration::from_millis(self.base_delay_ms),
            rate_limit_delay: Duration::from_millis(self.base_delay_ms),
        }
    }
}

/// Chat-completion endpoint used for text reports.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub api_url: String,
    /// Bearer token; `WEATHER_KLINE_API_KEY` takes precedence when set
    pub api_key: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    /// HTTP timeout (milliseconds)
    pub timeout_ms: u64,
    pub max_retries: u32,
    /// First retry delay (milliseconds), doubled per attempt
    pub base_delay_ms: u64,
    /// First retry delay after HTTP 429 (milliseconds), doubled per attempt
    pub rate_limit_delay_ms: u64,
    /// Pause between cities in a full batch (milliseconds)
    pub pause_between_cities_ms: u64,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            api_url: "https://open.bigmodel.cn/api/paas/v4/chat/completions".to_string(),
            api_key: String::new(),
            model: "glm-4-flash".to_string(),
            temperature: 0.8,
            max_tokens: 2000,
            timeout_ms: 30000,
            max_retries: 3,
            base_delay_ms: 2000,
            rate_limit_delay_ms: 5000,
            pause_between_cities_ms: 1000,
        }
    }
}

impl ReportConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_retries,
            base_delay: Duration::from_millis(self.base_delay_ms),
            rate_limit_delay: Duration::from_millis(self.rate_limit_delay_ms),
        }
    }

    /// API key from the environment, else from the file. None when both are empty.
    pub fn resolved_api_key(&self) -> Option<String> {
        std::env::var(API_KEY_ENV)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .or_else(|| Some(self.api_key.clone()).filter(|key| !key.trim().is_empty()))
    }
}

/// Chart styling.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    pub width: u32,
    pub height: u32,
    pub title_size: u32,
    /// Rising week colour [R, G, B]
    pub up_color: [u8; 3],
    /// Falling week colour [R, G, B]
    pub down_color: [u8; 3],
    /// Unchanged week colour [R, G, B]
    pub neutral_color: [u8; 3],
    pub grid_color: [u8; 3],
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            width: 1200,
            height: 600,
            title_size: 24,
            up_color: [239, 83, 80],     // #EF5350
            down_color: [38, 166, 154],  // #26A69A
            neutral_color: [144, 147, 153],
            grid_color: [220, 220, 220],
        }
    }
}

/// Complete application configuration.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub weather: WeatherConfig,
    pub report: ReportConfig,
    pub chart: ChartConfig,
    /// Root for stored observations and reports; `<exe_dir>/data` when unset
    pub data_dir: Option<PathBuf>,
}

impl AppConfig {
    /// Load config from file, or return defaults if it is missing or invalid.
    pub fn load(config_path: &Path) -> Self {
        crate::log(&format!("Looking for config at: {}", config_path.display()));

        if !config_path.exists() {
            crate::log("config.json not found. Using default config.");
            return Self::default();
        }

        match fs::read_to_string(config_path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(config) => {
                    crate::log(&format!("Config loaded from {}", config_path.display()));
                    config
                }
                Err(e) => {
                    crate::log(&format!("Failed to parse config: {}. Using defaults.", e));
                    Self::default()
                }
            },
            Err(e) => {
                crate::log(&format!("Failed to read config: {}. Using defaults.", e));
                Self::default()
            }
        }
    }

    /// Directory holding `weather/` and `reports.json`.
    pub fn data_dir(&self) -> PathBuf {
        self.data_dir
            .clone()
            .unwrap_or_else(crate::paths::get_data_dir)
    }
}

/// Default config location: config.json next to the executable.
pub fn default_config_path() -> PathBuf {
    crate::paths::get_exe_dir().join("config.json")
}

/// Initializes the global configuration. Call once at startup.
pub fn init_config(config_path: Option<&Path>) {
    let path = config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(default_config_path);
    let _ = CONFIG.set(AppConfig::load(&path));
}

/// Returns the global configuration, loading the default file on first use.
pub fn get_config() -> &'static AppConfig {
    CONFIG.get_or_init(|| AppConfig::load(&default_config_path()))
}
