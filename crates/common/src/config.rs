//! Application configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Global application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Frame editing defaults.
    pub editor: EditorDefaults,

    /// Preview surface settings.
    pub preview: PreviewConfig,

    /// Default export settings.
    pub export: ExportDefaults,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Defaults applied to newly added frames and duration edits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorDefaults {
    /// Duration given to a frame when it is added (ms).
    pub default_duration_ms: u32,

    /// Smallest duration a frame may carry (ms).
    pub minimum_duration_ms: u32,

    /// Duration used when an edit is not a number (ms).
    pub fallback_duration_ms: u32,
}

/// Preview surface settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewConfig {
    /// Surface width in pixels.
    pub width: u32,

    /// Surface height in pixels.
    pub height: u32,

    /// Background color as hex string (for example `#1a1a1a`).
    pub background: String,
}

/// Default export parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportDefaults {
    /// Output size as a multiple of the preview surface size.
    pub scale: f64,

    /// Encoder worker threads.
    pub workers: usize,

    /// Encoder quality (NeuQuant sample factor, 1 = best, 30 = fastest).
    pub quality: u8,

    /// How many times the animation loops.
    pub repeat: LoopCount,

    /// File name given to the exported artifact.
    pub file_name: String,
}

/// Loop behavior written into the animated image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoopCount {
    /// Loop forever.
    #[default]
    Forever,
    /// Play once, no loop extension.
    Once,
    /// Repeat the given number of times.
    Times(u16),
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "flipbook=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,

    /// Optional log file path.
    pub file: Option<PathBuf>,
}

impl Default for EditorDefaults {
    fn default() -> Self {
        Self {
            default_duration_ms: 300,
            minimum_duration_ms: 10,
            fallback_duration_ms: 100,
        }
    }
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            width: 600,
            height: 1100,
            background: "#ffffff".to_string(),
        }
    }
}

impl Default for ExportDefaults {
    fn default() -> Self {
        Self {
            scale: 1.0,
            workers: 2,
            quality: 10,
            repeat: LoopCount::Forever,
            file_name: "export.gif".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file: None,
        }
    }
}

impl AppConfig {
    /// Load config from the standard location, falling back to defaults.
    pub fn load() -> Self {
        let config_path = config_file_path();
        if config_path.exists() {
            match std::fs::read_to_string(&config_path) {
                Ok(content) => match Self::from_json(&content) {
                    Ok(config) => return config,
                    Err(e) => {
                        tracing::warn!("Failed to parse config at {:?}: {}", config_path, e);
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read config at {:?}: {}", config_path, e);
                }
            }
        }
        Self::default()
    }

    /// Parse a config document. Missing sections and fields take defaults.
    pub fn from_json(content: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }

    /// Save config to the standard location.
    pub fn save(&self) -> Result<(), std::io::Error> {
        let config_path = config_file_path();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(config_path, json)
    }

    /// Where [`AppConfig::load`] looks for the config file.
    pub fn path() -> PathBuf {
        config_file_path()
    }
}

/// Standard config file location.
fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("flipbook").join("config.json")
}
