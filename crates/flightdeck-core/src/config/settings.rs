use crate::{Error, Result};
use crate::gesture::GestureConfig;
use crate::session::SessionConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Main configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default)]
    pub gesture: GestureSettings,

    #[serde(default)]
    pub type_ahead: TypeAheadSettings,

    #[serde(default)]
    pub overlay: OverlaySettings,

    #[serde(default)]
    pub apps: AppConfig,
}

impl Config {
    /// Load config from file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, contains invalid JSON,
    /// or sets a card width of zero.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        super::validation::warn_unknown_fields(&content, "config.json");
        let config: Self = serde_json::from_str(&content)?;
        if config.overlay.card_width == 0 {
            return Err(Error::Config("overlay.cardWidth must be positive".to_string()));
        }
        Ok(config)
    }

    /// Save config to file.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails or the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Timings and sizes for a [`Session`](crate::Session).
    #[must_use]
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            gesture: GestureConfig {
                interval: Duration::from_millis(self.gesture.interval_ms),
                grace: Duration::from_millis(self.gesture.grace_ms),
            },
            idle_reset: Duration::from_millis(self.type_ahead.idle_reset_ms),
            card_width: self.overlay.card_width,
            selection_preview_chars: self.overlay.selection_preview_chars,
        }
    }
}

/// Double-tap Shift timing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GestureSettings {
    /// Maximum gap between the two Shift taps
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,

    /// Slack added before a lone tap is forgotten
    #[serde(default = "default_grace_ms")]
    pub grace_ms: u64,
}

fn default_interval_ms() -> u64 {
    350
}
fn default_grace_ms() -> u64 {
    80
}

impl Default for GestureSettings {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            grace_ms: default_grace_ms(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeAheadSettings {
    /// Inactivity after which the typed prefix is forgotten
    #[serde(default = "default_idle_reset_ms")]
    pub idle_reset_ms: u64,
}

fn default_idle_reset_ms() -> u64 {
    600
}

impl Default for TypeAheadSettings {
    fn default() -> Self {
        Self {
            idle_reset_ms: default_idle_reset_ms(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlaySettings {
    /// Width of one card, in renderer units (terminal cells for the TUI)
    #[serde(default = "default_card_width")]
    pub card_width: usize,

    #[serde(default = "default_selection_preview_chars")]
    pub selection_preview_chars: usize,
}

fn default_card_width() -> usize {
    crate::overlay::DEFAULT_CARD_WIDTH
}
fn default_selection_preview_chars() -> usize {
    crate::overlay::DEFAULT_SELECTION_PREVIEW_CHARS
}

impl Default for OverlaySettings {
    fn default() -> Self {
        Self {
            card_width: default_card_width(),
            selection_preview_chars: default_selection_preview_chars(),
        }
    }
}

/// App-specific configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    /// Browser command used to open launched URLs; system opener when unset
    #[serde(default)]
    pub browser: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.gesture.interval_ms, 350);
        assert_eq!(config.gesture.grace_ms, 80);
        assert_eq!(config.type_ahead.idle_reset_ms, 600);
        assert_eq!(config.overlay.card_width, 24);
        assert_eq!(config.overlay.selection_preview_chars, 60);
        assert!(config.apps.browser.is_none());
    }

    #[test]
    fn test_config_load_missing_file() {
        let config = Config::load(Path::new("/nonexistent/flightdeck/config.json")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_config_load_partial() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"gesture": {{"intervalMs": 250}}}}"#).unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.gesture.interval_ms, 250);
        assert_eq!(config.gesture.grace_ms, 80);
        assert_eq!(config.type_ahead.idle_reset_ms, 600);
    }

    #[test]
    fn test_config_load_invalid_json() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "{{ not json").unwrap();
        assert!(Config::load(file.path()).is_err());
    }

    #[test]
    fn test_config_rejects_zero_card_width() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"overlay": {{"cardWidth": 0}}}}"#).unwrap();
        let err = Config::load(file.path()).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_config_save_and_reload() {
        let file = NamedTempFile::new().unwrap();
        let mut config = Config::default();
        config.apps.browser = Some("firefox".to_string());
        config.type_ahead.idle_reset_ms = 900;

        config.save(file.path()).unwrap();
        let loaded = Config::load(file.path()).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_session_config_conversion() {
        let mut config = Config::default();
        config.gesture.interval_ms = 300;
        config.gesture.grace_ms = 50;
        config.type_ahead.idle_reset_ms = 700;
        config.overlay.card_width = 30;

        let session = config.session_config();
        assert_eq!(session.gesture.interval, Duration::from_millis(300));
        assert_eq!(session.gesture.grace, Duration::from_millis(50));
        assert_eq!(session.idle_reset, Duration::from_millis(700));
        assert_eq!(session.card_width, 30);
        assert_eq!(session.selection_preview_chars, 60);
    }

    #[test]
    fn test_default_session_config_matches_default_config() {
        assert_eq!(Config::default().session_config(), SessionConfig::default());
    }
}
