use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::animator::CompletionStrategy;
use crate::navigator::NavigatorOptions;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub ui: UiConfig,
    #[serde(default)]
    pub layout: LayoutConfig,
    pub paths: PathsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Event poll interval; also the animation frame interval
    pub tick_rate_ms: u64,
    /// How the end of a slide is detected (signal or timed)
    #[serde(default)]
    pub animation: CompletionStrategy,
    /// Slide duration in milliseconds (0 disables the slide)
    #[serde(default = "default_animation_ms")]
    pub animation_ms: u64,
}

fn default_animation_ms() -> u64 {
    300
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Rows added around the active step for buttons and borders
    #[serde(default = "default_padding")]
    pub padding: u16,
}

fn default_padding() -> u16 {
    4
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            padding: default_padding(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Directory for logs
    pub state: String,
    /// Form definition to load instead of the built-in questionnaire
    #[serde(default)]
    pub form: Option<String>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Whether to log to file in TUI mode (false = stderr for debugging)
    #[serde(default = "default_log_to_file")]
    pub to_file: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_to_file() -> bool {
    true
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            to_file: default_log_to_file(),
        }
    }
}

impl Config {
    /// Layered load: built-in defaults, user config, explicit file, then
    /// `STEPFORM__` environment variables.
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        // User config in ~/.config/stepform/ (optional global overrides)
        let user_config = dirs::config_dir()
            .map(|dir| dir.join("stepform").join("config.toml"))
            .filter(|path| path.exists());
        Self::load_layers(user_config.as_deref(), config_path, Some("STEPFORM"))
    }

    /// Build the layered config from explicit sources. `env_prefix` of `None`
    /// skips the environment layer.
    fn load_layers(
        user_config: Option<&Path>,
        config_path: Option<&str>,
        env_prefix: Option<&str>,
    ) -> Result<Self> {
        let defaults = Config::default();
        let defaults_json =
            serde_json::to_string(&defaults).context("Failed to serialize default config")?;

        let mut builder = config::Config::builder().add_source(config::File::from_str(
            &defaults_json,
            config::FileFormat::Json,
        ));

        if let Some(path) = user_config {
            builder = builder.add_source(config::File::from(path));
        }

        // Explicit config file (CLI override)
        if let Some(path) = config_path {
            builder = builder.add_source(config::File::with_name(path));
        }

        if let Some(prefix) = env_prefix {
            builder = builder.add_source(
                config::Environment::with_prefix(prefix)
                    .separator("__")
                    .try_parsing(true),
            );
        }

        let config = builder.build().context("Failed to load configuration")?;
        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    /// Get absolute path to state directory
    pub fn state_path(&self) -> PathBuf {
        let path = PathBuf::from(&self.paths.state);
        if path.is_absolute() {
            path
        } else {
            std::env::current_dir().unwrap_or_default().join(path)
        }
    }

    /// Get absolute path to logs directory
    pub fn logs_path(&self) -> PathBuf {
        self.state_path().join("logs")
    }

    pub fn form_path(&self) -> Option<PathBuf> {
        self.paths.form.as_ref().map(PathBuf::from)
    }

    pub fn tick_rate(&self) -> Duration {
        Duration::from_millis(self.ui.tick_rate_ms.max(1))
    }

    /// Navigator tunables derived from the ui and layout sections
    pub fn navigator_options(&self) -> NavigatorOptions {
        NavigatorOptions {
            strategy: self.ui.animation,
            animation: Duration::from_millis(self.ui.animation_ms),
            padding: self.layout.padding,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ui: UiConfig {
                tick_rate_ms: 16,
                animation: CompletionStrategy::Signal,
                animation_ms: default_animation_ms(),
            },
            layout: LayoutConfig::default(),
            paths: PathsConfig {
                state: ".stepform".to_string(),
                form: None,
            },
            logging: LoggingConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_round_trip_through_loader() {
        let config = Config::load_layers(None, None, None).unwrap();
        assert_eq!(config.layout.padding, 4);
        assert_eq!(config.ui.animation, CompletionStrategy::Signal);
        assert!(config.paths.form.is_none());
    }

    #[test]
    fn test_explicit_file_overrides_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[ui]\ntick_rate_ms = 50\nanimation = \"timed\"").unwrap();
        writeln!(file, "animation_ms = 120\n\n[layout]\npadding = 2").unwrap();

        let config =
            Config::load_layers(None, Some(file.path().to_str().unwrap()), None).unwrap();
        assert_eq!(config.ui.tick_rate_ms, 50);
        assert_eq!(config.ui.animation, CompletionStrategy::Timed);

        let options = config.navigator_options();
        assert_eq!(options.padding, 2);
        assert_eq!(options.animation, Duration::from_millis(120));
        assert_eq!(options.strategy, CompletionStrategy::Timed);
    }

    #[test]
    fn test_explicit_file_wins_over_user_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let user = dir.path().join("user.toml");
        std::fs::write(&user, "[layout]\npadding = 6\n\n[ui]\ntick_rate_ms = 40\n").unwrap();
        let explicit = dir.path().join("explicit.toml");
        std::fs::write(&explicit, "[layout]\npadding = 1\n").unwrap();

        let config = Config::load_layers(Some(&user), None, None).unwrap();
        assert_eq!(config.layout.padding, 6);

        let config =
            Config::load_layers(Some(&user), Some(explicit.to_str().unwrap()), None).unwrap();
        assert_eq!(config.layout.padding, 1);
        assert_eq!(config.ui.tick_rate_ms, 40);
    }

    #[test]
    fn test_logs_path_under_state() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let mut config = Config::default();
        config.paths.state = temp_dir.path().to_string_lossy().to_string();

        let logs_dir = config.logs_path();
        assert!(logs_dir.ends_with("logs"));
        assert!(logs_dir.starts_with(temp_dir.path()));
    }

    #[test]
    fn test_tick_rate_never_zero() {
        let mut config = Config::default();
        config.ui.tick_rate_ms = 0;
        assert_eq!(config.tick_rate(), Duration::from_millis(1));
    }
}
