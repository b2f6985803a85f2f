use std::io::IsTerminal;

use serde::{Deserialize, Serialize};

use crate::logger::{LoggerFormat, LoggerLevel, LoggerTimeZone};

/// Logger configuration, usually embedded in the caller's own config file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LoggerConfig {
    pub format: LoggerFormat,
    /// `EnvFilter` expression, e.g. `"info"` or `"vmb_core=debug,info"`.
    pub level: LoggerLevel,
    /// Timezone of the RFC3339 timestamps.
    pub tz: LoggerTimeZone,
    /// Print event targets (`vmb::ui`, `vmb_core::runner`, ...).
    pub with_targets: bool,
    /// Colored text output; only honored when stdout is a terminal.
    pub use_color: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            format: LoggerFormat::default(),
            level: LoggerLevel::default(),
            tz: LoggerTimeZone::default(),
            with_targets: true,
            use_color: true,
        }
    }
}

impl LoggerConfig {
    /// Whether ANSI colors should be emitted right now.
    ///
    /// Evaluated at install time, not at parse time, so redirections done
    /// after the config was loaded are still detected.
    pub fn should_use_color(&self) -> bool {
        self.use_color && self.format == LoggerFormat::Text && std::io::stdout().is_terminal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = LoggerConfig::default();

        assert_eq!(cfg.format, LoggerFormat::Text);
        assert_eq!(cfg.tz, LoggerTimeZone::Utc);
        assert_eq!(cfg.level.as_str(), "info");
        assert!(cfg.with_targets);
        assert!(cfg.use_color);
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let cfg: LoggerConfig = serde_json::from_str(r#"{"format": "json", "level": "vmb_core=debug,info"}"#).unwrap();

        assert_eq!(cfg.format, LoggerFormat::Json);
        assert_eq!(cfg.level.as_str(), "vmb_core=debug,info");
        assert_eq!(cfg.tz, LoggerTimeZone::Utc);
        assert!(cfg.with_targets);
    }

    #[test]
    fn camel_case_keys() {
        let cfg: LoggerConfig = serde_json::from_str(r#"{"withTargets": false, "useColor": false, "tz": "local"}"#).unwrap();

        assert!(!cfg.with_targets);
        assert!(!cfg.use_color);
        assert_eq!(cfg.tz, LoggerTimeZone::Local);
    }

    #[test]
    fn json_never_uses_color() {
        let cfg = LoggerConfig {
            format: LoggerFormat::Json,
            use_color: true,
            ..Default::default()
        };
        assert!(!cfg.should_use_color());
    }
}
