/// Logger configuration derived from command-line arguments
///
/// Holds the minimum level threshold and the set of modules with debug
/// diagnostics enabled. Initialized once at startup from CMD_ARGS; can be
/// replaced at runtime (used by tests).
use std::collections::HashSet;
use std::sync::RwLock;

use once_cell::sync::Lazy;

use super::levels::LogLevel;
use super::tags::LogTag;
use crate::arguments;

/// Runtime logger configuration
#[derive(Debug, Clone)]
pub struct LoggerConfig {
    /// Minimum level threshold (messages above this are dropped)
    pub min_level: LogLevel,
    /// Modules with --debug-<module> enabled
    pub debug_tags: HashSet<String>,
    /// Restrict output to these tags when non-empty
    pub enabled_tags: HashSet<String>,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            min_level: LogLevel::Info,
            debug_tags: HashSet::new(),
            enabled_tags: HashSet::new(),
        }
    }
}

static LOGGER_CONFIG: Lazy<RwLock<LoggerConfig>> =
    Lazy::new(|| RwLock::new(LoggerConfig::default()));

/// Build logger configuration from the global command-line arguments
///
/// Recognized flags:
/// - `--quiet` / `-q`: only errors
/// - `--verbose` / `-v`: everything
/// - `--debug-<module>`: debug level for that module's tag
pub fn init_from_args() {
    let mut config = LoggerConfig::default();

    if arguments::patterns::is_quiet_mode() {
        config.min_level = LogLevel::Error;
    } else if arguments::patterns::is_verbose_mode() {
        config.min_level = LogLevel::Verbose;
    }

    for arg in arguments::get_cmd_args() {
        if let Some(module) = arg.strip_prefix("--debug-") {
            config.debug_tags.insert(module.to_string());
        }
    }

    // Debug flags raise the threshold so gated messages can pass rule checks
    if !config.debug_tags.is_empty() && config.min_level < LogLevel::Debug {
        config.min_level = LogLevel::Debug;
    }

    set_logger_config(config);
}

/// Get a snapshot of the current logger configuration
pub fn get_logger_config() -> LoggerConfig {
    LOGGER_CONFIG
        .read()
        .map(|c| c.clone())
        .unwrap_or_default()
}

/// Replace the logger configuration
pub fn set_logger_config(config: LoggerConfig) {
    if let Ok(mut current) = LOGGER_CONFIG.write() {
        *current = config;
    }
}

/// Whether debug output is enabled for a tag
pub fn is_debug_enabled_for_tag(tag: &LogTag) -> bool {
    let config = get_logger_config();
    config.min_level == LogLevel::Verbose || config.debug_tags.contains(&tag.to_debug_key())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_flag_enables_tag() {
        let _guard = crate::arguments::TEST_ARGS_LOCK
            .lock()
            .unwrap_or_else(|e| e.into_inner());
        crate::arguments::set_cmd_args(vec![
            "omniscient".to_string(),
            "--debug-market".to_string(),
        ]);
        init_from_args();

        assert!(is_debug_enabled_for_tag(&LogTag::Market));
        assert!(!is_debug_enabled_for_tag(&LogTag::Auth));
    }

    #[test]
    fn test_quiet_mode_drops_threshold() {
        let _guard = crate::arguments::TEST_ARGS_LOCK
            .lock()
            .unwrap_or_else(|e| e.into_inner());
        crate::arguments::set_cmd_args(vec!["omniscient".to_string(), "--quiet".to_string()]);
        init_from_args();

        assert_eq!(get_logger_config().min_level, LogLevel::Error);
    }
}
