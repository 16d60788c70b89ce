/// Centralized argument handling system for Omniscient One
///
/// This module consolidates all command-line argument parsing and debug flag
/// checking used by the main binary and the operator tools.
///
/// Features:
/// - Centralized CMD_ARGS storage with thread-safe access
/// - Debug flag checking functions for all modules
/// - Unified argument parsing utilities
/// - Support for both binary-specific and main application arguments
use once_cell::sync::Lazy;
use std::env;
use std::sync::Mutex;

/// Global command-line arguments storage
/// Thread-safe singleton that stores arguments for access throughout the application
pub static CMD_ARGS: Lazy<Mutex<Vec<String>>> = Lazy::new(|| Mutex::new(env::args().collect()));

/// Sets the global command-line arguments
/// Used by binaries and tests to override the default env::args() collection
pub fn set_cmd_args(args: Vec<String>) {
    if let Ok(mut cmd_args) = CMD_ARGS.lock() {
        *cmd_args = args;
    }
}

/// Gets a copy of the current command-line arguments
/// Returns a vector clone to avoid holding the mutex lock
pub fn get_cmd_args() -> Vec<String> {
    match CMD_ARGS.lock() {
        Ok(args) => args.clone(),
        Err(_) => {
            // Fallback to env::args if mutex is poisoned
            env::args().collect()
        }
    }
}

/// Checks if a specific argument is present in the command line
pub fn has_arg(arg: &str) -> bool {
    get_cmd_args()
        .iter()
        .any(|a| a == arg)
}

/// Gets the value of a command-line argument that follows a flag
/// Returns None if the flag is not found or has no value
pub fn get_arg_value(flag: &str) -> Option<String> {
    let args = get_cmd_args();
    for (i, arg) in args.iter().enumerate() {
        if arg == flag && i + 1 < args.len() {
            return Some(args[i + 1].clone());
        }
    }
    None
}

// =============================================================================
// DEBUG FLAG CHECKING FUNCTIONS
// These functions check for specific debug flags in the command-line arguments
// =============================================================================

/// Auth module debug mode
pub fn is_debug_auth_enabled() -> bool {
    has_arg("--debug-auth")
}

/// Database operations debug mode
pub fn is_debug_database_enabled() -> bool {
    has_arg("--debug-database")
}

/// Market data engine debug mode
pub fn is_debug_market_enabled() -> bool {
    has_arg("--debug-market")
}

/// Scanner module debug mode
pub fn is_debug_scanner_enabled() -> bool {
    has_arg("--debug-scanner")
}

/// Subscription and billing debug mode
pub fn is_debug_billing_enabled() -> bool {
    has_arg("--debug-billing")
}

/// Webserver debug mode
pub fn is_debug_webserver_enabled() -> bool {
    has_arg("--debug-webserver")
}

/// System operations debug mode
pub fn is_debug_system_enabled() -> bool {
    has_arg("--debug-system")
}

/// Setup mode - run first-time deployment scaffolding and exit
pub fn is_setup_enabled() -> bool {
    has_arg("--setup")
}

/// Reset mode - wipe platform data after confirmation
pub fn is_reset_enabled() -> bool {
    has_arg("--reset")
}

/// Backup mode - create a database backup and exit
pub fn is_backup_enabled() -> bool {
    has_arg("--backup")
}

/// Plans mode - print the subscription plan comparison table and exit
pub fn is_plans_enabled() -> bool {
    has_arg("--plans")
}

/// Force flag - skip confirmation prompts in destructive modes
pub fn is_force_enabled() -> bool {
    has_arg("--force")
}

/// Get configured webserver port override
pub fn get_port_override() -> Option<u16> {
    get_arg_value("--port").and_then(|s| s.parse().ok())
}

// =============================================================================
// HELP SYSTEM
// =============================================================================

/// Displays the help menu with all available flags and their descriptions
pub fn print_help() {
    println!("Omniscient One - Trading Platform Backend");
    println!();
    println!("USAGE:");
    println!("    omniscient [FLAGS]");
    println!();
    println!("CORE FLAGS:");
    println!("    --setup                   Run first-time deployment setup and exit");
    println!("    --reset                   Wipe all platform data (asks for confirmation)");
    println!("    --force                   Skip confirmation prompts (with --reset)");
    println!("    --backup                  Create a database backup and exit");
    println!("    --plans                   Print the subscription plan table and exit");
    println!("    --port <n>                Override the webserver port");
    println!("    --help, -h                Show this help message");
    println!("    --version, -V             Show version information");
    println!();
    println!("DEBUG FLAGS:");
    println!("    --debug-auth              Auth module debug mode");
    println!("    --debug-billing           Subscription and billing debug mode");
    println!("    --debug-database          Database operations debug mode");
    println!("    --debug-market            Market data engine debug mode");
    println!("    --debug-scanner           Scanner module debug mode");
    println!("    --debug-system            System operations debug mode");
    println!("    --debug-webserver         Webserver debug mode");
    println!("    --verbose, -v             Very detailed trace output");
    println!("    --quiet, -q               Suppress warnings and info output");
    println!();
    println!("EXAMPLES:");
    println!("    omniscient --setup                  # First-time deployment setup");
    println!("    omniscient                          # Run the platform service");
    println!("    omniscient --port 9090              # Run on a custom port");
    println!("    omniscient --debug-market           # Run with market engine diagnostics");
    println!("    omniscient --reset --force          # Wipe all data without prompting");
    println!("    omniscient --backup                 # Snapshot the database");
}

// =============================================================================
// UTILITY FUNCTIONS
// =============================================================================

/// Checks if any debug mode is enabled
pub fn is_any_debug_enabled() -> bool {
    is_debug_auth_enabled() ||
        is_debug_database_enabled() ||
        is_debug_market_enabled() ||
        is_debug_scanner_enabled() ||
        is_debug_billing_enabled() ||
        is_debug_webserver_enabled() ||
        is_debug_system_enabled()
}

/// Gets a list of all enabled debug modes
pub fn get_enabled_debug_modes() -> Vec<&'static str> {
    let mut modes = Vec::new();

    if is_debug_auth_enabled() {
        modes.push("auth");
    }
    if is_debug_database_enabled() {
        modes.push("database");
    }
    if is_debug_market_enabled() {
        modes.push("market");
    }
    if is_debug_scanner_enabled() {
        modes.push("scanner");
    }
    if is_debug_billing_enabled() {
        modes.push("billing");
    }
    if is_debug_webserver_enabled() {
        modes.push("webserver");
    }
    if is_debug_system_enabled() {
        modes.push("system");
    }

    modes
}

/// Prints debug information about current arguments and enabled debug modes
pub fn print_debug_info() {
    let enabled_modes = get_enabled_debug_modes();
    if enabled_modes.is_empty() {
        return;
    }

    println!("Command-line arguments: {:?}", get_cmd_args());
    println!("Enabled debug modes: {:?}", enabled_modes);
}

// =============================================================================
// COMMON ARGUMENT PATTERNS
// =============================================================================

/// Common argument parsing patterns used across binaries
pub mod patterns {
    use super::*;

    /// Checks for help flags
    pub fn is_help_requested() -> bool {
        has_arg("--help") || has_arg("-h")
    }

    /// Checks for version flags
    pub fn is_version_requested() -> bool {
        has_arg("--version") || has_arg("-V")
    }

    /// Gets ticker argument (commonly used in market tools)
    pub fn get_ticker() -> Option<String> {
        get_arg_value("--ticker")
    }

    /// Gets email argument (commonly used in account tools)
    pub fn get_email() -> Option<String> {
        get_arg_value("--email")
    }

    /// Checks for quiet/silent mode
    pub fn is_quiet_mode() -> bool {
        has_arg("--quiet") || has_arg("-q")
    }

    /// Checks for verbose mode
    pub fn is_verbose_mode() -> bool {
        has_arg("--verbose") || has_arg("-v")
    }
}

/// Serializes tests that mutate CMD_ARGS or logger configuration
#[cfg(test)]
pub(crate) static TEST_ARGS_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_get_args() {
        let _guard = TEST_ARGS_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let test_args = vec![
            "omniscient".to_string(),
            "--debug-market".to_string(),
            "--ticker".to_string(),
            "NVDA".to_string()
        ];

        set_cmd_args(test_args.clone());
        let retrieved_args = get_cmd_args();

        assert_eq!(retrieved_args, test_args);
    }

    #[test]
    fn test_has_arg() {
        let _guard = TEST_ARGS_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        set_cmd_args(vec!["omniscient".to_string(), "--debug-market".to_string()]);

        assert!(has_arg("--debug-market"));
        assert!(!has_arg("--debug-auth"));
    }

    #[test]
    fn test_get_arg_value() {
        let _guard = TEST_ARGS_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        set_cmd_args(
            vec!["omniscient".to_string(), "--ticker".to_string(), "NVDA".to_string()]
        );

        assert_eq!(get_arg_value("--ticker"), Some("NVDA".to_string()));
        assert_eq!(get_arg_value("--email"), None);
    }

    #[test]
    fn test_debug_flags() {
        let _guard = TEST_ARGS_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        set_cmd_args(
            vec![
                "omniscient".to_string(),
                "--debug-auth".to_string(),
                "--debug-webserver".to_string()
            ]
        );

        assert!(is_debug_auth_enabled());
        assert!(is_debug_webserver_enabled());
        assert!(!is_debug_market_enabled());
        assert!(is_any_debug_enabled());

        let enabled_modes = get_enabled_debug_modes();
        assert!(enabled_modes.contains(&"auth"));
        assert!(enabled_modes.contains(&"webserver"));
        assert!(!enabled_modes.contains(&"market"));
    }

    #[test]
    fn test_patterns() {
        let _guard = TEST_ARGS_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        set_cmd_args(
            vec![
                "omniscient".to_string(),
                "--help".to_string(),
                "--email".to_string(),
                "ops@example.com".to_string()
            ]
        );

        assert!(patterns::is_help_requested());
        assert_eq!(patterns::get_email(), Some("ops@example.com".to_string()));
        assert!(!patterns::is_version_requested());
    }
}
