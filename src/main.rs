use omniscient_one::{
    arguments::{
        is_backup_enabled, is_force_enabled, is_plans_enabled, is_reset_enabled,
        is_setup_enabled, patterns, print_debug_info, print_help,
    },
    logger::{self as logger, LogTag},
};

/// Main entry point for Omniscient One
///
/// Unified entry point that handles:
/// - Special modes (--setup, --reset, --backup, --plans, --help)
/// - Service mode (default): REST API plus background maintenance loops
#[tokio::main]
async fn main() {
    // Ensure all directories exist BEFORE logger initialization
    // (Logger needs the logs directory to create log files)
    if let Err(e) = omniscient_one::paths::ensure_all_directories() {
        eprintln!("❌ Failed to create required directories: {}", e);
        std::process::exit(1);
    }

    // Initialize logger system (now safe to create log files)
    logger::init();

    // Check for help request first (before any other processing)
    if patterns::is_help_requested() {
        print_help();
        std::process::exit(0);
    }

    if patterns::is_version_requested() {
        println!("omniscient {}", env!("CARGO_PKG_VERSION"));
        std::process::exit(0);
    }

    // Print debug information if any debug modes are enabled
    print_debug_info();

    // =========================================================================
    // SPECIAL MODES (execute and exit)
    // =========================================================================

    // Plan table mode - execute and exit
    if is_plans_enabled() {
        print_plan_table();
        std::process::exit(0);
    }

    // Setup mode - execute and exit
    if is_setup_enabled() {
        match omniscient_one::setup::run_complete_setup() {
            Ok(()) => std::process::exit(0),
            Err(e) => {
                logger::error(LogTag::Setup, &format!("❌ Setup failed: {}", e));
                std::process::exit(1);
            }
        }
    }

    // Reset mode - execute and exit
    if is_reset_enabled() {
        logger::info(LogTag::System, "🔄 Reset mode enabled");

        println!("\n⚠️  WARNING: This will DELETE all stored data:");
        println!(
            "   - Platform database ({})",
            omniscient_one::paths::get_database_path().display()
        );
        println!(
            "   - Cached market data ({})",
            omniscient_one::paths::get_cache_directory().display()
        );
        println!("\nConfig, secrets, and logs are kept.");

        if !is_force_enabled() && !confirm("\nType 'yes' to confirm: ") {
            logger::info(LogTag::System, "❌ Reset cancelled");
            std::process::exit(0);
        }

        match omniscient_one::setup::run_reset() {
            Ok(()) => {
                logger::info(LogTag::System, "✅ Reset completed successfully");
                std::process::exit(0);
            }
            Err(e) => {
                logger::error(LogTag::System, &format!("❌ Reset failed: {}", e));
                std::process::exit(1);
            }
        }
    }

    // Backup mode - execute and exit
    if is_backup_enabled() {
        match run_backup() {
            Ok(path) => {
                logger::info(LogTag::System, &format!("✅ Backup written to {}", path));
                std::process::exit(0);
            }
            Err(e) => {
                logger::error(LogTag::System, &format!("❌ Backup failed: {}", e));
                std::process::exit(1);
            }
        }
    }

    // =========================================================================
    // SERVICE MODE
    // =========================================================================

    logger::info(LogTag::System, "🚀 Omniscient One starting up...");

    match omniscient_one::run::run_platform().await {
        Ok(_) => {
            logger::info(LogTag::System, "✅ Omniscient One stopped cleanly");
        }
        Err(e) => {
            logger::error(LogTag::System, &format!("❌ Omniscient One failed: {}", e));
            std::process::exit(1);
        }
    }
}

/// Ask the operator for confirmation on destructive actions
fn confirm(prompt: &str) -> bool {
    use std::io::{self, Write};

    print!("{}", prompt);
    if io::stdout().flush().is_err() {
        return false;
    }

    let mut input = String::new();
    if io::stdin().read_line(&mut input).is_err() {
        return false;
    }
    input.trim().eq_ignore_ascii_case("yes")
}

/// Create a database backup at the default location
fn run_backup() -> Result<String, String> {
    let db = omniscient_one::database::Database::open_default()
        .map_err(|e| e.to_string())?;
    let path = db.backup_database(None).map_err(|e| e.to_string())?;
    Ok(path.display().to_string())
}

/// Render the subscription plan comparison table
fn print_plan_table() {
    use comfy_table::{presets::UTF8_FULL, Cell, Table};

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec![
        "Plan",
        "Monthly",
        "Yearly",
        "Portfolios",
        "Alerts",
        "Daily scans",
        "API calls/day",
        "Trial",
    ]);

    for plan in omniscient_one::subscription::all_plans() {
        table.add_row(vec![
            Cell::new(plan.name),
            Cell::new(format!("${:.2}", plan.price_monthly)),
            Cell::new(format!("${:.2}", plan.price_yearly)),
            Cell::new(plan.limits.max_portfolios),
            Cell::new(plan.limits.max_alerts),
            Cell::new(plan.limits.daily_scans),
            Cell::new(plan.limits.api_calls_per_day),
            Cell::new(format!("{} days", plan.trial_days)),
        ]);
    }

    println!("{}", table);
}
