//! Standalone database backup tool
//!
//! Usage: tool_db_backup [--output <path>]

use omniscient_one::arguments::{get_arg_value, patterns};
use omniscient_one::database::Database;

fn main() {
    if patterns::is_help_requested() {
        println!("tool_db_backup - snapshot the platform database");
        println!();
        println!("USAGE:");
        println!("    tool_db_backup [--output <path>]");
        println!();
        println!("Without --output the backup lands in the backups directory");
        println!("with a timestamped name.");
        return;
    }

    if let Err(e) = omniscient_one::paths::ensure_all_directories() {
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }

    let output = get_arg_value("--output").map(std::path::PathBuf::from);

    let db = match Database::open_default() {
        Ok(db) => db,
        Err(e) => {
            eprintln!("❌ Failed to open database: {}", e);
            std::process::exit(1);
        }
    };

    match db.backup_database(output) {
        Ok(path) => println!("✅ Backup written to {}", path.display()),
        Err(e) => {
            eprintln!("❌ Backup failed: {}", e);
            std::process::exit(1);
        }
    }
}
