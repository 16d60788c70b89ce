//! First-run deployment setup
//!
//! Scaffolds everything the platform needs on disk: the directory tree,
//! data-directory README files, the default config, and the secrets
//! template, then runs an installation self-check. Also hosts the
//! destructive reset used by `--reset`.
//!
//! Every step prints its status line so the operator can see exactly what
//! was created; re-running is safe and leaves existing secrets untouched.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use colored::Colorize;

use crate::config::Config;
use crate::database::Database;
use crate::paths;

/// Literal contents of the top-level README written by setup
const PLATFORM_README: &str = "# Omniscient One\n\n\
Trading platform backend: accounts, portfolios, subscriptions, live market\n\
data, and the opportunity scanner.\n\n\
Run `omniscient --help` for the available modes.";

/// Literal contents of the data-directory README
const DATA_README: &str =
    "# Data Directory\n\nThis directory contains all user data, backups, and logs.";

/// Literal contents of the data-directory .gitignore
const DATA_GITIGNORE: &str = "# Ignore all files in data directory\n*\n!.gitignore\n!README.md";

/// Literal contents of the logs-directory README
const LOGS_README: &str = "# Logs Directory\n\nApplication logs are stored here.";

/// Literal contents of the backups-directory README
const BACKUPS_README: &str = "# Backups Directory\n\nDatabase backups are stored here.";

/// Template written to secrets.toml on first setup
const SECRETS_TEMPLATE: &str = r#"# ============================================================================
# OMNISCIENT ONE - PRODUCTION SECRETS
# ============================================================================
# IMPORTANT: DO NOT SHARE THIS FILE
# ============================================================================

# Flat-file store credentials
S3_ACCESS_KEY = ""
S3_SECRET_KEY = ""

# Authentication
JWT_SECRET = "your-super-secret-key-change-this-123"

# Billing (optional)
BILLING_WEBHOOK_SECRET = ""
"#;

/// Run the complete deployment setup at the platform's base directory
pub fn run_complete_setup() -> Result<()> {
    run_complete_setup_at(&paths::get_base_directory())
}

/// Run the complete deployment setup rooted at `base`
///
/// Steps, in order: banner, directories, data-directory files, config,
/// secrets template, next steps, self-check. Each step prints its status
/// line; any I/O failure propagates unrecovered.
pub fn run_complete_setup_at(base: &Path) -> Result<()> {
    println!("{}", "=".repeat(60));
    println!("🚀 OMNISCIENT ONE - COMPLETE DEPLOYMENT SETUP");
    println!("{}", "=".repeat(60));

    println!("📦 Platform version: {}", env!("CARGO_PKG_VERSION"));
    println!("📂 Base directory: {}", base.display());

    // Directory structure
    println!("\n📁 Creating directory structure...");
    let directories = [
        base.join("data"),
        base.join("data/backups"),
        base.join("data/cache"),
        base.join("logs"),
        base.join("exports"),
    ];
    for dir in &directories {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create directory {}", dir.display()))?;
    }
    println!("✅ Directory structure created");

    // Data-directory documentation and ignore rules
    println!("\n📄 Creating data directory files...");
    let files: [(PathBuf, &str); 5] = [
        (base.join("README.md"), PLATFORM_README),
        (base.join("data/README.md"), DATA_README),
        (base.join("data/.gitignore"), DATA_GITIGNORE),
        (base.join("logs/README.md"), LOGS_README),
        (base.join("data/backups/README.md"), BACKUPS_README),
    ];
    for (path, content) in &files {
        std::fs::write(path, content)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        println!("✅ Created file: {}", path.display());
    }

    // Default configuration
    println!("\n⚙️ Creating platform config...");
    let config_path = base.join("data/config.toml");
    if config_path.exists() {
        println!("⚠️  config.toml already exists - left untouched");
    } else {
        Config::default().save(&config_path)?;
        println!("✅ Created {}", config_path.display());
    }

    // Secrets template
    println!("\n🔐 Creating secrets template...");
    let secrets_path = base.join("data/secrets.toml");
    if secrets_path.exists() {
        println!("⚠️  secrets.toml already exists - left untouched");
    } else {
        std::fs::write(&secrets_path, SECRETS_TEMPLATE)
            .with_context(|| format!("Failed to create {}", secrets_path.display()))?;
        println!("✅ Created {}", secrets_path.display());
        println!("⚠️  IMPORTANT: Keep this file secret!");
    }

    println!("\n{}", "=".repeat(60));
    println!("✅ SETUP COMPLETE!");
    println!("{}", "=".repeat(60));

    println!("\n📋 NEXT STEPS:");
    println!("1. 🔐 Fill in your store and JWT secrets: {}", secrets_path.display());
    println!("2. ⚙️  Review the config: {}", config_path.display());
    println!("3. 🚀 Start the platform: omniscient");
    println!("4. 🌐 Open the API: http://127.0.0.1:8080/api/health");
    println!("5. 📝 Register your first account: POST /api/auth/register");

    println!("\n🔧 TROUBLESHOOTING:");
    println!("- If the store connection fails: check your S3 credentials");
    println!("- If database errors appear: check that {} is writable", base.join("data").display());
    println!("- If the port is taken: run with --port <n>");

    println!("\n🚀 YOUR TRADING PLATFORM IS READY FOR DEPLOYMENT!");

    run_install_check(base)?;
    Ok(())
}

/// Verify the scaffold actually works
///
/// Checks that the data directory is writable, the config parses, and the
/// database opens and migrates. Prints one line per check.
pub fn run_install_check(base: &Path) -> Result<()> {
    println!("\n🧪 Testing installation...");
    let mut all_ok = true;

    // Data directory writable
    let probe = base.join("data/.write_probe");
    match std::fs::write(&probe, b"ok").and_then(|_| std::fs::remove_file(&probe)) {
        Ok(_) => println!("✅ Data directory writable"),
        Err(e) => {
            println!("❌ Data directory NOT writable: {}", e);
            all_ok = false;
        }
    }

    // Config parses
    match Config::load(&base.join("data/config.toml")) {
        Ok(_) => println!("✅ Config parses"),
        Err(e) => {
            println!("❌ Config invalid: {}", e);
            all_ok = false;
        }
    }

    // Database opens and migrates
    match Database::open(&base.join("data/omniscient.db")) {
        Ok(_) => println!("✅ Database ready"),
        Err(e) => {
            println!("❌ Database failed to open: {}", e);
            all_ok = false;
        }
    }

    if !all_ok {
        println!("\n⚠️  Some checks failed - fix the issues above before deploying");
        anyhow::bail!("installation self-check failed");
    }
    Ok(())
}

/// Wipe all platform data under `base`
///
/// Deletes the database (with WAL/SHM siblings) and the cached market
/// data. Config, secrets, and logs survive.
pub fn run_reset_at(base: &Path) -> Result<()> {
    for file in paths::get_db_with_wal_files(base.join("data/omniscient.db")) {
        if file.exists() {
            std::fs::remove_file(&file)
                .with_context(|| format!("Failed to delete {}", file.display()))?;
            println!("🗑  Deleted {}", file.display());
        }
    }

    let cache_dir = base.join("data/cache");
    if cache_dir.exists() {
        std::fs::remove_dir_all(&cache_dir)
            .with_context(|| format!("Failed to clear {}", cache_dir.display()))?;
        std::fs::create_dir_all(&cache_dir)?;
        println!("🗑  Cleared {}", cache_dir.display());
    }

    println!("{}", "✅ Reset completed".bright_green());
    Ok(())
}

/// Wipe all platform data at the default base directory
pub fn run_reset() -> Result<()> {
    run_reset_at(&paths::get_base_directory())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setup_creates_readme_files_with_exact_contents() {
        let dir = tempfile::tempdir().unwrap();
        run_complete_setup_at(dir.path()).unwrap();

        let platform_readme = std::fs::read_to_string(dir.path().join("README.md")).unwrap();
        assert_eq!(platform_readme, PLATFORM_README);

        let readme = std::fs::read_to_string(dir.path().join("data/README.md")).unwrap();
        assert_eq!(readme, DATA_README);

        let gitignore = std::fs::read_to_string(dir.path().join("data/.gitignore")).unwrap();
        assert_eq!(gitignore, DATA_GITIGNORE);

        let logs_readme = std::fs::read_to_string(dir.path().join("logs/README.md")).unwrap();
        assert_eq!(logs_readme, LOGS_README);

        let backups_readme =
            std::fs::read_to_string(dir.path().join("data/backups/README.md")).unwrap();
        assert_eq!(backups_readme, BACKUPS_README);
    }

    #[test]
    fn test_setup_creates_config_and_secrets() {
        let dir = tempfile::tempdir().unwrap();
        run_complete_setup_at(dir.path()).unwrap();

        assert!(dir.path().join("data/config.toml").exists());
        let secrets = std::fs::read_to_string(dir.path().join("data/secrets.toml")).unwrap();
        assert_eq!(secrets, SECRETS_TEMPLATE);

        // The self-check leaves a usable database behind
        assert!(dir.path().join("data/omniscient.db").exists());
    }

    #[test]
    fn test_setup_is_idempotent_and_preserves_secrets() {
        let dir = tempfile::tempdir().unwrap();
        run_complete_setup_at(dir.path()).unwrap();

        let secrets_path = dir.path().join("data/secrets.toml");
        std::fs::write(&secrets_path, "JWT_SECRET = \"real-secret\"\n").unwrap();

        run_complete_setup_at(dir.path()).unwrap();
        let secrets = std::fs::read_to_string(&secrets_path).unwrap();
        assert_eq!(secrets, "JWT_SECRET = \"real-secret\"\n");
    }

    #[test]
    fn test_reset_deletes_database_keeps_config() {
        let dir = tempfile::tempdir().unwrap();
        run_complete_setup_at(dir.path()).unwrap();
        assert!(dir.path().join("data/omniscient.db").exists());

        run_reset_at(dir.path()).unwrap();
        assert!(!dir.path().join("data/omniscient.db").exists());
        assert!(dir.path().join("data/config.toml").exists());
        assert!(dir.path().join("data/cache").exists());
    }
}
