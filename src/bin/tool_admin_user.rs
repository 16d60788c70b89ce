//! Operator account tool
//!
//! Create accounts, change tiers, or anonymize a user without going
//! through the API.
//!
//! Usage:
//!     tool_admin_user --create --email <email> --username <name> --password <pw>
//!     tool_admin_user --set-tier <tier> --email <email> [--days <n>]
//!     tool_admin_user --anonymize --email <email>

use omniscient_one::arguments::{get_arg_value, has_arg, patterns};
use omniscient_one::auth::AuthManager;
use omniscient_one::database::Database;
use omniscient_one::secrets::Secrets;

fn main() {
    if patterns::is_help_requested() {
        print_usage();
        return;
    }

    if let Err(e) = omniscient_one::paths::ensure_all_directories() {
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }

    let db = match Database::open_default() {
        Ok(db) => db,
        Err(e) => {
            eprintln!("❌ Failed to open database: {}", e);
            std::process::exit(1);
        }
    };

    let Some(email) = patterns::get_email() else {
        eprintln!("❌ --email is required");
        print_usage();
        std::process::exit(2);
    };

    if has_arg("--create") {
        let (Some(username), Some(password)) =
            (get_arg_value("--username"), get_arg_value("--password"))
        else {
            eprintln!("❌ --create needs --username and --password");
            std::process::exit(2);
        };

        let secrets = Secrets::load(&omniscient_one::paths::get_secrets_path())
            .unwrap_or_default();
        let auth = AuthManager::new(db, secrets.jwt_secret(), 30, 14);

        match auth.register(&email, &username, &password) {
            Ok(summary) => {
                println!("✅ Created account '{}' ({})", summary.username, summary.user_id);
                if let Some(api_key) = summary.api_key {
                    println!("   API key: {}", api_key);
                }
            }
            Err(e) => {
                eprintln!("❌ {}", e);
                std::process::exit(1);
            }
        }
        return;
    }

    if let Some(tier) = get_arg_value("--set-tier") {
        if omniscient_one::subscription::get_plan(&tier).is_none() {
            eprintln!("❌ Unknown tier '{}'", tier);
            std::process::exit(2);
        }

        let days: i64 = get_arg_value("--days")
            .and_then(|s| s.parse().ok())
            .unwrap_or(30);

        match lookup_user_id(&db, &email) {
            Some(user_id) => {
                let expiry = (chrono::Utc::now() + chrono::Duration::days(days)).to_rfc3339();
                match db.update_subscription(&user_id, &tier, &expiry) {
                    Ok(()) => println!("✅ {} moved to {} until {}", email, tier, expiry),
                    Err(e) => {
                        eprintln!("❌ {}", e);
                        std::process::exit(1);
                    }
                }
            }
            None => {
                eprintln!("❌ No account for {}", email);
                std::process::exit(1);
            }
        }
        return;
    }

    if has_arg("--anonymize") {
        match lookup_user_id(&db, &email) {
            Some(user_id) => match db.anonymize_user(&user_id) {
                Ok(()) => println!("✅ Account {} anonymized", email),
                Err(e) => {
                    eprintln!("❌ {}", e);
                    std::process::exit(1);
                }
            },
            None => {
                eprintln!("❌ No account for {}", email);
                std::process::exit(1);
            }
        }
        return;
    }

    print_usage();
    std::process::exit(2);
}

fn lookup_user_id(db: &Database, email: &str) -> Option<String> {
    db.get_user_by_email(email).ok().flatten().map(|u| u.user_id)
}

fn print_usage() {
    println!("tool_admin_user - operator account management");
    println!();
    println!("USAGE:");
    println!("    tool_admin_user --create --email <email> --username <name> --password <pw>");
    println!("    tool_admin_user --set-tier <tier> --email <email> [--days <n>]");
    println!("    tool_admin_user --anonymize --email <email>");
}
