//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `chorewheel_core` linkage.
//! - Confirm the ledger schema bootstraps on an in-memory database.

use chorewheel_core::db::migrations::schema_version;
use chorewheel_core::db::open_db_in_memory;
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("chorewheel_core ping={}", chorewheel_core::ping());
    println!("chorewheel_core version={}", chorewheel_core::core_version());

    match open_db_in_memory().and_then(|conn| schema_version(&conn)) {
        Ok(version) => {
            println!("chorewheel_core schema_version={version}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("chorewheel_core schema bootstrap failed: {err}");
            ExitCode::FAILURE
        }
    }
}
