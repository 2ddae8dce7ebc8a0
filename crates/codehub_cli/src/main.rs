//! CLI diagnostics entry point.
//!
//! # Responsibility
//! - Verify `codehub_core` linkage with a deterministic ping.
//! - List accounts under a data root for on-device debugging dumps.

use codehub_core::storage::lifecycle;
use codehub_core::{AccountPaths, AccountRepository, SqliteAccountRepository};
use std::process::ExitCode;

fn main() -> ExitCode {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    match args.as_slice() {
        [] => {
            println!("codehub_core ping={}", codehub_core::ping());
            println!("codehub_core version={}", codehub_core::core_version());
            ExitCode::SUCCESS
        }
        [command, data_root] if command == "accounts" => list_accounts(data_root),
        _ => {
            eprintln!("usage: codehub_cli [accounts <data_root>]");
            ExitCode::from(2)
        }
    }
}

fn list_accounts(data_root: &str) -> ExitCode {
    let paths = AccountPaths::from_data_root(data_root);
    if !paths.registry_db_path().is_file() {
        println!("no account registry at {}", paths.registry_db_path().display());
        return ExitCode::SUCCESS;
    }

    let accounts = match SqliteAccountRepository::open(&paths).and_then(|repo| repo.list_accounts()) {
        Ok(accounts) => accounts,
        Err(err) => {
            eprintln!("failed to read accounts: {err}");
            return ExitCode::FAILURE;
        }
    };

    for account in accounts {
        let directory = if lifecycle::exists(&paths, account.id) {
            "present"
        } else {
            "missing"
        };
        println!(
            "id={} username={} directory={} dont_remember={}",
            account.id, account, directory, account.dont_remember
        );
    }
    ExitCode::SUCCESS
}
