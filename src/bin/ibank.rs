use std::{fs::File, path::PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use ibank::{
    bin_utils::{Session, csv_parser::load_accounts},
    directory::in_memory_directory::InMemoryDirectory,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Console bank: employees open and close accounts, clients move money.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// CSV file with accounts to open at start-up
    /// (name,passport,phone,balance,negative_limit)
    #[arg(long)]
    accounts: Option<PathBuf>,

    /// Password of the employee menu
    #[arg(long, env = "IBANK_EMPLOYEE_PASSWORD", default_value = "123", hide_env_values = true)]
    employee_password: String,
}

fn main() -> Result<()> {
    // stdout belongs to the console
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut directory = InMemoryDirectory::default();
    if let Some(path) = &args.accounts {
        let file = File::open(path)
            .with_context(|| format!("Failed to open `{}`", path.display()))?;
        let opened = load_accounts(file, &mut directory, |line, err| {
            warn!(line, "Skipping seed account: {err}")
        })?;
        info!(opened, "Seed accounts loaded");
    }

    let stdin = std::io::stdin();
    let session = Session {
        input: stdin.lock(),
        output: &mut std::io::stdout(),
        employee_password: args.employee_password,
        directory,
    };
    session.run()?;
    Ok(())
}
