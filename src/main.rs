use anyhow::Result;
use dotenvy::dotenv;
use tracing::info;
use tracing_appender::rolling;

use leavedesk::{Config, FileStore, LeaveLedger};

/// Non-interactive status report: loads the ledger (seeding on first run)
/// and prints the employee balances plus the pending queue.
fn main() -> Result<()> {
    dotenv().ok();

    let config = Config::from_env();

    // Rolling daily log
    let file_appender = rolling::daily(&config.log_dir, "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_target(false)
        .with_level(true)
        .init();

    info!(data_dir = %config.data_dir, "starting leavedesk status report");

    let ledger = LeaveLedger::open(FileStore::new(&config.data_dir));

    println!("Employees:");
    for employee in ledger.employees() {
        println!(
            "  #{} {}: {} day(s) of annual leave remaining",
            employee.id, employee.name, employee.balance
        );
    }

    let pending = ledger.pending_leaves();
    println!(
        "\nPending requests ({} of {} total):",
        pending.len(),
        ledger.all_leaves().len()
    );
    println!("{}", serde_json::to_string_pretty(&pending)?);

    Ok(())
}
