//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `dealflow_core` wiring.
//! - Print the seeded pipeline board deterministically for quick sanity checks.
//!
//! Set `DEALFLOW_LOG_DIR` (absolute path) to also write core logs.

use dealflow_core::{core_version, init_logging, CoreConfig, Crm, Stage};
use log::error;
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    println!("dealflow_core version={}", core_version());
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("event=cli_run module=cli status=error");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), Box<dyn Error>> {
    let config = CoreConfig::immediate();
    if let Some(log_dir) = std::env::var_os("DEALFLOW_LOG_DIR") {
        init_logging(&config.log_level, &PathBuf::from(log_dir))?;
    }

    let crm = Crm::from_seed(&config)?;
    let board = crm.board().await?;
    for stage in Stage::ALL {
        let aggregate = board.column(stage).aggregate();
        println!(
            "stage={:<12} count={} value={:.0}",
            stage.label(),
            aggregate.count,
            aggregate.total_value
        );
    }

    let totals = crm.totals().await?;
    println!(
        "total_value={:.0} active={} won_value={:.0} win_rate={}%",
        totals.total_value, totals.active_count, totals.won_value, totals.win_rate
    );
    Ok(())
}
