//! The search daemon itself: `seedsearch run`.

use anyhow::{Context, Result};
use std::path::Path;
use std::time::Duration;

pub async fn cmd_run(config_path: &Path, max_phase3_batches: Option<u64>) -> Result<()> {
    use seedsearch::batch::BatchWriter;
    use seedsearch::catalog::PhraseCatalog;
    use seedsearch::config::Settings;
    use seedsearch::controller::{PhaseController, RunLimits, RunOutcome};
    use seedsearch::ledger::StateLedger;
    use seedsearch::lock::InstanceLock;
    use seedsearch::oracle::{AlertSink, CommandAlert, CrackingAdapter, JohnOracle, LogAlert};

    let settings = Settings::load(config_path)?;
    let ledger = StateLedger::new(&settings.paths.ledger);
    if let Err(e) = settings.validate() {
        ledger.error(format!("Configuration error: {}", e));
        return Err(e.into());
    }
    if let Err(e) = settings.ensure_directories() {
        ledger.error(format!("Failed to create artifact or ledger directory: {}", e));
        return Err(e).context("Failed to create artifact or ledger directory");
    }
    let _lock = InstanceLock::acquire(settings.paths.lock_file())?;

    let alerts: Box<dyn AlertSink> = match &settings.alert.command {
        Some(command) => Box::new(CommandAlert::new(
            command.clone(),
            Duration::from_secs(settings.alert.timeout_secs),
        )),
        None => Box::new(LogAlert),
    };
    let adapter = CrackingAdapter::new(
        Box::new(JohnOracle::new(&settings.oracle)),
        alerts,
        &settings.paths.discoveries,
    );

    println!("{}", console::style("seedsearch").bold().cyan());
    println!("  Oracle:       {}", settings.oracle.binary.display());
    println!("  Targets:      {}", settings.oracle.hash_file.display());
    println!("  Ledger:       {}", settings.paths.ledger.display());
    println!("  Discoveries:  {}", settings.paths.discoveries.display());
    println!("  Artifacts:    {}", settings.paths.artifact_dir.display());
    println!();

    let controller = PhaseController::new(
        settings.search.clone(),
        PhraseCatalog::builtin().generate(),
        BatchWriter::new(&settings.paths.artifact_dir),
        adapter,
        ledger,
    )
    .with_limits(RunLimits { max_phase3_batches });

    match controller.run().await {
        Ok(RunOutcome::MatchFound { phase, entries }) => {
            println!(
                "{} in phase {}:",
                console::style("Match found").green().bold(),
                phase
            );
            for entry in entries {
                println!("  {}", entry);
            }
            println!("Discoveries file: {}", settings.paths.discoveries.display());
        }
        Ok(RunOutcome::Phase3LimitReached { batches }) => {
            println!("Stopped after {} phase 3 batch(es).", batches);
        }
        Ok(RunOutcome::NothingToSearch) => {
            println!("{}", console::style("The phrase catalog is empty.").yellow());
        }
        Err(e) => {
            controller.ledger().error(format!("Run stopped: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}
