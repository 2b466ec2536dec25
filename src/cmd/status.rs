//! Watcher report: `seedsearch status`.

use anyhow::{Context, Result};
use std::path::Path;

pub fn cmd_status(config_path: &Path, json: bool) -> Result<()> {
    use seedsearch::catalog::PhraseCatalog;
    use seedsearch::config::Settings;
    use seedsearch::ledger::StateLedger;
    use seedsearch::report::StatusReport;

    let settings = Settings::load(config_path)?;
    let ledger = StateLedger::new(&settings.paths.ledger);
    let lines = ledger.lines()?;
    let phrases = PhraseCatalog::builtin().generate();

    let report = StatusReport::build(
        &lines,
        &phrases,
        &settings.search,
        &settings.paths.discoveries,
        chrono::Local::now().fixed_offset(),
    );

    if json {
        let rendered =
            serde_json::to_string_pretty(&report).context("Failed to serialize status report")?;
        println!("{}", rendered);
        return Ok(());
    }

    if lines.is_empty() {
        println!("No ledger entries at {} yet.", settings.paths.ledger.display());
        println!();
    }
    print!("{}", report.render());
    println!();
    println!("Ledger: {}", settings.paths.ledger.display());
    println!("Discoveries: {}", settings.paths.discoveries.display());
    Ok(())
}
