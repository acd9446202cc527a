//! Check command implementation
//!
//! Decodes and validates a run file; nothing is composed.

use std::path::Path;

use garble_pipeline::RunConfig;
use tracing::info;

use crate::Result;

/// Run the check command
pub fn run(run_file: &Path) -> Result<()> {
    let config = RunConfig::load(run_file)?;
    info!(path = %run_file.display(), "run file is valid");

    println!("{}: ok", run_file.display());
    match config.master_seed {
        Some(seed) => println!("  master seed: {}", seed),
        None => println!("  master seed: (random)"),
    }
    for (index, descriptor) in config.operations.iter().enumerate() {
        println!("  [{}] {} ({})", index, descriptor.name, descriptor.operation.kind());
    }
    Ok(())
}
