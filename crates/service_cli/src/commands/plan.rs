//! Plan command implementation
//!
//! Prints the seed each operation receives without running anything.

use std::path::Path;

use garble_pipeline::PlanInput;
use serde::Serialize;

use crate::Result;

#[derive(Serialize)]
struct PlannedOperation<'a> {
    position: usize,
    name: &'a str,
    kind: &'static str,
    seed: u64,
}

/// Run the plan command
pub fn run(run_file: &Path, seed: Option<&str>, json: bool) -> Result<()> {
    let (config, master_seed) = super::load_run(run_file, seed)?;

    let inputs: Vec<PlanInput> = config
        .operations
        .iter()
        .map(|descriptor| PlanInput::named(descriptor.name.clone()))
        .collect();
    let planned: Vec<PlannedOperation<'_>> = garble_pipeline::plan(&inputs, master_seed)
        .into_iter()
        .enumerate()
        .map(|(position, (index, seed))| {
            let descriptor = &config.operations[index];
            PlannedOperation {
                position,
                name: &descriptor.name,
                kind: descriptor.operation.kind(),
                seed,
            }
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&planned)?);
    } else {
        println!("master seed: {}", master_seed);
        for entry in &planned {
            println!("{:>3}  {:<16} {:<16} {:>20}", entry.position, entry.name, entry.kind, entry.seed);
        }
    }
    Ok(())
}
