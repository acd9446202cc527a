//! Compose command implementation

use std::io::{Read, Write};
use std::path::Path;

use tracing::info;

use crate::Result;

/// Run the compose command
pub fn run(run_file: &Path, text: Option<&str>, seed: Option<&str>) -> Result<()> {
    let (config, master_seed) = super::load_run(run_file, seed)?;
    info!(
        operations = config.operations.len(),
        master_seed = %master_seed,
        "composing"
    );

    let input = match text {
        Some(text) => text.to_string(),
        None => {
            let mut buffer = String::new();
            std::io::stdin().read_to_string(&mut buffer)?;
            buffer
        }
    };

    let output = garble_pipeline::compose(&input, &config.operations, master_seed)?;

    let mut stdout = std::io::stdout().lock();
    stdout.write_all(output.as_bytes())?;
    if text.is_some() {
        stdout.write_all(b"\n")?;
    }
    stdout.flush()?;
    Ok(())
}
