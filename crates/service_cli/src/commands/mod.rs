//! Subcommand implementations

pub mod check;
pub mod compose;
pub mod plan;

use std::path::Path;

use garble_pipeline::RunConfig;
use tracing::info;

use crate::Result;

/// Loads a run file and settles its master seed.
///
/// Priority (highest to lowest):
/// 1. `--seed`
/// 2. `GARBLE_MASTER_SEED`
/// 3. The run file
/// 4. A random seed, logged so the run can be repeated
pub(crate) fn load_run(path: &Path, seed_override: Option<&str>) -> Result<(RunConfig, i128)> {
    let mut config = RunConfig::load(path)?;
    if let Some(value) = seed_override {
        config.apply_seed_override(value)?;
    }
    let seed = match config.master_seed {
        Some(seed) => seed,
        None => {
            let seed = i128::from(rand::random::<i64>());
            info!(seed = %seed, "no master seed configured, drew one at random");
            seed
        }
    };
    Ok((config, seed))
}
