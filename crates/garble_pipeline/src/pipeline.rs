//! Sequential, deterministic execution of operations over one buffer.
//!
//! Each entry gets its own generator seeded with
//! `derive_seed(master_seed, name, index)`, so an entry's draws depend only
//! on the master seed, its name and its position; never on what earlier
//! entries consumed.

use garble_core::buffer::TextBuffer;
use garble_core::rng::{Mt19937, RandomSource};
use garble_core::seed::derive_seed;
use garble_ops::{GlitchOp, Operation};

use crate::error::{PipelineError, PipelineResult};

/// One named operation in a pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineEntry {
    /// Name used for seed derivation and error reporting
    pub name: String,
    /// The operation to apply
    pub operation: Operation,
}

/// An ordered list of operations and the master seed they share.
///
/// # Examples
///
/// ```
/// use garble_ops::SwapAdjacentWords;
/// use garble_pipeline::Pipeline;
///
/// let pipeline = Pipeline::new(151).with_operation("Rushmore", SwapAdjacentWords { rate: 1.0 });
/// assert_eq!(pipeline.run("one two three four").unwrap(), "two one four three");
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Pipeline {
    master_seed: i128,
    entries: Vec<PipelineEntry>,
}

impl Pipeline {
    /// Creates an empty pipeline.
    pub fn new(master_seed: i128) -> Self {
        Self {
            master_seed,
            entries: Vec::new(),
        }
    }

    /// Appends an operation, builder style.
    pub fn with_operation(mut self, name: impl Into<String>, operation: impl Into<Operation>) -> Self {
        self.push(name, operation);
        self
    }

    /// Appends an operation.
    pub fn push(&mut self, name: impl Into<String>, operation: impl Into<Operation>) {
        self.entries.push(PipelineEntry {
            name: name.into(),
            operation: operation.into(),
        });
    }

    /// The master seed.
    #[inline]
    pub fn master_seed(&self) -> i128 {
        self.master_seed
    }

    /// Entries in execution order.
    #[inline]
    pub fn entries(&self) -> &[PipelineEntry] {
        &self.entries
    }

    /// Number of entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the pipeline has no entries.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The seed each entry will be run with, in execution order.
    pub fn seeds(&self) -> Vec<u64> {
        self.entries
            .iter()
            .enumerate()
            .map(|(index, entry)| derive_seed(self.master_seed, &entry.name, index))
            .collect()
    }

    /// Runs every entry over `text` with the built-in generator.
    ///
    /// # Errors
    /// The first failing operation aborts the run; see [`PipelineError`].
    pub fn run(&self, text: &str) -> PipelineResult<String> {
        self.run_with(text, Mt19937::from_seed_u64)
    }

    /// Runs every entry, seeding each from `factory(derived_seed)`.
    ///
    /// Lets a host inject its own generator while keeping seed derivation.
    ///
    /// # Errors
    /// The first failing operation aborts the run; see [`PipelineError`].
    pub fn run_with<F, R>(&self, text: &str, mut factory: F) -> PipelineResult<String>
    where
        F: FnMut(u64) -> R,
        R: RandomSource,
    {
        let span = tracing::debug_span!("pipeline", operations = self.entries.len());
        let _guard = span.enter();

        let mut buffer = TextBuffer::new(text);
        for (index, entry) in self.entries.iter().enumerate() {
            let seed = derive_seed(self.master_seed, &entry.name, index);
            tracing::debug!(name = %entry.name, index, seed, kind = entry.operation.kind(), "applying operation");
            let mut rng = factory(seed);
            entry
                .operation
                .apply(&mut buffer, &mut rng)
                .map_err(|source| {
                    tracing::warn!(name = %entry.name, index, error = %source, "operation failed");
                    PipelineError::Operation {
                        name: entry.name.clone(),
                        index,
                        source,
                    }
                })?;
        }
        Ok(buffer.into_string())
    }
}
