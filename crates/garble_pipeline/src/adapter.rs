//! Entry points for hosts that drive the engine with descriptors.
//!
//! - [`compose`]: decode descriptors, run the pipeline, return the text
//! - [`try_compose`]: like `compose`, but over raw JSON descriptors, and
//!   reports unsupported kinds instead of failing so the host can sequence
//!   operations itself
//! - [`plan`]: derive seeds without running anything
//! - [`compose_batch`]: one independent pipeline per input, in parallel

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use garble_core::seed::derive_seed;

use crate::descriptor::{is_supported_kind, Descriptor};
use crate::error::{BoundaryError, BoundaryResult};
use crate::pipeline::Pipeline;

/// Decodes `descriptors` into a pipeline.
///
/// # Errors
/// `BoundaryError::Descriptor` for the first descriptor that fails
/// validation.
pub fn build_pipeline(descriptors: &[Descriptor], master_seed: i128) -> BoundaryResult<Pipeline> {
    let mut pipeline = Pipeline::new(master_seed);
    for (index, descriptor) in descriptors.iter().enumerate() {
        let operation = descriptor.build().map_err(|err| BoundaryError::Descriptor {
            index,
            message: err.to_string(),
        })?;
        pipeline.push(descriptor.name.clone(), operation);
    }
    Ok(pipeline)
}

/// Runs `descriptors` over `text` in order.
///
/// # Errors
/// A descriptor validation failure, or the first operation failure wrapped
/// with its name and position.
///
/// # Examples
///
/// ```
/// use garble_pipeline::{compose, Descriptor, OperationSpec};
///
/// let descriptors = [Descriptor::new("Rushmore", OperationSpec::SwapAdjacent { rate: 1.0 })];
/// assert_eq!(compose("one two three four", &descriptors, 151).unwrap(), "two one four three");
/// ```
pub fn compose(text: &str, descriptors: &[Descriptor], master_seed: i128) -> BoundaryResult<String> {
    let pipeline = build_pipeline(descriptors, master_seed)?;
    Ok(pipeline.run(text)?)
}

/// Runs one pipeline per input text, in parallel.
///
/// Inputs share only the immutable decoded pipeline, so each output equals
/// `compose(text, descriptors, master_seed)` for its input.
///
/// # Errors
/// As [`compose`]; if several inputs fail, one of their errors is returned.
pub fn compose_batch<S>(texts: &[S], descriptors: &[Descriptor], master_seed: i128) -> BoundaryResult<Vec<String>>
where
    S: AsRef<str> + Sync,
{
    let pipeline = build_pipeline(descriptors, master_seed)?;
    tracing::debug!(inputs = texts.len(), operations = pipeline.len(), "composing batch");
    texts
        .par_iter()
        .map(|text| pipeline.run(text.as_ref()).map_err(BoundaryError::from))
        .collect()
}

/// Outcome of [`try_compose`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Composition {
    /// Every descriptor was supported and the pipeline ran.
    Composed(String),
    /// Some kinds are unknown to the engine; nothing ran.
    Fallback {
        /// The unsupported `type` tags, in descriptor order
        unsupported: Vec<String>,
    },
}

/// Composes over raw JSON descriptors, falling back on unknown kinds.
///
/// # Errors
/// A descriptor without a string `type`, a supported descriptor that fails
/// to decode or validate, or an operation failure.
///
/// # Examples
///
/// ```
/// use garble_pipeline::{try_compose, Composition};
/// use serde_json::json;
///
/// let raw = [json!({"name": "Scannequin", "type": "ocr", "rate": 0.0}),
///            json!({"name": "Spectroll", "type": "spectroll"})];
/// assert_eq!(
///     try_compose("text", &raw, 1).unwrap(),
///     Composition::Fallback { unsupported: vec!["spectroll".to_string()] },
/// );
/// ```
pub fn try_compose(text: &str, raw: &[Value], master_seed: i128) -> BoundaryResult<Composition> {
    let mut unsupported = Vec::new();
    for (index, value) in raw.iter().enumerate() {
        let kind = value
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| BoundaryError::Descriptor {
                index,
                message: "missing string field 'type'".to_string(),
            })?;
        if !is_supported_kind(kind) {
            unsupported.push(kind.to_string());
        }
    }
    if !unsupported.is_empty() {
        tracing::debug!(?unsupported, "falling back to host sequencing");
        return Ok(Composition::Fallback { unsupported });
    }

    let descriptors = raw
        .iter()
        .enumerate()
        .map(|(index, value)| {
            Descriptor::deserialize(value).map_err(|err| BoundaryError::Descriptor {
                index,
                message: err.to_string(),
            })
        })
        .collect::<BoundaryResult<Vec<_>>>()?;
    compose(text, &descriptors, master_seed).map(Composition::Composed)
}

/// One operation to plan a seed for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanInput {
    /// Name used for seed derivation
    pub name: String,
    /// Coarse ordering group; lower runs first
    #[serde(default)]
    pub scope: i32,
    /// Ordering within a scope; lower runs first
    #[serde(default)]
    pub order: i32,
}

impl PlanInput {
    /// An input with scope and order zero.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            scope: 0,
            order: 0,
        }
    }
}

/// Derives seeds for `inputs` without running them.
///
/// Inputs are ordered stably by `(scope, order)`; each gets the seed for its
/// position in that order. The result lists `(original index, seed)` in
/// execution order.
///
/// # Examples
///
/// ```
/// use garble_core::seed::derive_seed;
/// use garble_pipeline::{plan, PlanInput};
///
/// let planned = plan(&[PlanInput::named("Typogre"), PlanInput::named("Mim1c")], 151);
/// assert_eq!(planned, vec![(0, derive_seed(151, "Typogre", 0)), (1, derive_seed(151, "Mim1c", 1))]);
/// ```
pub fn plan(inputs: &[PlanInput], master_seed: i128) -> Vec<(usize, u64)> {
    let mut ordered: Vec<(usize, &PlanInput)> = inputs.iter().enumerate().collect();
    ordered.sort_by_key(|(_, input)| (input.scope, input.order));
    ordered
        .into_iter()
        .enumerate()
        .map(|(position, (index, input))| (index, derive_seed(master_seed, &input.name, position)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::OperationSpec;
    use serde_json::json;

    #[test]
    fn test_plan_orders_by_scope_then_order() {
        let inputs = vec![
            PlanInput { name: "late".to_string(), scope: 1, order: 0 },
            PlanInput { name: "early".to_string(), scope: 0, order: 5 },
            PlanInput { name: "first".to_string(), scope: 0, order: 1 },
        ];
        let planned = plan(&inputs, 42);
        assert_eq!(
            planned,
            vec![
                (2, derive_seed(42, "first", 0)),
                (1, derive_seed(42, "early", 1)),
                (0, derive_seed(42, "late", 2)),
            ]
        );
    }

    #[test]
    fn test_plan_is_stable_for_ties() {
        let inputs = vec![PlanInput::named("a"), PlanInput::named("b"), PlanInput::named("c")];
        let indices: Vec<usize> = plan(&inputs, 0).into_iter().map(|(index, _)| index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
    }

    #[test]
    fn test_compose_matches_pipeline() {
        let descriptors = vec![
            Descriptor::new("Reduple", OperationSpec::Reduplicate { rate: 0.3, unweighted: false }),
            Descriptor::new("Typogre", OperationSpec::Typo {
                rate: 0.05,
                layout: None,
                shift_slip_rate: 0.0,
                shift_slip_exit_rate: None,
                shift_map: None,
                motor_weighting: Default::default(),
            }),
        ];
        let text = "Some reasonably long sentence to corrupt a little.";
        let pipeline = build_pipeline(&descriptors, 9).unwrap();
        assert_eq!(compose(text, &descriptors, 9).unwrap(), pipeline.run(text).unwrap());
    }

    #[test]
    fn test_descriptor_error_carries_index() {
        let descriptors = vec![
            Descriptor::new("Ok", OperationSpec::Ocr { rate: 0.1 }),
            Descriptor::new("Bad", OperationSpec::Ocr { rate: f64::INFINITY }),
        ];
        let err = compose("x", &descriptors, 0).unwrap_err();
        assert!(matches!(err, BoundaryError::Descriptor { index: 1, .. }));
    }

    #[test]
    fn test_operation_error_is_surfaced() {
        let descriptors = vec![Descriptor::new(
            "Redactyl",
            OperationSpec::Redact {
                replacement_char: '█',
                rate: 0.5,
                merge_adjacent: false,
                unweighted: false,
            },
        )];
        let err = compose("", &descriptors, 0).unwrap_err();
        assert!(matches!(err, BoundaryError::Pipeline(_)));
        assert_eq!(err.index(), 0);
    }

    #[test]
    fn test_try_compose_runs_supported_batches() {
        let raw = vec![json!({"name": "Rushmore", "type": "swap_adjacent", "rate": 1.0})];
        assert_eq!(
            try_compose("one two", &raw, 5).unwrap(),
            Composition::Composed("two one".to_string())
        );
    }

    #[test]
    fn test_try_compose_requires_type() {
        let raw = vec![json!({"name": "Nameless"})];
        assert!(matches!(
            try_compose("x", &raw, 5),
            Err(BoundaryError::Descriptor { index: 0, .. })
        ));
    }

    #[test]
    fn test_batch_matches_single_compose() {
        let descriptors = vec![Descriptor::new("Rushmore", OperationSpec::Delete { rate: 0.5, unweighted: false })];
        let texts = ["alpha beta gamma delta", "one two three", "", "solo"];
        let batch = compose_batch(&texts, &descriptors, 77).unwrap();
        for (text, out) in texts.iter().zip(&batch) {
            assert_eq!(out, &compose(text, &descriptors, 77).unwrap());
        }
    }
}
