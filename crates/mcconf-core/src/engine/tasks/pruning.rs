use crate::engine::error::EngineError;
use crate::engine::matrix::DistanceMatrix;
use tracing::{debug, instrument};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PruningOutcome {
    /// The last remaining label.
    pub survivor: usize,
    /// Labels in the order they were removed.
    pub removed: Vec<usize>,
}

/// Removes the most divergent conformer until a single label remains.
#[instrument(skip_all, name = "pruning_task")]
pub fn run(matrix: &mut DistanceMatrix) -> Result<PruningOutcome, EngineError> {
    if matrix.is_empty() {
        return Err(EngineError::Invariant(
            "cannot select a representative from an empty matrix".to_string(),
        ));
    }

    let mut removed = Vec::with_capacity(matrix.len() - 1);
    while matrix.len() > 1 {
        let label = matrix.prune_most_divergent()?;
        debug!(label, remaining = matrix.len(), "Pruned most divergent conformer.");
        removed.push(label);
    }

    let survivor = *matrix
        .labels()
        .first()
        .ok_or_else(|| EngineError::Invariant("pruning removed every label".to_string()))?;
    Ok(PruningOutcome { survivor, removed })
}
