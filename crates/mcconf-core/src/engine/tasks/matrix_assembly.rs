use crate::core::models::molecule::MolecularGraph;
use crate::engine::config::ScoringConfig;
use crate::engine::error::EngineError;
use crate::engine::matrix::DistanceMatrix;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::similarity::{PairScore, score_pair};
use itertools::Itertools;
use tracing::{info, instrument, warn};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

#[derive(Debug, Clone, PartialEq)]
pub struct ScoredPair {
    pub label_a: usize,
    pub label_b: usize,
    pub score: PairScore,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssembledMatrix {
    pub matrix: DistanceMatrix,
    pub pairs: Vec<ScoredPair>,
}

impl AssembledMatrix {
    /// Number of pairs that received the sentinel score.
    pub fn sentinel_pairs(&self) -> usize {
        self.pairs.iter().filter(|p| p.score.is_sentinel()).count()
    }
}

/// Scores every unordered pair of `conformers` and fills the distance matrix.
///
/// Labels are positions in `conformers`. Pairs are scored independently (in
/// parallel with the `parallel` feature); the matrix is written only once
/// every pair is done.
#[instrument(skip_all, name = "matrix_assembly_task")]
pub fn run(
    conformers: &[MolecularGraph],
    config: &ScoringConfig,
    reporter: &ProgressReporter,
) -> Result<AssembledMatrix, EngineError> {
    let pairs: Vec<(usize, usize)> = (0..conformers.len()).tuple_combinations().collect();
    info!(
        conformers = conformers.len(),
        pairs = pairs.len(),
        "Assembling distance matrix."
    );

    let mut matrix = DistanceMatrix::new(conformers.len());
    if pairs.is_empty() {
        return Ok(AssembledMatrix {
            matrix,
            pairs: Vec::new(),
        });
    }

    reporter.report(Progress::TaskStart {
        total_steps: pairs.len() as u64,
    });

    #[cfg(not(feature = "parallel"))]
    let iterator = pairs.iter();

    #[cfg(feature = "parallel")]
    let iterator = pairs.par_iter();

    let scored: Result<Vec<ScoredPair>, EngineError> = iterator
        .map(|&(i, j)| {
            let result = score_pair(&conformers[i], &conformers[j], config);
            reporter.report(Progress::TaskIncrement);
            result
                .map(|score| ScoredPair {
                    label_a: i,
                    label_b: j,
                    score,
                })
                .map_err(|source| EngineError::Scoring {
                    label_a: i,
                    label_b: j,
                    source,
                })
        })
        .collect();

    reporter.report(Progress::TaskFinish);
    let scored = scored?;

    for pair in &scored {
        match pair.score {
            PairScore::Unmatched => warn!(
                label_a = pair.label_a,
                label_b = pair.label_b,
                "No complete atom correspondence between conformers; using sentinel score."
            ),
            PairScore::AlignmentFailed => warn!(
                label_a = pair.label_a,
                label_b = pair.label_b,
                "Alignment failed numerically; using sentinel score."
            ),
            PairScore::Matched { .. } => {}
        }
        matrix.set(pair.label_a, pair.label_b, pair.score.value())?;
    }

    Ok(AssembledMatrix {
        matrix,
        pairs: scored,
    })
}
