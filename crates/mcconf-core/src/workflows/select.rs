use crate::core::models::group::{IsomerGroup, group_by_property};
use crate::core::models::molecule::MolecularGraph;
use crate::engine::cancel::CancellationToken;
use crate::engine::config::{ScoringConfig, SelectionConfig};
use crate::engine::error::EngineError;
use crate::engine::matrix::DistanceMatrix;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::tasks;
use tracing::{info, instrument};

/// Data item recording how many conformers a representative was chosen from.
pub const SAMPLE_SIZE_PROPERTY: &str = "SAMPLE_SIZE";

/// The chosen conformer of one isomer group, with the evidence for the choice.
#[derive(Debug, Clone)]
pub struct Representative {
    pub group: String,
    /// Position of the representative within the group's conformers.
    pub label: usize,
    pub sample_size: usize,
    /// Records dropped from the group beyond the maximum sample size.
    pub discarded: usize,
    /// Labels in the order they were pruned.
    pub pruning_order: Vec<usize>,
    /// The full, unpruned score matrix.
    pub scores: DistanceMatrix,
    pub sentinel_pairs: usize,
    /// The representative conformer, carrying the sample-size data item.
    pub molecule: MolecularGraph,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionSummary {
    pub groups: usize,
    pub conformers: usize,
    pub discarded: usize,
}

/// Picks the conformer of `group` closest to all others.
#[instrument(skip_all, name = "select_representative", fields(group = %group.name))]
pub fn select_representative(
    group: &IsomerGroup,
    config: &ScoringConfig,
    reporter: &ProgressReporter,
) -> Result<Representative, EngineError> {
    if group.conformers.is_empty() {
        return Err(EngineError::Invariant(format!(
            "group '{}' has no conformers",
            group.name
        )));
    }

    let assembled = tasks::matrix_assembly::run(&group.conformers, config, reporter)?;
    let sentinel_pairs = assembled.sentinel_pairs();
    let scores = assembled.matrix.clone();
    let mut working = assembled.matrix;
    let outcome = tasks::pruning::run(&mut working)?;

    let mut molecule = group
        .conformers
        .get(outcome.survivor)
        .cloned()
        .ok_or_else(|| {
            EngineError::Invariant(format!(
                "surviving label {} is not a conformer of the group",
                outcome.survivor
            ))
        })?;
    molecule.set_property(SAMPLE_SIZE_PROPERTY, group.sample_size().to_string());

    if sentinel_pairs > 0 {
        reporter.report(Progress::Message(format!(
            "{}: {} pair(s) without atom correspondence scored as maximally divergent",
            group.name, sentinel_pairs
        )));
    }

    info!(
        label = outcome.survivor,
        title = molecule.title(),
        sample_size = group.sample_size(),
        sentinel_pairs,
        "Selected representative conformer."
    );

    Ok(Representative {
        group: group.name.clone(),
        label: outcome.survivor,
        sample_size: group.sample_size(),
        discarded: group.discarded,
        pruning_order: outcome.removed,
        scores,
        sentinel_pairs,
        molecule,
    })
}

/// Groups `molecules` and hands one representative per group to `sink`, in
/// group order.
///
/// Groups are processed one at a time; cancellation is checked before each.
/// Representatives already passed to `sink` stay valid if a later group fails
/// or the run is cancelled.
///
/// # Errors
///
/// Returns the first grouping, scoring or sink error, or
/// [`EngineError::Cancelled`] converted into `E`.
#[instrument(skip_all, name = "selection_workflow")]
pub fn run<I, F, E>(
    molecules: I,
    config: &SelectionConfig,
    reporter: &ProgressReporter,
    cancel: &CancellationToken,
    mut sink: F,
) -> Result<SelectionSummary, E>
where
    I: IntoIterator<Item = MolecularGraph>,
    F: FnMut(Representative) -> Result<(), E>,
    E: From<EngineError>,
{
    let groups = group_by_property(
        molecules,
        &config.grouping.property,
        config.grouping.max_sample_size,
    )
    .map_err(EngineError::from)?;
    info!(
        groups = groups.len(),
        property = %config.grouping.property,
        "Split input into isomer groups."
    );

    let mut summary = SelectionSummary::default();
    for (index, group) in groups.iter().enumerate() {
        if cancel.is_cancelled() {
            info!(completed = index, "Selection cancelled.");
            return Err(EngineError::Cancelled.into());
        }

        reporter.report(Progress::GroupStart {
            name: group.name.clone(),
            index,
            total: groups.len(),
        });
        let representative = select_representative(group, &config.scoring, reporter)
            .map_err(|e| e.in_group(&group.name))?;
        reporter.report(Progress::GroupFinish);

        summary.groups += 1;
        summary.conformers += group.sample_size();
        summary.discarded += group.discarded;
        sink(representative)?;
    }

    info!(
        groups = summary.groups,
        conformers = summary.conformers,
        discarded = summary.discarded,
        "Selection complete."
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::atom::Atom;
    use crate::core::models::topology::{Bond, BondOrder};
    use crate::engine::config::{AlignmentFailurePolicy, SelectionConfigBuilder, SimilarityMetric};
    use nalgebra::{Point3, Rotation3, Translation3, Unit, Vector3};

    // C0 bonded to N1, O2 and S3; S3 bonded to Cl4. Every atom is distinct,
    // so the identity is the only atom mapping.
    const BASE: [(&str, [f64; 3]); 5] = [
        ("C", [0.0, 0.0, 0.0]),
        ("N", [1.47, 0.0, 0.0]),
        ("O", [-0.5, 1.3, 0.1]),
        ("S", [-0.6, -0.9, 1.2]),
        ("Cl", [-1.8, -1.2, 2.6]),
    ];

    fn bonds() -> Vec<Bond> {
        vec![
            Bond::new(0, 1, BondOrder::Single),
            Bond::new(0, 2, BondOrder::Double),
            Bond::new(0, 3, BondOrder::Single),
            Bond::new(3, 4, BondOrder::Single),
        ]
    }

    /// A deterministic, slightly perturbed and rigidly moved copy of the base geometry.
    fn conformer(isomer: &str, seed: usize) -> MolecularGraph {
        let rotation = Rotation3::from_axis_angle(
            &Unit::new_normalize(Vector3::new(1.0, seed as f64, 0.5)),
            0.3 * seed as f64,
        );
        let shift = Translation3::new(seed as f64, -2.0 * seed as f64, 0.5);
        let atoms = BASE
            .iter()
            .enumerate()
            .map(|(i, (symbol, [x, y, z]))| {
                let noise = Vector3::new(
                    ((seed * 7 + i * 3) % 5) as f64 - 2.0,
                    ((seed * 3 + i * 5) % 7) as f64 - 3.0,
                    ((seed * 11 + i) % 3) as f64 - 1.0,
                ) * 0.0025;
                let p = Point3::new(*x, *y, *z) + noise;
                Atom::new(symbol, shift * (rotation * p))
            })
            .collect();
        let mut mol =
            MolecularGraph::from_parts(&format!("{isomer}-{seed}"), atoms, bonds()).unwrap();
        mol.set_property("ISOMER", isomer);
        mol
    }

    fn stretched(isomer: &str) -> MolecularGraph {
        let mut mol = conformer(isomer, 9);
        let mut positions = mol.positions();
        positions[4] = positions[3] + (positions[4] - positions[3]) * 5.0;
        mol.set_positions(&positions);
        mol.set_title("stretched");
        mol
    }

    fn broken(isomer: &str) -> MolecularGraph {
        let source = conformer(isomer, 8);
        let mut bonds = bonds();
        bonds[3] = Bond::new(1, 4, BondOrder::Single);
        let mut mol =
            MolecularGraph::from_parts("broken", source.atoms().to_vec(), bonds).unwrap();
        mol.set_property("ISOMER", isomer);
        mol
    }

    fn config(metric: SimilarityMetric) -> SelectionConfig {
        SelectionConfigBuilder::new()
            .metric(metric)
            .on_alignment_failure(AlignmentFailurePolicy::Abort)
            .group_property("ISOMER")
            .max_sample_size(50)
            .build()
            .unwrap()
    }

    fn collect(
        molecules: Vec<MolecularGraph>,
        config: &SelectionConfig,
    ) -> Result<Vec<Representative>, EngineError> {
        let mut out = Vec::new();
        run(
            molecules,
            config,
            &ProgressReporter::new(),
            &CancellationToken::new(),
            |rep| {
                out.push(rep);
                Ok::<_, EngineError>(())
            },
        )?;
        Ok(out)
    }

    #[test]
    fn two_groups_of_noisy_conformers_each_get_a_representative() {
        let mut input = Vec::new();
        for seed in 0..5 {
            input.push(conformer("A", seed));
            input.push(conformer("B", seed + 10));
        }
        let reps = collect(input.clone(), &config(SimilarityMetric::AlignmentRmsd)).unwrap();
        assert_eq!(reps.len(), 2);
        assert_eq!(reps[0].group, "A");
        assert_eq!(reps[1].group, "B");

        for rep in &reps {
            assert_eq!(rep.sample_size, 5);
            assert_eq!(rep.sentinel_pairs, 0);
            assert_eq!(rep.pruning_order.len(), 4);
            assert_eq!(rep.molecule.property(SAMPLE_SIZE_PROPERTY), Some("5"));
            for i in 0..5 {
                for j in (i + 1)..5 {
                    let score = rep.scores.get(i, j).unwrap();
                    assert!(score > 0.0 && score < 0.05, "score {score}");
                }
            }
        }

        // Same input, same choice.
        let again = collect(input, &config(SimilarityMetric::AlignmentRmsd)).unwrap();
        for (a, b) in reps.iter().zip(&again) {
            assert_eq!(a.label, b.label);
            assert_eq!(a.pruning_order, b.pruning_order);
            assert_eq!(a.molecule, b.molecule);
        }
    }

    #[test]
    fn stretched_conformer_is_pruned_first() {
        for metric in [SimilarityMetric::AlignmentRmsd, SimilarityMetric::InternalDistance] {
            let mut input: Vec<_> = (0..4).map(|s| conformer("A", s)).collect();
            input.insert(2, stretched("A"));
            let reps = collect(input, &config(metric)).unwrap();
            assert_eq!(reps[0].pruning_order[0], 2);
            assert_ne!(reps[0].label, 2);
        }
    }

    #[test]
    fn broken_connectivity_scores_sentinel_and_run_completes() {
        let mut input: Vec<_> = (0..3).map(|s| conformer("A", s)).collect();
        input.push(broken("A"));
        let reps = collect(input, &config(SimilarityMetric::AlignmentRmsd)).unwrap();
        let rep = &reps[0];
        assert_eq!(rep.sentinel_pairs, 3);
        assert_eq!(rep.scores.get(0, 3), Some(f64::MAX));
        assert_eq!(rep.pruning_order[0], 3);
        assert_ne!(rep.molecule.title(), "broken");
    }

    #[test]
    fn sentinel_pairs_are_reported_as_a_message() {
        let mut input: Vec<_> = (0..3).map(|s| conformer("A", s)).collect();
        input.push(broken("A"));
        let groups = group_by_property(input, "ISOMER", 50).unwrap();

        let messages = std::sync::Mutex::new(Vec::new());
        let reporter = ProgressReporter::with_callback(Box::new(|event| {
            if let Progress::Message(text) = event {
                messages.lock().unwrap().push(text);
            }
        }));
        let scoring = config(SimilarityMetric::AlignmentRmsd).scoring;
        select_representative(&groups[0], &scoring, &reporter).unwrap();
        drop(reporter);

        let messages = messages.into_inner().unwrap();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].starts_with("A: 3 pair(s)"));

        let clean: Vec<_> = (0..3).map(|s| conformer("A", s)).collect();
        let groups = group_by_property(clean, "ISOMER", 50).unwrap();
        let silent = ProgressReporter::with_callback(Box::new(|event| {
            assert!(!matches!(event, Progress::Message(_)));
        }));
        select_representative(&groups[0], &scoring, &silent).unwrap();
    }

    #[test]
    fn two_conformer_group_keeps_label_zero() {
        let input = vec![conformer("A", 1), conformer("A", 2)];
        let reps = collect(input, &config(SimilarityMetric::AlignmentRmsd)).unwrap();
        assert_eq!(reps[0].pruning_order, vec![1]);
        assert_eq!(reps[0].label, 0);
        assert_eq!(reps[0].molecule.title(), "A-1");
    }

    #[test]
    fn single_conformer_group_is_its_own_representative() {
        let reps = collect(vec![conformer("solo", 3)], &config(SimilarityMetric::AlignmentRmsd))
            .unwrap();
        assert_eq!(reps[0].label, 0);
        assert!(reps[0].pruning_order.is_empty());
        assert_eq!(reps[0].molecule.property(SAMPLE_SIZE_PROPERTY), Some("1"));
    }

    #[test]
    fn sample_size_counts_only_retained_conformers() {
        let config = SelectionConfigBuilder::new()
            .metric(SimilarityMetric::AlignmentRmsd)
            .on_alignment_failure(AlignmentFailurePolicy::Abort)
            .group_property("ISOMER")
            .max_sample_size(3)
            .build()
            .unwrap();
        let input: Vec<_> = (0..5).map(|s| conformer("A", s)).collect();
        let reps = collect(input, &config).unwrap();
        assert_eq!(reps[0].sample_size, 3);
        assert_eq!(reps[0].discarded, 2);
        assert_eq!(reps[0].molecule.property(SAMPLE_SIZE_PROPERTY), Some("3"));
    }

    #[test]
    fn missing_group_property_aborts_before_scoring() {
        let mut untagged = conformer("A", 1);
        untagged.remove_property("ISOMER");
        let result = collect(
            vec![conformer("A", 0), untagged],
            &config(SimilarityMetric::AlignmentRmsd),
        );
        assert!(matches!(result, Err(EngineError::Grouping(_))));
    }

    #[test]
    fn cancelled_run_stops_at_group_boundary() {
        let cancel = CancellationToken::new();
        let mut emitted = Vec::new();
        let input = vec![conformer("A", 0), conformer("B", 0), conformer("C", 0)];
        let result = run(
            input,
            &config(SimilarityMetric::AlignmentRmsd),
            &ProgressReporter::new(),
            &cancel,
            |rep: Representative| {
                emitted.push(rep.group);
                cancel.cancel();
                Ok::<_, EngineError>(())
            },
        );
        assert!(matches!(result, Err(EngineError::Cancelled)));
        assert_eq!(emitted, vec!["A".to_string()]);
    }

    #[test]
    fn sink_errors_propagate() {
        let result = run(
            vec![conformer("A", 0)],
            &config(SimilarityMetric::AlignmentRmsd),
            &ProgressReporter::new(),
            &CancellationToken::new(),
            |_| Err(EngineError::Invariant("disk full".into())),
        );
        assert!(matches!(result, Err(EngineError::Invariant(_))));
    }
}
