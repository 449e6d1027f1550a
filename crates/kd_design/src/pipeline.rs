//! Full design run for one scaffold.
//!
//! Draw order from the single random source: motif policy, constraint
//! compiler, then for every trial and every try one draw per position.

use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;

use kd_structure::find_hairpin_loops;
use kd_structure::DotBracketVec;
use kd_structure::HairpinLoop;
use kd_structure::PairTable;

use crate::assign_motifs;
use crate::compile;
use crate::filter_by_mfe;
use crate::inverse_fold_search;
use crate::rank_candidates;
use crate::Annotation;
use crate::Candidate;
use crate::ConflictPolicy;
use crate::ConstraintTable;
use crate::DesignConfig;
use crate::DesignError;
use crate::FoldingOracle;
use crate::MotifAssignment;
use crate::OracleFailurePolicy;
use crate::ScaffoldCatalog;
use crate::Topology;

/// Loops, motifs and constraints shared by all trials of a run.
#[derive(Debug, Clone)]
pub struct MotifPlan {
    pub structure: String,
    pub loops: Vec<HairpinLoop>,
    pub motifs: MotifAssignment,
    pub constraints: ConstraintTable,
    pub annotation: Annotation,
}

/// Validate `structure`, detect its hairpins, assign motifs and compile them.
pub fn plan_motifs<R: Rng + ?Sized>(
    structure: &str,
    topology: Topology,
    policy: ConflictPolicy,
    rng: &mut R,
) -> Result<MotifPlan, DesignError> {
    let dbv = DotBracketVec::try_from(structure)?;
    PairTable::try_from(&dbv)?;
    let loops = find_hairpin_loops(&dbv);
    let motifs = assign_motifs(topology, &loops, rng);
    let (constraints, annotation) = compile(dbv.len(), &loops, &motifs, policy, rng)?;
    Ok(MotifPlan {
        structure: structure.to_string(),
        loops,
        motifs,
        constraints,
        annotation,
    })
}

/// Run the pipeline on an arbitrary target structure.
pub fn design_structure<O: FoldingOracle + ?Sized>(
    structure: &str,
    topology: Topology,
    config: &DesignConfig,
    oracle: &O,
) -> Result<Vec<Candidate>, DesignError> {
    config.validate()?;
    let mut rng = StdRng::seed_from_u64(config.seed);
    let plan = plan_motifs(structure, topology, config.conflict_policy, &mut rng)?;
    log::info!(
        "{} hairpin loops, {} kissing pairs, {} constrained positions.",
        plan.loops.len(),
        plan.motifs.kissing_pairs().len(),
        plan.constraints.len()
    );

    if config.tries_per_trial == 0 {
        log::warn!("No inverse-folding tries per trial, nothing to design.");
        return Ok(Vec::new());
    }

    // Trials can outnumber the candidates by far, so grow on demand.
    let n_trials = config.n_trials();
    let mut candidates = Vec::new();
    let mut failures = 0;
    for trial in 0..n_trials {
        let result = inverse_fold_search(
            structure,
            &plan.constraints,
            config.tries_per_trial,
            oracle,
            &mut rng,
        );
        match result {
            Ok(Some(hit)) => {
                log::debug!("trial {}: d={} mfe={:.2}", trial, hit.bp_distance, hit.mfe);
                candidates.push(Candidate::from_hit(hit, structure, &plan.motifs, &plan.annotation));
            }
            Ok(None) => (),
            Err(e) => match config.failure_policy {
                OracleFailurePolicy::Abort => return Err(e.into()),
                OracleFailurePolicy::Skip => {
                    failures += 1;
                    log::warn!("trial {} skipped: {}", trial, e);
                }
            },
        }
    }
    if failures > 0 {
        log::warn!("{} of {} trials failed.", failures, n_trials);
    }

    let mut candidates = filter_by_mfe(candidates, config.mfe_threshold, config.mfe_percentile);
    rank_candidates(&mut candidates);
    candidates.truncate(config.n_candidates);
    log::info!("{} candidates kept.", candidates.len());
    Ok(candidates)
}

/// Run the pipeline on a named scaffold from `catalog`.
pub fn generate_candidates<O: FoldingOracle + ?Sized>(
    catalog: &ScaffoldCatalog,
    scaffold_id: &str,
    config: &DesignConfig,
    oracle: &O,
) -> Result<Vec<Candidate>, DesignError> {
    let scaffold = catalog.get(scaffold_id)
        .ok_or_else(|| DesignError::UnknownScaffold(scaffold_id.to_string()))?;
    log::info!("Designing {} ({:?}, length {}).", scaffold.name, scaffold.topology, scaffold.structure.len());
    design_structure(&scaffold.structure, scaffold.topology, config, oracle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use kd_structure::bp_distance;
    use crate::search::tests::ScriptedOracle;
    use crate::Motif;
    use crate::NussinovOracle;
    use crate::OracleError;

    /// Deterministic oracle: the designed sequence is the seed, the
    /// predicted structure is the target with the first `k` pairs opened,
    /// where `k` depends on the sequence content.
    struct EchoOracle {
        target: String,
        calls: Cell<usize>,
        fail_every: Option<usize>,
    }

    impl EchoOracle {
        fn new(target: &str) -> Self {
            Self { target: target.to_string(), calls: Cell::new(0), fail_every: None }
        }
    }

    impl FoldingOracle for EchoOracle {
        fn inverse_fold(&self, seed: &str, _target: &str) -> Result<String, OracleError> {
            let n = self.calls.get();
            self.calls.set(n + 1);
            if self.fail_every.is_some_and(|k| n % k == 0) {
                return Err(OracleError::InvalidNucleotide('!'));
            }
            Ok(seed.to_string())
        }

        fn fold(&self, sequence: &str) -> Result<(String, f64), OracleError> {
            let gs = sequence.chars().filter(|&c| c == 'G').count();
            let open = gs % 3;
            let mut ss: Vec<char> = self.target.chars().collect();
            let mut opened = 0;
            for i in 0..ss.len() {
                if opened == open {
                    break;
                }
                if ss[i] == '(' {
                    let pt = PairTable::try_from(self.target.as_str())?;
                    let j = pt[i].unwrap() as usize;
                    ss[i] = '.';
                    ss[j] = '.';
                    opened += 1;
                }
            }
            let cs = sequence.chars().filter(|&c| c == 'C').count();
            Ok((ss.into_iter().collect(), -(cs as f64)))
        }
    }

    #[test]
    fn test_unknown_scaffold() {
        let catalog = ScaffoldCatalog::builtin();
        let oracle = ScriptedOracle::new(&[]);
        let err = generate_candidates(&catalog, "nope", &DesignConfig::default(), &oracle).unwrap_err();
        assert!(matches!(err, DesignError::UnknownScaffold(ref s) if s == "nope"));
    }

    #[test]
    fn test_malformed_structure_fails_fast() {
        let oracle = ScriptedOracle::new(&[]);
        let err = design_structure("((....)", Topology::Tetraloops, &DesignConfig::default(), &oracle).unwrap_err();
        assert!(matches!(err, DesignError::MalformedStructure(_)));
        assert_eq!(oracle.folds.get(), 0);
    }

    #[test]
    fn test_ranked_and_truncated() {
        let catalog = ScaffoldCatalog::builtin();
        let scaffold = catalog.get("z_tile_tetramer").unwrap();
        let oracle = EchoOracle::new(&scaffold.structure);
        let config = DesignConfig { n_candidates: 4, ..DesignConfig::default() };
        let cands = generate_candidates(&catalog, "z_tile_tetramer", &config, &oracle).unwrap();

        assert!(cands.len() <= 4);
        assert!(!cands.is_empty());
        for w in cands.windows(2) {
            assert!(w[0].bp_distance <= w[1].bp_distance);
            if w[0].bp_distance == w[1].bp_distance {
                assert!(w[0].mfe <= w[1].mfe);
            }
        }
        for c in &cands {
            assert_eq!(c.target_structure, scaffold.structure);
            assert_eq!(c.sequence.len(), scaffold.structure.len());
            assert_eq!(bp_distance(&c.target_structure, &c.predicted_structure).unwrap(), c.bp_distance);
            assert!(c.motifs.is_complete());
            assert_eq!(c.motifs.kissing_pairs().len(), 2);
        }
    }

    #[test]
    fn test_candidates_honor_constraints() {
        let catalog = ScaffoldCatalog::builtin();
        let scaffold = catalog.get("tetrahedron_wireframe").unwrap();
        let oracle = EchoOracle::new(&scaffold.structure);
        let config = DesignConfig::default();
        let cands = generate_candidates(&catalog, "tetrahedron_wireframe", &config, &oracle).unwrap();

        let mut rng = StdRng::seed_from_u64(config.seed);
        let plan = plan_motifs(&scaffold.structure, scaffold.topology, config.conflict_policy, &mut rng).unwrap();
        assert_eq!(plan.motifs.kissing_pairs(), vec![(0, 2), (1, 3)]);
        for c in &cands {
            let bases: Vec<char> = c.sequence.chars().collect();
            for (pos, allowed) in plan.constraints.to_vec() {
                assert!(allowed.iter().any(|&b| char::from(b) == bases[pos]));
            }
            assert_eq!(c.annotation, plan.annotation);
        }
    }

    #[test]
    fn test_same_seed_same_candidates() {
        let catalog = ScaffoldCatalog::builtin();
        for name in ["z_tile_tetramer", "triangular_prism", "rool_repeat_unit"] {
            let structure = &catalog.get(name).unwrap().structure;
            let config = DesignConfig { n_candidates: 3, ..DesignConfig::default() };
            let a = generate_candidates(&catalog, name, &config, &EchoOracle::new(structure)).unwrap();
            let b = generate_candidates(&catalog, name, &config, &EchoOracle::new(structure)).unwrap();
            assert_eq!(a, b);

            let other = DesignConfig { seed: 7, ..config };
            let c = generate_candidates(&catalog, name, &other, &EchoOracle::new(structure)).unwrap();
            assert_ne!(a, c);
        }
    }

    #[test]
    fn test_trial_count_and_tries() {
        let catalog = ScaffoldCatalog::builtin();
        // Never an exact match, so every trial uses all of its tries.
        let oracle = ScriptedOracle::new(&[]);
        let config = DesignConfig { n_candidates: 2, tries_per_trial: 4, ..DesignConfig::default() };
        let cands = generate_candidates(&catalog, "rool_repeat_unit", &config, &oracle).unwrap();
        assert_eq!(oracle.folds.get(), 6 * 4);
        assert_eq!(cands.len(), 2);
        assert!(cands.iter().all(|c| c.bp_distance == 12));
        // Lowest MFE first: the scripted oracle reports -(call index).
        assert!(cands[0].mfe <= cands[1].mfe);
    }

    #[test]
    fn test_no_tries_no_candidates() {
        let catalog = ScaffoldCatalog::builtin();
        let oracle = ScriptedOracle::new(&[]);
        let config = DesignConfig { tries_per_trial: 0, ..DesignConfig::default() };
        let cands = generate_candidates(&catalog, "z_tile_tetramer", &config, &oracle).unwrap();
        assert!(cands.is_empty());
    }

    #[test]
    fn test_huge_candidate_count_without_tries() {
        let catalog = ScaffoldCatalog::builtin();
        let oracle = ScriptedOracle::new(&[]);
        let config = DesignConfig {
            n_candidates: usize::MAX / 2,
            tries_per_trial: 0,
            ..DesignConfig::default()
        };
        assert_eq!(config.n_trials(), usize::MAX);
        let cands = generate_candidates(&catalog, "z_tile_tetramer", &config, &oracle).unwrap();
        assert!(cands.is_empty());
        assert_eq!(oracle.folds.get(), 0);
    }

    #[test]
    fn test_failure_policies() {
        let catalog = ScaffoldCatalog::builtin();
        let structure = &catalog.get("z_tile_tetramer").unwrap().structure;

        let mut oracle = EchoOracle::new(structure);
        oracle.fail_every = Some(2);
        let config = DesignConfig { tries_per_trial: 1, n_candidates: 4, ..DesignConfig::default() };
        let cands = generate_candidates(&catalog, "z_tile_tetramer", &config, &oracle).unwrap();
        // 12 trials, every other one fails.
        assert_eq!(oracle.calls.get(), 12);
        assert_eq!(cands.len(), 4);

        let mut oracle = EchoOracle::new(structure);
        oracle.fail_every = Some(2);
        let config = DesignConfig { failure_policy: OracleFailurePolicy::Abort, ..config };
        let err = generate_candidates(&catalog, "z_tile_tetramer", &config, &oracle).unwrap_err();
        assert!(matches!(err, DesignError::Oracle(_)));
        assert_eq!(oracle.calls.get(), 1);
    }

    #[test]
    fn test_mfe_filters_applied() {
        let catalog = ScaffoldCatalog::builtin();
        let structure = &catalog.get("z_tile_tetramer").unwrap().structure;
        let config = DesignConfig { n_candidates: 15, ..DesignConfig::default() };
        let all = generate_candidates(&catalog, "z_tile_tetramer", &config, &EchoOracle::new(structure)).unwrap();

        let threshold = crate::mfe_statistics(&all).unwrap().mean_mfe;
        let filtered_config = DesignConfig { mfe_threshold: Some(threshold), ..config };
        let filtered = generate_candidates(&catalog, "z_tile_tetramer", &filtered_config, &EchoOracle::new(structure)).unwrap();
        assert!(filtered.len() <= all.len());
        assert!(filtered.iter().all(|c| c.mfe <= threshold));
    }

    #[test]
    fn test_strict_policy_on_builtin_scaffolds() {
        // Detected hairpins never overlap, so strict compilation always succeeds.
        let catalog = ScaffoldCatalog::builtin();
        for scaffold in catalog.iter() {
            let mut rng = StdRng::seed_from_u64(1);
            let plan = plan_motifs(&scaffold.structure, scaffold.topology, ConflictPolicy::Reject, &mut rng).unwrap();
            assert_eq!(plan.annotation.len(), scaffold.structure.len());
            assert!(plan.motifs.iter().all(|m| *m != Motif::Unassigned));
        }
    }

    #[test]
    fn test_with_nussinov_oracle() {
        let catalog = ScaffoldCatalog::builtin();
        let oracle = NussinovOracle::default();
        let config = DesignConfig { n_candidates: 2, tries_per_trial: 2, ..DesignConfig::default() };
        let cands = generate_candidates(&catalog, "z_tile_tetramer", &config, &oracle).unwrap();
        assert_eq!(cands.len(), 2);
        for c in &cands {
            let (ss, mfe) = oracle.fold(&c.sequence).unwrap();
            assert_eq!(ss, c.predicted_structure);
            assert_eq!(mfe, c.mfe);
        }
    }
}
