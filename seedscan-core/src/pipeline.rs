//! End-to-end scoring pipeline: find targets on a transcript, compute every
//! available feature per target, combine them with the regression model,
//! and aggregate per-transcript summaries.

use std::path::Path;

use crate::config::ScanConfig;
use crate::conservation::{self, Alignment};
use crate::engines::{ExactProbEngine, FoldModel, FoldingEngine};
use crate::markov::TransitionMatrix;
use crate::model::ModelRegistry;
use crate::phast::{self, AlignmentInput, PhastTools};
use crate::prob;
use crate::seed;
use crate::targetscan;
use crate::thermo;
use crate::types::{Feature, FeatureMap, Reducer, ScanError, Target};

/// External resources available to a scoring run.
///
/// Everything is optional: features whose backing resource is absent are
/// left out of the map (thermodynamics, exact probability) or fall back to
/// their neutral value (conservation).
pub struct ScoreResources<'a> {
    /// RNA folding backend for the thermodynamic features.
    pub folding: Option<&'a dyn FoldingEngine>,
    /// Exact occurrence-probability backend.
    pub exact_prob: Option<&'a dyn ExactProbEngine>,
    /// Folding parameters forwarded to the folding backend.
    pub fold_model: FoldModel,
    /// Multi-species alignment covering the host transcript.
    pub alignment: Option<&'a Alignment>,
    /// Species tree to refit on the alignment, in Newick format.
    pub tree: Option<&'a str>,
    /// Fitted phyloFit model file for the alignment.
    pub mod_path: Option<&'a Path>,
    /// PHAST executables for tree fitting and the selection test.
    pub phast: Option<&'a PhastTools>,
}

impl Default for ScoreResources<'_> {
    fn default() -> Self {
        Self {
            folding: None,
            exact_prob: None,
            fold_model: thermo::default_fold_model(),
            alignment: None,
            tree: None,
            mod_path: None,
            phast: None,
        }
    }
}

impl ScoreResources<'_> {
    /// True when every engine-backed feature of the full model can be
    /// computed.
    #[must_use]
    pub fn has_all_engines(&self) -> bool {
        self.folding.is_some() && self.exact_prob.is_some()
    }
}

/// Target finder and scorer for one configuration.
///
/// # Examples
///
/// ```rust
/// use seedscan_core::config::ScanConfig;
/// use seedscan_core::pipeline::{ScoreResources, Scorer};
/// use seedscan_core::types::Feature;
///
/// let scorer = Scorer::new(ScanConfig::default());
/// let host = format!("{}ATAAGCTA{}", "C".repeat(20), "C".repeat(32));
/// let scored = scorer.score_transcript(&host, "UAGCUUAUCAGACUGAUGUUGA", &ScoreResources::default())?;
/// assert_eq!(scored.len(), 1);
/// assert!(scored[0].1.contains_key(&Feature::MirmapScore));
/// # Ok::<(), seedscan_core::types::ScanError>(())
/// ```
pub struct Scorer {
    /// Scan configuration shared by every transcript.
    pub config: ScanConfig,
    full_models: ModelRegistry,
    site_models: ModelRegistry,
}

impl Scorer {
    /// Build a scorer with the shipped model registries.
    #[must_use]
    pub fn new(config: ScanConfig) -> Self {
        Self {
            config,
            full_models: ModelRegistry::full(),
            site_models: ModelRegistry::site_only(),
        }
    }

    /// Find candidate targets for `mirna_seq` on `host_seq`.
    ///
    /// Input sequences are normalized to the DNA alphabet first.
    ///
    /// # Errors
    ///
    /// Propagates [`ScanError`] from the seed finder.
    pub fn find_targets(&self, host_seq: &str, mirna_seq: &str) -> Result<Vec<Target>, ScanError> {
        let host = crate::sequence::normalize_rna(host_seq);
        let mirna = crate::sequence::normalize_rna(mirna_seq);
        seed::find_targets(&host, &mirna, &self.config)
    }

    /// Compute every available feature for one target.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError`] when an engine fails or when the model lacks a
    /// required feature.
    pub fn score_target(
        &self,
        target: &Target,
        transitions: &TransitionMatrix,
        resources: &ScoreResources<'_>,
    ) -> Result<FeatureMap, ScanError> {
        let correct = self.config.with_correction;
        let mut features = FeatureMap::new();

        let au = targetscan::au_content(target, self.config.au_window_length, correct);
        let position = targetscan::position(target, correct);
        let pairing = targetscan::pairing3p(target, correct);
        if let Some(value) = au {
            features.insert(Feature::TgsAu, value);
        }
        if let Some(value) = position {
            features.insert(Feature::TgsPosition, value);
        }
        if let Some(value) = pairing {
            features.insert(Feature::TgsPairing3p, value);
        }
        if let Some(value) = targetscan::combined_score(target, au, position, pairing, correct) {
            features.insert(Feature::TgsScore, value);
        }

        if let Some(engine) = resources.folding {
            let duplex = thermo::dg_duplex(target, engine, &resources.fold_model)?;
            let duplex_seed = thermo::dg_duplex_seed(target, engine, &resources.fold_model)?;
            let open = thermo::dg_open(target, engine, &resources.fold_model)?;
            features.insert(Feature::DgDuplex, duplex.duplex);
            features.insert(Feature::DgBinding, duplex.binding);
            features.insert(Feature::DgDuplexSeed, duplex_seed.duplex);
            features.insert(Feature::DgBindingSeed, duplex_seed.binding);
            features.insert(Feature::DgOpen, open);
            features.insert(Feature::DgTotal, thermo::dg_total(duplex.duplex, open));
        }

        if let Some(engine) = resources.exact_prob {
            features.insert(
                Feature::ProbExact,
                prob::prob_exact(target, transitions, engine)?,
            );
        }
        features.insert(
            Feature::ProbBinomial,
            prob::prob_binomial(target, transitions)?,
        );

        features.insert(Feature::ConsBls, 0.0);
        features.insert(Feature::SelecPhylop, 1.0);
        if let Some(alignment) = resources.alignment {
            let target_aln = conservation::extract_target_alignment(
                target,
                alignment,
                &self.config.aln_alphabet,
            )?;
            if target_aln.is_conserved() {
                let fitted_tree = match (resources.tree, resources.phast, resources.mod_path) {
                    (Some(tree), Some(tools), _) => Some(
                        tools
                            .phylofit(
                                AlignmentInput::Inline(&alignment.seqs),
                                Some(tree),
                                Some("REV"),
                                true,
                            )?
                            .tree,
                    ),
                    (None, _, Some(mod_path)) => Some(phast::read_tree_from_mod(mod_path)?),
                    _ => None,
                };
                if let Some(tree) = fitted_tree {
                    features.insert(
                        Feature::ConsBls,
                        conservation::branch_length_score(&target_aln, &tree)?,
                    );
                }
                if let (Some(mod_path), Some(tools)) = (resources.mod_path, resources.phast) {
                    features.insert(
                        Feature::SelecPhylop,
                        tools.phylop(
                            "SPH",
                            "CONACC",
                            mod_path,
                            AlignmentInput::Inline(&target_aln.seqs),
                        )?,
                    );
                }
            }
        }

        let registry = if resources.has_all_engines() {
            &self.full_models
        } else {
            &self.site_models
        };
        let model = registry.select(target.seed_length())?;
        let score = model.apply(&features)?;
        features.insert(Feature::MirmapScore, score);
        Ok(features)
    }

    /// Find and score every target of one miRNA on one transcript.
    ///
    /// The Markov chain is fitted once on the host sequence and shared by
    /// all targets.
    ///
    /// # Errors
    ///
    /// Propagates [`ScanError`] from target finding or scoring.
    pub fn score_transcript(
        &self,
        host_seq: &str,
        mirna_seq: &str,
        resources: &ScoreResources<'_>,
    ) -> Result<Vec<(Target, FeatureMap)>, ScanError> {
        let targets = self.find_targets(host_seq, mirna_seq)?;
        if targets.is_empty() {
            return Ok(Vec::new());
        }
        let transitions = TransitionMatrix::estimate(
            &targets[0].host_seq,
            &self.config.alphabet,
            self.config.markov_order,
        );
        targets
            .into_iter()
            .map(|target| {
                let features = self.score_target(&target, &transitions, resources)?;
                Ok((target, features))
            })
            .collect()
    }
}

/// Aggregate per-target features into one per-transcript map.
///
/// Each feature uses its own reducer (best site for window features, sum
/// for the combined scores). Features absent from any target are skipped.
#[must_use]
pub fn aggregate(maps: &[FeatureMap]) -> FeatureMap {
    let mut result = FeatureMap::new();
    if maps.is_empty() {
        return result;
    }
    for feature in Feature::ALL {
        let values: Vec<f64> = maps.iter().filter_map(|m| m.get(&feature).copied()).collect();
        if values.len() != maps.len() {
            continue;
        }
        let reduced = match feature.reducer() {
            Reducer::Min => values.iter().copied().fold(f64::INFINITY, f64::min),
            Reducer::Max => values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            Reducer::Sum => values.iter().sum(),
        };
        result.insert(feature, reduced);
    }
    result
}
