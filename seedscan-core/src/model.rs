//! Linear models combining individual features into the final score.
//!
//! Models are keyed by seed length. Two registries ship with the crate: the
//! full models, trained with the thermodynamic and exact-probability
//! features, and a reduced set for runs without external engines.

use std::collections::BTreeMap;

use crate::types::{Feature, FeatureMap, ScanError};

/// Linear combination of features.
#[derive(Debug, Clone)]
pub struct ScoreModel {
    /// Constant term.
    pub intercept: f64,
    /// Feature weights, applied in order.
    pub coefficients: Vec<(Feature, f64)>,
}

impl ScoreModel {
    /// Evaluate the model on computed features.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::MissingFeature`] when a weighted feature is
    /// absent from `features`.
    pub fn apply(&self, features: &FeatureMap) -> Result<f64, ScanError> {
        let mut score = self.intercept;
        for (feature, weight) in &self.coefficients {
            let value = features
                .get(feature)
                .ok_or(ScanError::MissingFeature(feature.name()))?;
            score += weight * value;
        }
        Ok(score)
    }
}

/// Seed-length-keyed collection of score models.
#[derive(Debug, Clone)]
pub struct ModelRegistry {
    models: BTreeMap<usize, ScoreModel>,
}

impl ModelRegistry {
    /// Registry of the full models, requiring every feature including the
    /// engine-backed ones.
    #[must_use]
    pub fn full() -> Self {
        let mut models = BTreeMap::new();
        models.insert(
            6,
            ScoreModel {
                intercept: 0.148_300_586_692_704,
                coefficients: vec![
                    (Feature::TgsAu, -0.275_016_235_769_136),
                    (Feature::TgsPosition, 5.433_670_280_652_11e-6),
                    (Feature::TgsPairing3p, -0.002_332_781_197_609_94),
                    (Feature::DgDuplex, 0.007_726_588_984_960_47),
                    (Feature::DgBinding, -0.003_036_838_336_606_96),
                    (Feature::DgDuplexSeed, 0.049_690_980_153_361_2),
                    (Feature::DgBindingSeed, -0.048_931_930_580_652),
                    (Feature::DgOpen, 0.000_674_676_164_622_922),
                    (Feature::ProbExact, 0.161_116_355_920_18),
                    (Feature::ProbBinomial, -0.038_833_374_070_867_1),
                    (Feature::ConsBls, -0.004_263_140_775_938_48),
                    (Feature::SelecPhylop, -0.011_245_524_822_807_2),
                ],
            },
        );
        models.insert(
            7,
            ScoreModel {
                intercept: 0.349_448_109_979_275,
                coefficients: vec![
                    (Feature::TgsAu, -0.402_470_212_080_983),
                    (Feature::TgsPosition, 6.892_497_078_310_41e-5),
                    (Feature::TgsPairing3p, -0.012_989_125_144_696_7),
                    (Feature::DgDuplex, 0.014_133_299_780_250_9),
                    (Feature::DgBinding, -0.013_215_917_546_275_5),
                    (Feature::DgDuplexSeed, -0.081_444_508_512_190_4),
                    (Feature::DgBindingSeed, 0.115_558_118_311_931),
                    (Feature::DgOpen, 0.003_315_073_471_396_85),
                    (Feature::ProbExact, 0.792_962_156_550_929),
                    (Feature::ProbBinomial, -0.221_194_996_463_23),
                    (Feature::ConsBls, -0.035_584_033_564_220_3),
                    (Feature::SelecPhylop, -0.012_753_199_599_162_9),
                ],
            },
        );
        Self { models }
    }

    /// Registry of the reduced models, restricted to features computable
    /// without folding or exact-probability engines.
    #[must_use]
    pub fn site_only() -> Self {
        let mut models = BTreeMap::new();
        models.insert(
            6,
            ScoreModel {
                intercept: 0.121_104_869_645_859,
                coefficients: vec![
                    (Feature::TgsAu, -0.275_594_504_153_219),
                    (Feature::TgsPosition, 9.445_828_442_292_99e-6),
                    (Feature::TgsPairing3p, -0.011_120_926_738_284_9),
                    (Feature::ProbBinomial, 0.070_161_999_292_364_1),
                    (Feature::ConsBls, -0.006_465_486_213_458_19),
                ],
            },
        );
        models.insert(
            7,
            ScoreModel {
                intercept: 0.150_015_113_841_088,
                coefficients: vec![
                    (Feature::TgsAu, -0.443_606_032_336_791),
                    (Feature::TgsPosition, 6.346_039_353_203_21e-5),
                    (Feature::TgsPairing3p, -0.020_767_287_021_075_2),
                    (Feature::ProbBinomial, 0.378_665_477_250_754),
                    (Feature::ConsBls, -0.055_271_334_474_097_1),
                ],
            },
        );
        Self { models }
    }

    /// Model for one seed length.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::UnregisteredSeedLength`] when no model covers
    /// `seed_length`.
    pub fn select(&self, seed_length: usize) -> Result<&ScoreModel, ScanError> {
        self.models
            .get(&seed_length)
            .ok_or(ScanError::UnregisteredSeedLength(seed_length))
    }

    /// Registered seed lengths, ascending.
    #[must_use]
    pub fn seed_lengths(&self) -> Vec<usize> {
        self.models.keys().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_is_affine() {
        let model = ScoreModel {
            intercept: 1.0,
            coefficients: vec![(Feature::TgsAu, 2.0)],
        };
        let mut features = FeatureMap::new();
        features.insert(Feature::TgsAu, 3.0);
        assert_eq!(model.apply(&features).unwrap(), 7.0);
    }

    #[test]
    fn test_apply_requires_every_feature() {
        let model = ScoreModel {
            intercept: 0.0,
            coefficients: vec![(Feature::TgsAu, 1.0), (Feature::ConsBls, 1.0)],
        };
        let mut features = FeatureMap::new();
        features.insert(Feature::TgsAu, 0.5);
        assert!(matches!(
            model.apply(&features),
            Err(ScanError::MissingFeature("cons_bls"))
        ));
    }

    #[test]
    fn test_registries_cover_default_seed_lengths() {
        assert_eq!(ModelRegistry::full().seed_lengths(), vec![6, 7]);
        assert_eq!(ModelRegistry::site_only().seed_lengths(), vec![6, 7]);
        assert!(matches!(
            ModelRegistry::full().select(8),
            Err(ScanError::UnregisteredSeedLength(8))
        ));
    }

    #[test]
    fn test_site_only_models_avoid_engine_features() {
        let registry = ModelRegistry::site_only();
        for length in registry.seed_lengths() {
            let model = registry.select(length).unwrap();
            for (feature, _) in &model.coefficients {
                assert!(!matches!(
                    feature,
                    Feature::DgDuplex
                        | Feature::DgBinding
                        | Feature::DgDuplexSeed
                        | Feature::DgBindingSeed
                        | Feature::DgOpen
                        | Feature::DgTotal
                        | Feature::ProbExact
                ));
            }
        }
    }

    #[test]
    fn test_full_model_intercept_only_baseline() {
        let registry = ModelRegistry::full();
        let model = registry.select(7).unwrap();
        let mut features = FeatureMap::new();
        for (feature, _) in &model.coefficients {
            features.insert(*feature, 0.0);
        }
        let score = model.apply(&features).unwrap();
        assert!((score - model.intercept).abs() < 1e-15);
    }
}
