//! Empirical site features: AU content, positional bias and 3' pairing,
//! plus their combination.
//!
//! The discrete site type (6mer, 7mer-A1, 7mer-m8, 8mer) selects a set of
//! fixed empirical parameters: window shifts, positional weighting ramps
//! and the linear-correction constants of each sub-feature. Sites whose
//! seed length falls outside the supported range have no type and every
//! feature here yields `None` for them; an absent value is never replaced
//! by zero.

use crate::types::{SiteType, Target};

/// Fixed empirical parameters of one site type.
#[derive(Debug, Clone)]
pub struct SiteParams {
    /// Shift applied upstream of the seed end when positioning windows.
    pub up_shift: i64,
    /// Shift applied downstream of the seed end when positioning windows.
    pub down_shift: i64,
    /// Mean correction term shared by the three sub-features.
    pub fc_mean: f64,
    /// AU-content correction slope.
    pub ca_fc_slope: f64,
    /// AU-content correction intercept.
    pub ca_fc_intercept: f64,
    /// Position-specific weights for the upstream AU window, seed-distal
    /// first.
    pub ca_weights_up: [f64; 30],
    /// Position-specific weights for the downstream AU window, seed-proximal
    /// first.
    pub ca_weights_down: [f64; 30],
    /// Positional-feature correction slope.
    pub po_fc_slope: f64,
    /// Positional-feature correction intercept.
    pub po_fc_intercept: f64,
    /// 3'-pairing correction slope.
    pub pa_fc_slope: f64,
    /// 3'-pairing correction intercept.
    pub pa_fc_intercept: f64,
    /// Offset on the miRNA where the 3' region begins.
    pub pa_mirna_seed_start: usize,
    /// Overhang origin for the seed-proximal pairing window.
    pub pa_mirna_seed_overhang: i64,
}

const fn ramp_desc<const N: usize>(top: f64) -> [f64; N] {
    let mut weights = [0.0; N];
    let mut i = 0;
    while i < N {
        weights[i] = top - i as f64;
        i += 1;
    }
    weights
}

const fn ramp_asc<const N: usize>(bottom: f64) -> [f64; N] {
    let mut weights = [0.0; N];
    let mut i = 0;
    while i < N {
        weights[i] = bottom + i as f64;
        i += 1;
    }
    weights
}

static PARAMS_6MER: SiteParams = SiteParams {
    up_shift: -1,
    down_shift: 2,
    fc_mean: -0.015,
    ca_fc_slope: -0.241,
    ca_fc_intercept: 0.115,
    ca_weights_up: ramp_desc::<30>(31.0),
    ca_weights_down: ramp_asc::<30>(2.0),
    po_fc_slope: 0.000049,
    po_fc_intercept: -0.033,
    pa_fc_slope: -0.00278,
    pa_fc_intercept: -0.0091,
    pa_mirna_seed_start: 7,
    pa_mirna_seed_overhang: 1,
};

static PARAMS_7MER_A1: SiteParams = SiteParams {
    up_shift: -1,
    down_shift: 2,
    fc_mean: -0.099,
    ca_fc_slope: -0.42,
    ca_fc_intercept: 0.137,
    ca_weights_up: ramp_desc::<30>(31.0),
    ca_weights_down: ramp_asc::<30>(2.0),
    po_fc_slope: 0.000072,
    po_fc_intercept: -0.131,
    pa_fc_slope: -0.0211,
    pa_fc_intercept: -0.053,
    pa_mirna_seed_start: 7,
    pa_mirna_seed_overhang: 1,
};

static PARAMS_7MER_M8: SiteParams = SiteParams {
    up_shift: -2,
    down_shift: 1,
    fc_mean: -0.161,
    ca_fc_slope: -0.5,
    ca_fc_intercept: 0.108,
    ca_weights_up: ramp_desc::<30>(30.0),
    ca_weights_down: ramp_asc::<30>(1.0),
    po_fc_slope: 0.000091,
    po_fc_intercept: -0.198,
    pa_fc_slope: -0.031,
    pa_fc_intercept: -0.094,
    pa_mirna_seed_start: 8,
    pa_mirna_seed_overhang: 0,
};

static PARAMS_8MER: SiteParams = SiteParams {
    up_shift: -2,
    down_shift: 1,
    fc_mean: -0.31,
    ca_fc_slope: -0.64,
    ca_fc_intercept: 0.055,
    ca_weights_up: ramp_desc::<30>(30.0),
    ca_weights_down: ramp_asc::<30>(1.0),
    po_fc_slope: 0.000172,
    po_fc_intercept: -0.38,
    pa_fc_slope: -0.0041,
    pa_fc_intercept: -0.299,
    pa_mirna_seed_start: 8,
    pa_mirna_seed_overhang: 0,
};

/// Empirical parameters for a site type.
#[must_use]
pub fn site_params(site: SiteType) -> &'static SiteParams {
    match site {
        SiteType::Mer6 => &PARAMS_6MER,
        SiteType::Mer7A1 => &PARAMS_7MER_A1,
        SiteType::Mer7M8 => &PARAMS_7MER_M8,
        SiteType::Mer8 => &PARAMS_8MER,
    }
}

/// Classify a site from seed length and the host nucleotide immediately 3'
/// of the seed (opposite miRNA position 1).
///
/// Returns `None` for seed lengths outside the supported range.
#[must_use]
pub fn classify(seed_length: usize, nt1: Option<u8>) -> Option<SiteType> {
    let is_a = nt1 == Some(b'A');
    if seed_length >= 7 {
        Some(if is_a { SiteType::Mer8 } else { SiteType::Mer7M8 })
    } else if seed_length == 6 {
        Some(if is_a { SiteType::Mer7A1 } else { SiteType::Mer6 })
    } else {
        None
    }
}

/// Site type of a target, from its seed length and flanking nucleotide.
#[must_use]
pub fn site_type(target: &Target) -> Option<SiteType> {
    classify(
        target.seed_length(),
        target.host_seq.as_bytes().get(target.seed.end()).copied(),
    )
}

fn binarize(c: u8) -> f64 {
    if c == b'A' || c == b'T' {
        1.0
    } else {
        0.0
    }
}

fn shifted(base: usize, shift: i64) -> usize {
    let value = base as i64 + shift;
    value.max(0) as usize
}

/// AU content around the site, weighted by distance from the seed.
///
/// Windows of `window` nt are taken upstream and downstream of the site
/// (shifted per site type); each A/T position contributes the reciprocal of
/// its positional weight and the total is normalized by the reciprocal
/// weight mass of the actually-available window. Truncated windows at
/// sequence ends keep the seed-proximal portion of the weight ramps.
#[must_use]
pub fn au_content(target: &Target, window: usize, with_correction: bool) -> Option<f64> {
    let site = site_type(target)?;
    let params = site_params(site);
    let host = target.host_seq.as_bytes();
    let end = target.seed.end();

    let up_hi = shifted(end + 1, params.up_shift).min(host.len());
    let up_lo = up_hi.saturating_sub(window);
    let seq_up = &host[up_lo..up_hi];

    let down_lo = shifted(end, params.down_shift).min(host.len());
    let down_hi = shifted(end + window, params.down_shift).min(host.len());
    let seq_down = &host[down_lo..down_hi];

    let weights_up = &params.ca_weights_up[params.ca_weights_up.len() - seq_up.len()..];
    let weights_down = &params.ca_weights_down[..seq_down.len()];

    let content: f64 = seq_up
        .iter()
        .zip(weights_up)
        .chain(seq_down.iter().zip(weights_down))
        .map(|(&c, &w)| binarize(c) / w)
        .sum();
    let mass: f64 = weights_up
        .iter()
        .chain(weights_down)
        .map(|&w| 1.0 / w)
        .sum();
    let content = content / mass;

    if with_correction {
        Some(content * params.ca_fc_slope + params.ca_fc_intercept - params.fc_mean)
    } else {
        Some(content)
    }
}

/// Distance of the site to the nearer transcript end, shifted per site type
/// and capped at 1500.
#[must_use]
pub fn position(target: &Target, with_correction: bool) -> Option<f64> {
    let site = site_type(target)?;
    let params = site_params(site);
    let end = target.seed.end() as i64;
    let host_len = target.host_seq.len() as i64;
    let closest = (end + 1 + params.up_shift)
        .min(host_len - (end + 1) + params.down_shift)
        .min(1500);
    if with_correction {
        Some(closest as f64 * params.po_fc_slope + params.po_fc_intercept - params.fc_mean)
    } else {
        Some(closest as f64)
    }
}

/// One pass of the asymmetric 3'-pairing walk at a fixed relative offset.
///
/// Watson-Crick pairs score 1.0 inside the seed-proximal window (positions
/// 4-7 from the overhang origin) and 0.5 elsewhere; runs of fewer than 2
/// consecutive pairs are discarded. The best run score is penalized by the
/// starting offset of the alignment, not the offset of the best run: the
/// shipped linear models were fit against this behavior.
fn align(utr_3p: &[u8], mir_3p: &[u8], mir_offset: usize, utr_offset: usize, overhang: i64) -> f64 {
    let mut score = 0.0_f64;
    let mut run_score = 0.0_f64;
    let mut run_length = 0_usize;
    let offset = mir_offset.max(utr_offset);
    let mut i = 0;
    while i + mir_offset < mir_3p.len() && i + utr_offset < utr_3p.len() {
        let pair = (utr_3p[i + utr_offset], mir_3p[i + mir_offset]);
        let paired = matches!(pair, (b'A', b'T') | (b'T', b'A') | (b'G', b'C') | (b'C', b'G'));
        if paired {
            if run_length == 0 {
                run_score = 0.0;
            }
            let seed_proximal = (4..=7).contains(&((i + mir_offset) as i64 - overhang));
            run_score += if seed_proximal { 1.0 } else { 0.5 };
            run_length += 1;
        } else if run_length >= 2 {
            if run_score > score {
                score = run_score;
            }
            run_score = 0.0;
            run_length = 0;
        } else {
            run_score = 0.0;
            run_length = 0;
        }
        i += 1;
    }
    if run_length >= 2 && run_score > score {
        score = run_score;
    }
    score - ((offset as f64 - 2.0) / 2.0).max(0.0)
}

/// 3'-pairing score: best run score over all relative offsets between the
/// miRNA 3' region and the reverse of the host 3'-flanking region, trying
/// both offset directions.
#[must_use]
pub fn pairing3p(target: &Target, with_correction: bool) -> Option<f64> {
    let site = site_type(target)?;
    let params = site_params(site);
    let host = target.host_seq.as_bytes();
    let end = target.seed.end();

    let utr_hi = (end + 1).saturating_sub(params.pa_mirna_seed_start);
    let utr_lo = utr_hi.saturating_sub(15);
    let utr_3p: Vec<u8> = host[utr_lo..utr_hi].iter().rev().copied().collect();
    let mir_3p = if params.pa_mirna_seed_start < target.mirna_seq.len() {
        &target.mirna_seq.as_bytes()[params.pa_mirna_seed_start..]
    } else {
        &[][..]
    };

    let mut best = 0.0_f64;
    for offset in 0..utr_3p.len().max(mir_3p.len()) {
        best = best
            .max(align(&utr_3p, mir_3p, offset, 0, params.pa_mirna_seed_overhang))
            .max(align(&utr_3p, mir_3p, 0, offset, params.pa_mirna_seed_overhang));
    }

    if with_correction {
        Some(best * params.pa_fc_slope + params.pa_fc_intercept - params.fc_mean)
    } else {
        Some(best)
    }
}

/// Combined empirical score: sum of the three sub-features, plus the site
/// type's correction mean when correction is enabled.
///
/// Absent when the site has no type or any sub-feature is unavailable.
#[must_use]
pub fn combined_score(
    target: &Target,
    score_au: Option<f64>,
    score_position: Option<f64>,
    score_pairing3p: Option<f64>,
    with_correction: bool,
) -> Option<f64> {
    let site = site_type(target)?;
    let params = site_params(site);
    let score = score_au? + score_position? + score_pairing3p?;
    if with_correction {
        Some(score + params.fc_mean)
    } else {
        Some(score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScanConfig;
    use crate::seed::find_targets;
    use crate::types::{Interval, Target};
    use std::sync::Arc;

    const MIRNA: &str = "TAGCTTATCAGACTGATGTTGA";

    fn planted_target() -> Target {
        let host = format!("{}ATAAGCTA{}", "C".repeat(20), "C".repeat(32));
        let targets = find_targets(&host, MIRNA, &ScanConfig::default()).unwrap();
        assert_eq!(targets.len(), 1);
        targets.into_iter().next().unwrap()
    }

    fn short_seed_target() -> Target {
        // Seed length 5 has no site type.
        let host: Arc<str> = Arc::from("C".repeat(40).as_str());
        Target::new(
            Arc::clone(&host),
            Interval::new(10, 32).unwrap(),
            Arc::from(MIRNA),
            Interval::new(26, 31).unwrap(),
            "AGCTT".to_string(),
            1,
        )
        .unwrap()
    }

    #[test]
    fn test_classification_table() {
        assert_eq!(classify(7, Some(b'A')), Some(SiteType::Mer8));
        assert_eq!(classify(7, Some(b'G')), Some(SiteType::Mer7M8));
        assert_eq!(classify(8, Some(b'C')), Some(SiteType::Mer7M8));
        assert_eq!(classify(6, Some(b'A')), Some(SiteType::Mer7A1));
        assert_eq!(classify(6, Some(b'T')), Some(SiteType::Mer6));
        assert_eq!(classify(5, Some(b'A')), None);
        // No flanking nucleotide available: treated as non-A.
        assert_eq!(classify(7, None), Some(SiteType::Mer7M8));
    }

    #[test]
    fn test_planted_site_is_8mer() {
        let target = planted_target();
        assert_eq!(site_type(&target), Some(SiteType::Mer8));
    }

    #[test]
    fn test_position_distance_to_nearer_end() {
        let target = planted_target();
        // seed end 27, host length 60, 8mer shifts (-2, +1):
        // min(27 + 1 - 2, 60 - 28 + 1) = 26
        assert_eq!(position(&target, false), Some(26.0));
    }

    #[test]
    fn test_position_is_capped() {
        let host = format!("{}ATAAGCTA{}", "C".repeat(2000), "C".repeat(2000));
        let targets = find_targets(&host, MIRNA, &ScanConfig::default()).unwrap();
        assert_eq!(position(&targets[0], false), Some(1500.0));
    }

    #[test]
    fn test_au_content_hand_computed() {
        let target = planted_target();
        let params = site_params(SiteType::Mer8);
        // Upstream window: host[0..26] = 20 C's then "ATAAGC"; weights are
        // the seed-proximal 26 entries of the descending ramp.
        let wup = &params.ca_weights_up[4..];
        let expected_up: f64 = (0..26)
            .map(|i| match i {
                20 | 21 | 22 | 23 => binarize(b"ATAA"[i - 20]) / wup[i],
                _ => 0.0,
            })
            .sum();
        // Downstream window host[28..58] is all C.
        let mass: f64 = wup.iter().map(|w| 1.0 / w).sum::<f64>()
            + params.ca_weights_down.iter().map(|w| 1.0 / w).sum::<f64>();
        let expected = expected_up / mass;
        let got = au_content(&target, 30, false).unwrap();
        assert!((got - expected).abs() < 1e-12);
        assert!(got > 0.0 && got < 1.0);
    }

    #[test]
    fn test_correction_is_affine() {
        let target = planted_target();
        let params = site_params(SiteType::Mer8);
        let raw = au_content(&target, 30, false).unwrap();
        let corrected = au_content(&target, 30, true).unwrap();
        let expected = raw * params.ca_fc_slope + params.ca_fc_intercept - params.fc_mean;
        assert!((corrected - expected).abs() < 1e-12);

        let raw = position(&target, false).unwrap();
        let corrected = position(&target, true).unwrap();
        let expected = raw * params.po_fc_slope + params.po_fc_intercept - params.fc_mean;
        assert!((corrected - expected).abs() < 1e-12);
    }

    #[test]
    fn test_pairing3p_no_pairs_in_c_flank() {
        // The 3' flank is all C and the miRNA 3' region has only isolated
        // G's, so no run of length >= 2 forms anywhere.
        let target = planted_target();
        assert_eq!(pairing3p(&target, false), Some(0.0));
    }

    #[test]
    fn test_pairing3p_rewards_consecutive_pairs() {
        // host[16..20] = TCTG reads GTCT in the reversed flank, pairing the
        // first four miRNA 3' nucleotides CAGA in one run of four.
        let host = format!("{}TCTGATAAGCTA{}", "C".repeat(16), "C".repeat(32));
        let targets = find_targets(&host, MIRNA, &ScanConfig::default()).unwrap();
        assert_eq!(targets.len(), 1);
        let score = pairing3p(&targets[0], false).unwrap();
        // Four pairs outside the seed-proximal window at offset zero.
        assert!((score - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_combined_score_is_sum() {
        let target = planted_target();
        let au = au_content(&target, 30, false);
        let pos = position(&target, false);
        let pair = pairing3p(&target, false);
        let combined = combined_score(&target, au, pos, pair, false).unwrap();
        assert!((combined - (au.unwrap() + pos.unwrap() + pair.unwrap())).abs() < 1e-12);
    }

    #[test]
    fn test_combined_score_absent_without_site_type() {
        let target = short_seed_target();
        assert_eq!(site_type(&target), None);
        assert_eq!(au_content(&target, 30, false), None);
        assert_eq!(position(&target, false), None);
        assert_eq!(pairing3p(&target, false), None);
        assert_eq!(combined_score(&target, Some(1.0), Some(2.0), Some(3.0), false), None);
    }

    #[test]
    fn test_combined_score_absent_when_subfeature_missing() {
        let target = planted_target();
        assert_eq!(combined_score(&target, None, Some(2.0), Some(3.0), false), None);
    }

    #[test]
    fn test_align_offset_penalty_uses_starting_offset() {
        // No pairs form, so the score is exactly the negated offset penalty.
        assert_eq!(align(b"CCCC", b"CCCCCCCC", 5, 0, 0), -1.5);
        assert_eq!(align(b"CCCC", b"CCCCCCCC", 0, 0, 0), 0.0);
        // A two-pair run outside the seed-proximal window scores 0.5 each.
        assert_eq!(align(b"GGCC", b"CCCC", 0, 0, 0), 1.0);
    }
}
