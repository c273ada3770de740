//! Thermodynamic features computed through a [`FoldingEngine`].
//!
//! Duplex energies come from a cofold of the target site with the miRNA,
//! with the seed pairing enforced through a dot-bracket constraint. The
//! opening energy compares the ensemble free energy of the site region
//! folded freely against the same region forced single-stranded.

use crate::engines::{FoldModel, FoldingEngine};
use crate::types::{ScanError, Target};

const UPSTREAM_REST: usize = 20;
const DOWNSTREAM_REST: usize = 20;
const DG_BINDING_AREA: usize = 70;

/// Fold model used when the caller does not supply one: minimum hairpin
/// loop of two.
#[must_use]
pub fn default_fold_model() -> FoldModel {
    FoldModel {
        min_loop_size: Some(2),
        temperature: None,
    }
}

/// Duplex MFE and ensemble binding energy of a cofold.
#[derive(Debug, Clone, Copy)]
pub struct DuplexEnergies {
    /// Minimum free energy of the duplex (kcal/mol).
    pub duplex: f64,
    /// Ensemble binding free energy (kcal/mol).
    pub binding: f64,
}

fn duplex_constraint(target: &Target) -> String {
    let mirna_len = target.mirna_length();
    let seed_len = target.seed_length();
    let start = target.seed_start_on_mirna;
    let lo = mirna_len - seed_len - start;
    let hi = mirna_len - start;
    let mut up = vec![b'.'; mirna_len];
    let mut down = vec![b'.'; mirna_len];
    for i in lo..hi {
        up[i] = b'(';
        down[i] = b')';
    }
    down.reverse();
    up.extend_from_slice(&down);
    String::from_utf8(up).expect("constraint bytes are ASCII")
}

/// Cofold the full target site with the miRNA, seed pairing enforced.
///
/// # Errors
///
/// Returns [`ScanError::EngineFailure`] when the folding backend fails.
pub fn dg_duplex(
    target: &Target,
    engine: &dyn FoldingEngine,
    model: &FoldModel,
) -> Result<DuplexEnergies, ScanError> {
    let site_seq = target.site_seq();
    let constraint = duplex_constraint(target);
    let result = engine.fold_partition(
        &[&site_seq, &target.mirna_seq],
        Some(&constraint),
        model,
    )?;
    let binding = result.efe_binding.ok_or_else(|| {
        ScanError::EngineFailure("cofold returned no binding free energy".into())
    })?;
    Ok(DuplexEnergies {
        duplex: result.mfe,
        binding,
    })
}

/// Cofold only the seed-matching site with the seed, unconstrained.
///
/// # Errors
///
/// Returns [`ScanError::EngineFailure`] when the folding backend fails.
pub fn dg_duplex_seed(
    target: &Target,
    engine: &dyn FoldingEngine,
    model: &FoldModel,
) -> Result<DuplexEnergies, ScanError> {
    let seed_site = target.seed_site_seq();
    let result = engine.fold_partition(&[&seed_site, &target.seed_seq], None, model)?;
    let binding = result.efe_binding.ok_or_else(|| {
        ScanError::EngineFailure("cofold returned no binding free energy".into())
    })?;
    Ok(DuplexEnergies {
        duplex: result.mfe,
        binding,
    })
}

/// Site accessibility: ensemble free-energy cost of forcing the miRNA
/// footprint, plus flanking rests, single-stranded.
///
/// The folded window extends [`DG_BINDING_AREA`] nt beyond the constrained
/// region on both sides; where the host sequence runs out the window is
/// padded with poly(A).
///
/// # Errors
///
/// Returns [`ScanError::EngineFailure`] when the folding backend fails.
pub fn dg_open(
    target: &Target,
    engine: &dyn FoldingEngine,
    model: &FoldModel,
) -> Result<f64, ScanError> {
    let host_len = target.host_seq.len();
    let flank = UPSTREAM_REST + DG_BINDING_AREA;
    let start_tmp = target.mirna.start() as i64 - flank as i64;
    let (start, polya_up) = if start_tmp < 0 {
        (0, start_tmp.unsigned_abs() as usize)
    } else {
        (start_tmp as usize, 0)
    };
    let end_tmp = target.mirna.end() + DOWNSTREAM_REST + DG_BINDING_AREA;
    let (end, polya_down) = if end_tmp > host_len {
        (host_len, end_tmp - host_len)
    } else {
        (end_tmp, 0)
    };
    let seq = format!(
        "{}{}{}",
        "A".repeat(polya_up),
        &target.host_seq[start..end],
        "A".repeat(polya_down)
    );
    let constraint = format!(
        "{}{}{}",
        ".".repeat(DG_BINDING_AREA),
        "x".repeat(UPSTREAM_REST + target.mirna_length() + DOWNSTREAM_REST),
        ".".repeat(DG_BINDING_AREA)
    );
    let free = engine.fold_partition(&[&seq], None, model)?;
    let blocked = engine.fold_partition(&[&seq], Some(&constraint), model)?;
    Ok(blocked.efe - free.efe)
}

/// Combined duplex formation and site opening cost.
#[must_use]
pub fn dg_total(dg_duplex: f64, dg_open: f64) -> f64 {
    dg_duplex + dg_open
}
