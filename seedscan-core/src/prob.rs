//! Over-representation probabilities of the seed site motif.
//!
//! Both features ask how surprising the observed occurrence count of the
//! seed-matching motif is in the host sequence, under a Markov chain fitted
//! on that same sequence. `prob_binomial` approximates the answer with a
//! binomial tail; `prob_exact` delegates to an exact-distribution engine.

use crate::engines::{ExactProbEngine, SearchDirection};
use crate::markov::TransitionMatrix;
use crate::sequence::count_occurrences;
use crate::types::{ScanError, Target};

/// Cumulative distribution function P(X <= x) of Binomial(n, p).
///
/// Evaluated in the log domain so large `n` stays finite. Degenerate `p`
/// values short-circuit: with `p <= 0` all mass is at zero, with `p >= 1`
/// all mass is at `n`.
#[must_use]
pub fn binomial_cdf(x: i64, n: u64, p: f64) -> f64 {
    if x < 0 {
        return 0.0;
    }
    let x = x as u64;
    if x >= n {
        return 1.0;
    }
    if p <= 0.0 {
        return 1.0;
    }
    if p >= 1.0 {
        return 0.0;
    }
    let (log_p, log_q) = (p.ln(), (1.0 - p).ln());
    let n_f = n as f64;
    let mut log_binom = 0.0; // ln C(n, k), updated incrementally
    let mut cdf = 0.0;
    for k in 0..=x {
        if k > 0 {
            log_binom += (n_f - k as f64 + 1.0).ln() - (k as f64).ln();
        }
        cdf += (log_binom + k as f64 * log_p + (n_f - k as f64) * log_q).exp();
    }
    cdf.min(1.0)
}

/// Upper tail P(X > x) of Binomial(n, p).
#[must_use]
pub fn binomial_tail(x: i64, n: u64, p: f64) -> f64 {
    1.0 - binomial_cdf(x, n, p)
}

/// P-value of the observed seed-site motif count under a binomial
/// approximation: the probability of seeing at least as many occurrences by
/// chance.
///
/// The motif probability comes from `transitions`; the number of trials is
/// the number of length-`motif` windows in the host sequence.
///
/// # Errors
///
/// Returns [`ScanError::InvalidSequence`] if the motif contains a symbol
/// outside the transition matrix's alphabet.
pub fn prob_binomial(target: &Target, transitions: &TransitionMatrix) -> Result<f64, ScanError> {
    let motif = target.seed_site_seq();
    let p = transitions.motif_prob(&motif)?;
    let count = count_occurrences(&target.host_seq, &motif);
    let trials = (target.host_seq.len() - motif.len() + 1) as u64;
    Ok(binomial_tail(count as i64 - 1, trials, p))
}

/// P-value of the observed seed-site motif count under the exact
/// occurrence distribution, computed by an external engine.
///
/// # Errors
///
/// Returns [`ScanError::EngineFailure`] when the engine fails.
pub fn prob_exact(
    target: &Target,
    transitions: &TransitionMatrix,
    engine: &dyn ExactProbEngine,
) -> Result<f64, ScanError> {
    let motif = target.seed_site_seq();
    let count = count_occurrences(&target.host_seq, &motif);
    engine.exact_prob(
        &motif,
        count,
        target.host_seq.len(),
        transitions.alphabet(),
        transitions.flat(),
        transitions.order(),
        SearchDirection::Over,
    )
}
