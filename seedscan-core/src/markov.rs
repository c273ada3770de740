//! Markov-chain transition estimation over a sequence.
//!
//! Transition counts are kept in a flat table indexed over the full
//! `|alphabet|^(order + 1)` motif space so every permutation is represented,
//! observed or not. Rows (grouped by length-`order` prefix) are normalized
//! to conditional probabilities; a prefix with zero observations keeps an
//! all-zero row, which callers must tolerate.

use crate::types::ScanError;

/// Fitted transition matrix of a Markov chain.
///
/// # Examples
///
/// ```rust
/// use seedscan_core::markov::TransitionMatrix;
///
/// let tm = TransitionMatrix::estimate("ACGTACGTACGT", b"ACGT", 1);
/// let p = tm.motif_prob("ACG").unwrap();
/// assert!(p > 0.0 && p <= 1.0);
/// ```
#[derive(Debug, Clone)]
pub struct TransitionMatrix {
    alphabet: Vec<u8>,
    order: usize,
    probs: Vec<f64>,
}

impl TransitionMatrix {
    /// Estimate transition probabilities of an order-`order` chain from
    /// `seq`. Windows containing symbols outside `alphabet` are ignored.
    #[must_use]
    pub fn estimate(seq: &str, alphabet: &[u8], order: usize) -> Self {
        let window = order + 1;
        let mut counts = vec![0.0_f64; alphabet.len().pow(window as u32)];
        let bytes = seq.as_bytes();
        if bytes.len() >= window {
            'outer: for start in 0..=bytes.len() - window {
                let mut index = 0;
                for &c in &bytes[start..start + window] {
                    match alphabet.iter().position(|&a| a == c) {
                        Some(digit) => index = index * alphabet.len() + digit,
                        None => continue 'outer,
                    }
                }
                counts[index] += 1.0;
            }
        }
        // Normalize each prefix row to a conditional distribution.
        for row in counts.chunks_mut(alphabet.len()) {
            let total: f64 = row.iter().sum();
            if total > 0.0 {
                for value in row.iter_mut() {
                    *value /= total;
                }
            }
        }
        Self {
            alphabet: alphabet.to_vec(),
            order,
            probs: counts,
        }
    }

    /// Markov order of the chain.
    #[must_use]
    pub const fn order(&self) -> usize {
        self.order
    }

    /// Alphabet the chain was fitted over.
    #[must_use]
    pub fn alphabet(&self) -> &[u8] {
        &self.alphabet
    }

    /// Flattened transition table in motif-index order, as consumed by the
    /// exact-probability engine.
    #[must_use]
    pub fn flat(&self) -> &[f64] {
        &self.probs
    }

    /// Conditional probability row for one length-`order` prefix index.
    #[must_use]
    pub fn row(&self, prefix_index: usize) -> &[f64] {
        let n = self.alphabet.len();
        &self.probs[prefix_index * n..(prefix_index + 1) * n]
    }

    /// Number of prefix rows.
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.probs.len() / self.alphabet.len()
    }

    fn window_index(&self, window: &[u8]) -> Result<usize, ScanError> {
        let mut index = 0;
        for &c in window {
            let digit = self.alphabet.iter().position(|&a| a == c).ok_or_else(|| {
                ScanError::InvalidSequence(format!(
                    "symbol '{}' outside the alphabet",
                    c as char
                ))
            })?;
            index = index * self.alphabet.len() + digit;
        }
        Ok(index)
    }

    /// Probability of observing `motif` under the fitted chain: the product
    /// of each successive window's conditional probability.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::InvalidSequence`] if the motif contains a symbol
    /// outside the alphabet.
    pub fn motif_prob(&self, motif: &str) -> Result<f64, ScanError> {
        let bytes = motif.as_bytes();
        let window = self.order + 1;
        let mut prob = 1.0;
        if bytes.len() >= window {
            for start in 0..=bytes.len() - window {
                prob *= self.probs[self.window_index(&bytes[start..start + window])?];
            }
        }
        Ok(prob)
    }
}
