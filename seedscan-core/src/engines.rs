//! External computation engines.
//!
//! Thermodynamic folding and exact motif-occurrence probabilities both come
//! from external tools. The traits here are the seams the pipeline calls
//! through; callers supply implementations backed by whatever binding they
//! have available, and tests supply mocks.

use crate::types::ScanError;

/// Parameters forwarded to the folding engine.
#[derive(Debug, Clone, Default)]
pub struct FoldModel {
    /// Minimum hairpin loop size, when the engine supports overriding it.
    pub min_loop_size: Option<i32>,
    /// Folding temperature in degrees Celsius.
    pub temperature: Option<f64>,
}

/// Minimum-free-energy fold of one or two concatenated sequences.
#[derive(Debug, Clone)]
pub struct FoldResult {
    /// Dot-bracket structure of the MFE fold.
    pub mfe_structure: String,
    /// Minimum free energy (kcal/mol).
    pub mfe: f64,
}

/// Partition-function fold, carrying ensemble quantities alongside the MFE.
#[derive(Debug, Clone)]
pub struct PartitionFoldResult {
    /// Dot-bracket structure of the MFE fold.
    pub mfe_structure: String,
    /// Minimum free energy (kcal/mol).
    pub mfe: f64,
    /// Ensemble structure string.
    pub efe_structure: String,
    /// Ensemble free energy (kcal/mol).
    pub efe: f64,
    /// Free energy of the binding ensemble, for cofold runs.
    pub efe_binding: Option<f64>,
}

/// RNA (co)folding backend.
///
/// `seqs` holds one sequence for a plain fold or two for a cofold of the
/// host site with the miRNA. `constraints`, when given, is a dot-bracket
/// constraint string matching the concatenated sequence length.
pub trait FoldingEngine {
    /// Minimum-free-energy fold.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::EngineFailure`] when the backend fails.
    fn fold(
        &self,
        seqs: &[&str],
        constraints: Option<&str>,
        model: &FoldModel,
    ) -> Result<FoldResult, ScanError>;

    /// Partition-function fold.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::EngineFailure`] when the backend fails.
    fn fold_partition(
        &self,
        seqs: &[&str],
        constraints: Option<&str>,
        model: &FoldModel,
    ) -> Result<PartitionFoldResult, ScanError>;
}

/// Tail direction for the exact occurrence-probability computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchDirection {
    /// P(count >= observed)
    Over,
    /// P(count <= observed)
    Under,
}

/// Exact motif-occurrence probability backend.
pub trait ExactProbEngine {
    /// Exact probability of observing `observed` or more (resp. fewer)
    /// occurrences of a length-`motif_length` motif in a sequence of
    /// `seq_length` symbols, under the Markov chain given by
    /// `transitions_flat` (row-major over the full motif space).
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::EngineFailure`] when the backend fails.
    #[allow(clippy::too_many_arguments)]
    fn exact_prob(
        &self,
        motif: &str,
        observed: usize,
        seq_length: usize,
        alphabet: &[u8],
        transitions_flat: &[f64],
        order: usize,
        direction: SearchDirection,
    ) -> Result<f64, ScanError>;
}
