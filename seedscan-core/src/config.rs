/// Configuration settings for target prediction and scoring.
///
/// All fields are read-only once a scan starts; the same configuration can
/// be shared across threads.
///
/// # Examples
///
/// ## Default configuration
///
/// ```rust
/// use seedscan_core::config::ScanConfig;
///
/// let config = ScanConfig::default();
/// assert_eq!(config.seed_lengths, vec![6, 7]);
/// ```
///
/// ## Corrected scores with a single seed length
///
/// ```rust
/// use seedscan_core::config::ScanConfig;
///
/// let config = ScanConfig {
///     seed_lengths: vec![7],
///     with_correction: true,
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Offset from the miRNA 5' end where the seed begins.
    ///
    /// Conventionally 1, skipping the first nucleotide.
    ///
    /// **Default**: `1`
    pub seed_start_on_mirna: usize,

    /// Seed lengths to search, processed longest first.
    ///
    /// **Default**: `[6, 7]`
    pub seed_lengths: Vec<usize>,

    /// Nucleotide alphabet used by the Markov transition estimator.
    ///
    /// **Default**: `ACGT`
    pub alphabet: Vec<u8>,

    /// Alignment alphabet used for reference-coordinate mapping.
    ///
    /// Symbols outside this set (gaps in particular) do not consume host
    /// positions.
    ///
    /// **Default**: `ACGTN`
    pub aln_alphabet: Vec<u8>,

    /// Order of the Markov chain fitted on the host sequence.
    ///
    /// **Default**: `1`
    pub markov_order: usize,

    /// Window length (nt) scanned upstream and downstream of the site for
    /// the AU-content feature.
    ///
    /// **Default**: `30`
    pub au_window_length: usize,

    /// Apply the fixed linear-regression correction to the empirical site
    /// features and their combined score.
    ///
    /// **Default**: `false`
    pub with_correction: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            seed_start_on_mirna: 1,
            seed_lengths: vec![6, 7],
            alphabet: b"ACGT".to_vec(),
            aln_alphabet: b"ACGTN".to_vec(),
            markov_order: 1,
            au_window_length: 30,
            with_correction: false,
        }
    }
}
