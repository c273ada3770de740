use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use thiserror::Error;

/// Half-open coordinate range `[start, end)` over a sequence, 0-based.
///
/// Ordering is lexicographic by `(start, end)`.
///
/// # Examples
///
/// ```rust
/// use seedscan_core::types::Interval;
///
/// let iv = Interval::new(3, 10)?;
/// assert_eq!(iv.len(), 7);
/// # Ok::<(), seedscan_core::types::ScanError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Interval {
    start: usize,
    end: usize,
}

impl Interval {
    /// Create a new interval, rejecting `start > end`.
    pub fn new(start: usize, end: usize) -> Result<Self, ScanError> {
        if start > end {
            return Err(ScanError::InvalidInterval { start, end });
        }
        Ok(Self { start, end })
    }

    /// Inclusive 0-based start coordinate.
    #[must_use]
    pub const fn start(&self) -> usize {
        self.start
    }

    /// Exclusive 0-based end coordinate.
    #[must_use]
    pub const fn end(&self) -> usize {
        self.end
    }

    /// Number of positions covered by the interval.
    #[must_use]
    #[allow(clippy::len_without_is_empty)]
    pub const fn len(&self) -> usize {
        self.end - self.start
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

/// A candidate microRNA binding site on a host sequence.
///
/// Built once by the seed finder and immutable afterwards. The host and
/// miRNA sequences are reference-counted so that many targets on the same
/// transcript share a single copy.
#[derive(Debug, Clone)]
pub struct Target {
    /// Full host (transcript) sequence.
    pub host_seq: Arc<str>,
    /// Interval on the host spanned by the full miRNA footprint.
    pub mirna: Interval,
    /// miRNA sequence, 5' to 3'.
    pub mirna_seq: Arc<str>,
    /// Interval on the host matched by the seed.
    pub seed: Interval,
    /// Seed subsequence as it appears on the miRNA.
    pub seed_seq: String,
    /// Offset from the miRNA 5' end where the seed begins.
    pub seed_start_on_mirna: usize,
}

impl Target {
    /// Create a new target, checking that intervals, lengths and sequences
    /// fit together.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::InconsistentTarget`] when a derived interval
    /// length does not match the corresponding sequence length, or when the
    /// miRNA footprint falls outside the host sequence. These indicate a
    /// coordinate-translation bug upstream, not a user error.
    pub fn new(
        host_seq: Arc<str>,
        mirna: Interval,
        mirna_seq: Arc<str>,
        seed: Interval,
        seed_seq: String,
        seed_start_on_mirna: usize,
    ) -> Result<Self, ScanError> {
        if seed.len() != seed_seq.len() {
            return Err(ScanError::InconsistentTarget(format!(
                "seed interval length {} != seed sequence length {}",
                seed.len(),
                seed_seq.len()
            )));
        }
        if mirna.len() != mirna_seq.len() {
            return Err(ScanError::InconsistentTarget(format!(
                "miRNA interval length {} != miRNA sequence length {}",
                mirna.len(),
                mirna_seq.len()
            )));
        }
        if mirna.end() > host_seq.len() {
            return Err(ScanError::InconsistentTarget(format!(
                "miRNA footprint {} extends past host sequence end {}",
                mirna,
                host_seq.len()
            )));
        }
        Ok(Self {
            host_seq,
            mirna,
            mirna_seq,
            seed,
            seed_seq,
            seed_start_on_mirna,
        })
    }

    /// Length of the miRNA footprint.
    #[must_use]
    pub fn mirna_length(&self) -> usize {
        self.mirna.len()
    }

    /// Length of the seed match.
    #[must_use]
    pub fn seed_length(&self) -> usize {
        self.seed.len()
    }

    /// Subsequence of the host bound by the seed.
    #[must_use]
    pub fn seed_site_seq(&self) -> &str {
        &self.host_seq[self.seed.start()..self.seed.end()]
    }

    /// Subsequence of the host covered by the full miRNA footprint.
    #[must_use]
    pub fn site_seq(&self) -> &str {
        &self.host_seq[self.mirna.start()..self.mirna.end()]
    }
}

/// Discrete site classification by seed length and flanking nucleotide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SiteType {
    /// 6 nt seed match, non-A flank.
    Mer6,
    /// 6 nt seed match with an A opposite miRNA position 1.
    Mer7A1,
    /// 7 nt seed match, non-A flank.
    Mer7M8,
    /// 7 nt seed match with an A opposite miRNA position 1.
    Mer8,
}

impl SiteType {
    /// Canonical TargetScan name of the site type.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Mer6 => "6mer",
            Self::Mer7A1 => "7mer-A1",
            Self::Mer7M8 => "7mer-m8",
            Self::Mer8 => "8mer",
        }
    }
}

impl fmt::Display for SiteType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Closed vocabulary of per-target feature names.
///
/// The declaration order is the fixed column order of the tabulated score
/// report, and `Ord` follows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Feature {
    TgsAu,
    TgsPosition,
    TgsPairing3p,
    TgsScore,
    DgDuplex,
    DgBinding,
    DgDuplexSeed,
    DgBindingSeed,
    DgOpen,
    DgTotal,
    ProbExact,
    ProbBinomial,
    ConsBls,
    SelecPhylop,
    MirmapScore,
}

/// Reduction rule applied to one feature across all targets of a transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reducer {
    Min,
    Max,
    Sum,
}

impl Feature {
    /// Every feature, in report column order.
    pub const ALL: [Feature; 15] = [
        Feature::TgsAu,
        Feature::TgsPosition,
        Feature::TgsPairing3p,
        Feature::TgsScore,
        Feature::DgDuplex,
        Feature::DgBinding,
        Feature::DgDuplexSeed,
        Feature::DgBindingSeed,
        Feature::DgOpen,
        Feature::DgTotal,
        Feature::ProbExact,
        Feature::ProbBinomial,
        Feature::ConsBls,
        Feature::SelecPhylop,
        Feature::MirmapScore,
    ];

    /// Stable identifier used as report column header and model field name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::TgsAu => "tgs_au",
            Self::TgsPosition => "tgs_position",
            Self::TgsPairing3p => "tgs_pairing3p",
            Self::TgsScore => "tgs_score",
            Self::DgDuplex => "dg_duplex",
            Self::DgBinding => "dg_binding",
            Self::DgDuplexSeed => "dg_duplex_seed",
            Self::DgBindingSeed => "dg_binding_seed",
            Self::DgOpen => "dg_open",
            Self::DgTotal => "dg_total",
            Self::ProbExact => "prob_exact",
            Self::ProbBinomial => "prob_binomial",
            Self::ConsBls => "cons_bls",
            Self::SelecPhylop => "selec_phylop",
            Self::MirmapScore => "mirmap_score",
        }
    }

    /// Human-readable label used by the pretty report.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::TgsAu => "AU content",
            Self::TgsPosition => "UTR position",
            Self::TgsPairing3p => "3' pairing",
            Self::TgsScore => "TargetScan score",
            Self::DgDuplex => "dG duplex (kcal/mol)",
            Self::DgBinding => "dG binding (kcal/mol)",
            Self::DgDuplexSeed => "dG seed duplex (kcal/mol)",
            Self::DgBindingSeed => "dG seed binding (kcal/mol)",
            Self::DgOpen => "dG open (kcal/mol)",
            Self::DgTotal => "dG total (kcal/mol)",
            Self::ProbExact => "Probability (Exact)",
            Self::ProbBinomial => "Probability (Binomial)",
            Self::ConsBls => "Conservation (BLS)",
            Self::SelecPhylop => "Conservation (PhyloP)",
            Self::MirmapScore => "miRmap score",
        }
    }

    /// Fixed reduction rule for transcript-level aggregation.
    #[must_use]
    pub const fn reducer(self) -> Reducer {
        match self {
            Self::TgsAu | Self::TgsPairing3p | Self::ConsBls => Reducer::Max,
            Self::TgsScore | Self::MirmapScore => Reducer::Sum,
            Self::TgsPosition
            | Self::DgDuplex
            | Self::DgBinding
            | Self::DgDuplexSeed
            | Self::DgBindingSeed
            | Self::DgOpen
            | Self::DgTotal
            | Self::ProbExact
            | Self::ProbBinomial
            | Self::SelecPhylop => Reducer::Min,
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Per-target feature mapping, ordered by report column order.
pub type FeatureMap = BTreeMap<Feature, f64>;

/// Error types that can occur during target prediction and scoring.
#[derive(Error, Debug)]
pub enum ScanError {
    /// Invalid input sequence format or content.
    #[error("Invalid sequence: {0}")]
    InvalidSequence(String),
    /// Interval with start past end.
    #[error("Invalid interval: start {start} must be <= end {end}")]
    InvalidInterval { start: usize, end: usize },
    /// Derived target coordinates do not fit the expected lengths.
    #[error("Inconsistent target: {0}")]
    InconsistentTarget(String),
    /// A required alignment/model input is absent for a requested computation.
    #[error("Missing input: {0}")]
    MissingInput(String),
    /// A model field is absent from the feature mapping; indicates features
    /// were computed out of order.
    #[error("Missing feature '{0}' required by the scoring model")]
    MissingFeature(&'static str),
    /// No linear model registered for the target's seed length.
    #[error("No model registered for seed length {0}")]
    UnregisteredSeedLength(usize),
    /// An external engine (folding, exact probability, phast tool) failed.
    #[error("External engine failure: {0}")]
    EngineFailure(String),
    /// Error parsing input data or external tool output.
    #[error("Parse error: {0}")]
    ParseError(String),
    /// File I/O operation failed.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}
