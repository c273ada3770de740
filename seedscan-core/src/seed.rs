//! Seed finder: enumerates candidate binding sites from a host/miRNA
//! sequence pair.
//!
//! The miRNA seed is searched on the reverse complement of the host
//! sequence, overlapping occurrences included, and matches are translated
//! back to forward host coordinates. Longer seed lengths are processed
//! first so that, at a given anchor point, the longer and more specific
//! match wins over shorter ones sharing the same seed end coordinate.

use std::collections::HashSet;
use std::sync::Arc;

use crate::config::ScanConfig;
use crate::sequence::{find_overlapping, reverse_complement};
use crate::types::{Interval, ScanError, Target};

/// Find candidate target sites for `mirna_seq` on `host_seq`.
///
/// Both sequences are expected uppercase over the DNA alphabet (use
/// [`crate::sequence::normalize_rna`] on RNA input). The returned targets
/// are sorted by seed-interval end coordinate, descending, and the list is
/// identical across repeated calls.
///
/// # Errors
///
/// Returns [`ScanError::InconsistentTarget`] if a derived interval length
/// does not match the expected seed or miRNA length.
///
/// # Examples
///
/// ```rust
/// use seedscan_core::config::ScanConfig;
/// use seedscan_core::seed::find_targets;
///
/// // Host carrying the reverse complement of the 7 nt seed AGCTTAT.
/// let host = format!("{}ATAAGCTA{}", "C".repeat(20), "C".repeat(32));
/// let mirna = "TAGCTTATCAGACTGATGTTGA";
///
/// let targets = find_targets(&host, mirna, &ScanConfig::default())?;
/// assert_eq!(targets.len(), 1);
/// assert_eq!(targets[0].seed_length(), 7);
/// assert_eq!(targets[0].seed_seq, "AGCTTAT");
/// # Ok::<(), seedscan_core::types::ScanError>(())
/// ```
pub fn find_targets(
    host_seq: &str,
    mirna_seq: &str,
    config: &ScanConfig,
) -> Result<Vec<Target>, ScanError> {
    let host: Arc<str> = Arc::from(host_seq);
    let mirna: Arc<str> = Arc::from(mirna_seq);
    let host_rc = reverse_complement(host_seq);
    let host_len = host_seq.len();
    let mirna_len = mirna_seq.len();
    let seed_start = config.seed_start_on_mirna;

    let mut seed_lengths = config.seed_lengths.clone();
    seed_lengths.sort_unstable_by(|a, b| b.cmp(a));
    seed_lengths.dedup();

    let mut targets = Vec::new();
    let mut seen_ends: HashSet<usize> = HashSet::new();
    for seed_length in seed_lengths {
        if seed_start + seed_length > mirna_len {
            continue;
        }
        let seed_seq = &mirna_seq[seed_start..seed_start + seed_length];
        for match_start in find_overlapping(&host_rc, seed_seq) {
            let seed =
                Interval::new(host_len - (match_start + seed_length), host_len - match_start)?;
            // Discard matches whose full miRNA footprint would extend
            // outside the host sequence.
            let tail_3p = mirna_len - seed_length - seed_start;
            if seed.start() < tail_3p || seed.end() + seed_start > host_len {
                continue;
            }
            if seen_ends.contains(&seed.end()) {
                continue;
            }
            let mirna_interval = Interval::new(
                seed.end() + seed_start - mirna_len,
                seed.end() + seed_start,
            )?;
            if seed.len() != seed_length {
                return Err(ScanError::InconsistentTarget(format!(
                    "seed interval length {} != seed length {}",
                    seed.len(),
                    seed_length
                )));
            }
            if mirna_interval.len() != mirna_len {
                return Err(ScanError::InconsistentTarget(format!(
                    "miRNA interval length {} != miRNA length {}",
                    mirna_interval.len(),
                    mirna_len
                )));
            }
            targets.push(Target::new(
                Arc::clone(&host),
                mirna_interval,
                Arc::clone(&mirna),
                seed,
                seed_seq.to_string(),
                seed_start,
            )?);
            seen_ends.insert(seed.end());
        }
    }

    // 3'-to-5' order along the host sequence; stable for determinism.
    targets.sort_by(|a, b| b.seed.end().cmp(&a.seed.end()));
    Ok(targets)
}
