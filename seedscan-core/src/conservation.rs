//! Conservation features derived from a multi-species alignment.
//!
//! The seed-site window is lifted from reference coordinates into alignment
//! columns, species that are all-gap over the window are dropped, and the
//! species whose degapped window reproduces the seed site exactly form the
//! motif-bearing set used for the branch-length score.

use std::collections::BTreeSet;

use crate::newick::NewickNode;
use crate::sequence::SeqRecord;
use crate::types::{ScanError, Target};

/// Multi-species alignment; the first record is the reference species the
/// host sequence comes from.
#[derive(Debug, Clone)]
pub struct Alignment {
    /// Aligned records in input order.
    pub seqs: Vec<SeqRecord>,
}

impl Alignment {
    /// Wrap parsed records.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::MissingInput`] when `seqs` is empty.
    pub fn new(seqs: Vec<SeqRecord>) -> Result<Self, ScanError> {
        if seqs.is_empty() {
            return Err(ScanError::MissingInput("empty alignment".into()));
        }
        Ok(Self { seqs })
    }

    /// Name of the reference species.
    #[must_use]
    pub fn ref_species(&self) -> &str {
        &self.seqs[0].0
    }
}

/// Alignment slice over one target's seed site.
#[derive(Debug, Clone)]
pub struct TargetAlignment {
    /// Reference species name.
    pub ref_species: String,
    /// Per-species windows, all-gap species dropped, all-gap columns
    /// removed.
    pub seqs: Vec<SeqRecord>,
    /// Species whose degapped window equals the reference seed site.
    pub species_with_motif: BTreeSet<String>,
}

impl TargetAlignment {
    /// True when the branch-length and selection scores are informative:
    /// the reference carries the motif and at least one other species does
    /// too.
    #[must_use]
    pub fn is_conserved(&self) -> bool {
        self.species_with_motif.contains(&self.ref_species) && self.species_with_motif.len() > 1
    }
}

/// Alignment-column indices of the reference positions over `alphabet`.
fn coord_vec(seq: &str, alphabet: &[u8]) -> Vec<usize> {
    seq.bytes()
        .enumerate()
        .filter(|(_, c)| alphabet.contains(c))
        .map(|(i, _)| i)
        .collect()
}

fn remove_gap_columns(seqs: &mut [SeqRecord]) {
    let Some(width) = seqs.first().map(|(_, s)| s.len()) else {
        return;
    };
    let keep: Vec<bool> = (0..width)
        .map(|i| seqs.iter().any(|(_, s)| s.as_bytes()[i] != b'-'))
        .collect();
    for (_, seq) in seqs.iter_mut() {
        *seq = seq
            .bytes()
            .zip(&keep)
            .filter(|(_, &k)| k)
            .map(|(c, _)| c as char)
            .collect();
    }
}

/// Slice the alignment over the seed-site window of `target`.
///
/// # Errors
///
/// Returns [`ScanError::MissingInput`] when the reference sequence is too
/// short to cover the seed interval.
pub fn extract_target_alignment(
    target: &Target,
    aln: &Alignment,
    aln_alphabet: &[u8],
) -> Result<TargetAlignment, ScanError> {
    let ref_species = aln.ref_species().to_string();
    let coords = coord_vec(&aln.seqs[0].1, aln_alphabet);
    let start = *coords.get(target.seed.start()).ok_or_else(|| {
        ScanError::MissingInput(format!(
            "reference '{ref_species}' shorter than seed start {}",
            target.seed.start()
        ))
    })?;
    let end = *coords.get(target.seed.end()).ok_or_else(|| {
        ScanError::MissingInput(format!(
            "reference '{ref_species}' shorter than seed end {}",
            target.seed.end()
        ))
    })?;
    let seed_site = target.seed_site_seq();

    let mut seqs = Vec::new();
    let mut species_with_motif = BTreeSet::new();
    for (name, seq) in &aln.seqs {
        let window: String = seq.chars().skip(start).take(end - start).collect();
        if window.bytes().all(|c| c == b'-') {
            continue;
        }
        let degapped: String = window
            .chars()
            .filter(|c| matches!(c, 'A' | 'C' | 'G' | 'T'))
            .collect();
        if degapped == seed_site {
            species_with_motif.insert(name.clone());
        }
        seqs.push((name.clone(), window));
    }
    remove_gap_columns(&mut seqs);
    Ok(TargetAlignment {
        ref_species,
        seqs,
        species_with_motif,
    })
}

/// Branch Length Score: total branch length of `tree` pruned down to the
/// motif-bearing species.
///
/// Zero when the site is not conserved beyond the reference.
///
/// # Errors
///
/// Returns [`ScanError::ParseError`] on a malformed tree.
pub fn branch_length_score(
    target_aln: &TargetAlignment,
    tree: &str,
) -> Result<f64, ScanError> {
    if !target_aln.is_conserved() {
        return Ok(0.0);
    }
    let parsed = NewickNode::parse(tree)?;
    Ok(parsed
        .retain_leaves(&target_aln.species_with_motif)
        .map_or(0.0, |pruned| pruned.branch_length_sum()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScanConfig;
    use crate::seed::find_targets;

    const MIRNA: &str = "TAGCTTATCAGACTGATGTTGA";

    fn planted_target() -> Target {
        let host = format!("{}ATAAGCTA{}", "C".repeat(20), "C".repeat(32));
        find_targets(&host, MIRNA, &ScanConfig::default())
            .unwrap()
            .remove(0)
    }

    // Reference alignment row carrying the planted host with a gap inserted
    // before the site, so alignment columns shift away from host coordinates.
    fn planted_alignment(other_site: &str, third_site: &str) -> Alignment {
        let host = format!("{}ATAAGCTA{}", "C".repeat(20), "C".repeat(32));
        let reference = format!("{}--{}", &host[..10], &host[10..]);
        let other = format!("{}--{}{}{}", "G".repeat(10), "G".repeat(10), other_site, "G".repeat(33));
        let third = format!("{}--{}{}{}", "T".repeat(10), "T".repeat(10), third_site, "T".repeat(33));
        Alignment::new(vec![
            ("hg38".to_string(), reference),
            ("mm39".to_string(), other),
            ("rn7".to_string(), third),
        ])
        .unwrap()
    }

    #[test]
    fn test_coord_vec_skips_gaps() {
        assert_eq!(coord_vec("A-C-G", b"ACGTN"), vec![0, 2, 4]);
        assert_eq!(coord_vec("--", b"ACGTN"), Vec::<usize>::new());
    }

    #[test]
    fn test_extract_maps_through_gapped_reference() {
        let target = planted_target();
        let aln = planted_alignment("ATAAGCT", "ATAAGCT");
        let ta = extract_target_alignment(&target, &aln, b"ACGTN").unwrap();
        assert_eq!(ta.ref_species, "hg38");
        assert_eq!(ta.seqs.len(), 3);
        // Reference window is the seed site itself.
        assert_eq!(ta.seqs[0].1, "ATAAGCT");
        assert!(ta.species_with_motif.contains("hg38"));
        assert!(ta.species_with_motif.contains("mm39"));
        assert!(ta.species_with_motif.contains("rn7"));
        assert!(ta.is_conserved());
    }

    #[test]
    fn test_gapped_window_still_counts_motif_when_degapped() {
        let target = planted_target();
        // A gap inside the reference site widens the window to eight
        // columns; the motif comparison works on degapped windows, so a
        // species whose eight columns degap to the seed site still counts.
        let reference = format!("{}ATA-AGCTA{}", "C".repeat(20), "C".repeat(32));
        let other = format!("{}ATAAGCT-G{}", "G".repeat(20), "G".repeat(32));
        let third = format!("{}TTTTTTTTT{}", "T".repeat(20), "T".repeat(32));
        let aln = Alignment::new(vec![
            ("hg38".to_string(), reference),
            ("mm39".to_string(), other),
            ("rn7".to_string(), third),
        ])
        .unwrap();
        let ta = extract_target_alignment(&target, &aln, b"ACGTN").unwrap();
        assert!(ta.species_with_motif.contains("hg38"));
        assert!(ta.species_with_motif.contains("mm39"));
        assert!(!ta.species_with_motif.contains("rn7"));
    }

    #[test]
    fn test_all_gap_species_is_dropped() {
        let target = planted_target();
        let aln = planted_alignment("-------", "ATAAGCT");
        let ta = extract_target_alignment(&target, &aln, b"ACGTN").unwrap();
        assert_eq!(ta.seqs.len(), 2);
        assert!(ta.seqs.iter().all(|(name, _)| name != "mm39"));
    }

    #[test]
    fn test_short_reference_is_an_error() {
        let target = planted_target();
        let aln = Alignment::new(vec![("hg38".to_string(), "ACGT".to_string())]).unwrap();
        assert!(matches!(
            extract_target_alignment(&target, &aln, b"ACGTN"),
            Err(ScanError::MissingInput(_))
        ));
    }

    #[test]
    fn test_bls_sums_pruned_tree() {
        let target = planted_target();
        let aln = planted_alignment("ATAAGCT", "TTTTTTT");
        let ta = extract_target_alignment(&target, &aln, b"ACGTN").unwrap();
        // hg38 and mm39 carry the motif: prune (hg38:1,(mm39:2,rn7:3):4)
        // down to those two.
        let bls = branch_length_score(&ta, "(hg38:1,(mm39:2,rn7:3):4);").unwrap();
        assert_eq!(bls, 7.0);
    }

    #[test]
    fn test_bls_zero_without_conservation() {
        let target = planted_target();
        let aln = planted_alignment("TTTTTTT", "TTTTTTT");
        let ta = extract_target_alignment(&target, &aln, b"ACGTN").unwrap();
        assert_eq!(
            branch_length_score(&ta, "(hg38:1,(mm39:2,rn7:3):4);").unwrap(),
            0.0
        );
    }
}
