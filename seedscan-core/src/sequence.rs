//! Sequence utilities: FASTA loading, reverse complement and substring
//! search with the overlap/count policies the rest of the pipeline relies
//! on.

use crate::types::ScanError;
use bio::alphabets::dna;
use bio::io::fasta;
use std::fs::File;
use std::path::Path;

/// Named sequence record, in file order.
pub type SeqRecord = (String, String);

/// Return the reverse complement of a DNA sequence.
///
/// # Examples
///
/// ```rust
/// use seedscan_core::sequence::reverse_complement;
///
/// assert_eq!(reverse_complement("ACGT"), "ACGT");
/// assert_eq!(reverse_complement("AAGC"), "GCTT");
/// ```
#[must_use]
pub fn reverse_complement(seq: &str) -> String {
    String::from_utf8(dna::revcomp(seq.as_bytes())).expect("revcomp of valid UTF-8 is UTF-8")
}

/// Uppercase a sequence and replace U with T, normalizing RNA input to the
/// DNA alphabet used throughout the pipeline.
#[must_use]
pub fn normalize_rna(seq: &str) -> String {
    seq.to_ascii_uppercase().replace('U', "T")
}

/// Find every occurrence of `needle` in `haystack`, overlapping matches
/// included, returning start positions in ascending order.
///
/// Overlap-permitting search is required by the seed finder because seed
/// occurrences may abut.
#[must_use]
pub fn find_overlapping(haystack: &str, needle: &str) -> Vec<usize> {
    let (hay, ndl) = (haystack.as_bytes(), needle.as_bytes());
    if ndl.is_empty() || ndl.len() > hay.len() {
        return Vec::new();
    }
    (0..=hay.len() - ndl.len())
        .filter(|&i| &hay[i..i + ndl.len()] == ndl)
        .collect()
}

/// Count non-overlapping occurrences of `needle` in `haystack`.
///
/// This is the occurrence count used as the binomial observation for the
/// motif-probability features.
#[must_use]
pub fn count_occurrences(haystack: &str, needle: &str) -> usize {
    if needle.is_empty() {
        return 0;
    }
    let mut count = 0;
    let mut pos = 0;
    while let Some(found) = haystack[pos..].find(needle) {
        count += 1;
        pos += found + needle.len();
    }
    count
}

/// Load a FASTA file as a vector of `(id, sequence)` records, preserving
/// file order.
///
/// # Errors
///
/// Returns [`ScanError::IoError`] when the file cannot be opened and
/// [`ScanError::ParseError`] on malformed records.
pub fn load_fasta<P: AsRef<Path>>(path: P, uppercase: bool) -> Result<Vec<SeqRecord>, ScanError> {
    let file = File::open(path)?;
    let reader = fasta::Reader::new(file);
    let mut records = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| ScanError::ParseError(e.to_string()))?;
        let mut seq = String::from_utf8(record.seq().to_vec())
            .map_err(|e| ScanError::ParseError(e.to_string()))?;
        if uppercase {
            seq.make_ascii_uppercase();
        }
        records.push((record.id().to_string(), seq));
    }
    Ok(records)
}

/// Parse FASTA text into `(id, sequence)` records, preserving input order.
pub fn parse_fasta_str(text: &str, uppercase: bool) -> Result<Vec<SeqRecord>, ScanError> {
    let mut records: Vec<SeqRecord> = Vec::new();
    for line in text.lines() {
        let line = line.trim_end();
        if let Some(header) = line.strip_prefix('>') {
            records.push((header.trim().to_string(), String::new()));
        } else if !line.is_empty() {
            let (_, seq) = records
                .last_mut()
                .ok_or_else(|| ScanError::ParseError("sequence before FASTA header".into()))?;
            if uppercase {
                seq.push_str(&line.to_ascii_uppercase());
            } else {
                seq.push_str(line);
            }
        }
    }
    Ok(records)
}

/// Render records as FASTA text.
#[must_use]
pub fn to_fasta_str(records: &[SeqRecord]) -> String {
    records
        .iter()
        .map(|(name, seq)| format!(">{name}\n{seq}"))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reverse_complement_keeps_length() {
        assert_eq!(reverse_complement("ATAAGCT"), "AGCTTAT");
        assert_eq!(reverse_complement(""), "");
    }

    #[test]
    fn test_normalize_rna_uppercases_and_converts_u() {
        assert_eq!(normalize_rna("acguACGU"), "ACGTACGT");
    }

    #[test]
    fn test_find_overlapping_matches() {
        assert_eq!(find_overlapping("AAAA", "AA"), vec![0, 1, 2]);
        assert_eq!(find_overlapping("ACGT", "GT"), vec![2]);
        assert!(find_overlapping("ACGT", "TTTTT").is_empty());
        assert!(find_overlapping("ACGT", "").is_empty());
    }

    #[test]
    fn test_count_occurrences_is_non_overlapping() {
        assert_eq!(count_occurrences("AAAA", "AA"), 2);
        assert_eq!(count_occurrences("ACGTACGT", "ACGT"), 2);
        assert_eq!(count_occurrences("ACGT", "T"), 1);
        assert_eq!(count_occurrences("ACGT", ""), 0);
    }

    #[test]
    fn test_parse_fasta_str_preserves_order() {
        let records =
            parse_fasta_str(">ref\nacgt\nACGT\n>other species\nTT--AA\n", true).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0], ("ref".to_string(), "ACGTACGT".to_string()));
        assert_eq!(records[1].0, "other species");
        assert_eq!(records[1].1, "TT--AA");
    }

    #[test]
    fn test_parse_fasta_str_rejects_headerless_sequence() {
        assert!(matches!(
            parse_fasta_str("ACGT\n", false),
            Err(ScanError::ParseError(_))
        ));
    }

    #[test]
    fn test_load_fasta_round_trip() {
        use std::io::Write;
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, ">seq1 first\nACGT\nacgt\n>seq2\nTTAA\n").unwrap();
        let records = load_fasta(file.path(), true).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0], ("seq1".to_string(), "ACGTACGT".to_string()));
        assert_eq!(records[1], ("seq2".to_string(), "TTAA".to_string()));
    }

    #[test]
    fn test_to_fasta_str() {
        let records = vec![
            ("a".to_string(), "ACGT".to_string()),
            ("b".to_string(), "TT".to_string()),
        ];
        assert_eq!(to_fasta_str(&records), ">a\nACGT\n>b\nTT");
    }
}
