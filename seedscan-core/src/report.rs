//! Tabulated and pretty output of predicted targets.
//!
//! The tab-separated table carries annotation columns followed by one
//! column per feature in [`Feature::ALL`] order; features that were not
//! computed are written as `NA`. The pretty report draws the miRNA over
//! its site and lists labelled feature values.

use std::io::{self, Write};

use crate::types::{Feature, FeatureMap, Target};

/// Annotation columns of the per-target table.
pub const ANNOT_COLUMNS: [&str; 8] = [
    "mirna_id",
    "transcript_stable_id",
    "target_id",
    "seed_length",
    "mirna_start",
    "mirna_end",
    "seed_start",
    "seed_end",
];

/// Annotation columns of the per-transcript aggregate table.
pub const AGG_ANNOT_COLUMNS: [&str; 5] = [
    "mirna_id",
    "transcript_stable_id",
    "num_target",
    "num_seed6",
    "num_seed7",
];

/// Render a feature value: the shorter of the plain and the eight-decimal
/// representation.
#[must_use]
pub fn format_number(value: f64) -> String {
    let plain = format!("{value}");
    let fixed = format!("{value:.8}");
    if plain.len() < fixed.len() {
        plain
    } else {
        fixed
    }
}

fn feature_cell(features: &FeatureMap, feature: Feature) -> String {
    features
        .get(&feature)
        .map_or_else(|| "NA".to_string(), |v| format_number(*v))
}

/// Write the header of the per-target table.
///
/// # Errors
///
/// Propagates I/O errors from `writer`.
pub fn write_table_header<W: Write>(writer: &mut W) -> io::Result<()> {
    let mut columns: Vec<&str> = ANNOT_COLUMNS.to_vec();
    columns.extend(Feature::ALL.iter().map(|f| f.name()));
    writeln!(writer, "{}", columns.join("\t"))
}

/// Write the header of the aggregate table.
///
/// # Errors
///
/// Propagates I/O errors from `writer`.
pub fn write_aggregate_header<W: Write>(writer: &mut W) -> io::Result<()> {
    let mut columns: Vec<&str> = AGG_ANNOT_COLUMNS.to_vec();
    columns.extend(Feature::ALL.iter().map(|f| f.name()));
    writeln!(writer, "{}", columns.join("\t"))
}

/// Write one per-target row. `target_id` is the 1-based rank of the target
/// on its transcript.
///
/// # Errors
///
/// Propagates I/O errors from `writer`.
pub fn write_target_row<W: Write>(
    writer: &mut W,
    mirna_id: &str,
    transcript_id: &str,
    target_id: usize,
    target: &Target,
    features: &FeatureMap,
) -> io::Result<()> {
    let mut cells = vec![
        mirna_id.to_string(),
        transcript_id.to_string(),
        target_id.to_string(),
        target.seed_length().to_string(),
        target.mirna.start().to_string(),
        target.mirna.end().to_string(),
        target.seed.start().to_string(),
        target.seed.end().to_string(),
    ];
    cells.extend(Feature::ALL.iter().map(|f| feature_cell(features, *f)));
    writeln!(writer, "{}", cells.join("\t"))
}

/// Write one per-transcript aggregate row.
///
/// # Errors
///
/// Propagates I/O errors from `writer`.
pub fn write_aggregate_row<W: Write>(
    writer: &mut W,
    mirna_id: &str,
    transcript_id: &str,
    targets: &[Target],
    features: &FeatureMap,
) -> io::Result<()> {
    let seed6 = targets.iter().filter(|t| t.seed_length() == 6).count();
    let seed7 = targets.iter().filter(|t| t.seed_length() == 7).count();
    let mut cells = vec![
        mirna_id.to_string(),
        transcript_id.to_string(),
        targets.len().to_string(),
        seed6.to_string(),
        seed7.to_string(),
    ];
    cells.extend(Feature::ALL.iter().map(|f| feature_cell(features, *f)));
    writeln!(writer, "{}", cells.join("\t"))
}

/// Draw the miRNA reverse-paired over its host site, seed columns marked.
#[must_use]
pub fn pairing_diagram(target: &Target, extension: usize) -> String {
    let left = extension.min(target.mirna.start());
    let window_start = target.mirna.start() - left;
    let window_end = (target.mirna.end() + extension).min(target.host_seq.len());
    let start_label = target.mirna.start().to_string();
    let end_label = (target.mirna.end() - 1).to_string();
    let gap = target
        .mirna_length()
        .saturating_sub(start_label.len() + 1);
    let reversed_mirna: String = target.mirna_seq.chars().rev().collect();
    let lines = [
        format!("{}{}{}{}", " ".repeat(left), start_label, " ".repeat(gap), end_label),
        format!(
            "{}|{}|",
            " ".repeat(left),
            " ".repeat(target.mirna_length().saturating_sub(2))
        ),
        target.host_seq[window_start..window_end].to_string(),
        format!(
            "{}{}",
            " ".repeat(target.seed.start() - window_start),
            "|".repeat(target.seed_length())
        ),
        format!("{}{}", " ".repeat(left), reversed_mirna),
    ];
    lines.join("\n")
}

/// Features shown by the pretty report, with their display labels.
const PRETTY_FEATURES: [Feature; 13] = [
    Feature::DgDuplex,
    Feature::DgBinding,
    Feature::DgOpen,
    Feature::DgTotal,
    Feature::TgsAu,
    Feature::TgsPosition,
    Feature::TgsPairing3p,
    Feature::TgsScore,
    Feature::ProbExact,
    Feature::ProbBinomial,
    Feature::ConsBls,
    Feature::SelecPhylop,
    Feature::MirmapScore,
];

/// Labelled feature listing of the pretty report.
#[must_use]
pub fn pretty_features(features: &FeatureMap) -> String {
    PRETTY_FEATURES
        .iter()
        .map(|feature| {
            let value = features
                .get(feature)
                .map_or_else(|| "NA".to_string(), |v| format!("{v:.4}"));
            format!(" {:<25}{}", feature.label(), value)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Write the pretty block for one target.
///
/// # Errors
///
/// Propagates I/O errors from `writer`.
pub fn write_pretty_target<W: Write>(
    writer: &mut W,
    target_id: usize,
    target: &Target,
    features: &FeatureMap,
) -> io::Result<()> {
    writeln!(
        writer,
        "\nTarget #{target_id}\n\n{}\n\n{}",
        pairing_diagram(target, 10),
        pretty_features(features)
    )
}

/// Write the pretty block for the per-transcript aggregate.
///
/// # Errors
///
/// Propagates I/O errors from `writer`.
pub fn write_pretty_aggregate<W: Write>(
    writer: &mut W,
    features: &FeatureMap,
) -> io::Result<()> {
    writeln!(writer, "\nAggregate scores\n\n{}", pretty_features(features))
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

    #[test]
    fn test_format_number_prefers_shorter_rendering() {
        assert_eq!(format_number(0.5), "0.5");
        assert_eq!(format_number(1.0), "1");
        assert_eq!(format_number(1.0 / 3.0), "0.33333333");
    }

    #[test]
    fn test_table_header_lists_all_features() {
        let mut out = Vec::new();
        write_table_header(&mut out).unwrap();
        let header = String::from_utf8(out).unwrap();
        let columns: Vec<&str> = header.trim_end().split('\t').collect();
        assert_eq!(columns.len(), 8 + Feature::ALL.len());
        assert_eq!(columns[0], "mirna_id");
        assert_eq!(columns[8], "tgs_au");
        assert_eq!(*columns.last().unwrap(), "mirmap_score");
    }

    #[test]
    fn test_target_row_writes_na_for_missing_features() {
        let target = planted_target();
        let mut features = FeatureMap::new();
        features.insert(Feature::TgsAu, 0.5);
        let mut out = Vec::new();
        write_target_row(&mut out, "miR-1", "tx1", 1, &target, &features).unwrap();
        let row = String::from_utf8(out).unwrap();
        let cells: Vec<&str> = row.trim_end().split('\t').collect();
        assert_eq!(&cells[..8], &["miR-1", "tx1", "1", "7", "6", "28", "20", "27"]);
        assert_eq!(cells[8], "0.5");
        assert_eq!(cells[9], "NA");
    }

    #[test]
    fn test_aggregate_row_counts_seed_lengths() {
        let target = planted_target();
        let targets = vec![target.clone(), target];
        let mut out = Vec::new();
        write_aggregate_row(&mut out, "miR-1", "tx1", &targets, &FeatureMap::new()).unwrap();
        let row = String::from_utf8(out).unwrap();
        let cells: Vec<&str> = row.trim_end().split('\t').collect();
        assert_eq!(&cells[..5], &["miR-1", "tx1", "2", "0", "2"]);
    }

    #[test]
    fn test_pairing_diagram_alignment() {
        // Deep site: miRNA footprint (16, 38) leaves room for the full
        // ten-column extension on both sides.
        let host = format!("{}ATAAGCTA{}", "C".repeat(30), "C".repeat(32));
        let target = find_targets(&host, MIRNA, &ScanConfig::default())
            .unwrap()
            .remove(0);
        assert_eq!(target.mirna.start(), 16);
        let diagram = pairing_diagram(&target, 10);
        let lines: Vec<&str> = diagram.split('\n').collect();
        assert_eq!(lines.len(), 5);
        // Window covers (mirna.start - 10, mirna.end + 10).
        assert_eq!(lines[2].len(), 42);
        // Seed marks sit over the seed site within the window.
        let mark_offset = target.seed.start() - (target.mirna.start() - 10);
        assert_eq!(&lines[3][mark_offset..mark_offset + 7], "|||||||");
        assert!(lines[4].ends_with(&MIRNA.chars().rev().collect::<String>()));
    }

    #[test]
    fn test_pairing_diagram_clamps_at_sequence_start() {
        let host = format!("{}ATAAGCTA{}", "C".repeat(14), "C".repeat(32));
        let target = find_targets(&host, MIRNA, &ScanConfig::default())
            .unwrap()
            .remove(0);
        assert_eq!(target.mirna.start(), 0);
        let diagram = pairing_diagram(&target, 10);
        let lines: Vec<&str> = diagram.split('\n').collect();
        assert!(lines[4].starts_with(&MIRNA.chars().rev().collect::<String>()));
    }

    #[test]
    fn test_pretty_features_labels_and_na() {
        let mut features = FeatureMap::new();
        features.insert(Feature::MirmapScore, -0.1234);
        let text = pretty_features(&features);
        assert!(text.contains("miRmap score"));
        assert!(text.contains("-0.1234"));
        assert!(text.contains("NA"));
    }
}
