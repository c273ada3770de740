use assert_cmd::Command;
use std::fs;
use tempfile::TempDir;

const MIRNA_FASTA: &str = ">mir-a\nUAGCUUAUCAGACUGAUGUUGA\n";

fn planted_transcript_fasta() -> String {
    // Transcript carrying one site matched by the 7 nt seed AGCUUAU,
    // followed by an A.
    format!(">tx1\n{}ATAAGCTA{}\n", "C".repeat(20), "C".repeat(32))
}

fn write_fixtures(dir: &TempDir) -> (String, String) {
    let mirna_path = dir.path().join("mirnas.fa");
    let transcript_path = dir.path().join("transcripts.fa");
    fs::write(&mirna_path, MIRNA_FASTA).unwrap();
    fs::write(&transcript_path, planted_transcript_fasta()).unwrap();
    (
        mirna_path.to_str().unwrap().to_string(),
        transcript_path.to_str().unwrap().to_string(),
    )
}

#[test]
fn table_output_reports_planted_target() {
    let dir = TempDir::new().unwrap();
    let (mirnas, transcripts) = write_fixtures(&dir);
    let output = dir.path().join("targets.tsv");

    Command::cargo_bin("seedscan")
        .unwrap()
        .args(["-a", &mirnas, "-f", &transcripts, "-q"])
        .args(["-o", output.to_str().unwrap()])
        .assert()
        .success();

    let table = fs::read_to_string(&output).unwrap();
    let lines: Vec<&str> = table.lines().collect();
    assert_eq!(lines.len(), 2);

    let header: Vec<&str> = lines[0].split('\t').collect();
    assert_eq!(header[0], "mirna_id");
    assert_eq!(header[8], "tgs_au");
    assert_eq!(*header.last().unwrap(), "mirmap_score");

    let row: Vec<&str> = lines[1].split('\t').collect();
    assert_eq!(row.len(), header.len());
    assert_eq!(
        &row[..8],
        &["mir-a", "tx1", "1", "7", "6", "28", "20", "27"]
    );
    // No folding backend: thermodynamic columns are NA.
    let dg_duplex_col = header.iter().position(|c| *c == "dg_duplex").unwrap();
    assert_eq!(row[dg_duplex_col], "NA");
    // Neutral conservation defaults.
    let cons_col = header.iter().position(|c| *c == "cons_bls").unwrap();
    assert_eq!(row[cons_col], "0");
    let phylop_col = header.iter().position(|c| *c == "selec_phylop").unwrap();
    assert_eq!(row[phylop_col], "1");
    // The combined score is a finite number.
    let score: f64 = row.last().unwrap().parse().unwrap();
    assert!(score.is_finite());
}

#[test]
fn aggregate_output_counts_targets_per_pair() {
    let dir = TempDir::new().unwrap();
    let (mirnas, transcripts) = write_fixtures(&dir);
    let output = dir.path().join("targets.tsv");
    let output_1to1 = dir.path().join("aggregated.tsv");

    Command::cargo_bin("seedscan")
        .unwrap()
        .args(["-a", &mirnas, "-f", &transcripts, "-g", "-q"])
        .args(["-o", output.to_str().unwrap()])
        .args(["-x", output_1to1.to_str().unwrap()])
        .assert()
        .success();

    let table = fs::read_to_string(&output_1to1).unwrap();
    let lines: Vec<&str> = table.lines().collect();
    assert_eq!(lines.len(), 2);

    let header: Vec<&str> = lines[0].split('\t').collect();
    assert_eq!(
        &header[..5],
        &[
            "mirna_id",
            "transcript_stable_id",
            "num_target",
            "num_seed6",
            "num_seed7"
        ]
    );
    let row: Vec<&str> = lines[1].split('\t').collect();
    assert_eq!(&row[..5], &["mir-a", "tx1", "1", "0", "1"]);
}

#[test]
fn pretty_output_draws_pairing() {
    let dir = TempDir::new().unwrap();
    let (mirnas, transcripts) = write_fixtures(&dir);
    let output = dir.path().join("report.txt");

    Command::cargo_bin("seedscan")
        .unwrap()
        .args(["-a", &mirnas, "-f", &transcripts, "-p", "-q"])
        .args(["-o", output.to_str().unwrap()])
        .assert()
        .success();

    let report = fs::read_to_string(&output).unwrap();
    assert!(report.contains("Target #1"));
    assert!(report.contains("|||||||"));
    assert!(report.contains("miRmap score"));
    // The miRNA is drawn reversed under its site.
    assert!(report.contains("AGTTGTAGTCAGACTATTCGAT"));
}

#[test]
fn transcript_without_site_yields_empty_table() {
    let dir = TempDir::new().unwrap();
    let mirna_path = dir.path().join("mirnas.fa");
    let transcript_path = dir.path().join("transcripts.fa");
    fs::write(&mirna_path, MIRNA_FASTA).unwrap();
    fs::write(
        &transcript_path,
        format!(">tx-empty\n{}\n", "G".repeat(60)),
    )
    .unwrap();
    let output = dir.path().join("targets.tsv");

    Command::cargo_bin("seedscan")
        .unwrap()
        .args(["-a", mirna_path.to_str().unwrap()])
        .args(["-f", transcript_path.to_str().unwrap(), "-q"])
        .args(["-o", output.to_str().unwrap()])
        .assert()
        .success();

    let table = fs::read_to_string(&output).unwrap();
    // Header only.
    assert_eq!(table.lines().count(), 1);
}

#[test]
fn missing_input_fails_with_error() {
    let dir = TempDir::new().unwrap();
    let (mirnas, _) = write_fixtures(&dir);

    Command::cargo_bin("seedscan")
        .unwrap()
        .args(["-a", &mirnas, "-f", "/nonexistent/transcripts.fa"])
        .assert()
        .failure();
}
