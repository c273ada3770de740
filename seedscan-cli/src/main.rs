//! # Seedscan CLI - miRNA Target Prediction
//!
//! Command-line interface for seed-based miRNA target prediction and
//! scoring.
//!
//! ## Usage
//!
//! ```bash
//! # Score every miRNA against every transcript
//! seedscan -a mirnas.fa -f transcripts.fa -o targets.tsv
//!
//! # With per-transcript alignments and evolutionary models
//! seedscan -a mirnas.fa -f transcripts.fa -s alns/ -d mods/ -o targets.tsv
//!
//! # Aggregate targets per miRNA-transcript pair
//! seedscan -a mirnas.fa -f transcripts.fa -g -x aggregated.tsv
//! ```
//!
//! ## Options
//!
//! - `-a, --mirna-fasta <FILE>`: miRNA FASTA file
//! - `-f, --transcript-fasta <FILE>`: transcript FASTA file
//! - `-s, --aln <DIR>`: directory of `<transcript>.fa` alignments
//! - `-d, --mod <DIR>`: directory of `<transcript>.mod` evolutionary models
//! - `-e, --tree <FILE>`: Newick species tree to refit per alignment
//! - `-o, --output <FILE>`: per-target output (default: stdout)
//! - `-g, --aggregate`: also write per-pair aggregate scores
//! - `-x, --output-1to1 <FILE>`: aggregate output (default: stdout)
//! - `-p, --pretty-output`: human-readable report instead of a table

use clap::{Arg, ArgAction, Command};
use rayon::prelude::*;
use seedscan_core::config::ScanConfig;
use seedscan_core::conservation::Alignment;
use seedscan_core::phast::PhastTools;
use seedscan_core::pipeline::{aggregate, ScoreResources, Scorer};
use seedscan_core::report;
use seedscan_core::sequence::{load_fasta, normalize_rna};
use seedscan_core::types::ScanError;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

struct Job {
    mirna_id: String,
    mirna_seq: String,
    transcript_id: String,
    transcript_seq: String,
    aln_path: Option<PathBuf>,
    mod_path: Option<PathBuf>,
}

struct JobOutput {
    num_targets: usize,
    table: String,
    table_1to1: Option<String>,
}

fn open_output(path: &str) -> io::Result<Box<dyn Write>> {
    if path == "-" {
        Ok(Box::new(BufWriter::new(io::stdout())))
    } else {
        Ok(Box::new(BufWriter::new(File::create(path)?)))
    }
}

fn existing_file(dir: Option<&String>, name: &str) -> Option<PathBuf> {
    let path = Path::new(dir?).join(name);
    path.exists().then_some(path)
}

fn run_job(
    scorer: &Scorer,
    job: &Job,
    tree: Option<&str>,
    phast: &PhastTools,
    with_aggregate: bool,
    pretty: bool,
) -> Result<JobOutput, ScanError> {
    let alignment = match &job.aln_path {
        Some(path) => Some(Alignment::new(load_fasta(path, true)?)?),
        None => None,
    };
    let resources = ScoreResources {
        alignment: alignment.as_ref(),
        tree,
        mod_path: job.mod_path.as_deref(),
        phast: Some(phast),
        ..Default::default()
    };
    let scored = scorer.score_transcript(&job.transcript_seq, &job.mirna_seq, &resources)?;

    let mut table = Vec::new();
    for (rank, (target, features)) in scored.iter().enumerate() {
        if pretty {
            report::write_pretty_target(&mut table, rank + 1, target, features)?;
        } else {
            report::write_target_row(
                &mut table,
                &job.mirna_id,
                &job.transcript_id,
                rank + 1,
                target,
                features,
            )?;
        }
    }

    let table_1to1 = if with_aggregate && !scored.is_empty() {
        let maps: Vec<_> = scored.iter().map(|(_, f)| f.clone()).collect();
        let targets: Vec<_> = scored.iter().map(|(t, _)| t.clone()).collect();
        let agg = aggregate(&maps);
        let mut out = Vec::new();
        if pretty {
            report::write_pretty_aggregate(&mut out, &agg)?;
        } else {
            report::write_aggregate_row(&mut out, &job.mirna_id, &job.transcript_id, &targets, &agg)?;
        }
        Some(String::from_utf8_lossy(&out).into_owned())
    } else {
        None
    };

    Ok(JobOutput {
        num_targets: scored.len(),
        table: String::from_utf8_lossy(&table).into_owned(),
        table_1to1,
    })
}

/// Parses command-line arguments, scores every miRNA-transcript pair in
/// parallel, and writes the per-target and optional aggregate tables.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    let matches = Command::new("seedscan")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Predict miRNA targets")
        .arg(
            Arg::new("mirna-fasta")
                .short('a')
                .long("mirna-fasta")
                .value_name("FILE")
                .required(true)
                .help("miRNA FASTA file"),
        )
        .arg(
            Arg::new("transcript-fasta")
                .short('f')
                .long("transcript-fasta")
                .value_name("FILE")
                .required(true)
                .help("Transcript FASTA file"),
        )
        .arg(
            Arg::new("aln")
                .short('s')
                .long("aln")
                .value_name("DIR")
                .help("Directory of per-transcript multiple sequence alignments"),
        )
        .arg(
            Arg::new("mod")
                .short('d')
                .long("mod")
                .value_name("DIR")
                .help("Directory of per-transcript evolutionary models"),
        )
        .arg(
            Arg::new("tree")
                .short('e')
                .long("tree")
                .value_name("FILE")
                .help("Newick species tree"),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("FILE")
                .default_value("-")
                .help("Per-target output (default: stdout)"),
        )
        .arg(
            Arg::new("aggregate")
                .short('g')
                .long("aggregate")
                .action(ArgAction::SetTrue)
                .help("Aggregate multiple targets (miRNA-mRNA 1 to 1 relationships)"),
        )
        .arg(
            Arg::new("output-1to1")
                .short('x')
                .long("output-1to1")
                .value_name("FILE")
                .default_value("-")
                .help("Aggregate output (default: stdout)"),
        )
        .arg(
            Arg::new("pretty-output")
                .short('p')
                .long("pretty-output")
                .action(ArgAction::SetTrue)
                .help("Pretty output"),
        )
        .arg(
            Arg::new("quiet")
                .short('q')
                .long("quiet")
                .action(ArgAction::SetTrue)
                .help("Quiet mode"),
        )
        .arg(
            Arg::new("path-phylofit")
                .long("path-phylofit")
                .value_name("FILE")
                .default_value("phyloFit")
                .help("Path to the phyloFit executable"),
        )
        .arg(
            Arg::new("path-phylop")
                .long("path-phylop")
                .value_name("FILE")
                .default_value("phyloP")
                .help("Path to the phyloP executable"),
        )
        .get_matches();

    let mirnas = load_fasta(matches.get_one::<String>("mirna-fasta").unwrap(), true)?;
    let transcripts = load_fasta(matches.get_one::<String>("transcript-fasta").unwrap(), true)?;

    let tree = match matches.get_one::<String>("tree") {
        Some(path) => Some(std::fs::read_to_string(path)?),
        None => None,
    };
    let phast = PhastTools {
        phylofit_path: PathBuf::from(matches.get_one::<String>("path-phylofit").unwrap()),
        phylop_path: PathBuf::from(matches.get_one::<String>("path-phylop").unwrap()),
    };

    let aln_dir = matches.get_one::<String>("aln");
    let mod_dir = matches.get_one::<String>("mod");
    let with_aggregate = matches.get_flag("aggregate");
    let pretty = matches.get_flag("pretty-output");

    let jobs: Vec<Job> = mirnas
        .iter()
        .flat_map(|(mirna_id, mirna_seq)| {
            transcripts.iter().map(move |(transcript_id, transcript_seq)| Job {
                mirna_id: mirna_id.clone(),
                mirna_seq: normalize_rna(mirna_seq),
                transcript_id: transcript_id.clone(),
                transcript_seq: normalize_rna(transcript_seq),
                aln_path: existing_file(aln_dir, &format!("{transcript_id}.fa")),
                mod_path: existing_file(mod_dir, &format!("{transcript_id}.mod")),
            })
        })
        .collect();

    let scorer = Scorer::new(ScanConfig::default());
    let outputs: Vec<JobOutput> = jobs
        .par_iter()
        .map(|job| run_job(&scorer, job, tree.as_deref(), &phast, with_aggregate, pretty))
        .collect::<Result<_, _>>()?;

    let mut out = open_output(matches.get_one::<String>("output").unwrap())?;
    let mut out_1to1 = if with_aggregate {
        Some(open_output(matches.get_one::<String>("output-1to1").unwrap())?)
    } else {
        None
    };

    if !pretty {
        report::write_table_header(&mut out)?;
        if let Some(writer) = out_1to1.as_mut() {
            report::write_aggregate_header(writer)?;
        }
    }
    for output in &outputs {
        out.write_all(output.table.as_bytes())?;
        if let (Some(writer), Some(row)) = (out_1to1.as_mut(), output.table_1to1.as_ref()) {
            writer.write_all(row.as_bytes())?;
        }
    }
    out.flush()?;
    if let Some(writer) = out_1to1.as_mut() {
        writer.flush()?;
    }

    if !matches.get_flag("quiet") {
        eprintln!(
            "Scoring complete! Found {} targets across {} miRNA-transcript pairs.",
            outputs.iter().map(|o| o.num_targets).sum::<usize>(),
            outputs.len()
        );
    }

    Ok(())
}
