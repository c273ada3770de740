//! Wrappers around the PHAST command-line programs.
//!
//! `phyloFit` refits branch lengths of a species tree on an alignment;
//! `phyloP` tests the alignment for conservation. Both run as subprocesses
//! with inline inputs spilled to temporary files, and both parse the tools'
//! plain-text output.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::sequence::{to_fasta_str, SeqRecord};
use crate::types::ScanError;

/// Locations of the PHAST executables.
#[derive(Debug, Clone)]
pub struct PhastTools {
    /// Path to `phyloFit`.
    pub phylofit_path: PathBuf,
    /// Path to `phyloP`.
    pub phylop_path: PathBuf,
}

impl Default for PhastTools {
    fn default() -> Self {
        Self {
            phylofit_path: PathBuf::from("phyloFit"),
            phylop_path: PathBuf::from("phyloP"),
        }
    }
}

/// Alignment handed to a PHAST program: either a file already on disk or
/// records to spill to a temporary file.
#[derive(Debug, Clone)]
pub enum AlignmentInput<'a> {
    /// Existing FASTA alignment file.
    Path(&'a Path),
    /// In-memory records, written out before the run.
    Inline(&'a [SeqRecord]),
}

/// Parsed `phyloFit` output.
#[derive(Debug, Clone)]
pub struct PhylofitResult {
    /// Fitted tree in Newick format.
    pub tree: String,
    /// Training log-likelihood.
    pub training_lnl: f64,
    /// Full model text as emitted by `phyloFit`.
    pub mod_raw: String,
}

fn run_command(mut cmd: Command) -> Result<String, ScanError> {
    let output = cmd
        .output()
        .map_err(|e| ScanError::EngineFailure(format!("{:?}: {e}", cmd.get_program())))?;
    if !output.status.success() {
        return Err(ScanError::EngineFailure(format!(
            "{:?} exited with {}: {}",
            cmd.get_program(),
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

fn spill_to_temp(content: &str, suffix: &str) -> Result<tempfile::NamedTempFile, ScanError> {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile()?;
    file.write_all(content.as_bytes())?;
    file.flush()?;
    Ok(file)
}

impl PhastTools {
    /// Fit branch lengths of `tree` on `aln` with `phyloFit`.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::EngineFailure`] when the program fails or its
    /// output cannot be parsed.
    pub fn phylofit(
        &self,
        aln: AlignmentInput<'_>,
        tree: Option<&str>,
        subst_model: Option<&str>,
        use_em: bool,
    ) -> Result<PhylofitResult, ScanError> {
        let mut cmd = Command::new(&self.phylofit_path);
        cmd.args(["--precision", "HIGH", "--out-root", "-", "--msa-format", "FASTA"]);
        if let Some(model) = subst_model {
            cmd.args(["--subst-mod", model]);
        }
        if use_em {
            cmd.arg("--EM");
        }
        // Temporary files must outlive the child process.
        let tree_file = match tree {
            Some(text) => {
                let file = spill_to_temp(text, ".nh")?;
                cmd.arg("--tree").arg(file.path());
                Some(file)
            }
            None => None,
        };
        let aln_file = match aln {
            AlignmentInput::Path(path) => {
                cmd.arg(path);
                None
            }
            AlignmentInput::Inline(records) => {
                let file = spill_to_temp(&to_fasta_str(records), ".fa")?;
                cmd.arg(file.path());
                Some(file)
            }
        };
        let stdout = run_command(cmd)?;
        drop(tree_file);
        drop(aln_file);
        parse_phylofit_output(&stdout)
    }

    /// Run `phyloP` over `aln` under the model at `mod_path` and return the
    /// p-value of conservation.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::EngineFailure`] when the program fails or its
    /// output cannot be parsed.
    pub fn phylop(
        &self,
        method: &str,
        mode: &str,
        mod_path: &Path,
        aln: AlignmentInput<'_>,
    ) -> Result<f64, ScanError> {
        let mut cmd = Command::new(&self.phylop_path);
        cmd.args(["--method", method, "--mode", mode, "--msa-format", "FASTA"]);
        cmd.arg(mod_path);
        let aln_file = match aln {
            AlignmentInput::Path(path) => {
                cmd.arg(path);
                None
            }
            AlignmentInput::Inline(records) => {
                let file = spill_to_temp(&to_fasta_str(records), ".fa")?;
                cmd.arg(file.path());
                Some(file)
            }
        };
        let stdout = run_command(cmd)?;
        drop(aln_file);
        parse_phylop_output(&stdout)
    }
}

/// Parse the model text `phyloFit` writes to stdout.
///
/// # Errors
///
/// Returns [`ScanError::ParseError`] when a required field is absent.
pub fn parse_phylofit_output(stdout: &str) -> Result<PhylofitResult, ScanError> {
    let tree = extract_tree(stdout)?;
    let training_lnl = stdout
        .lines()
        .find_map(|line| line.strip_prefix("TRAINING_LNL: "))
        .ok_or_else(|| ScanError::ParseError("no TRAINING_LNL in phyloFit output".into()))?
        .trim()
        .parse::<f64>()
        .map_err(|e| ScanError::ParseError(format!("bad TRAINING_LNL: {e}")))?;
    Ok(PhylofitResult {
        tree,
        training_lnl,
        mod_raw: stdout.to_string(),
    })
}

/// Extract the `TREE:` line of a phyloFit model, terminated by `;`.
///
/// # Errors
///
/// Returns [`ScanError::ParseError`] when no tree is present.
pub fn extract_tree(mod_text: &str) -> Result<String, ScanError> {
    let start = mod_text
        .find("TREE: ")
        .ok_or_else(|| ScanError::ParseError("no TREE in model text".into()))?
        + "TREE: ".len();
    let end = mod_text[start..]
        .find(';')
        .ok_or_else(|| ScanError::ParseError("unterminated TREE in model text".into()))?;
    Ok(mod_text[start..start + end + 1].to_string())
}

/// Read the fitted tree out of a phyloFit `.mod` file.
///
/// # Errors
///
/// Returns [`ScanError::IoError`] on read failure and
/// [`ScanError::ParseError`] when the file holds no tree.
pub fn read_tree_from_mod(path: &Path) -> Result<String, ScanError> {
    let text = std::fs::read_to_string(path)?;
    extract_tree(&text)
}

/// Parse the conservation p-value out of `phyloP` stdout.
///
/// # Errors
///
/// Returns [`ScanError::ParseError`] when the p-value line is absent.
pub fn parse_phylop_output(stdout: &str) -> Result<f64, ScanError> {
    let marker = "p-value of conservation: ";
    let start = stdout
        .find(marker)
        .ok_or_else(|| ScanError::ParseError("no conservation p-value in phyloP output".into()))?
        + marker.len();
    let value = stdout[start..]
        .split_whitespace()
        .next()
        .ok_or_else(|| ScanError::ParseError("empty conservation p-value".into()))?;
    value
        .parse::<f64>()
        .map_err(|e| ScanError::ParseError(format!("bad conservation p-value: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    const MOD_TEXT: &str = "ALPHABET: A C G T \n\
ORDER: 0\n\
SUBST_MOD: REV\n\
TRAINING_LNL: -1234.567800\n\
BACKGROUND: 0.25 0.25 0.25 0.25 \n\
RATE_MAT:\n\
  -1.0 0.3 0.3 0.4\n\
TREE: (hg38:0.1,(mm39:0.2,rn7:0.3):0.05);\n";

    #[test]
    fn test_parse_phylofit_output() {
        let result = parse_phylofit_output(MOD_TEXT).unwrap();
        assert_eq!(result.tree, "(hg38:0.1,(mm39:0.2,rn7:0.3):0.05);");
        assert_eq!(result.training_lnl, -1234.5678);
        assert_eq!(result.mod_raw, MOD_TEXT);
    }

    #[test]
    fn test_parse_phylofit_requires_tree() {
        assert!(matches!(
            parse_phylofit_output("TRAINING_LNL: -1.0\n"),
            Err(ScanError::ParseError(_))
        ));
    }

    #[test]
    fn test_extract_tree_stops_at_semicolon() {
        assert_eq!(
            extract_tree("junk\nTREE: (A:1,B:2);\nmore").unwrap(),
            "(A:1,B:2);"
        );
        assert!(extract_tree("TREE: (A:1,B:2").is_err());
    }

    #[test]
    fn test_read_tree_from_mod_file() {
        let file = spill_to_temp(MOD_TEXT, ".mod").unwrap();
        assert_eq!(
            read_tree_from_mod(file.path()).unwrap(),
            "(hg38:0.1,(mm39:0.2,rn7:0.3):0.05);"
        );
    }

    #[test]
    fn test_parse_phylop_output() {
        let stdout = "observed stats\np-value of conservation: 0.001234 (two-sided)\n";
        assert_eq!(parse_phylop_output(stdout).unwrap(), 0.001234);
        assert!(parse_phylop_output("nothing here").is_err());
    }

    #[test]
    fn test_missing_executable_is_an_engine_failure() {
        let tools = PhastTools {
            phylofit_path: PathBuf::from("/nonexistent/phyloFit"),
            phylop_path: PathBuf::from("/nonexistent/phyloP"),
        };
        let records = vec![("a".to_string(), "ACGT".to_string())];
        assert!(matches!(
            tools.phylofit(AlignmentInput::Inline(&records), None, Some("REV"), true),
            Err(ScanError::EngineFailure(_))
        ));
    }
}
