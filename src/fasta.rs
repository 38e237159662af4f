//! FASTA file input.
//!
//! Mirrors the upload filter of the web form: only `.fa` / `.fasta` names are
//! accepted (case-insensitive), anything else is rejected with a warning and
//! the submission payload stays unchanged.

use anyhow::{bail, Context, Result};
use std::path::Path;

pub fn is_fasta_name(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    lower.ends_with(".fa") || lower.ends_with(".fasta")
}

/// Load a FASTA file's text for the submission payload.
pub fn read_fasta_file(path: &Path) -> Result<String> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();
    if !is_fasta_name(name) {
        bail!(
            "only FASTA files are accepted (.fasta or .fa): {}",
            path.display()
        );
    }
    std::fs::read_to_string(path).with_context(|| format!("read {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn temp_file(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("seqjob-fasta-{}-{name}", std::process::id()));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn suffix_check_is_case_insensitive() {
        assert!(is_fasta_name("seq.fasta"));
        assert!(is_fasta_name("SEQ.FASTA"));
        assert!(is_fasta_name("query.Fa"));
        assert!(!is_fasta_name("notes.txt"));
        assert!(!is_fasta_name("fasta"));
        assert!(!is_fasta_name("x.fa.bak"));
    }

    #[test]
    fn non_fasta_names_are_rejected() {
        let path = temp_file("notes.txt", "not a sequence");
        let err = read_fasta_file(&path).unwrap_err();
        assert!(err.to_string().contains("only FASTA files"));
    }

    #[test]
    fn fasta_text_is_loaded() {
        let contents = ">sp|P01308|INS_HUMAN\nMALWMRLLPLLALLALWGPDPAAA\n";
        let path = temp_file("seq.fasta", contents);
        assert_eq!(read_fasta_file(&path).unwrap(), contents);
    }

    #[test]
    fn missing_file_reports_the_path() {
        let path = std::env::temp_dir().join("seqjob-no-such-file.fasta");
        let err = read_fasta_file(&path).unwrap_err();
        assert!(format!("{err:#}").contains("seqjob-no-such-file.fasta"));
    }
}
