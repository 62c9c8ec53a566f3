// fasta.rs - FASTA reading and writing

use std::fs;
use std::io::Write;
use std::path::Path;

use bio::io::fasta;

use crate::data::sequence::Sequence;
use crate::error::{PhyloError, Result};

/// Minimum number of records a tree-building request needs
pub const MIN_RECORDS: usize = 2;

/// Normalise FASTA text as received from files or JSON bodies.
///
/// Literal `\r\n` and `\n` escapes become real newlines, CRLF becomes LF and
/// blank lines are dropped.
pub fn normalize_fasta_text(text: &str) -> String {
    let unescaped = text
        .replace("\\r\\n", "\n")
        .replace("\\n", "\n")
        .replace("\r\n", "\n");

    let mut normalized = String::with_capacity(unescaped.len());
    for line in unescaped.lines() {
        let line = line.trim_end();
        if line.trim().is_empty() {
            continue;
        }
        normalized.push_str(line.trim_start());
        normalized.push('\n');
    }
    normalized
}

/// Parse FASTA text into sequences, keeping record order.
///
/// Ids are the first whitespace-delimited token of each header. Empty
/// records and duplicate ids are rejected.
pub fn parse_fasta(text: &str) -> Result<Vec<Sequence>> {
    let normalized = normalize_fasta_text(text);
    if normalized.is_empty() {
        return Err(PhyloError::input("no sequence data provided"));
    }
    if !normalized.starts_with('>') {
        return Err(PhyloError::input(
            "FASTA input must start with a '>' header line",
        ));
    }

    let reader = fasta::Reader::new(normalized.as_bytes());
    let mut sequences: Vec<Sequence> = Vec::new();

    for (index, record_result) in reader.records().enumerate() {
        let record = record_result
            .map_err(|e| PhyloError::input(format!("Invalid FASTA record {}: {}", index + 1, e)))?;

        if record.id().is_empty() {
            return Err(PhyloError::input(format!(
                "FASTA record {} has an empty id",
                index + 1
            )));
        }
        if record.seq().is_empty() {
            return Err(PhyloError::input(format!(
                "FASTA record '{}' has no residues",
                record.id()
            )));
        }
        if sequences.iter().any(|s| s.id == record.id()) {
            return Err(PhyloError::input(format!(
                "duplicate FASTA id '{}'",
                record.id()
            )));
        }

        sequences.push(Sequence::new(record.id(), record.seq()));
    }

    Ok(sequences)
}

/// Parse FASTA text and require at least two records
pub fn parse_fasta_for_tree(text: &str) -> Result<Vec<Sequence>> {
    let sequences = parse_fasta(text)?;
    if sequences.len() < MIN_RECORDS {
        return Err(PhyloError::input(format!(
            "at least {} sequences are required, got {}",
            MIN_RECORDS,
            sequences.len()
        )));
    }
    Ok(sequences)
}

/// Read and parse a FASTA file
pub fn read_fasta_file(path: &Path) -> Result<Vec<Sequence>> {
    let content = fs::read_to_string(path).map_err(|e| {
        PhyloError::input(format!("Failed to read FASTA file '{}': {}", path.display(), e))
    })?;
    parse_fasta(&content)
}

/// Write sequences as FASTA, one residue line per record
pub fn write_fasta<W: Write>(writer: W, sequences: &[Sequence]) -> Result<()> {
    let mut writer = fasta::Writer::new(writer);
    for seq in sequences {
        writer.write(&seq.id, None, &seq.residues)?;
    }
    writer.flush()?;
    Ok(())
}

/// Accepted FASTA file extensions
pub fn has_fasta_extension(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|s| s.to_str()).unwrap_or(""),
        "fasta" | "fa" | "fna" | "fas" | "faa"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_multiline_records() {
        let text = ">seq1 description\nACGT\nacgt\n\n>seq2\nTTTT\nGGGG\n";
        let seqs = parse_fasta(text).unwrap();
        assert_eq!(seqs.len(), 2);
        assert_eq!(seqs[0].id, "seq1");
        assert_eq!(seqs[0].residues, b"ACGTACGT".to_vec());
        assert_eq!(seqs[1].residues, b"TTTTGGGG".to_vec());
    }

    #[test]
    fn test_escaped_newlines() {
        let text = ">a\\nACGT\\n>b\\r\\nACGA";
        let seqs = parse_fasta(text).unwrap();
        assert_eq!(seqs.len(), 2);
        assert_eq!(seqs[1].id, "b");
        assert_eq!(seqs[1].residues, b"ACGA".to_vec());
    }

    #[test]
    fn test_leading_blank_lines_ignored() {
        let seqs = parse_fasta("\n\n>a\nAC\n>b\nAG\n").unwrap();
        assert_eq!(seqs.len(), 2);
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!(parse_fasta("").is_err());
        assert!(parse_fasta("ACGT\n>a\nAC").is_err());
        assert!(parse_fasta(">a\n>b\nAC\n").is_err());
        assert!(parse_fasta(">a\nAC\n>a\nAG\n").is_err());
    }

    #[test]
    fn test_minimum_records() {
        let err = parse_fasta_for_tree(">only\nACGT\n").unwrap_err();
        assert!(err.to_string().contains("at least 2"));
    }

    #[test]
    fn test_write_fasta() {
        let seqs = vec![Sequence::new("a", "AC-T"), Sequence::new("b", "ACGT")];
        let mut buffer = Vec::new();
        write_fasta(&mut buffer, &seqs).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert_eq!(text, ">a\nAC-T\n>b\nACGT\n");
        assert_eq!(parse_fasta(&text).unwrap(), seqs);
    }

    #[test]
    fn test_fasta_extension() {
        assert!(has_fasta_extension(Path::new("x.fasta")));
        assert!(has_fasta_extension(Path::new("x.fna")));
        assert!(!has_fasta_extension(Path::new("x.txt")));
    }
}
