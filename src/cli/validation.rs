// validation.rs - Input validation utilities

use std::collections::{HashMap, HashSet};
use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use log::info;
use regex::Regex;

use crate::align::AlignerKind;
use crate::cli::args::Args;
use crate::core::{ModelPolicy, TaxonFilter};
use crate::data::fasta::has_fasta_extension;
use crate::error::{PhyloError, Result};
use crate::output::MatrixFormat;

pub struct ValidationResult {
    pub inputs: Vec<PathBuf>,
    pub aligner: AlignerKind,
    pub align_timeout: Duration,
    pub model_policy: ModelPolicy,
    pub matrix_format: MatrixFormat,
    pub taxon_filter: TaxonFilter,
}

/// Validate all command line arguments
pub fn validate_args(args: &Args) -> Result<ValidationResult> {
    if args.input.is_empty() {
        return Err(PhyloError::config("--input is required (FASTA file or directory)"));
    }
    let inputs = collect_inputs(&args.input)?;

    let aligner = AlignerKind::from_str(&args.aligner).map_err(PhyloError::config)?;
    if aligner == AlignerKind::None && args.aligner_path.is_some() {
        return Err(PhyloError::config(
            "--aligner-path is not compatible with --aligner none",
        ));
    }
    if args.align_timeout == 0 {
        return Err(PhyloError::config("Aligner timeout must be at least 1 second"));
    }

    let model_policy = ModelPolicy::from_str(&args.model).map_err(PhyloError::config)?;
    let matrix_format = MatrixFormat::from_str(&args.matrix_format).map_err(PhyloError::config)?;

    if inputs.len() > 1 {
        for (flag, value) in [("--output", &args.output), ("--matrix-output", &args.matrix_output)] {
            if let Some(path) = value {
                if Path::new(path).is_file() {
                    return Err(PhyloError::config(format!(
                        "{} must be a directory when several inputs are given, '{}' is a file",
                        flag, path
                    )));
                }
            }
        }
        if args.output.is_some() || args.matrix_output.is_some() {
            check_unique_stems(&inputs)?;
        }
    }

    if args.threads == Some(0) {
        return Err(PhyloError::config("Thread count must be at least 1"));
    }

    // Compile regex patterns
    let include = compile_regex("include_taxa", args.include_taxa.as_deref())?;
    let exclude = compile_regex("exclude_taxa", args.exclude_taxa.as_deref())?;

    // Load filter sets from files
    let include_ids = match &args.include_taxa_list {
        Some(path) => Some(load_set_from_file(path)?),
        None => None,
    };
    let exclude_ids = match &args.exclude_taxa_list {
        Some(path) => Some(load_set_from_file(path)?),
        None => None,
    };

    Ok(ValidationResult {
        inputs,
        aligner,
        align_timeout: Duration::from_secs(args.align_timeout),
        model_policy,
        matrix_format,
        taxon_filter: TaxonFilter::new(include, exclude).with_id_lists(include_ids, exclude_ids),
    })
}

fn compile_regex(name: &str, pattern: Option<&str>) -> Result<Option<Regex>> {
    pattern
        .map(|p| Regex::new(p).map_err(|e| PhyloError::config(format!("Invalid {} regex: {}", name, e))))
        .transpose()
}

/// Expand files and directories into a sorted, de-duplicated list of FASTA files
fn collect_inputs(inputs: &[String]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for input in inputs {
        let path = Path::new(input);
        if path.is_dir() {
            let mut found: Vec<PathBuf> = fs::read_dir(path)
                .map_err(|e| PhyloError::config(format!("Failed to read directory '{}': {}", input, e)))?
                .filter_map(|entry| entry.ok().map(|e| e.path()))
                .filter(|p| p.is_file() && has_fasta_extension(p))
                .collect();
            if found.is_empty() {
                return Err(PhyloError::config(format!("No FASTA files found in directory '{}'", input)));
            }
            found.sort();
            files.extend(found);
        } else if path.is_file() {
            files.push(path.to_path_buf());
        } else {
            return Err(PhyloError::config(format!("Input not found: {}", input)));
        }
    }

    let mut seen = HashSet::new();
    files.retain(|p| seen.insert(p.clone()));
    Ok(files)
}

/// File name an input's results are written under, without extension
pub fn output_stem(input: &Path) -> String {
    input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "tree".to_string())
}

/// Inputs sharing a stem would write to the same output files
fn check_unique_stems(inputs: &[PathBuf]) -> Result<()> {
    let mut seen: HashMap<String, &Path> = HashMap::new();
    for input in inputs {
        if let Some(previous) = seen.insert(output_stem(input), input) {
            return Err(PhyloError::config(format!(
                "inputs '{}' and '{}' would write to the same output name '{}'",
                previous.display(),
                input.display(),
                output_stem(input)
            )));
        }
    }
    Ok(())
}

/// Load a set of strings from a file (one per line)
fn load_set_from_file(file_path: &str) -> Result<HashSet<String>> {
    let file = File::open(file_path)
        .map_err(|e| PhyloError::config(format!("Failed to open filter file '{}': {}", file_path, e)))?;

    let reader = BufReader::new(file);
    let mut set = HashSet::new();

    for (line_num, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| {
            PhyloError::config(format!(
                "Failed to read line {} from '{}': {}",
                line_num + 1,
                file_path,
                e
            ))
        })?;
        let trimmed = line.trim();
        if !trimmed.is_empty() {
            set.insert(trimmed.to_string());
        }
    }

    info!("Loaded {} items from filter file '{}'", set.len(), file_path);
    Ok(set)
}

#[cfg(test)]
mod tests {
    use super::*;
    use argh::FromArgs;

    fn parse(args: &[&str]) -> Args {
        Args::from_args(&["njtree"], args).unwrap()
    }

    fn fasta_dir() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.fasta"), ">x\nACGT\n>y\nACGA\n").unwrap();
        fs::write(dir.path().join("a.fa"), ">x\nACGT\n>y\nACGA\n").unwrap();
        fs::write(dir.path().join("notes.txt"), "not a fasta").unwrap();
        dir
    }

    #[test]
    fn test_valid_args() {
        let dir = fasta_dir();
        let input = dir.path().to_str().unwrap();
        let result = validate_args(&parse(&["--input", input, "--model", "k2p", "--aligner", "none"])).unwrap();
        let names: Vec<_> = result
            .inputs
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["a.fa", "b.fasta"]);
        assert_eq!(result.aligner, AlignerKind::None);
        assert_eq!(result.model_policy, ModelPolicy::Fixed(crate::models::ModelKind::Kimura));
        assert_eq!(result.matrix_format, MatrixFormat::Tsv);
        assert_eq!(result.align_timeout, Duration::from_secs(300));
        assert!(result.taxon_filter.is_empty());
    }

    #[test]
    fn test_invalid_values() {
        let dir = fasta_dir();
        let input = dir.path().to_str().unwrap();
        assert!(validate_args(&parse(&[])).is_err());
        assert!(validate_args(&parse(&["--input", "/nonexistent.fasta"])).is_err());
        assert!(validate_args(&parse(&["--input", input, "--model", "jc69"])).is_err());
        assert!(validate_args(&parse(&["--input", input, "--aligner", "muscle"])).is_err());
        assert!(validate_args(&parse(&["--input", input, "--matrix-format", "xlsx"])).is_err());
        assert!(validate_args(&parse(&["--input", input, "--include-taxa", "("])).is_err());
        assert!(validate_args(&parse(&["--input", input, "--align-timeout", "0"])).is_err());
    }

    #[test]
    fn test_shared_stems_rejected_with_outputs() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("seqs.fa"), ">x\nACGT\n>y\nACGA\n").unwrap();
        fs::write(dir.path().join("seqs.fasta"), ">x\nACGT\n>y\nACGA\n>z\nTCGA\n").unwrap();
        let input = dir.path().to_str().unwrap();
        let out = dir.path().join("out");
        let out = out.to_str().unwrap();

        let err = validate_args(&parse(&["--input", input, "--output", out])).err().unwrap();
        assert!(err.to_string().contains("same output name 'seqs'"));
        assert!(validate_args(&parse(&["--input", input, "--matrix-output", out])).is_err());
        // Trees on stdout only: nothing can collide
        assert!(validate_args(&parse(&["--input", input])).is_ok());

        let distinct = fasta_dir();
        let input = distinct.path().to_str().unwrap();
        assert!(validate_args(&parse(&["--input", input, "--output", out])).is_ok());
    }

    #[test]
    fn test_output_stem() {
        assert_eq!(output_stem(Path::new("/data/run1/seqs.fasta")), "seqs");
        assert_eq!(output_stem(Path::new("seqs.v2.fa")), "seqs.v2");
    }

    #[test]
    fn test_taxon_lists() {
        let dir = fasta_dir();
        let list = dir.path().join("keep.txt");
        fs::write(&list, "x\n\n  y  \n").unwrap();
        let result = validate_args(&parse(&[
            "--input",
            dir.path().join("a.fa").to_str().unwrap(),
            "--exclude-taxa-list",
            list.to_str().unwrap(),
        ]))
        .unwrap();
        assert!(!result.taxon_filter.matches("x"));
        assert!(!result.taxon_filter.matches("y"));
        assert!(result.taxon_filter.matches("z"));
    }
}
