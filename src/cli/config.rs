// config.rs - Configuration file support

use log::info;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{PhyloError, Result};

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Config {
    // Input/Output
    pub input: Option<Vec<String>>,
    pub output: Option<String>,

    // Alignment
    pub aligner: Option<String>,
    pub aligner_path: Option<String>,
    pub align_timeout: Option<u64>,

    // Distances
    pub model: Option<String>,
    pub matrix_output: Option<String>,
    pub matrix_format: Option<String>,

    // Taxon filtering
    pub include_taxa: Option<String>,
    pub exclude_taxa: Option<String>,
    pub include_taxa_list: Option<String>,
    pub exclude_taxa_list: Option<String>,

    // Performance
    pub threads: Option<usize>,

    // Flags
    pub json: Option<bool>,
    pub dry_run: Option<bool>,
}

impl Config {
    /// Create a new empty configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            PhyloError::config(format!("Failed to read config file '{}': {}", path.display(), e))
        })?;

        let config = Self::from_toml(&content).map_err(|e| {
            PhyloError::config(format!("Failed to parse config file '{}': {}", path.display(), e))
        })?;

        info!("Loaded configuration from: {}", path.display());
        Ok(config)
    }

    pub fn from_toml(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Save configuration to TOML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self)
            .map_err(|e| PhyloError::config(format!("Failed to serialize config: {}", e)))?;

        fs::write(path, content).map_err(|e| {
            PhyloError::config(format!("Failed to write config file '{}': {}", path.display(), e))
        })?;

        info!("Saved configuration to: {}", path.display());
        Ok(())
    }

    /// Generate a sample configuration file with comments
    pub fn generate_sample() -> String {
        r#"# njtree.toml - Configuration file for njtree
# Command line arguments will override these settings

# =============================================================================
# INPUT/OUTPUT
# =============================================================================

# FASTA files or directories of FASTA files
input = ["/path/to/sequences.fasta"]

# Output Newick file (a directory when several inputs are given)
output = "tree.nwk"

# =============================================================================
# ALIGNMENT
# =============================================================================

# Aligner: clustalw, none (input is already aligned)
aligner = "clustalw"

# Explicit aligner executable (default: clustalw2 or clustalw on PATH)
# aligner_path = "/usr/local/bin/clustalw2"

# Aligner timeout in seconds
align_timeout = 300

# =============================================================================
# DISTANCES
# =============================================================================

# Substitution model: auto, identity, kimura, blosum62
# auto picks kimura for nucleotides and blosum62 for proteins; any model
# that fails on the data falls back to identity
model = "auto"

# Also write the distance matrix
# matrix_output = "distances.tsv"

# Matrix format: tsv, csv, phylip, nexus
matrix_format = "tsv"

# =============================================================================
# TAXON FILTERING
# =============================================================================

# Include only taxa whose id matches regex pattern
# include_taxa = "^sample_.*"

# Exclude taxa whose id matches regex pattern
# exclude_taxa = "control.*"

# Include only taxa listed in a file (one id per line)
# include_taxa_list = "keep.txt"

# Exclude taxa listed in a file (one id per line)
# exclude_taxa_list = "drop.txt"

# =============================================================================
# PERFORMANCE
# =============================================================================

# Number of threads for batch runs (omit for auto-detection)
# threads = 8

# =============================================================================
# FLAGS
# =============================================================================

# Print JSON responses instead of plain Newick
json = false

# Validate inputs without computation (dry run)
dry_run = false
"#
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_config_parses() {
        let config = Config::from_toml(&Config::generate_sample()).unwrap();
        assert_eq!(config.input, Some(vec!["/path/to/sequences.fasta".to_string()]));
        assert_eq!(config.model.as_deref(), Some("auto"));
        assert_eq!(config.align_timeout, Some(300));
        assert_eq!(config.dry_run, Some(false));
        assert!(config.include_taxa.is_none());
    }

    #[test]
    fn test_config_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("njtree.toml");
        let config = Config {
            model: Some("kimura".to_string()),
            threads: Some(4),
            ..Config::default()
        };
        config.to_file(&path).unwrap();
        assert_eq!(Config::from_file(&path).unwrap(), config);
    }

    #[test]
    fn test_unknown_key_is_ignored_and_bad_value_rejected() {
        assert!(Config::from_toml("model = \"kimura\"\nextra = 1\n").is_ok());
        assert!(Config::from_toml("threads = \"many\"\n").is_err());
    }
}
